//! 展開選項與請求

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bom_core::{BomId, ComponentId};

/// 展開選項
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionOptions {
    /// 是否計入損耗補償（預設開啟）
    ///
    /// 關閉時得到理論用量；損耗係數本身仍會被檢查，
    /// 超出範圍的資料錯誤不因關閉補償而被放過。
    pub include_scrap: bool,

    /// 最大展開深度，`None` 表示展開到底
    ///
    /// 根節點深度為 0。達到上限的組裝不再展開，
    /// 其需求量保留展開前的數字並標記為截斷。
    pub max_depth: Option<u32>,

    /// 指定特定物料使用的 BOM 版本
    ///
    /// 用於消除多版本歧義，或預覽尚未核准的版本。
    pub bom_version_overrides: HashMap<ComponentId, BomId>,

    /// 生效日期，用於過濾明細的生效區間
    pub effective_on: Option<NaiveDate>,
}

impl Default for ExplosionOptions {
    fn default() -> Self {
        Self {
            include_scrap: true,
            max_depth: None,
            bom_version_overrides: HashMap::new(),
            effective_on: None,
        }
    }
}

impl ExplosionOptions {
    /// 創建預設選項
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：關閉損耗補償
    pub fn without_scrap(mut self) -> Self {
        self.include_scrap = false;
        self
    }

    /// 建構器模式：限制展開深度
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// 建構器模式：指定物料使用的 BOM 版本
    pub fn with_bom_override(
        mut self,
        component_id: impl Into<ComponentId>,
        bom_id: BomId,
    ) -> Self {
        self.bom_version_overrides.insert(component_id.into(), bom_id);
        self
    }

    /// 建構器模式：設置生效日期
    pub fn with_effective_on(mut self, date: NaiveDate) -> Self {
        self.effective_on = Some(date);
        self
    }
}

/// 展開請求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionRequest {
    /// 根 BOM
    pub root_bom_id: BomId,

    /// 目標產量
    pub target_quantity: Decimal,

    /// 展開選項
    pub options: ExplosionOptions,
}

impl ExplosionRequest {
    /// 創建新的展開請求（預設選項）
    pub fn new(root_bom_id: BomId, target_quantity: Decimal) -> Self {
        Self {
            root_bom_id,
            target_quantity,
            options: ExplosionOptions::default(),
        }
    }

    /// 建構器模式：設置展開選項
    pub fn with_options(mut self, options: ExplosionOptions) -> Self {
        self.options = options;
        self
    }
}
