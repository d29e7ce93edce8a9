//! 展開結果快取
//!
//! 以完整的展開輸入當鍵，命中時直接回傳先前算好的報告。
//! 每份報告記住它涉及的所有物料，任何一個被標髒即整份失效。

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use bom_calc::{ExplosionReport, ExplosionRequest};
use bom_core::{BomId, BomRepository, ComponentId, Result};

use crate::dirty_tracking::DirtyTracker;

/// 快取鍵
///
/// 同一組展開輸入唯一對應一份報告；任何選項不同都是不同的鍵。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    root_bom_id: BomId,
    target_quantity: Decimal,
    include_scrap: bool,
    max_depth: Option<u32>,
    /// 版本指定依料號排序，讓 HashMap 的走訪順序不影響鍵值
    overrides: Vec<(ComponentId, BomId)>,
    effective_on: Option<NaiveDate>,
}

impl CacheKey {
    /// 由展開請求建鍵
    pub fn from_request(request: &ExplosionRequest) -> Self {
        let mut overrides: Vec<(ComponentId, BomId)> = request
            .options
            .bom_version_overrides
            .iter()
            .map(|(component_id, bom_id)| (component_id.clone(), *bom_id))
            .collect();
        overrides.sort();

        Self {
            root_bom_id: request.root_bom_id,
            target_quantity: request.target_quantity,
            include_scrap: request.options.include_scrap,
            max_depth: request.options.max_depth,
            overrides,
            effective_on: request.options.effective_on,
        }
    }
}

struct CacheEntry {
    report: ExplosionReport,
    /// 報告涉及的所有物料（含中間組裝），反向失效用
    involved: HashSet<ComponentId>,
}

/// 展開結果快取
#[derive(Default)]
pub struct ExplosionCache {
    entries: HashMap<CacheKey, CacheEntry>,
}

impl ExplosionCache {
    /// 創建空的快取
    pub fn new() -> Self {
        Self::default()
    }

    /// 查詢快取
    pub fn get(&self, request: &ExplosionRequest) -> Option<&ExplosionReport> {
        self.entries
            .get(&CacheKey::from_request(request))
            .map(|entry| &entry.report)
    }

    /// 寫入報告
    pub fn insert(&mut self, request: &ExplosionRequest, report: ExplosionReport) {
        let involved = involved_components(&report);
        self.entries.insert(
            CacheKey::from_request(request),
            CacheEntry { report, involved },
        );
    }

    /// 取用報告，未命中時計算並寫入
    pub fn fetch<R: BomRepository>(
        &mut self,
        repo: &R,
        request: &ExplosionRequest,
    ) -> Result<&ExplosionReport> {
        let key = CacheKey::from_request(request);

        let entry = match self.entries.entry(key) {
            Entry::Occupied(slot) => {
                tracing::debug!("快取命中: BOM {}", request.root_bom_id);
                slot.into_mut()
            }
            Entry::Vacant(slot) => {
                tracing::debug!("快取未命中，開始計算: BOM {}", request.root_bom_id);
                let report = bom_calc::explode_with_costs(repo, request)?;
                let involved = involved_components(&report);
                slot.insert(CacheEntry { report, involved })
            }
        };

        Ok(&entry.report)
    }

    /// 清除涉及指定物料的所有條目，回傳清除數量
    pub fn invalidate_component(&mut self, component_id: &ComponentId) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !entry.involved.contains(component_id));
        before - self.entries.len()
    }

    /// 依髒標記清除條目並取走標記，回傳清除數量
    pub fn invalidate_dirty(&mut self, tracker: &mut DirtyTracker) -> usize {
        let dirty = tracker.take_dirty();
        if dirty.is_empty() {
            return 0;
        }

        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.involved.is_disjoint(&dirty));

        let evicted = before - self.entries.len();
        tracing::debug!("快取失效: {} 個髒物料，清除 {} 份報告", dirty.len(), evicted);
        evicted
    }

    /// 清空快取
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 快取條目數
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 檢查快取是否為空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 收集報告涉及的所有物料
fn involved_components(report: &ExplosionReport) -> HashSet<ComponentId> {
    report
        .explosion
        .nodes
        .iter()
        .map(|node| node.component_id.clone())
        .collect()
}
