//! BOM 結構驗證
//!
//! 展開前的守門員：從根 BOM 出發走訪整個用料結構，偵測循環參照、
//! 解析每個自製物料實際選用的 BOM 版本，並擋下停用物料的用量。
//! 驗證通過後產出唯讀的 [`BomGraph`]，後續展開與成本彙總不需再查資料來源。

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bom_core::{Bom, BomError, BomId, BomRepository, Component, ComponentId, Result};

use crate::arena::{BomArena, BomEdge, BomNode, NodeIndex};
use crate::graph::BomGraph;

/// 驗證通過的 BOM 結構
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    /// 展開圖
    pub graph: BomGraph,

    /// 根節點索引
    pub root: NodeIndex,

    /// 根 BOM ID
    pub root_bom_id: BomId,

    /// 各自製物料實際選用的 BOM 版本
    pub resolved: HashMap<ComponentId, BomId>,
}

/// BOM 結構驗證器
pub struct ValidityGuard;

impl ValidityGuard {
    /// 驗證根 BOM 的完整用料結構
    ///
    /// 根 BOM 可為任何狀態（草稿預覽、歷史重查都是合法用途），
    /// 但巢狀的自製物料只會解析到已核准版本，除非 `overrides` 明確指定。
    ///
    /// # 參數
    /// * `overrides` - 物料 -> 指定 BOM 版本，用於消除多版本歧義或預覽草稿
    /// * `effective_on` - 生效日期，`None` 表示不過濾生效區間
    pub fn validate<R: BomRepository>(
        repo: &R,
        root_bom_id: &BomId,
        overrides: &HashMap<ComponentId, BomId>,
        effective_on: Option<NaiveDate>,
    ) -> Result<Validation> {
        let root_bom = repo.bom(root_bom_id)?;
        let root_component = repo.component(&root_bom.component_id)?;

        tracing::debug!(
            "開始驗證 BOM 結構: {} v{} (物料 {})",
            root_bom.code,
            root_bom.version,
            root_component.id
        );

        let mut walk = Walk {
            repo,
            overrides,
            effective_on,
            arena: BomArena::new(),
            resolved: HashMap::new(),
            path: Vec::new(),
            on_path: HashSet::new(),
        };

        let root = walk.visit(root_component, Some(root_bom))?;

        tracing::debug!(
            "BOM 結構驗證通過: {} 個節點, {} 條邊",
            walk.arena.node_count(),
            walk.arena.edge_count()
        );

        Ok(Validation {
            graph: BomGraph::from_arena(walk.arena),
            root,
            root_bom_id: *root_bom_id,
            resolved: walk.resolved,
        })
    }
}

/// 深度優先走訪狀態
struct Walk<'a, R: BomRepository> {
    repo: &'a R,
    overrides: &'a HashMap<ComponentId, BomId>,
    effective_on: Option<NaiveDate>,
    arena: BomArena,
    resolved: HashMap<ComponentId, BomId>,
    /// 目前走訪路徑（根到當前節點），循環錯誤回報用
    path: Vec<ComponentId>,
    /// 路徑上的物料集合，循環偵測用
    on_path: HashSet<ComponentId>,
}

impl<R: BomRepository> Walk<'_, R> {
    /// 走訪一個物料節點，回傳其在儲存區中的索引
    fn visit(&mut self, component: Component, bom: Option<Bom>) -> Result<NodeIndex> {
        let component_id = component.id.clone();

        // 循環檢查必須先於節點重用：回到走訪路徑上的物料即為循環，
        // 出現在其他分支的共用件則不是
        if self.on_path.contains(&component_id) {
            let mut path = self.path.clone();
            path.push(component_id);
            return Err(BomError::CycleDetected { path });
        }

        if let Some(existing) = self.arena.find_node(&component_id) {
            return Ok(existing);
        }

        let header = bom.clone();
        let index = self.arena.add_node(BomNode { component, bom });

        // 採購件沒有 BOM，到此為止
        let Some(bom) = header else {
            return Ok(index);
        };

        self.resolved.insert(component_id.clone(), bom.id);
        self.path.push(component_id.clone());
        self.on_path.insert(component_id.clone());

        for item in self.repo.bom_items(&bom.id)? {
            if let Some(date) = self.effective_on {
                if !item.is_effective_on(date) {
                    tracing::debug!(
                        "略過未生效明細: BOM {} 的 {} (生效日 {})",
                        bom.code,
                        item.component_id,
                        date
                    );
                    continue;
                }
            }

            let child = self.repo.component(&item.component_id)?;

            // 停用物料允許殘留零用量明細（逐步汰換），有實際用量才擋
            if !child.is_active() && item.quantity_per_batch > Decimal::ZERO {
                return Err(BomError::InactiveComponent {
                    component_id: child.id,
                    bom_item_id: item.id,
                });
            }

            let child_bom = self.resolve(&child)?;
            let child_index = self.visit(child, child_bom)?;
            self.arena.add_edge(
                index,
                child_index,
                BomEdge {
                    bom_id: bom.id,
                    item,
                },
            );
        }

        self.path.pop();
        self.on_path.remove(&component_id);

        Ok(index)
    }

    /// 解析物料該用哪份 BOM
    ///
    /// 採購件不需要 BOM；自製物料依序採用指定版本或唯一的已核准版本，
    /// 零份或多份已核准版本都是結構錯誤。
    fn resolve(&self, component: &Component) -> Result<Option<Bom>> {
        if !component.is_manufactured() {
            return Ok(None);
        }

        if let Some(bom_id) = self.overrides.get(&component.id) {
            let bom = self.repo.bom(bom_id)?;
            if bom.component_id != component.id {
                return Err(BomError::ForeignBomOverride {
                    component_id: component.id.clone(),
                    bom_id: *bom_id,
                });
            }
            return Ok(Some(bom));
        }

        let mut candidates = self.repo.approved_boms(&component.id)?;
        match candidates.len() {
            0 => Err(BomError::NoApprovedBom(component.id.clone())),
            1 => Ok(candidates.pop()),
            _ => {
                candidates.sort_by_key(|bom| bom.version);
                Err(BomError::AmbiguousBom {
                    component_id: component.id.clone(),
                    candidates: candidates.iter().map(|bom| bom.id).collect(),
                })
            }
        }
    }
}
