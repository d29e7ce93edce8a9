//! BOM 展開計算
//!
//! 將驗證過的 BOM 結構依目標產量展開成需求樹，並彙整出
//! 採購件與截斷點的需求明細。共用件在不同路徑下產生各自的
//! 樹節點實例，數量依各自路徑換算後於明細中加總。

use std::collections::BTreeMap;

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bom_core::{BomError, BomId, BomRepository, ComponentId, Result};
use bom_graph::{BomArena, NodeIndex, Validation, ValidityGuard};

use crate::options::{ExplosionOptions, ExplosionRequest};

/// 展開樹節點
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionNode {
    /// 物料
    pub component_id: ComponentId,

    /// 此節點選用的 BOM（採購件為 `None`）
    pub bom_id: Option<BomId>,

    /// 毛需求量（已含損耗補償）
    pub required_quantity: Decimal,

    /// 批量換算比例 required / batch_size（展開的組裝才有）
    pub scale: Option<Decimal>,

    /// 深度（根為 0）
    pub depth: u32,

    /// 單位成本快照（取自父 BOM 明細，根節點為 `None`）
    pub unit_cost: Option<Decimal>,

    /// 此層加值人工成本（BOM 主檔，每批量）
    pub labor_cost: Decimal,

    /// 此層加值製造費用（BOM 主檔，每批量）
    pub overhead_cost: Decimal,

    /// 子節點在樹中的索引
    pub children: Vec<usize>,

    /// 是否因深度上限被截斷
    pub truncated: bool,

    /// 是否為葉節點（採購件）
    pub is_leaf: bool,
}

/// 彙整後的需求明細（葉節點與截斷點）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionItem {
    /// 物料
    pub component_id: ComponentId,

    /// 需求總量（同料號跨路徑加總）
    pub required_quantity: Decimal,

    /// 最淺出現深度
    pub depth: u32,

    /// 是否為採購件
    pub is_leaf: bool,

    /// 任一路徑因深度上限被截斷
    pub truncated: bool,
}

/// 展開結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionResult {
    /// 根 BOM
    pub root_bom_id: BomId,

    /// 目標產量
    pub target_quantity: Decimal,

    /// 展開樹節點（父節點必在子節點之前）
    pub nodes: Vec<ExplosionNode>,

    /// 根節點在 `nodes` 中的索引
    pub root: usize,

    /// 彙整需求明細，依（深度、料號）排序
    pub items: Vec<ExplosionItem>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl ExplosionResult {
    /// 取得根節點
    pub fn root_node(&self) -> &ExplosionNode {
        &self.nodes[self.root]
    }

    /// 依料號查詢彙整明細
    pub fn item(&self, component_id: &ComponentId) -> Option<&ExplosionItem> {
        self.items
            .iter()
            .find(|item| &item.component_id == component_id)
    }
}

/// BOM 展開計算器
pub struct ExplosionCalculator;

impl ExplosionCalculator {
    /// 驗證並展開單一 BOM
    pub fn explode<R: BomRepository>(
        repo: &R,
        request: &ExplosionRequest,
    ) -> Result<ExplosionResult> {
        let validation = ValidityGuard::validate(
            repo,
            &request.root_bom_id,
            &request.options.bom_version_overrides,
            request.options.effective_on,
        )?;

        Self::explode_validated(&validation, request)
    }

    /// 用已驗證的結構展開
    ///
    /// 同一份驗證結果可重複套用不同產量，省去重新走訪資料來源。
    pub fn explode_validated(
        validation: &Validation,
        request: &ExplosionRequest,
    ) -> Result<ExplosionResult> {
        if request.target_quantity <= Decimal::ZERO {
            return Err(BomError::InvalidTargetQuantity(request.target_quantity));
        }

        let start_time = std::time::Instant::now();
        let arena = validation.graph.arena();

        tracing::info!(
            "開始 BOM 展開: 目標產量 {}，結構 {} 節點 {} 邊",
            request.target_quantity,
            arena.node_count(),
            arena.edge_count()
        );

        let mut tree = Tree {
            arena,
            options: &request.options,
            nodes: Vec::new(),
        };
        let root = tree.expand(validation.root, request.target_quantity, 0, None)?;

        let items = flatten(&tree.nodes);

        let elapsed = start_time.elapsed();
        tracing::info!(
            "BOM 展開完成: {} 個節點實例，{} 筆彙整明細，耗時 {:?}",
            tree.nodes.len(),
            items.len(),
            elapsed
        );

        Ok(ExplosionResult {
            root_bom_id: validation.root_bom_id,
            target_quantity: request.target_quantity,
            nodes: tree.nodes,
            root,
            items,
            calculation_time_ms: Some(elapsed.as_millis()),
        })
    }

    /// 批次展開多張 BOM（平行計算，結果順序與請求一致）
    pub fn explode_many<R: BomRepository>(
        repo: &R,
        requests: &[ExplosionRequest],
    ) -> Vec<Result<ExplosionResult>> {
        requests
            .par_iter()
            .map(|request| Self::explode(repo, request))
            .collect()
    }
}

/// 展開樹建構狀態
struct Tree<'a> {
    arena: &'a BomArena,
    options: &'a ExplosionOptions,
    nodes: Vec<ExplosionNode>,
}

impl Tree<'_> {
    /// 展開一個節點實例，回傳其在樹中的索引
    fn expand(
        &mut self,
        index: NodeIndex,
        required_quantity: Decimal,
        depth: u32,
        unit_cost: Option<Decimal>,
    ) -> Result<usize> {
        let arena = self.arena;
        let node = arena.node(index).ok_or_else(|| {
            BomError::CalculationError(format!("展開圖缺少節點 {}", index.index()))
        })?;

        let slot = self.nodes.len();

        // 採購件：葉節點
        let Some(bom) = &node.bom else {
            self.nodes.push(ExplosionNode {
                component_id: node.component.id.clone(),
                bom_id: None,
                required_quantity,
                scale: None,
                depth,
                unit_cost,
                labor_cost: Decimal::ZERO,
                overhead_cost: Decimal::ZERO,
                children: Vec::new(),
                truncated: false,
                is_leaf: true,
            });
            return Ok(slot);
        };

        // 達到深度上限的組裝不再展開，保留展開前的需求量並標記截斷，
        // 之後的成本彙總改用它的單位成本快照
        if self.options.max_depth.is_some_and(|limit| depth >= limit) {
            self.nodes.push(ExplosionNode {
                component_id: node.component.id.clone(),
                bom_id: Some(bom.id),
                required_quantity,
                scale: None,
                depth,
                unit_cost,
                labor_cost: Decimal::ZERO,
                overhead_cost: Decimal::ZERO,
                children: Vec::new(),
                truncated: true,
                is_leaf: false,
            });
            return Ok(slot);
        }

        if bom.batch_size <= Decimal::ZERO {
            return Err(BomError::DivisionByZeroBatchSize(bom.id));
        }

        // 批量換算：需求量相對一個批量的比例，保留小數（允許部分批量）
        let scale = required_quantity / bom.batch_size;

        self.nodes.push(ExplosionNode {
            component_id: node.component.id.clone(),
            bom_id: Some(bom.id),
            required_quantity,
            scale: Some(scale),
            depth,
            unit_cost,
            labor_cost: bom.labor_cost,
            overhead_cost: bom.overhead_cost,
            children: Vec::new(),
            truncated: false,
            is_leaf: false,
        });

        let mut children = Vec::with_capacity(arena.children(index).count());
        for (child_index, edge) in arena.children(index) {
            // 損耗係數一律檢查，是否計入補償才看選項
            let multiplier = edge.item.scrap_multiplier()?;
            let effective = if self.options.include_scrap {
                multiplier
            } else {
                Decimal::ONE
            };

            let child_quantity = edge.item.quantity_per_batch * scale * effective;
            children.push(self.expand(
                child_index,
                child_quantity,
                depth + 1,
                edge.item.unit_cost,
            )?);
        }
        self.nodes[slot].children = children;

        Ok(slot)
    }
}

/// 彙整葉節點與截斷點成需求明細
///
/// 同料號跨路徑加總，深度取最淺，任一路徑截斷即標記截斷。
fn flatten(nodes: &[ExplosionNode]) -> Vec<ExplosionItem> {
    let mut merged: BTreeMap<ComponentId, ExplosionItem> = BTreeMap::new();

    for node in nodes {
        if !node.is_leaf && !node.truncated {
            continue;
        }

        match merged.get_mut(&node.component_id) {
            Some(item) => {
                item.required_quantity += node.required_quantity;
                item.depth = item.depth.min(node.depth);
                item.truncated |= node.truncated;
            }
            None => {
                merged.insert(
                    node.component_id.clone(),
                    ExplosionItem {
                        component_id: node.component_id.clone(),
                        required_quantity: node.required_quantity,
                        depth: node.depth,
                        is_leaf: node.is_leaf,
                        truncated: node.truncated,
                    },
                );
            }
        }
    }

    let mut items: Vec<ExplosionItem> = merged.into_values().collect();
    items.sort_by(|a, b| {
        a.depth
            .cmp(&b.depth)
            .then_with(|| a.component_id.cmp(&b.component_id))
    });
    items
}
