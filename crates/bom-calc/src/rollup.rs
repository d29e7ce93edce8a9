//! 成本彙總計算
//!
//! 由下而上累計展開樹的成本：葉節點與截斷點用單位成本快照計價，
//! 組裝節點的材料成本是子節點總成本之和，再加上該層 BOM 依批量
//! 比例換算的人工與製造費用。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bom_core::{BomError, BomId, ComponentId, Result};

use crate::explosion::ExplosionResult;

/// 單一展開樹節點的成本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeCost {
    /// 物料
    pub component_id: ComponentId,

    /// 此節點選用的 BOM（採購件為 `None`）
    pub bom_id: Option<BomId>,

    /// 深度（根為 0）
    pub depth: u32,

    /// 毛需求量
    pub required_quantity: Decimal,

    /// 材料成本：葉節點為數量 x 快照，組裝為子節點總成本之和
    pub material_cost: Decimal,

    /// 此層加值人工成本（已依批量比例換算）
    pub labor_cost: Decimal,

    /// 此層加值製造費用（已依批量比例換算）
    pub overhead_cost: Decimal,

    /// 總成本（材料 + 人工 + 製造費用）
    pub total_cost: Decimal,
}

/// 成本彙總結果
///
/// 頂層欄位是整棵樹的成本構成：材料合計來自葉節點與截斷點，
/// 人工與製造費用合計來自各層 BOM 的加值。三者之和恆等於
/// 根節點的總成本。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRollup {
    /// 材料成本合計
    pub material_cost: Decimal,

    /// 加值人工成本合計
    pub labor_cost: Decimal,

    /// 加值製造費用合計
    pub overhead_cost: Decimal,

    /// 總成本（根節點）
    pub total_cost: Decimal,

    /// 每個節點的成本，索引與展開結果的 `nodes` 對齊
    pub by_node: Vec<NodeCost>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl CostRollup {
    /// 回傳四捨五入到指定小數位的副本（報表呈現用）
    ///
    /// 計算過程保留完整精度，只在最後呈現時捨入。
    pub fn rounded(&self, dp: u32) -> CostRollup {
        CostRollup {
            material_cost: self.material_cost.round_dp(dp),
            labor_cost: self.labor_cost.round_dp(dp),
            overhead_cost: self.overhead_cost.round_dp(dp),
            total_cost: self.total_cost.round_dp(dp),
            by_node: self
                .by_node
                .iter()
                .map(|cost| NodeCost {
                    component_id: cost.component_id.clone(),
                    bom_id: cost.bom_id,
                    depth: cost.depth,
                    required_quantity: cost.required_quantity.round_dp(dp),
                    material_cost: cost.material_cost.round_dp(dp),
                    labor_cost: cost.labor_cost.round_dp(dp),
                    overhead_cost: cost.overhead_cost.round_dp(dp),
                    total_cost: cost.total_cost.round_dp(dp),
                })
                .collect(),
            calculation_time_ms: self.calculation_time_ms,
        }
    }
}

/// 成本彙總計算器
pub struct CostRollupCalculator;

impl CostRollupCalculator {
    /// 由展開結果彙總成本
    ///
    /// 展開樹的節點順序保證父節點在子節點之前，由後往前走
    /// 即為後序：算到任何節點時，其子節點的成本都已就緒。
    pub fn rollup(explosion: &ExplosionResult) -> Result<CostRollup> {
        let start_time = std::time::Instant::now();

        let mut by_node: Vec<NodeCost> = explosion
            .nodes
            .iter()
            .map(|node| NodeCost {
                component_id: node.component_id.clone(),
                bom_id: node.bom_id,
                depth: node.depth,
                required_quantity: node.required_quantity,
                material_cost: Decimal::ZERO,
                labor_cost: Decimal::ZERO,
                overhead_cost: Decimal::ZERO,
                total_cost: Decimal::ZERO,
            })
            .collect();

        let mut material_total = Decimal::ZERO;
        let mut labor_total = Decimal::ZERO;
        let mut overhead_total = Decimal::ZERO;

        for index in (0..explosion.nodes.len()).rev() {
            let node = &explosion.nodes[index];

            let material = if node.is_leaf || node.truncated {
                // 零用量明細（逐步汰換）不需要成本快照
                if node.required_quantity == Decimal::ZERO {
                    Decimal::ZERO
                } else {
                    let unit_cost = node.unit_cost.ok_or_else(|| {
                        BomError::MissingCostSnapshot(node.component_id.clone())
                    })?;
                    node.required_quantity * unit_cost
                }
            } else {
                node.children
                    .iter()
                    .map(|&child| by_node[child].total_cost)
                    .sum()
            };

            // 葉節點與截斷點沒有批量比例，也就沒有加值成本
            let (labor, overhead) = match node.scale {
                Some(scale) => (node.labor_cost * scale, node.overhead_cost * scale),
                None => (Decimal::ZERO, Decimal::ZERO),
            };

            if node.is_leaf || node.truncated {
                material_total += material;
            }
            labor_total += labor;
            overhead_total += overhead;

            let cost = &mut by_node[index];
            cost.material_cost = material;
            cost.labor_cost = labor;
            cost.overhead_cost = overhead;
            cost.total_cost = material + labor + overhead;
        }

        let total_cost = by_node[explosion.root].total_cost;

        tracing::debug!(
            "成本彙總完成: 材料 {} + 人工 {} + 製費 {} = {}",
            material_total,
            labor_total,
            overhead_total,
            total_cost
        );

        Ok(CostRollup {
            material_cost: material_total,
            labor_cost: labor_total,
            overhead_cost: overhead_total,
            total_cost,
            by_node,
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explosion::ExplosionCalculator;
    use crate::options::{ExplosionOptions, ExplosionRequest};
    use bom_core::{Bom, BomItem, Component, ComponentType, InMemoryBomRepository};
    use chrono::NaiveDate;

    fn approved(mut bom: Bom) -> Bom {
        bom.submit_for_approval().unwrap();
        bom.approve(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap())
            .unwrap();
        bom
    }

    /// 與展開測試相同的腳踏車結構：
    /// BIKE (批量 1, 人工 50, 製費 20) -> FRAME x2 @ 65、WHEEL x2 @ 25
    /// FRAME (批量 1, 人工 10, 製費 5) -> STEEL-TUBE x4 @ 5
    fn bike_repo(wheel_cost: Option<Decimal>) -> (InMemoryBomRepository, BomId) {
        let mut repo = InMemoryBomRepository::new();
        repo.add_component(Component::new("BIKE", "腳踏車", ComponentType::FinishedGood));
        repo.add_component(Component::new("FRAME", "車架", ComponentType::SubAssembly));
        repo.add_component(Component::new("WHEEL", "車輪", ComponentType::RawMaterial));
        repo.add_component(Component::new(
            "STEEL-TUBE",
            "鋼管",
            ComponentType::RawMaterial,
        ));

        let frame = approved(
            Bom::new("FRAME", "BOM-FRAME", 1, Decimal::ONE)
                .with_labor_cost(Decimal::from(10))
                .with_overhead_cost(Decimal::from(5)),
        );
        let frame_id = frame.id;
        repo.add_bom(
            frame,
            vec![BomItem::new(frame_id, "STEEL-TUBE", Decimal::from(4))
                .with_unit_cost(Decimal::from(5))],
        );

        let bike = approved(
            Bom::new("BIKE", "BOM-BIKE", 1, Decimal::ONE)
                .with_labor_cost(Decimal::from(50))
                .with_overhead_cost(Decimal::from(20)),
        );
        let bike_id = bike.id;

        let mut wheel_item = BomItem::new(bike_id, "WHEEL", Decimal::from(2));
        if let Some(cost) = wheel_cost {
            wheel_item = wheel_item.with_unit_cost(cost);
        }
        repo.add_bom(
            bike,
            vec![
                BomItem::new(bike_id, "FRAME", Decimal::from(2)).with_unit_cost(Decimal::from(65)),
                wheel_item,
            ],
        );

        (repo, bike_id)
    }

    fn explode(
        repo: &InMemoryBomRepository,
        bom_id: BomId,
        quantity: Decimal,
    ) -> ExplosionResult {
        ExplosionCalculator::explode(repo, &ExplosionRequest::new(bom_id, quantity)).unwrap()
    }

    #[test]
    fn test_rollup_multi_level() {
        let (repo, bike_id) = bike_repo(Some(Decimal::from(25)));
        let explosion = explode(&repo, bike_id, Decimal::ONE);

        let rollup = CostRollupCalculator::rollup(&explosion).unwrap();

        // 一台腳踏車：
        //   鋼管 8 x 5 = 40
        //   FRAME：材料 40 + 人工 10x2 + 製費 5x2 = 70
        //   車輪 2 x 25 = 50
        //   BIKE：材料 70 + 50 = 120，人工 50，製費 20 -> 總成本 190
        assert_eq!(rollup.total_cost, Decimal::from(190));

        // 成本構成：材料 90（鋼管 40 + 車輪 50）、人工 70、製費 30
        assert_eq!(rollup.material_cost, Decimal::from(90));
        assert_eq!(rollup.labor_cost, Decimal::from(70));
        assert_eq!(rollup.overhead_cost, Decimal::from(30));

        // 根節點視角：材料是子節點總成本之和
        let root = &rollup.by_node[explosion.root];
        assert_eq!(root.material_cost, Decimal::from(120));
        assert_eq!(root.labor_cost, Decimal::from(50));
        assert_eq!(root.total_cost, Decimal::from(190));

        // FRAME 節點
        let frame = rollup
            .by_node
            .iter()
            .find(|cost| cost.component_id == ComponentId::new("FRAME"))
            .unwrap();
        assert_eq!(frame.material_cost, Decimal::from(40));
        assert_eq!(frame.labor_cost, Decimal::from(20));
        assert_eq!(frame.overhead_cost, Decimal::from(10));
        assert_eq!(frame.total_cost, Decimal::from(70));
    }

    #[test]
    fn test_cost_composition_identity() {
        // 材料 + 人工 + 製費 恆等於總成本
        let (repo, bike_id) = bike_repo(Some(Decimal::from(25)));
        let explosion = explode(&repo, bike_id, Decimal::from(3));

        let rollup = CostRollupCalculator::rollup(&explosion).unwrap();

        assert_eq!(
            rollup.material_cost + rollup.labor_cost + rollup.overhead_cost,
            rollup.total_cost
        );
        assert_eq!(rollup.total_cost, Decimal::from(570)); // 190 x 3
    }

    #[test]
    fn test_missing_cost_snapshot() {
        let (repo, bike_id) = bike_repo(None);
        let explosion = explode(&repo, bike_id, Decimal::ONE);

        let err = CostRollupCalculator::rollup(&explosion).unwrap_err();
        assert!(matches!(
            err,
            BomError::MissingCostSnapshot(id) if id == ComponentId::new("WHEEL")
        ));
    }

    #[test]
    fn test_truncated_node_priced_by_snapshot() {
        let (repo, bike_id) = bike_repo(Some(Decimal::from(25)));

        let request = ExplosionRequest::new(bike_id, Decimal::from(10))
            .with_options(ExplosionOptions::new().with_max_depth(1));
        let explosion = ExplosionCalculator::explode(&repo, &request).unwrap();

        let rollup = CostRollupCalculator::rollup(&explosion).unwrap();

        // FRAME 截斷：20 x 65 = 1300（不展開、不計它自己的人工製費）
        // 車輪：20 x 25 = 500
        // BIKE：材料 1800，人工 500，製費 200 -> 總成本 2500
        assert_eq!(rollup.material_cost, Decimal::from(1800));
        assert_eq!(rollup.labor_cost, Decimal::from(500));
        assert_eq!(rollup.overhead_cost, Decimal::from(200));
        assert_eq!(rollup.total_cost, Decimal::from(2500));

        let frame = rollup
            .by_node
            .iter()
            .find(|cost| cost.component_id == ComponentId::new("FRAME"))
            .unwrap();
        assert_eq!(frame.material_cost, Decimal::from(1300));
        assert_eq!(frame.labor_cost, Decimal::ZERO);
    }

    #[test]
    fn test_value_added_scales_with_partial_batch() {
        // 批量 10、人工 40：生產 25 -> 2.5 批 -> 人工 100
        let mut repo = InMemoryBomRepository::new();
        repo.add_component(Component::new("PAINT", "油漆", ComponentType::FinishedGood));
        repo.add_component(Component::new("RESIN", "樹脂", ComponentType::RawMaterial));

        let bom = approved(
            Bom::new("PAINT", "BOM-PAINT", 1, Decimal::from(10))
                .with_labor_cost(Decimal::from(40)),
        );
        let bom_id = bom.id;
        repo.add_bom(
            bom,
            vec![BomItem::new(bom_id, "RESIN", Decimal::from(5))
                .with_unit_cost(Decimal::from(8))],
        );

        let explosion = explode(&repo, bom_id, Decimal::from(25));
        let rollup = CostRollupCalculator::rollup(&explosion).unwrap();

        assert_eq!(rollup.labor_cost, Decimal::from(100));
        // 樹脂 5 x 2.5 = 12.5 公斤 @ 8 = 100
        assert_eq!(rollup.material_cost, Decimal::from(100));
        assert_eq!(rollup.total_cost, Decimal::from(200));
    }

    #[test]
    fn test_zero_quantity_line_needs_no_snapshot() {
        // 逐步汰換：用量歸零的停用件沒有成本快照也不該擋彙總
        let mut repo = InMemoryBomRepository::new();
        repo.add_component(Component::new("TOP", "總成", ComponentType::FinishedGood));
        repo.add_component(Component::new("TUBE", "鋼管", ComponentType::RawMaterial));
        repo.add_component(
            Component::new("OLD-PART", "停產零件", ComponentType::RawMaterial).as_discontinued(),
        );

        let bom = approved(Bom::new("TOP", "BOM-T", 1, Decimal::ONE));
        let bom_id = bom.id;
        repo.add_bom(
            bom,
            vec![
                BomItem::new(bom_id, "TUBE", Decimal::from(2)).with_unit_cost(Decimal::from(5)),
                BomItem::new(bom_id, "OLD-PART", Decimal::ZERO),
            ],
        );

        let explosion = explode(&repo, bom_id, Decimal::ONE);
        let rollup = CostRollupCalculator::rollup(&explosion).unwrap();

        assert_eq!(rollup.material_cost, Decimal::from(10));
        assert_eq!(rollup.total_cost, Decimal::from(10));
    }

    #[test]
    fn test_rounded_presentation_copy() {
        // 損耗補償產生無限小數，捨入只發生在呈現副本
        let mut repo = InMemoryBomRepository::new();
        repo.add_component(Component::new("PAINT", "油漆", ComponentType::FinishedGood));
        repo.add_component(Component::new("RESIN", "樹脂", ComponentType::RawMaterial));

        let bom = approved(Bom::new("PAINT", "BOM-PAINT", 1, Decimal::from(10)));
        let bom_id = bom.id;
        repo.add_bom(
            bom,
            vec![BomItem::new(bom_id, "RESIN", Decimal::from(5))
                .with_scrap_factor(Decimal::new(1, 1))
                .with_unit_cost(Decimal::from(8))],
        );

        let explosion = explode(&repo, bom_id, Decimal::from(100));
        let rollup = CostRollupCalculator::rollup(&explosion).unwrap();

        // 50 / 0.9 x 8 = 444.44...
        let rounded = rollup.rounded(2);
        assert_eq!(rounded.material_cost, Decimal::new(44444, 2));
        assert_eq!(rounded.total_cost, Decimal::new(44444, 2));

        // 原始結果保留完整精度
        assert_ne!(rollup.material_cost, rounded.material_cost);
    }
}
