//! BOM 明細模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bom::BomId;
use crate::component::ComponentId;
use crate::{BomError, Result};

/// BOM 明細（一條用料）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomItem {
    /// 明細ID
    pub id: Uuid,

    /// 所屬 BOM
    pub bom_id: BomId,

    /// 用料物料
    pub component_id: ComponentId,

    /// 每批量用量（生產一個批量所需的數量）
    pub quantity_per_batch: Decimal,

    /// 損耗係數（0 <= f < 1，報廢補償比例）
    pub scrap_factor: Decimal,

    /// 單位成本快照（核准時凍結；未核准前為 None）
    pub unit_cost: Option<Decimal>,

    /// 顯示順序（對展開無語意）
    pub sequence: u32,

    /// 生效起日
    pub effective_from: Option<NaiveDate>,

    /// 生效迄日
    pub effective_to: Option<NaiveDate>,

    /// 位置參考（如圖面代號）
    pub reference: Option<String>,

    /// 備註
    pub notes: Option<String>,
}

impl BomItem {
    /// 創建新的 BOM 明細
    pub fn new(
        bom_id: BomId,
        component_id: impl Into<ComponentId>,
        quantity_per_batch: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            bom_id,
            component_id: component_id.into(),
            quantity_per_batch,
            scrap_factor: Decimal::ZERO,
            unit_cost: None,
            sequence: 0,
            effective_from: None,
            effective_to: None,
            reference: None,
            notes: None,
        }
    }

    /// 建構器模式：設置損耗係數
    pub fn with_scrap_factor(mut self, scrap_factor: Decimal) -> Self {
        self.scrap_factor = scrap_factor;
        self
    }

    /// 建構器模式：設置單位成本快照
    pub fn with_unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }

    /// 建構器模式：設置顯示順序
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    /// 建構器模式：設置生效區間
    pub fn with_effectivity(
        mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Self {
        self.effective_from = from;
        self.effective_to = to;
        self
    }

    /// 建構器模式：設置位置參考
    pub fn with_reference(mut self, reference: String) -> Self {
        self.reference = Some(reference);
        self
    }

    /// 建構器模式：設置備註
    pub fn with_notes(mut self, notes: String) -> Self {
        self.notes = Some(notes);
        self
    }

    /// 凍結單位成本快照（核准時由後端呼叫）
    pub fn freeze_unit_cost(&mut self, unit_cost: Decimal) {
        self.unit_cost = Some(unit_cost);
    }

    /// 計算損耗補償倍率 1 / (1 - f)
    ///
    /// 損耗係數超出 [0, 1) 視為資料錯誤，直接回報而不截斷。
    pub fn scrap_multiplier(&self) -> Result<Decimal> {
        if self.scrap_factor < Decimal::ZERO || self.scrap_factor >= Decimal::ONE {
            return Err(BomError::InvalidScrapFactor {
                bom_item_id: self.id,
                scrap_factor: self.scrap_factor,
            });
        }

        Ok(Decimal::ONE / (Decimal::ONE - self.scrap_factor))
    }

    /// 檢查指定日期是否在生效區間內（兩端皆含；未設定的端點視為不限）
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.effective_from {
            if date < from {
                return false;
            }
        }

        if let Some(to) = self.effective_to {
            if date > to {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_item() {
        let bom_id = BomId::new();
        let item = BomItem::new(bom_id, "FRAME-001", Decimal::from(1))
            .with_sequence(10)
            .with_unit_cost(Decimal::from(250))
            .with_reference("F1".to_string());

        assert_eq!(item.bom_id, bom_id);
        assert_eq!(item.component_id, ComponentId::new("FRAME-001"));
        assert_eq!(item.quantity_per_batch, Decimal::from(1));
        assert_eq!(item.scrap_factor, Decimal::ZERO);
        assert_eq!(item.unit_cost, Some(Decimal::from(250)));
        assert_eq!(item.sequence, 10);
    }

    #[test]
    fn test_scrap_multiplier() {
        let item = BomItem::new(BomId::new(), "STEEL-TUBE", Decimal::from(3))
            .with_scrap_factor(Decimal::new(1, 1)); // 0.1

        // 1 / (1 - 0.1) = 10/9 = 1.111111...
        let multiplier = item.scrap_multiplier().unwrap();
        assert_eq!(multiplier.round_dp(6), Decimal::new(1_111_111, 6));
    }

    #[test]
    fn test_zero_scrap_multiplier_is_one() {
        let item = BomItem::new(BomId::new(), "STEEL-TUBE", Decimal::from(3));

        assert_eq!(item.scrap_multiplier().unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_invalid_scrap_factor() {
        // 損耗係數 1 代表全損，為配置錯誤
        let all_scrap = BomItem::new(BomId::new(), "STEEL-TUBE", Decimal::from(3))
            .with_scrap_factor(Decimal::ONE);
        let err = all_scrap.scrap_multiplier().unwrap_err();
        assert!(matches!(err, BomError::InvalidScrapFactor { .. }));

        // 負值同樣不合法
        let negative = BomItem::new(BomId::new(), "STEEL-TUBE", Decimal::from(3))
            .with_scrap_factor(Decimal::new(-2, 1)); // -0.2
        assert!(negative.scrap_multiplier().is_err());

        // 超過 1 的值不可被截斷，必須回報
        let over = BomItem::new(BomId::new(), "STEEL-TUBE", Decimal::from(3))
            .with_scrap_factor(Decimal::new(15, 1)); // 1.5
        assert!(over.scrap_multiplier().is_err());
    }

    #[test]
    fn test_effectivity_window() {
        let item = BomItem::new(BomId::new(), "WHEEL-001", Decimal::from(2)).with_effectivity(
            NaiveDate::from_ymd_opt(2025, 1, 1),
            NaiveDate::from_ymd_opt(2025, 6, 30),
        );

        assert!(item.is_effective_on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(item.is_effective_on(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()));
        assert!(item.is_effective_on(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()));
        assert!(!item.is_effective_on(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
        assert!(!item.is_effective_on(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()));
    }

    #[test]
    fn test_open_ended_effectivity() {
        let item = BomItem::new(BomId::new(), "WHEEL-001", Decimal::from(2));

        // 未設定區間時任何日期皆生效
        assert!(item.is_effective_on(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()));
        assert!(item.is_effective_on(NaiveDate::from_ymd_opt(2099, 12, 31).unwrap()));
    }
}
