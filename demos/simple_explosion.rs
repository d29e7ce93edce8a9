//! 簡單 BOM 展開示例

use bom_calc::{ExplosionCalculator, ExplosionRequest};
use bom_core::{Bom, BomItem, Component, ComponentType, InMemoryBomRepository};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== 簡單 BOM 展開示例 ===\n");

    // 建立主檔：一張桌子 = 4 隻桌腳 + 1 片桌板
    let mut repo = InMemoryBomRepository::new();
    repo.add_component(Component::new("TABLE-001", "餐桌", ComponentType::FinishedGood));
    repo.add_component(Component::new("LEG-001", "桌腳", ComponentType::RawMaterial));
    repo.add_component(Component::new("TOP-001", "桌板", ComponentType::RawMaterial));

    // 建立已核准的 BOM
    let mut bom = Bom::new("TABLE-001", "BOM-TABLE-001", 1, Decimal::ONE);
    bom.submit_for_approval()?;
    bom.approve(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap())?;
    let bom_id = bom.id;
    repo.add_bom(
        bom,
        vec![
            BomItem::new(bom_id, "LEG-001", Decimal::from(4)),
            BomItem::new(bom_id, "TOP-001", Decimal::ONE),
        ],
    );

    // 展開 50 張桌子
    let request = ExplosionRequest::new(bom_id, Decimal::from(50));
    let result = ExplosionCalculator::explode(&repo, &request)?;

    println!("需求清單:");
    for item in &result.items {
        println!(
            "  - 物料: {}, 數量: {}, 階層: {}",
            item.component_id, item.required_quantity, item.depth
        );
    }

    println!("\n耗時: {} ms", result.calculation_time_ms.unwrap_or(0));

    Ok(())
}
