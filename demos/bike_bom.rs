//! 腳踏車 BOM 展開與成本彙總完整範例
//!
//! 展示從建立主檔到展開、成本彙總與快取的完整流程

use bom_cache::{DirtyTracker, ExplosionCache};
use bom_calc::{explode_with_costs, ExplosionCalculator, ExplosionOptions, ExplosionRequest};
use bom_core::*;
use bom_graph::ValidityGuard;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("===== Bike BOM Explosion Example =====\n");

    // 步驟 1: 建立物料主檔與 BOM 結構
    println!("[1] Create Components and BOMs");
    let (repo, bike_bom_id) = create_bike_repo()?;
    println!("    Components: {}", repo.component_count());
    println!("    BOMs: {}\n", repo.bom_count());

    // 步驟 2: 結構檢核（循環、核准狀態、停用料、損耗範圍）
    println!("[2] Validate Structure");
    let validation = ValidityGuard::validate(&repo, &bike_bom_id, &HashMap::new(), None)?;
    println!("    Nodes: {}", validation.graph.arena().node_count());
    println!("    Edges: {}\n", validation.graph.arena().edge_count());

    // 步驟 3: 展開 100 台
    println!("[3] Execute Explosion (target 100)");
    let request = ExplosionRequest::new(bike_bom_id, Decimal::from(100));
    let result = ExplosionCalculator::explode(&repo, &request)?;
    println!(
        "    Completed in {} ms, {} nodes\n",
        result.calculation_time_ms.unwrap_or(0),
        result.nodes.len()
    );

    // 步驟 4: 展開後的採購需求清單
    println!("[4] Flattened Requirements");
    for item in &result.items {
        println!(
            "    - {} | Qty: {} | Depth: {}{}",
            item.component_id,
            item.required_quantity.round_dp(4),
            item.depth,
            if item.truncated { " | (truncated)" } else { "" }
        );
    }
    println!();

    // 步驟 5: 成本彙總
    println!("[5] Cost Rollup");
    let report = explode_with_costs(&repo, &request)?;
    let rollup = report.rollup.rounded(2);
    println!("    Material: {}", rollup.material_cost);
    println!("    Labor:    {}", rollup.labor_cost);
    println!("    Overhead: {}", rollup.overhead_cost);
    println!("    Total:    {}\n", rollup.total_cost);

    println!("    Per-node breakdown:");
    for cost in &rollup.by_node {
        println!(
            "      - {} | Material: {} | Labor: {} | Overhead: {} | Total: {}",
            cost.component_id,
            cost.material_cost,
            cost.labor_cost,
            cost.overhead_cost,
            cost.total_cost
        );
    }
    println!();

    // 步驟 6: 限制展開深度，半成品改用快照單價計價
    println!("[6] Depth-Limited Explosion (max_depth 1)");
    let shallow_request = ExplosionRequest::new(bike_bom_id, Decimal::from(100))
        .with_options(ExplosionOptions::new().with_max_depth(1));
    let shallow = explode_with_costs(&repo, &shallow_request)?;
    let shallow_rollup = shallow.rollup.rounded(2);
    for item in &shallow.explosion.items {
        println!(
            "    - {} | Qty: {} {}",
            item.component_id,
            item.required_quantity.round_dp(4),
            if item.truncated { "(snapshot priced)" } else { "" }
        );
    }
    println!(
        "    Total with snapshots: {} (fully exploded: {})\n",
        shallow_rollup.total_cost, rollup.total_cost
    );

    // 步驟 7: 結果快取與失效
    println!("[7] Result Cache");
    let mut cache = ExplosionCache::new();
    cache.fetch(&repo, &request)?;
    let cached = cache.fetch(&repo, &request)?;
    println!(
        "    Cached entries: 1, total from cache: {}",
        cached.rollup.total_cost.round_dp(2)
    );

    let mut tracker = DirtyTracker::new();
    tracker.mark_dirty(ComponentId::new("FRAME-001"));
    let evicted = cache.invalidate_dirty(&mut tracker);
    println!("    Evicted after FRAME-001 change: {}\n", evicted);

    // 步驟 8: 匯出 JSON 報告
    println!("[8] Export Report as JSON");
    let json = serde_json::to_string_pretty(&rollup)?;
    println!("{json}\n");

    println!("===== BOM Explosion Complete =====\n");

    Ok(())
}

/// 建立腳踏車 BOM 測試資料
///
/// BIKE-001 (批量 1, 人工 50, 製費 20)
/// ├── FRAME-001 x1 (批量 10, 人工 200, 製費 80, 快照單價 120)
/// │   ├── TUBE-001  x4   @ 5.5 (損耗 10%)
/// │   └── PAINT-001 x0.5 @ 30
/// └── WHEEL-001 x2 @ 25
fn create_bike_repo(
) -> std::result::Result<(InMemoryBomRepository, BomId), Box<dyn std::error::Error>> {
    let mut repo = InMemoryBomRepository::new();
    let approved_on = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();

    repo.add_component(Component::new(
        "BIKE-001",
        "城市腳踏車",
        ComponentType::FinishedGood,
    ));
    repo.add_component(Component::new(
        "FRAME-001",
        "鋁合金車架",
        ComponentType::SubAssembly,
    ));
    repo.add_component(Component::new(
        "WHEEL-001",
        "26 吋輪組",
        ComponentType::RawMaterial,
    ));
    repo.add_component(Component::new(
        "TUBE-001",
        "鋁合金管材",
        ComponentType::RawMaterial,
    ));
    repo.add_component(Component::new(
        "PAINT-001",
        "烤漆塗料",
        ComponentType::RawMaterial,
    ));

    // 車架 BOM：批量 10
    let mut frame_bom = Bom::new("FRAME-001", "BOM-FRAME-001", 1, Decimal::from(10))
        .with_labor_cost(Decimal::from(200))
        .with_overhead_cost(Decimal::from(80));
    frame_bom.submit_for_approval()?;
    frame_bom.approve(approved_on)?;
    let frame_bom_id = frame_bom.id;
    repo.add_bom(
        frame_bom,
        vec![
            BomItem::new(frame_bom_id, "TUBE-001", Decimal::from(4))
                .with_scrap_factor(Decimal::new(1, 1))
                .with_unit_cost(Decimal::new(55, 1))
                .with_sequence(10),
            BomItem::new(frame_bom_id, "PAINT-001", Decimal::new(5, 1))
                .with_unit_cost(Decimal::from(30))
                .with_sequence(20),
        ],
    );

    // 整車 BOM：批量 1
    let mut bike_bom = Bom::new("BIKE-001", "BOM-BIKE-001", 1, Decimal::ONE)
        .with_labor_cost(Decimal::from(50))
        .with_overhead_cost(Decimal::from(20));
    bike_bom.submit_for_approval()?;
    bike_bom.approve(approved_on)?;
    let bike_bom_id = bike_bom.id;
    repo.add_bom(
        bike_bom,
        vec![
            BomItem::new(bike_bom_id, "FRAME-001", Decimal::ONE)
                .with_unit_cost(Decimal::from(120))
                .with_sequence(10),
            BomItem::new(bike_bom_id, "WHEEL-001", Decimal::from(2))
                .with_unit_cost(Decimal::from(25))
                .with_sequence(20),
        ],
    );

    Ok((repo, bike_bom_id))
}
