//! BOM 圖

use serde::{Deserialize, Serialize};

use crate::arena::{BomArena, BomNode, NodeIndex};

/// BOM 圖
///
/// 驗證器走訪資料來源後建立的唯讀展開結構。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BomGraph {
    arena: BomArena,
}

impl BomGraph {
    /// 創建空圖
    pub fn new() -> Self {
        Self::default()
    }

    /// 由已建好的儲存區建立圖
    pub fn from_arena(arena: BomArena) -> Self {
        Self { arena }
    }

    /// 取得節點儲存區
    pub fn arena(&self) -> &BomArena {
        &self.arena
    }

    /// 走訪所有組裝節點（有 BOM 者）
    pub fn assemblies(&self) -> impl Iterator<Item = (NodeIndex, &BomNode)> + '_ {
        self.arena.nodes().filter(|(_, node)| !node.is_leaf())
    }

    /// 走訪所有葉節點（採購件）
    pub fn leaves(&self) -> impl Iterator<Item = (NodeIndex, &BomNode)> + '_ {
        self.arena.nodes().filter(|(_, node)| node.is_leaf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::BomNode;
    use bom_core::{Bom, Component, ComponentType};
    use rust_decimal::Decimal;

    #[test]
    fn test_assemblies_and_leaves() {
        let mut arena = BomArena::new();
        arena.add_node(BomNode {
            component: Component::new("BIKE", "腳踏車", ComponentType::FinishedGood),
            bom: Some(Bom::new("BIKE", "BOM-BIKE", 1, Decimal::ONE)),
        });
        arena.add_node(BomNode {
            component: Component::new("STEEL-TUBE", "鋼管", ComponentType::RawMaterial),
            bom: None,
        });

        let graph = BomGraph::from_arena(arena);

        assert_eq!(graph.assemblies().count(), 1);
        assert_eq!(graph.leaves().count(), 1);
        assert_eq!(graph.arena().node_count(), 2);
    }
}
