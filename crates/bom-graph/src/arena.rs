//! BOM 節點儲存區（arena）

use bom_core::{Bom, BomId, BomItem, Component, ComponentId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 節點索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// 取得底層索引值
    pub fn index(&self) -> usize {
        self.0
    }
}

/// 圖節點：一個物料與其解析選用的 BOM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomNode {
    /// 物料主檔快照
    pub component: Component,

    /// 解析選用的 BOM（葉節點為 None）
    pub bom: Option<Bom>,
}

impl BomNode {
    /// 物料ID
    pub fn component_id(&self) -> &ComponentId {
        &self.component.id
    }

    /// 檢查是否為葉節點（無 BOM 可展開）
    pub fn is_leaf(&self) -> bool {
        self.bom.is_none()
    }
}

/// 圖邊：父 BOM 中消耗子物料的明細
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomEdge {
    /// 所屬（父）BOM
    pub bom_id: BomId,

    /// 用料明細
    pub item: BomItem,
}

/// BOM 節點儲存區
///
/// 以 Vec 為後盾：每個物料恰有一個節點（共用子組件不重複建立），
/// 邊以鄰接表存放。展開期間只透過索引讀取，不再查詢資料來源。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BomArena {
    nodes: Vec<BomNode>,
    children: Vec<Vec<(NodeIndex, BomEdge)>>,
    index: HashMap<ComponentId, NodeIndex>,
}

impl BomArena {
    /// 創建空的儲存區
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入節點；同一物料重複加入時回傳既有節點索引
    pub fn add_node(&mut self, node: BomNode) -> NodeIndex {
        if let Some(&existing) = self.index.get(node.component_id()) {
            return existing;
        }

        let idx = NodeIndex(self.nodes.len());
        self.index.insert(node.component_id().clone(), idx);
        self.nodes.push(node);
        self.children.push(Vec::new());
        idx
    }

    /// 加入一條父到子的邊
    pub fn add_edge(&mut self, parent: NodeIndex, child: NodeIndex, edge: BomEdge) {
        self.children[parent.0].push((child, edge));
    }

    /// 依物料ID查找節點
    pub fn find_node(&self, component_id: &ComponentId) -> Option<NodeIndex> {
        self.index.get(component_id).copied()
    }

    /// 依索引取得節點
    pub fn node(&self, index: NodeIndex) -> Option<&BomNode> {
        self.nodes.get(index.0)
    }

    /// 走訪節點的所有子邊
    pub fn children(&self, index: NodeIndex) -> impl Iterator<Item = (NodeIndex, &BomEdge)> + '_ {
        self.children
            .get(index.0)
            .into_iter()
            .flatten()
            .map(|(child, edge)| (*child, edge))
    }

    /// 走訪所有節點
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &BomNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i), node))
    }

    /// 節點數量
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 邊數量
    pub fn edge_count(&self) -> usize {
        self.children.iter().map(Vec::len).sum()
    }
}
