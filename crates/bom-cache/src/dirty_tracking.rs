//! 髒標記追蹤
//!
//! BOM 或物料主檔變更時由上層標記，快取據此決定哪些展開結果失效。

use std::collections::HashSet;

use bom_core::ComponentId;

/// 髒標記追蹤器
pub struct DirtyTracker {
    dirty_components: HashSet<ComponentId>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self {
            dirty_components: HashSet::new(),
        }
    }

    /// 標記物料為髒
    pub fn mark_dirty(&mut self, component_id: ComponentId) {
        self.dirty_components.insert(component_id);
    }

    /// 批次標記物料為髒
    pub fn mark_many(&mut self, components: impl IntoIterator<Item = ComponentId>) {
        self.dirty_components.extend(components);
    }

    /// 檢查物料是否為髒
    pub fn is_dirty(&self, component_id: &ComponentId) -> bool {
        self.dirty_components.contains(component_id)
    }

    /// 取走所有髒標記，追蹤器歸零
    pub fn take_dirty(&mut self) -> HashSet<ComponentId> {
        std::mem::take(&mut self.dirty_components)
    }

    /// 獲取所有髒物料
    pub fn get_dirty_components(&self) -> Vec<ComponentId> {
        self.dirty_components.iter().cloned().collect()
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_components.clear();
    }

    /// 髒物料數量
    pub fn len(&self) -> usize {
        self.dirty_components.len()
    }

    /// 檢查是否沒有髒標記
    pub fn is_empty(&self) -> bool {
        self.dirty_components.is_empty()
    }
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}
