//! BOM 資料存取介面

use std::collections::HashMap;

use crate::bom::{Bom, BomId};
use crate::component::{Component, ComponentId};
use crate::item::BomItem;
use crate::{BomError, Result};

/// BOM 唯讀資料存取介面
///
/// 展開與驗證透過此介面讀取資料。實作端需保證單次呼叫內回傳
/// 一致的資料快照（例如單一交易內讀取），展開過程不另行加鎖。
pub trait BomRepository: Send + Sync {
    /// 依 ID 讀取 BOM 主檔
    fn bom(&self, id: &BomId) -> Result<Bom>;

    /// 依 ID 讀取物料主檔
    fn component(&self, id: &ComponentId) -> Result<Component>;

    /// 讀取物料的所有已核准 BOM（歷史版本可能並存）
    fn approved_boms(&self, component_id: &ComponentId) -> Result<Vec<Bom>>;

    /// 讀取 BOM 的所有明細
    fn bom_items(&self, bom_id: &BomId) -> Result<Vec<BomItem>>;
}

/// 記憶體內 BOM 存放區
///
/// 做為測試替身與範例資料來源；讀取一律回傳複本，
/// 天然滿足「單次呼叫一致快照」的要求。
#[derive(Debug, Clone, Default)]
pub struct InMemoryBomRepository {
    components: HashMap<ComponentId, Component>,
    boms: HashMap<BomId, Bom>,
    items: HashMap<BomId, Vec<BomItem>>,
    by_component: HashMap<ComponentId, Vec<BomId>>,
}

impl InMemoryBomRepository {
    /// 創建空的存放區
    pub fn new() -> Self {
        Self::default()
    }

    /// 寫入物料主檔（同 ID 覆蓋）
    pub fn add_component(&mut self, component: Component) {
        self.components.insert(component.id.clone(), component);
    }

    /// 寫入 BOM 主檔與明細（同 ID 覆蓋）
    pub fn add_bom(&mut self, bom: Bom, items: Vec<BomItem>) {
        let ids = self.by_component.entry(bom.component_id.clone()).or_default();
        if !ids.contains(&bom.id) {
            ids.push(bom.id);
        }

        self.items.insert(bom.id, items);
        self.boms.insert(bom.id, bom);
    }

    /// 刪除 BOM
    ///
    /// 僅草稿、或所屬物料未被任何明細引用的 BOM 可刪除；
    /// 已核准且被引用者必須以作廢取代刪除。
    pub fn remove_bom(&mut self, id: &BomId) -> Result<()> {
        let bom = self
            .boms
            .get(id)
            .ok_or(BomError::BomNotFound(*id))?;

        if !bom.status.is_modifiable() && self.is_component_referenced(&bom.component_id) {
            return Err(BomError::BomDeleteForbidden(*id));
        }

        let component_id = bom.component_id.clone();
        self.boms.remove(id);
        self.items.remove(id);
        if let Some(ids) = self.by_component.get_mut(&component_id) {
            ids.retain(|bom_id| bom_id != id);
        }

        Ok(())
    }

    /// 物料筆數
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// BOM 筆數
    pub fn bom_count(&self) -> usize {
        self.boms.len()
    }

    fn is_component_referenced(&self, component_id: &ComponentId) -> bool {
        self.items
            .values()
            .flatten()
            .any(|item| &item.component_id == component_id)
    }
}

impl BomRepository for InMemoryBomRepository {
    fn bom(&self, id: &BomId) -> Result<Bom> {
        self.boms
            .get(id)
            .cloned()
            .ok_or(BomError::BomNotFound(*id))
    }

    fn component(&self, id: &ComponentId) -> Result<Component> {
        self.components
            .get(id)
            .cloned()
            .ok_or_else(|| BomError::ComponentNotFound(id.clone()))
    }

    fn approved_boms(&self, component_id: &ComponentId) -> Result<Vec<Bom>> {
        let ids = match self.by_component.get(component_id) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };

        Ok(ids
            .iter()
            .filter_map(|id| self.boms.get(id))
            .filter(|bom| bom.is_approved())
            .cloned()
            .collect())
    }

    fn bom_items(&self, bom_id: &BomId) -> Result<Vec<BomItem>> {
        if !self.boms.contains_key(bom_id) {
            return Err(BomError::BomNotFound(*bom_id));
        }

        Ok(self.items.get(bom_id).cloned().unwrap_or_default())
    }
}
