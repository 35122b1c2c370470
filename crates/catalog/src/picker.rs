//! Multi-select product picker over the catalog index.
//!
//! The picker tracks which products are highlighted and turns each
//! selection change into a batched added/removed delta. It never touches
//! the draft itself; the screen controller feeds the delta in.

use farmastock_core::ProductId;

use crate::index::CatalogIndex;
use crate::product::CatalogProduct;

/// One batched selection change.
///
/// Every id appears at most once in either list, regardless of how many
/// simultaneous toggles produced the change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionDelta {
    /// Products newly selected, as catalog snapshots (the draft copies
    /// price and stock from these).
    pub added: Vec<CatalogProduct>,
    /// Ids deselected in this change.
    pub removed: Vec<ProductId>,
}

impl SelectionDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Picker state: current search query plus the highlighted ids.
#[derive(Debug, Clone, Default)]
pub struct ProductPicker {
    query: String,
    selected: Vec<ProductId>,
}

impl ProductPicker {
    /// Open the picker with highlighting restored from the current draft
    /// membership, so partial progress is never visually lost.
    pub fn with_selected(ids: &[ProductId]) -> Self {
        Self {
            query: String::new(),
            selected: dedup_ids(ids),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// The rows to display for the current query.
    pub fn results<'a>(&self, index: &'a CatalogIndex) -> Vec<&'a CatalogProduct> {
        index.filter(&self.query)
    }

    pub fn selected(&self) -> &[ProductId] {
        &self.selected
    }

    pub fn is_selected(&self, id: ProductId) -> bool {
        self.selected.contains(&id)
    }

    /// Replace the selection set and report the symmetric difference.
    ///
    /// Ids present in the new set but not the previous come back as `added`
    /// (with their catalog snapshots); ids present before but absent now
    /// come back as `removed`. A deselected id that has meanwhile vanished
    /// from the catalog is still reported as removed.
    pub fn replace_selection(
        &mut self,
        index: &CatalogIndex,
        new_ids: &[ProductId],
    ) -> SelectionDelta {
        let new_ids = dedup_ids(new_ids);

        let added = new_ids
            .iter()
            .filter(|id| !self.selected.contains(id))
            .filter_map(|id| index.get(*id).cloned())
            .collect();

        let removed = self
            .selected
            .iter()
            .copied()
            .filter(|id| !new_ids.contains(id))
            .collect();

        self.selected = new_ids;
        SelectionDelta { added, removed }
    }
}

/// Order-preserving dedup of a selection list.
fn dedup_ids(ids: &[ProductId]) -> Vec<ProductId> {
    let mut out: Vec<ProductId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}
