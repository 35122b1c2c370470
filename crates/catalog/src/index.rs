//! In-memory index over the fetched catalog snapshot.

use farmastock_core::ProductId;

use crate::product::CatalogProduct;

/// Lookup and filtering over one catalog snapshot.
///
/// The index owns the snapshot; `refresh` replaces it wholesale (stock may
/// have changed for every product after a movement, not only the visible
/// page). Filtering never mutates the snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    products: Vec<CatalogProduct>,
}

impl CatalogIndex {
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        Self { products }
    }

    pub fn get(&self, id: ProductId) -> Option<&CatalogProduct> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Case-insensitive substring filter over name and description.
    ///
    /// Recomputed on every keystroke; an empty query returns the full
    /// snapshot in catalog order.
    pub fn filter(&self, query: &str) -> Vec<&CatalogProduct> {
        self.products.iter().filter(|p| p.matches(query)).collect()
    }

    /// Replace the snapshot after a successful movement.
    pub fn refresh(&mut self, products: Vec<CatalogProduct>) {
        self.products = products;
    }
}
