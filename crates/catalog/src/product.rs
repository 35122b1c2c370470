//! Read-only product snapshot as served by the stock endpoint.

use serde::{Deserialize, Serialize};

use farmastock_core::{Entity, Money, ProductId};

/// Immutable snapshot of a catalog product.
///
/// Fetched once at screen load and replaced wholesale after a successful
/// movement; never mutated in place. The `stock` value is the on-hand
/// quantity at fetch time and may be stale by the time a draft is
/// submitted — the server remains authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i64,
}

impl Entity for CatalogProduct {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl CatalogProduct {
    /// Case-insensitive substring match over name and description.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, description: &str) -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(1),
            name: name.to_string(),
            description: description.to_string(),
            price: Money::from_cents(100),
            stock: 10,
        }
    }

    #[test]
    fn matching_is_case_insensitive_over_name_and_description() {
        let p = product("Ibuprofeno 400mg", "antiinflamatorio");
        assert!(p.matches("IBU"));
        assert!(p.matches("400mg"));
        assert!(p.matches("Antiinflamatorio"));
        assert!(!p.matches("paracetamol"));
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(product("a", "b").matches(""));
    }
}
