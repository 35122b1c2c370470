//! One product entry within a movement draft.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use farmastock_catalog::CatalogProduct;
use farmastock_core::{Entity, LineId, Money, ProductId};

use crate::kind::MovementKind;

/// Kind-conditional line fields.
///
/// A sale line always carries a price; an entry line always carries its lot
/// fields. The other kinds carry nothing beyond the common columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDetails {
    Entry {
        /// Nullable until the user fills it in.
        expiration_date: Option<NaiveDate>,
        batch_number: String,
    },
    Sale {
        price: Money,
    },
    Bare,
}

impl LineDetails {
    fn for_product(kind: MovementKind, product: &CatalogProduct) -> Self {
        match kind {
            MovementKind::Entry => LineDetails::Entry {
                expiration_date: None,
                batch_number: String::new(),
            },
            MovementKind::Sale => LineDetails::Sale {
                price: product.price,
            },
            MovementKind::Adjustment | MovementKind::Return => LineDetails::Bare,
        }
    }
}

/// Line-scoped error state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineIssue {
    /// A blocked increment: the requested quantity would exceed the stock
    /// snapshot. The quantity was left unchanged.
    StockLimit { available: i64 },
    /// The server rejected this line at submission time (insufficient
    /// stock at commit). Authoritative over any client-side check.
    Rejected { reason: String },
}

/// One line rejected by the server, as reported in a stock-conflict
/// response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedLine {
    pub product_id: ProductId,
    pub reason: String,
}

/// A draft line: product reference, quantity, and kind-conditional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementLine {
    id: LineId,
    product_id: ProductId,
    product_name: String,
    description: String,
    quantity: u32,
    /// Stock snapshot copied from the catalog at selection time.
    stock: i64,
    details: LineDetails,
    issue: Option<LineIssue>,
}

impl MovementLine {
    /// New line for a freshly picked product: quantity 1, stock and price
    /// copied from the catalog snapshot.
    pub(crate) fn from_product(kind: MovementKind, product: &CatalogProduct) -> Self {
        Self {
            id: LineId::new(),
            product_id: product.id,
            product_name: product.name.clone(),
            description: product.description.clone(),
            quantity: 1,
            stock: product.stock,
            details: LineDetails::for_product(kind, product),
            issue: None,
        }
    }

    pub fn line_id(&self) -> LineId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn details(&self) -> &LineDetails {
        &self.details
    }

    pub fn issue(&self) -> Option<&LineIssue> {
        self.issue.as_ref()
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.issue, Some(LineIssue::Rejected { .. }))
    }

    pub fn price(&self) -> Option<Money> {
        match &self.details {
            LineDetails::Sale { price } => Some(*price),
            _ => None,
        }
    }

    pub fn expiration_date(&self) -> Option<NaiveDate> {
        match &self.details {
            LineDetails::Entry {
                expiration_date, ..
            } => *expiration_date,
            _ => None,
        }
    }

    pub fn batch_number(&self) -> Option<&str> {
        match &self.details {
            LineDetails::Entry { batch_number, .. } => Some(batch_number.as_str()),
            _ => None,
        }
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub(crate) fn details_mut(&mut self) -> &mut LineDetails {
        &mut self.details
    }

    pub(crate) fn clear_issue(&mut self) {
        self.issue = None;
    }

    pub(crate) fn clear_rejection(&mut self) {
        if self.is_rejected() {
            self.issue = None;
        }
    }

    pub(crate) fn note_stock_limit(&mut self) {
        self.issue = Some(LineIssue::StockLimit {
            available: self.stock,
        });
    }

    pub(crate) fn flag_rejected(&mut self, reason: String) {
        self.issue = Some(LineIssue::Rejected { reason });
    }
}

impl Entity for MovementLine {
    type Id = LineId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
