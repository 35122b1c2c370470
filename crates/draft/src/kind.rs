//! Movement type: fixed for the lifetime of one draft.

use serde::{Deserialize, Serialize};

/// The four kinds of inventory movement a draft can describe.
///
/// The kind determines which optional fields are active on each line and
/// which stock-direction rule applies. Direction is enforced server-side;
/// the client only pre-checks quantity against the stock snapshot for the
/// consuming kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Purchase entry: stock increases; lines carry lot number and
    /// expiration date; the draft requires a provider.
    Entry,
    /// Sale: stock decreases; lines carry an editable price; the draft
    /// requires a payment method.
    Sale,
    /// Stock adjustment (subtraction): stock decreases.
    Adjustment,
    /// Return: stock increases back.
    Return,
}

impl MovementKind {
    pub fn increases_stock(&self) -> bool {
        matches!(self, MovementKind::Entry | MovementKind::Return)
    }

    /// Whether `quantity <= stock` is pre-checked client-side.
    ///
    /// Only the consuming kinds are checked; the snapshot may be stale
    /// either way, so the server's verdict at submission always wins.
    pub fn checks_stock(&self) -> bool {
        matches!(self, MovementKind::Sale | MovementKind::Adjustment)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Entry => "entry",
            MovementKind::Sale => "sale",
            MovementKind::Adjustment => "adjustment",
            MovementKind::Return => "return",
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
