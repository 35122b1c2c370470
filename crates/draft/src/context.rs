//! Draft-level metadata, closed over the movement kind.

use serde::{Deserialize, Serialize};

use farmastock_core::{PaymentMethodId, ProviderId};

use crate::kind::MovementKind;

/// Provider reference (purchase entries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
}

/// Payment method reference (sales).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
}

/// Per-kind draft metadata.
///
/// An entry draft carries a provider slot and a sale draft a payment-method
/// slot; the other kinds carry nothing. Modeling this as a closed variant
/// (rather than two independent options next to a kind tag) makes an
/// entry-with-payment-method draft unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftContext {
    Entry { provider: Option<Provider> },
    Sale { payment_method: Option<PaymentMethod> },
    Adjustment,
    Return,
}

impl DraftContext {
    /// Fresh metadata for a new draft of the given kind.
    pub fn for_kind(kind: MovementKind) -> Self {
        match kind {
            MovementKind::Entry => DraftContext::Entry { provider: None },
            MovementKind::Sale => DraftContext::Sale { payment_method: None },
            MovementKind::Adjustment => DraftContext::Adjustment,
            MovementKind::Return => DraftContext::Return,
        }
    }

    pub fn kind(&self) -> MovementKind {
        match self {
            DraftContext::Entry { .. } => MovementKind::Entry,
            DraftContext::Sale { .. } => MovementKind::Sale,
            DraftContext::Adjustment => MovementKind::Adjustment,
            DraftContext::Return => MovementKind::Return,
        }
    }

    pub fn provider(&self) -> Option<&Provider> {
        match self {
            DraftContext::Entry { provider } => provider.as_ref(),
            _ => None,
        }
    }

    pub fn payment_method(&self) -> Option<&PaymentMethod> {
        match self {
            DraftContext::Sale { payment_method } => payment_method.as_ref(),
            _ => None,
        }
    }
}
