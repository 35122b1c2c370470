//! Wire shape of a movement submission.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use farmastock_core::{PaymentMethodId, ProductId, ProviderId};
use farmastock_draft::{MovementDraft, MovementKind};

/// One request line, as the movement endpoint expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRequestLine {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
}

/// The full movement request: draft-level metadata plus one line per
/// draft line, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRequest {
    pub movement_type: MovementKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<PaymentMethodId>,
    pub lines: Vec<MovementRequestLine>,
}

impl MovementRequest {
    /// Serialize a draft into its request form.
    ///
    /// Purely a projection: validation happens before the draft reaches
    /// this point (`MovementDraft::begin_submission`).
    pub fn from_draft(draft: &MovementDraft) -> Self {
        Self {
            movement_type: draft.kind(),
            provider_id: draft.context().provider().map(|p| p.id),
            payment_method_id: draft.context().payment_method().map(|m| m.id),
            lines: draft
                .lines()
                .iter()
                .map(|line| MovementRequestLine {
                    product_id: line.product_id(),
                    quantity: line.quantity(),
                    batch_number: line.batch_number().map(str::to_string),
                    expiration_date: line.expiration_date(),
                })
                .collect(),
        }
    }
}
