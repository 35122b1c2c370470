//! The movement draft: line collection, invariants, local validation.

use serde::{Deserialize, Serialize};

use chrono::NaiveDate;
use farmastock_catalog::CatalogProduct;
use farmastock_core::{DomainError, DomainResult, LineId, Money, ProductId};

use crate::context::{DraftContext, PaymentMethod, Provider};
use crate::kind::MovementKind;
use crate::line::{LineDetails, MovementLine, RejectedLine};

/// Per-attempt submission phase.
///
/// While `Submitting`, every mutating operation fails with a conflict; the
/// response handler is the only code that moves the draft out of this
/// phase. This is the single-flight guard: at most one outstanding
/// submission per draft instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftPhase {
    Editing,
    Submitting,
}

/// Name/id pair of a removed line, returned so the caller can emit one
/// notification per line (or a batched summary).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedLine {
    pub product_id: ProductId,
    pub product_name: String,
}

/// The uncommitted, in-memory movement being assembled.
///
/// Created empty (or seeded with one line) when the modal opens, mutated by
/// picker events and per-line edits, submitted as a unit, and discarded on
/// close, cancel, or successful save. Never persists across open/close
/// cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementDraft {
    context: DraftContext,
    /// Insertion order is display order.
    lines: Vec<MovementLine>,
    phase: DraftPhase,
}

impl MovementDraft {
    pub fn new(kind: MovementKind) -> Self {
        Self {
            context: DraftContext::for_kind(kind),
            lines: Vec::new(),
            phase: DraftPhase::Editing,
        }
    }

    /// Draft pre-seeded with one line (modal opened from a row action).
    pub fn seeded(kind: MovementKind, product: &CatalogProduct) -> Self {
        let mut draft = Self::new(kind);
        draft.lines.push(MovementLine::from_product(kind, product));
        draft
    }

    pub fn kind(&self) -> MovementKind {
        self.context.kind()
    }

    pub fn context(&self) -> &DraftContext {
        &self.context
    }

    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == DraftPhase::Submitting
    }

    pub fn lines(&self) -> &[MovementLine] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> Option<&MovementLine> {
        self.lines.iter().find(|l| l.line_id() == id)
    }

    pub fn line_by_product(&self, product_id: ProductId) -> Option<&MovementLine> {
        self.lines.iter().find(|l| l.product_id() == product_id)
    }

    /// Current draft membership, in display order (picker highlighting).
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.iter().map(|l| l.product_id()).collect()
    }

    pub fn has_rejected_lines(&self) -> bool {
        self.lines.iter().any(|l| l.is_rejected())
    }

    fn ensure_editable(&self) -> DomainResult<()> {
        match self.phase {
            DraftPhase::Editing => Ok(()),
            DraftPhase::Submitting => Err(DomainError::conflict(
                "a submission is in flight; the draft is locked",
            )),
        }
    }

    fn line_mut(&mut self, id: LineId) -> DomainResult<&mut MovementLine> {
        self.lines
            .iter_mut()
            .find(|l| l.line_id() == id)
            .ok_or_else(DomainError::not_found)
    }

    /// Add one line per product not already present by `product_id`.
    ///
    /// Re-selecting a product never creates a second line; already-present
    /// products are skipped. Returns how many lines were actually added.
    pub fn add_products(&mut self, products: &[CatalogProduct]) -> DomainResult<usize> {
        self.ensure_editable()?;
        let kind = self.kind();
        let mut added = 0;
        for product in products {
            if self.line_by_product(product.id).is_some() {
                continue;
            }
            self.lines.push(MovementLine::from_product(kind, product));
            added += 1;
        }
        Ok(added)
    }

    /// Remove the lines whose product id matches.
    ///
    /// Returns the removed names so the caller can notify the user.
    pub fn remove_products(&mut self, ids: &[ProductId]) -> DomainResult<Vec<RemovedLine>> {
        self.ensure_editable()?;
        let mut removed = Vec::new();
        self.lines.retain(|line| {
            if ids.contains(&line.product_id()) {
                removed.push(RemovedLine {
                    product_id: line.product_id(),
                    product_name: line.product_name().to_string(),
                });
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    /// Increase a line's quantity by one.
    ///
    /// For the consuming kinds an increment beyond the stock snapshot is
    /// rejected: the quantity stays unchanged and the line is flagged with
    /// a stock-limit issue so the user sees why. Never silently clamps.
    pub fn increment_quantity(&mut self, id: LineId) -> DomainResult<()> {
        self.ensure_editable()?;
        let checks_stock = self.kind().checks_stock();
        let line = self.line_mut(id)?;

        let next = i64::from(line.quantity()) + 1;
        if checks_stock && next > line.stock() {
            line.note_stock_limit();
            return Err(DomainError::invariant(format!(
                "insufficient stock for {}: {} available",
                line.product_name(),
                line.stock()
            )));
        }

        line.set_quantity(line.quantity() + 1);
        line.clear_issue();
        Ok(())
    }

    /// Decrease a line's quantity by one, floor 1 (a no-op at the floor).
    pub fn decrement_quantity(&mut self, id: LineId) -> DomainResult<()> {
        self.ensure_editable()?;
        let line = self.line_mut(id)?;
        if line.quantity() <= 1 {
            return Ok(());
        }
        line.set_quantity(line.quantity() - 1);
        line.clear_issue();
        Ok(())
    }

    pub fn edit_description(&mut self, id: LineId, description: impl Into<String>) -> DomainResult<()> {
        self.ensure_editable()?;
        let line = self.line_mut(id)?;
        line.set_description(description.into());
        line.clear_issue();
        Ok(())
    }

    /// Edit the lot number of an entry line.
    pub fn edit_batch_number(&mut self, id: LineId, batch_number: impl Into<String>) -> DomainResult<()> {
        self.ensure_editable()?;
        let line = self.line_mut(id)?;
        match line.details_mut() {
            LineDetails::Entry { batch_number: slot, .. } => *slot = batch_number.into(),
            _ => {
                return Err(DomainError::invariant(
                    "batch number applies to entry lines only",
                ));
            }
        }
        line.clear_issue();
        Ok(())
    }

    /// Edit the expiration date of an entry line (nullable until filled).
    pub fn edit_expiration_date(&mut self, id: LineId, date: Option<NaiveDate>) -> DomainResult<()> {
        self.ensure_editable()?;
        let line = self.line_mut(id)?;
        match line.details_mut() {
            LineDetails::Entry { expiration_date, .. } => *expiration_date = date,
            _ => {
                return Err(DomainError::invariant(
                    "expiration date applies to entry lines only",
                ));
            }
        }
        line.clear_issue();
        Ok(())
    }

    /// Edit the unit price of a sale line.
    pub fn edit_price(&mut self, id: LineId, price: Money) -> DomainResult<()> {
        self.ensure_editable()?;
        let line = self.line_mut(id)?;
        match line.details_mut() {
            LineDetails::Sale { price: slot } => *slot = price,
            _ => return Err(DomainError::invariant("price applies to sale lines only")),
        }
        line.clear_issue();
        Ok(())
    }

    pub fn set_provider(&mut self, provider: Provider) -> DomainResult<()> {
        self.ensure_editable()?;
        match &mut self.context {
            DraftContext::Entry { provider: slot } => {
                *slot = Some(provider);
                Ok(())
            }
            _ => Err(DomainError::invariant(
                "a provider applies to entry drafts only",
            )),
        }
    }

    pub fn set_payment_method(&mut self, payment_method: PaymentMethod) -> DomainResult<()> {
        self.ensure_editable()?;
        match &mut self.context {
            DraftContext::Sale { payment_method: slot } => {
                *slot = Some(payment_method);
                Ok(())
            }
            _ => Err(DomainError::invariant(
                "a payment method applies to sale drafts only",
            )),
        }
    }

    /// Sale total: sum over lines of quantity times unit price.
    ///
    /// Defined only for sale drafts; recomputed from the current line state
    /// on every call, never cached.
    pub fn total(&self) -> Option<Money> {
        match self.kind() {
            MovementKind::Sale => Some(
                self.lines
                    .iter()
                    .filter_map(|l| l.price().map(|p| p.times(l.quantity())))
                    .sum(),
            ),
            _ => None,
        }
    }

    /// Field-level validation ahead of submission. Empty means submittable.
    pub fn validate_for_submit(&self) -> Vec<DomainError> {
        let mut errors = Vec::new();

        if self.lines.is_empty() {
            errors.push(DomainError::validation("must add at least one product"));
        }

        match &self.context {
            DraftContext::Entry { provider: None } => {
                errors.push(DomainError::validation(
                    "a provider is required for an entry",
                ));
            }
            DraftContext::Sale {
                payment_method: None,
            } => {
                errors.push(DomainError::validation(
                    "a payment method is required for a sale",
                ));
            }
            _ => {}
        }

        if self.has_rejected_lines() {
            errors.push(DomainError::validation(
                "rejected lines must be corrected or removed before resubmitting",
            ));
        }

        errors
    }

    /// Move into the `Submitting` phase.
    ///
    /// Fails with a conflict while a submission is already in flight and
    /// with the first validation error when the draft is not submittable,
    /// so a caller can never serialize an invalid or duplicate request.
    pub fn begin_submission(&mut self) -> DomainResult<()> {
        if self.is_submitting() {
            return Err(DomainError::conflict(
                "a submission is already in flight for this draft",
            ));
        }
        if let Some(error) = self.validate_for_submit().into_iter().next() {
            return Err(error);
        }
        self.phase = DraftPhase::Submitting;
        Ok(())
    }

    /// Return to `Editing` after a failed or rejected attempt.
    pub fn finish_submission(&mut self) {
        self.phase = DraftPhase::Editing;
    }

    /// Apply the server's rejection list from a stock-conflict response.
    ///
    /// Flags exactly the lines whose product id appears in the list and is
    /// still present in the draft; every other line is untouched. Stale
    /// rejection flags from a previous attempt are cleared first. Part of
    /// the response handling path, so it is not gated on the phase.
    pub fn mark_rejected(&mut self, rejected: &[RejectedLine]) {
        for line in &mut self.lines {
            line.clear_rejection();
        }
        for rejection in rejected {
            if let Some(line) = self
                .lines
                .iter_mut()
                .find(|l| l.product_id() == rejection.product_id)
            {
                line.flag_rejected(rejection.reason.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::LineIssue;

    fn product(id: i64, stock: i64, price_cents: u64) -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            description: String::new(),
            price: Money::from_cents(price_cents),
            stock,
        }
    }

    fn provider() -> Provider {
        Provider {
            id: farmastock_core::ProviderId::new(1),
            name: "droguería central".to_string(),
        }
    }

    fn payment_method() -> PaymentMethod {
        PaymentMethod {
            id: farmastock_core::PaymentMethodId::new(1),
            name: "cash".to_string(),
        }
    }

    fn sale_draft(products: &[CatalogProduct]) -> MovementDraft {
        let mut draft = MovementDraft::new(MovementKind::Sale);
        draft.add_products(products).unwrap();
        draft
    }

    #[test]
    fn re_adding_a_product_never_duplicates_the_line() {
        let p = product(1, 10, 100);
        let mut draft = sale_draft(&[p.clone()]);

        let added = draft.add_products(&[p.clone(), p]).unwrap();
        assert_eq!(added, 0);
        assert_eq!(draft.lines().len(), 1);
    }

    #[test]
    fn seeded_draft_opens_with_one_line() {
        let draft = MovementDraft::seeded(MovementKind::Return, &product(7, 3, 100));
        assert_eq!(draft.lines().len(), 1);
        assert_eq!(draft.lines()[0].quantity(), 1);
    }

    #[test]
    fn removed_and_re_added_product_gets_a_fresh_line_id() {
        let p = product(1, 10, 100);
        let mut draft = sale_draft(&[p.clone()]);
        let first_id = draft.lines()[0].line_id();

        let removed = draft.remove_products(&[p.id]).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].product_name, "product-1");

        draft.add_products(&[p]).unwrap();
        assert_ne!(draft.lines()[0].line_id(), first_id);
    }

    #[test]
    fn increment_beyond_stock_is_rejected_with_a_line_issue() {
        let mut draft = sale_draft(&[product(1, 2, 100)]);
        let id = draft.lines()[0].line_id();

        draft.increment_quantity(id).unwrap();
        assert_eq!(draft.line(id).unwrap().quantity(), 2);

        let err = draft.increment_quantity(id).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        let line = draft.line(id).unwrap();
        assert_eq!(line.quantity(), 2);
        assert_eq!(line.issue(), Some(&LineIssue::StockLimit { available: 2 }));
    }

    #[test]
    fn entry_increments_ignore_the_stock_snapshot() {
        let mut draft = MovementDraft::new(MovementKind::Entry);
        draft.add_products(&[product(1, 0, 100)]).unwrap();
        let id = draft.lines()[0].line_id();

        for _ in 0..5 {
            draft.increment_quantity(id).unwrap();
        }
        assert_eq!(draft.line(id).unwrap().quantity(), 6);
    }

    #[test]
    fn successful_edit_clears_the_line_issue() {
        let mut draft = sale_draft(&[product(1, 1, 100)]);
        let id = draft.lines()[0].line_id();

        assert!(draft.increment_quantity(id).is_err());
        assert!(draft.line(id).unwrap().issue().is_some());

        draft.edit_price(id, Money::from_cents(90)).unwrap();
        assert!(draft.line(id).unwrap().issue().is_none());
    }

    #[test]
    fn decrement_never_goes_below_one() {
        let mut draft = sale_draft(&[product(1, 10, 100)]);
        let id = draft.lines()[0].line_id();

        draft.decrement_quantity(id).unwrap();
        assert_eq!(draft.line(id).unwrap().quantity(), 1);
    }

    #[test]
    fn sale_total_tracks_current_line_state() {
        let mut draft = sale_draft(&[product(1, 10, 1000), product(2, 10, 500)]);
        let first = draft.lines()[0].line_id();
        draft.increment_quantity(first).unwrap();

        // (2 x 10.00) + (1 x 5.00)
        assert_eq!(draft.total(), Some(Money::from_cents(2500)));

        draft.add_products(&[product(3, 10, 250)]).unwrap();
        let third = draft.lines()[2].line_id();
        draft.increment_quantity(third).unwrap();
        draft.increment_quantity(third).unwrap();

        // ... + (3 x 2.50)
        assert_eq!(draft.total(), Some(Money::from_cents(3250)));
    }

    #[test]
    fn total_is_undefined_outside_sales() {
        let mut draft = MovementDraft::new(MovementKind::Entry);
        draft.add_products(&[product(1, 10, 100)]).unwrap();
        assert_eq!(draft.total(), None);
    }

    #[test]
    fn empty_draft_fails_validation() {
        let draft = MovementDraft::new(MovementKind::Adjustment);
        let errors = draft.validate_for_submit();
        assert_eq!(
            errors,
            vec![DomainError::validation("must add at least one product")]
        );
    }

    #[test]
    fn entry_requires_a_provider_and_sale_a_payment_method() {
        let mut entry = MovementDraft::new(MovementKind::Entry);
        entry.add_products(&[product(1, 10, 100)]).unwrap();
        assert_eq!(entry.validate_for_submit().len(), 1);
        entry.set_provider(provider()).unwrap();
        assert!(entry.validate_for_submit().is_empty());

        let mut sale = sale_draft(&[product(1, 10, 100)]);
        assert_eq!(sale.validate_for_submit().len(), 1);
        sale.set_payment_method(payment_method()).unwrap();
        assert!(sale.validate_for_submit().is_empty());
    }

    #[test]
    fn wrong_kind_field_edits_are_invariant_violations() {
        let mut sale = sale_draft(&[product(1, 10, 100)]);
        let id = sale.lines()[0].line_id();
        assert!(sale.edit_batch_number(id, "L-1").is_err());
        assert!(sale.edit_expiration_date(id, None).is_err());
        assert!(sale.set_provider(provider()).is_err());

        let mut entry = MovementDraft::new(MovementKind::Entry);
        entry.add_products(&[product(1, 10, 100)]).unwrap();
        let id = entry.lines()[0].line_id();
        assert!(entry.edit_price(id, Money::ZERO).is_err());
        assert!(entry.set_payment_method(payment_method()).is_err());
        assert!(entry.edit_batch_number(id, "L-1").is_ok());
    }

    #[test]
    fn draft_is_locked_while_submitting() {
        let mut draft = sale_draft(&[product(1, 10, 100)]);
        draft.set_payment_method(payment_method()).unwrap();
        let id = draft.lines()[0].line_id();

        draft.begin_submission().unwrap();
        assert!(draft.is_submitting());

        assert!(matches!(
            draft.increment_quantity(id),
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            draft.add_products(&[product(2, 5, 100)]),
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            draft.remove_products(&[ProductId::new(1)]),
            Err(DomainError::Conflict(_))
        ));

        // Double submission is refused (single-flight).
        assert!(matches!(
            draft.begin_submission(),
            Err(DomainError::Conflict(_))
        ));

        draft.finish_submission();
        assert!(draft.increment_quantity(id).is_ok());
    }

    #[test]
    fn begin_submission_refuses_an_invalid_draft() {
        let mut draft = MovementDraft::new(MovementKind::Sale);
        assert!(matches!(
            draft.begin_submission(),
            Err(DomainError::Validation(_))
        ));
        assert!(!draft.is_submitting());
    }

    #[test]
    fn mark_rejected_flags_exactly_the_listed_lines() {
        let mut draft = sale_draft(&[product(1, 10, 100), product(2, 10, 100), product(3, 10, 100)]);
        let rejected = vec![RejectedLine {
            product_id: ProductId::new(2),
            reason: "insufficient stock".to_string(),
        }];

        draft.mark_rejected(&rejected);

        assert!(!draft.lines()[0].is_rejected());
        assert!(draft.lines()[1].is_rejected());
        assert!(!draft.lines()[2].is_rejected());
        assert!(draft.has_rejected_lines());
        assert_eq!(draft.lines().len(), 3);
    }

    #[test]
    fn mark_rejected_replaces_stale_flags_from_the_previous_attempt() {
        let mut draft = sale_draft(&[product(1, 10, 100), product(2, 10, 100)]);

        draft.mark_rejected(&[RejectedLine {
            product_id: ProductId::new(1),
            reason: "insufficient stock".to_string(),
        }]);
        draft.mark_rejected(&[RejectedLine {
            product_id: ProductId::new(2),
            reason: "insufficient stock".to_string(),
        }]);

        assert!(!draft.lines()[0].is_rejected());
        assert!(draft.lines()[1].is_rejected());
    }

    #[test]
    fn unresolved_rejected_lines_block_submission() {
        let mut draft = sale_draft(&[product(1, 10, 100)]);
        draft.set_payment_method(payment_method()).unwrap();
        draft.mark_rejected(&[RejectedLine {
            product_id: ProductId::new(1),
            reason: "insufficient stock".to_string(),
        }]);

        assert!(matches!(
            draft.begin_submission(),
            Err(DomainError::Validation(_))
        ));

        // Removing the offending line unblocks the draft.
        draft.remove_products(&[ProductId::new(1)]).unwrap();
        draft.add_products(&[product(2, 10, 100)]).unwrap();
        assert!(draft.begin_submission().is_ok());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(i64),
            Remove(i64),
            Increment(i64),
            Decrement(i64),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            let id = 1i64..6;
            prop_oneof![
                id.clone().prop_map(Op::Add),
                id.clone().prop_map(Op::Remove),
                id.clone().prop_map(Op::Increment),
                id.prop_map(Op::Decrement),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: no sequence of add/remove/quantity operations can
            /// duplicate a product or push a quantity out of bounds.
            #[test]
            fn lines_stay_unique_and_quantities_stay_in_bounds(
                ops in proptest::collection::vec(op_strategy(), 0..60)
            ) {
                let mut draft = MovementDraft::new(MovementKind::Sale);

                for op in ops {
                    match op {
                        Op::Add(id) => {
                            let _ = draft.add_products(&[product(id, 4, 100)]);
                        }
                        Op::Remove(id) => {
                            let _ = draft.remove_products(&[ProductId::new(id)]);
                        }
                        Op::Increment(id) => {
                            let line_id =
                                draft.line_by_product(ProductId::new(id)).map(|l| l.line_id());
                            if let Some(line_id) = line_id {
                                let _ = draft.increment_quantity(line_id);
                            }
                        }
                        Op::Decrement(id) => {
                            let line_id =
                                draft.line_by_product(ProductId::new(id)).map(|l| l.line_id());
                            if let Some(line_id) = line_id {
                                let _ = draft.decrement_quantity(line_id);
                            }
                        }
                    }

                    let mut seen = std::collections::HashSet::new();
                    for line in draft.lines() {
                        prop_assert!(seen.insert(line.product_id()), "duplicate product line");
                        prop_assert!(line.quantity() >= 1);
                        prop_assert!(i64::from(line.quantity()) <= line.stock());
                    }
                }
            }
        }
    }
}
