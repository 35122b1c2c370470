//! The movement screen controller.
//!
//! Single-threaded, event-driven: the UI calls in, the controller drives
//! the draft lifecycle (`CLOSED -> OPEN -> EDITING <-> ERROR -> SUBMITTING
//! -> CLOSED | OPEN+ERROR`) and talks to the collaborators. Submission is
//! split into a pure decision step (`begin_submit`: validate, lock,
//! serialize) and a state-evolution step (`complete_submit`: apply the
//! response), with the one suspending sink call in between.

use farmastock_catalog::{CatalogIndex, ProductPicker, SelectionDelta};
use farmastock_core::{DomainError, DomainResult, ProductId};
use farmastock_draft::{MovementDraft, MovementKind};

use crate::ports::{CatalogError, CatalogSource, MovementSink, NotificationSink, SubmitError};
use crate::reconcile::rejected_in_draft;
use crate::request::MovementRequest;

/// How one submission attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The movement was applied; the draft is gone and the catalog fresh.
    Applied,
    /// Stock conflict: the draft survives with the offending lines flagged.
    Rejected,
    /// Generic failure: the draft survives untouched; the user may retry.
    Failed,
    /// Local validation failed; no network call was made.
    Invalid,
    /// Nothing to submit, or a submission was already in flight.
    Ignored,
}

/// Screen state for one movement modal plus its catalog.
pub struct MovementScreen<C, M, N> {
    catalog_source: C,
    movement_sink: M,
    notifications: N,
    catalog: CatalogIndex,
    catalog_loading: bool,
    draft: Option<MovementDraft>,
    close_requested: bool,
}

impl<C, M, N> MovementScreen<C, M, N>
where
    C: CatalogSource,
    M: MovementSink,
    N: NotificationSink,
{
    pub fn new(catalog_source: C, movement_sink: M, notifications: N) -> Self {
        Self {
            catalog_source,
            movement_sink,
            notifications,
            catalog: CatalogIndex::default(),
            catalog_loading: false,
            draft: None,
            close_requested: false,
        }
    }

    /// Initial catalog load. The screen is busy until it settles.
    pub async fn load(&mut self) -> Result<(), CatalogError> {
        self.catalog_loading = true;
        let result = self.catalog_source.fetch_stock_catalog().await;
        self.catalog_loading = false;

        match result {
            Ok(products) => {
                tracing::info!(products = products.len(), "stock catalog loaded");
                self.catalog.refresh(products);
                Ok(())
            }
            Err(err) => {
                tracing::error!("catalog load failed: {err}");
                self.notifications.error("could not load products");
                Err(err)
            }
        }
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    pub fn is_loading(&self) -> bool {
        self.catalog_loading
    }

    /// Whether the UI must present a non-interactive busy state.
    pub fn is_busy(&self) -> bool {
        self.catalog_loading || self.draft.as_ref().is_some_and(|d| d.is_submitting())
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&MovementDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut MovementDraft> {
        self.draft.as_mut()
    }

    /// Open the modal with an empty draft.
    pub fn open_draft(&mut self, kind: MovementKind) -> DomainResult<()> {
        if self.draft.is_some() {
            return Err(DomainError::conflict(
                "another movement draft is already open",
            ));
        }
        self.draft = Some(MovementDraft::new(kind));
        self.close_requested = false;
        Ok(())
    }

    /// Open the modal from a row action, pre-seeded with that product.
    pub fn open_seeded(&mut self, kind: MovementKind, product_id: ProductId) -> DomainResult<()> {
        if self.draft.is_some() {
            return Err(DomainError::conflict(
                "another movement draft is already open",
            ));
        }
        let product = self
            .catalog
            .get(product_id)
            .ok_or_else(DomainError::not_found)?;
        self.draft = Some(MovementDraft::seeded(kind, product));
        self.close_requested = false;
        Ok(())
    }

    /// Picker pre-highlighted with the draft's current membership.
    pub fn open_picker(&self) -> ProductPicker {
        let ids = self
            .draft
            .as_ref()
            .map(|d| d.product_ids())
            .unwrap_or_default();
        ProductPicker::with_selected(&ids)
    }

    /// Push one batched picker change into the draft.
    pub fn apply_picker_delta(&mut self, delta: &SelectionDelta) -> DomainResult<()> {
        let draft = self.draft.as_mut().ok_or_else(DomainError::not_found)?;
        draft.add_products(&delta.added)?;
        let removed = draft.remove_products(&delta.removed)?;

        match removed.as_slice() {
            [] => {}
            [line] => self
                .notifications
                .warning(&format!("removed {} from the movement", line.product_name)),
            lines => self
                .notifications
                .warning(&format!("removed {} products from the movement", lines.len())),
        }
        Ok(())
    }

    /// Decision step: validate, enter `Submitting`, serialize the request.
    ///
    /// Fails with a conflict while an attempt is already in flight, so at
    /// most one request per draft instance can ever be produced at a time.
    pub fn begin_submit(&mut self) -> DomainResult<MovementRequest> {
        let draft = self.draft.as_mut().ok_or_else(DomainError::not_found)?;
        draft.begin_submission()?;
        Ok(MovementRequest::from_draft(draft))
    }

    /// State-evolution step: apply the sink's response to the draft.
    ///
    /// The sole place the draft is cleared on success; a close requested
    /// while the attempt was in flight is honored here, after settling.
    pub fn complete_submit(&mut self, response: Result<(), SubmitError>) -> SubmitOutcome {
        match response {
            Ok(()) => {
                if self.draft.take().is_none() {
                    return SubmitOutcome::Ignored;
                }
                tracing::info!("movement applied");
                self.close_requested = false;
                self.notifications.success("movement saved");
                SubmitOutcome::Applied
            }
            Err(SubmitError::StockConflict(rejected)) => {
                let Some(draft) = self.draft.as_mut() else {
                    return SubmitOutcome::Ignored;
                };
                let hits = rejected_in_draft(&draft.product_ids(), &rejected);
                draft.mark_rejected(&hits);
                draft.finish_submission();
                let flagged = hits.len();
                tracing::warn!(rejected = flagged, "movement rejected: insufficient stock");
                self.notifications.error(&format!(
                    "insufficient stock for {flagged} product(s); review the flagged lines"
                ));
                self.close_if_requested();
                SubmitOutcome::Rejected
            }
            Err(SubmitError::Failed(reason)) => {
                let Some(draft) = self.draft.as_mut() else {
                    return SubmitOutcome::Ignored;
                };
                draft.finish_submission();
                tracing::error!("movement submission failed: {reason}");
                self.notifications
                    .error(&format!("could not save the movement: {reason}"));
                self.close_if_requested();
                SubmitOutcome::Failed
            }
        }
    }

    /// One full submission attempt.
    ///
    /// Exactly one `create_movement` call per accepted attempt; a call
    /// while another attempt is in flight is ignored without touching the
    /// sink. On success the catalog is re-fetched (stock may have changed
    /// for every product in the movement, not only the visible page).
    pub async fn submit(&mut self) -> SubmitOutcome {
        let Some(draft) = self.draft.as_ref() else {
            return SubmitOutcome::Ignored;
        };
        if draft.is_submitting() {
            tracing::debug!("submit ignored: attempt already in flight");
            return SubmitOutcome::Ignored;
        }

        let errors = draft.validate_for_submit();
        if !errors.is_empty() {
            for error in &errors {
                self.notifications.error(&error.to_string());
            }
            return SubmitOutcome::Invalid;
        }

        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(DomainError::Conflict(_)) => return SubmitOutcome::Ignored,
            Err(error) => {
                self.notifications.error(&error.to_string());
                return SubmitOutcome::Invalid;
            }
        };

        tracing::info!(
            kind = %request.movement_type,
            lines = request.lines.len(),
            "submitting movement"
        );
        let response = self.movement_sink.create_movement(&request).await;
        let outcome = self.complete_submit(response);

        if outcome == SubmitOutcome::Applied {
            if self.load().await.is_err() {
                self.notifications
                    .warning("movement saved, but the catalog could not be refreshed");
            }
        }
        outcome
    }

    /// Close the modal, discarding the draft.
    ///
    /// While an attempt is in flight the close is deferred: the draft's
    /// reset must not happen until the pending response settles.
    pub fn request_close(&mut self) {
        match &self.draft {
            Some(draft) if draft.is_submitting() => {
                self.close_requested = true;
            }
            _ => {
                self.draft = None;
                self.close_requested = false;
            }
        }
    }

    fn close_if_requested(&mut self) {
        if self.close_requested {
            self.draft = None;
            self.close_requested = false;
        }
    }
}
