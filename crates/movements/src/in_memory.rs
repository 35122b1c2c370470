//! In-memory collaborator implementations.
//!
//! Intended for tests/dev. The backend keeps a mutable product list so a
//! "concurrent user" can be simulated by changing stock between a draft's
//! catalog load and its submission.

use std::sync::Mutex;

use async_trait::async_trait;

use farmastock_catalog::CatalogProduct;
use farmastock_core::ProductId;
use farmastock_draft::RejectedLine;

use crate::ports::{CatalogError, CatalogSource, MovementSink, NotificationSink, SubmitError};
use crate::request::MovementRequest;

#[derive(Debug, Default)]
struct BackendState {
    products: Vec<CatalogProduct>,
    requests: Vec<MovementRequest>,
    fail_next: Option<String>,
}

/// In-memory stand-in for the inventory backend.
///
/// `create_movement` enforces the server-side stock rule: consuming
/// movements are checked line by line against current stock, and a
/// shortfall rejects the whole request (all lines or none) with the
/// offending product ids. Successful movements apply their stock deltas,
/// so a subsequent catalog fetch observes the change.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<BackendState>,
}

impl InMemoryBackend {
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        Self {
            state: Mutex::new(BackendState {
                products,
                requests: Vec::new(),
                fail_next: None,
            }),
        }
    }

    /// Simulate another user moving inventory concurrently.
    pub fn set_stock(&self, id: ProductId, stock: i64) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(product) = state.products.iter_mut().find(|p| p.id == id) {
                product.stock = stock;
            }
        }
    }

    /// Make the next `create_movement` fail with a generic error.
    pub fn fail_next(&self, reason: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_next = Some(reason.into());
        }
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<MovementRequest> {
        self.state
            .lock()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }

    pub fn stock_of(&self, id: ProductId) -> Option<i64> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.products.iter().find(|p| p.id == id).map(|p| p.stock))
    }
}

#[async_trait]
impl CatalogSource for InMemoryBackend {
    async fn fetch_stock_catalog(&self) -> Result<Vec<CatalogProduct>, CatalogError> {
        let state = self
            .state
            .lock()
            .map_err(|_| CatalogError::Unavailable("state lock poisoned".to_string()))?;
        Ok(state.products.clone())
    }

    async fn fetch_catalog_page(&self, filter: &str) -> Result<Vec<CatalogProduct>, CatalogError> {
        let state = self
            .state
            .lock()
            .map_err(|_| CatalogError::Unavailable("state lock poisoned".to_string()))?;
        Ok(state
            .products
            .iter()
            .filter(|p| p.matches(filter))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MovementSink for InMemoryBackend {
    async fn create_movement(&self, request: &MovementRequest) -> Result<(), SubmitError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SubmitError::Failed("state lock poisoned".to_string()))?;
        state.requests.push(request.clone());

        if let Some(reason) = state.fail_next.take() {
            return Err(SubmitError::Failed(reason));
        }

        let consuming = !request.movement_type.increases_stock();
        if consuming {
            let rejected: Vec<RejectedLine> = request
                .lines
                .iter()
                .filter_map(|line| {
                    let stock = state
                        .products
                        .iter()
                        .find(|p| p.id == line.product_id)
                        .map(|p| p.stock)
                        .unwrap_or(0);
                    if i64::from(line.quantity) > stock {
                        Some(RejectedLine {
                            product_id: line.product_id,
                            reason: format!("insufficient stock: {stock} available"),
                        })
                    } else {
                        None
                    }
                })
                .collect();

            if !rejected.is_empty() {
                return Err(SubmitError::StockConflict(rejected));
            }
        }

        // All lines accepted: apply the deltas atomically.
        for line in &request.lines {
            if let Some(product) = state.products.iter_mut().find(|p| p.id == line.product_id) {
                let delta = i64::from(line.quantity);
                product.stock += if consuming { -delta } else { delta };
            }
        }
        Ok(())
    }
}

/// Notice severity, mirroring the toast levels of the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Notification sink that records every toast for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn messages_at(&self, level: NoticeLevel) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    fn record(&self, level: NoticeLevel, message: &str) {
        // Fire-and-forget: a poisoned lock just drops the toast.
        if let Ok(mut notices) = self.notices.lock() {
            notices.push((level, message.to_string()));
        }
    }
}

impl NotificationSink for RecordingNotifier {
    fn success(&self, message: &str) {
        self.record(NoticeLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.record(NoticeLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.record(NoticeLevel::Error, message);
    }
}
