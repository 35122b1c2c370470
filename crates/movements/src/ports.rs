//! Collaborator boundaries consumed by the movement screen.
//!
//! Contracts only: the HTTP transport behind them is out of scope and
//! supplied by the host application.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use farmastock_catalog::CatalogProduct;
use farmastock_draft::RejectedLine;

use crate::request::MovementRequest;

/// Catalog fetch error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog fetch failed: {0}")]
    Unavailable(String),
}

/// Movement submission error.
///
/// A stock conflict is a distinguished failure so the screen can branch on
/// it; everything else collapses to `Failed` and is retryable by the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The server rejected specific lines for insufficient stock at commit
    /// time. Authoritative over any client-side snapshot check.
    #[error("stock conflict: {} line(s) rejected", .0.len())]
    StockConflict(Vec<RejectedLine>),

    /// Network or server failure unrelated to stock.
    #[error("movement submission failed: {0}")]
    Failed(String),
}

/// Read side: the stock catalog endpoint.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Full snapshot of candidate products (screen load and post-movement
    /// refresh).
    async fn fetch_stock_catalog(&self) -> Result<Vec<CatalogProduct>, CatalogError>;

    /// Server-side search; client-side substring filtering over the full
    /// snapshot is an acceptable implementation.
    async fn fetch_catalog_page(&self, filter: &str) -> Result<Vec<CatalogProduct>, CatalogError>;
}

/// Write side: the movement endpoint.
///
/// `create_movement` is not idempotent: a retry after a true success would
/// double-apply the movement, so callers must never auto-retry.
#[async_trait]
pub trait MovementSink: Send + Sync {
    async fn create_movement(&self, request: &MovementRequest) -> Result<(), SubmitError>;
}

/// Fire-and-forget toasts; never relied upon for control flow.
pub trait NotificationSink: Send + Sync {
    fn success(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

#[async_trait]
impl<S> CatalogSource for Arc<S>
where
    S: CatalogSource + ?Sized,
{
    async fn fetch_stock_catalog(&self) -> Result<Vec<CatalogProduct>, CatalogError> {
        (**self).fetch_stock_catalog().await
    }

    async fn fetch_catalog_page(&self, filter: &str) -> Result<Vec<CatalogProduct>, CatalogError> {
        (**self).fetch_catalog_page(filter).await
    }
}

#[async_trait]
impl<S> MovementSink for Arc<S>
where
    S: MovementSink + ?Sized,
{
    async fn create_movement(&self, request: &MovementRequest) -> Result<(), SubmitError> {
        (**self).create_movement(request).await
    }
}

impl<S> NotificationSink for Arc<S>
where
    S: NotificationSink + ?Sized,
{
    fn success(&self, message: &str) {
        (**self).success(message)
    }

    fn warning(&self, message: &str) {
        (**self).warning(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }
}
