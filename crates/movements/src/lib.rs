//! Movement submission & reconciliation module.
//!
//! This crate serializes a movement draft into a request, drives the
//! single-flight submission protocol against the movement endpoint, and
//! reconciles server-side stock conflicts back onto the draft so the user
//! never loses what they typed. Collaborators (catalog, movement endpoint,
//! toasts) are consumed through ports; in-memory implementations are
//! provided for tests and development.

pub mod in_memory;
pub mod ports;
pub mod reconcile;
pub mod request;
pub mod screen;

pub use in_memory::{InMemoryBackend, NoticeLevel, RecordingNotifier};
pub use ports::{CatalogError, CatalogSource, MovementSink, NotificationSink, SubmitError};
pub use reconcile::rejected_in_draft;
pub use request::{MovementRequest, MovementRequestLine};
pub use screen::{MovementScreen, SubmitOutcome};
