//! Adaptive learning store
//!
//! Persistent record of strategy/selector outcomes. Each recorded outcome
//! updates a per-selector and a per-strategy reliability aggregate; the
//! confidence scorer reads those aggregates back as historical-success
//! features. Aggregates survive process restart via an atomically replaced
//! JSON snapshot.
//!
//! Learning is advisory: persistence failures are logged and retried on
//! the next flush, never surfaced to the healing path.

pub mod model;
pub mod persist;
pub mod store;

pub use model::*;
pub use store::*;
