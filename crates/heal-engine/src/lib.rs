//! Healing engine - classification and orchestration
//!
//! The orchestrator drives one healing attempt end to end:
//! classify the failure, fan out to every strategy provider, score each
//! candidate, rank deterministically, and hand the bounded list back to
//! the caller. Outcomes the caller observes flow back through
//! [`HealingOrchestrator::record_outcome`] into the learning store.

pub mod classifier;
pub mod orchestrator;

pub use classifier::classify;
pub use orchestrator::{EngineConfig, HealingOrchestrator};
