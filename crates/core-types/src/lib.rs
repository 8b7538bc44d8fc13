//! Shared primitives for the locheal selector-healing core
//!
//! Every other crate in the workspace consumes these types:
//! - Element/page/browser snapshots captured at failure time
//! - The failure record and its closed classification
//! - Candidate locators and their scored, explainable counterparts
//! - Outcome records fed back into the learning store

pub mod candidate;
pub mod element;
pub mod errors;
pub mod failure;
pub mod outcome;
pub mod page;

pub use candidate::*;
pub use element::*;
pub use errors::*;
pub use failure::*;
pub use outcome::*;
pub use page::*;

/// Clamp a score into the closed [0, 1] range.
///
/// Every factor score and confidence value in the pipeline passes through
/// this before it is stored or compared.
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp01_bounds() {
        assert_eq!(clamp01(-0.2), 0.0);
        assert_eq!(clamp01(0.0), 0.0);
        assert_eq!(clamp01(0.73), 0.73);
        assert_eq!(clamp01(1.0), 1.0);
        assert_eq!(clamp01(4.5), 1.0);
    }
}
