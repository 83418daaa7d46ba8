//! Conversion of association strengths into additive search costs.
//!
//! Strengths behave like independent-evidence probabilities, so summing
//! `-ln(strength)` along a set of edges is the negative log of their product:
//! a lower total cost means a higher joint likelihood.

use crate::error::DomainError;

/// Returns `true` when `strength` lies in (0, 1]. NaN is rejected.
#[inline]
pub fn is_valid_strength(strength: f64) -> bool {
    strength > 0.0 && strength <= 1.0
}

/// Cost of traversing an edge with the given association strength.
///
/// `cost(1.0)` is exactly `0.0`; the cost grows without bound as the
/// strength approaches zero.
pub fn cost(strength: f64) -> Result<f64, DomainError> {
    if !is_valid_strength(strength) {
        return Err(DomainError { strength });
    }
    if strength == 1.0 {
        return Ok(0.0);
    }
    Ok(-strength.ln())
}
