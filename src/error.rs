//! Error types for constraint configuration.

use thiserror::Error;

use crate::math::Real;

/// Errors produced when deriving SPOOK coefficients from equation parameters.
///
/// All three parameters must be strictly positive: the coefficients divide by
/// `k (1 + 4 d)` and by the squared time step.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum EquationError {
    /// The stiffness was zero, negative, or not finite.
    #[error("invalid constraint stiffness {0} (must be > 0)")]
    InvalidStiffness(Real),
    /// The relaxation was zero, negative, or not finite.
    #[error("invalid constraint relaxation {0} (must be > 0)")]
    InvalidRelaxation(Real),
    /// The time step was zero, negative, or not finite.
    #[error("invalid time step {0} (must be > 0)")]
    InvalidTimeStep(Real),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_offending_value() {
        let err = EquationError::InvalidStiffness(-1.0);
        assert!(format!("{err}").contains("-1"));

        let err = EquationError::InvalidTimeStep(0.0);
        assert!(format!("{err}").contains("time step"));
    }
}
