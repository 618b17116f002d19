//! Error types for the motion library.
//!
//! Every variant is a precondition failure. Degenerate game states such as
//! an unreachable target or a blocked move are reported as outcomes, not
//! errors.

use thiserror::Error;

/// Errors that can occur while configuring or advancing motion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MotionError {
    /// Error for an invalid speed.
    /// This variant is returned when a speed is not a positive finite number.
    #[error("Invalid speed: {0}")]
    InvalidSpeed(&'static str),
    /// Error for an invalid arrival epsilon.
    /// This variant is returned when the epsilon is not a positive finite number.
    #[error("Invalid arrival epsilon: {0}")]
    InvalidEpsilon(&'static str),
    /// Error for an invalid behaviour range.
    /// This variant is returned when a sight or attack range is not a positive finite number.
    #[error("Invalid range: {0}")]
    InvalidRange(&'static str),
    /// Error for negative time delta.
    /// This variant is returned when a negative time delta is passed to a tick.
    #[error("Negative time delta: {0}")]
    NegativeTimeDelta(&'static str),
    /// Error for a NaN or infinite time delta.
    #[error("Non-finite time delta: {0}")]
    NonFiniteTimeDelta(&'static str),
}

/// Rejects time deltas a tick cannot integrate.
pub(crate) fn validate_dt(dt: f32) -> Result<(), MotionError> {
    if !dt.is_finite() {
        return Err(MotionError::NonFiniteTimeDelta("must be finite"));
    }
    if dt < 0.0 {
        return Err(MotionError::NegativeTimeDelta("must be non-negative"));
    }
    Ok(())
}
