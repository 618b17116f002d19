//! This module defines the error types used by the `pursuit-navigation` crate.

#![warn(missing_docs)]

use thiserror::Error;

/// Error type for navigation operations.
///
/// Only grid construction can fail. Path searches never error: an unreachable
/// or invalid goal yields an empty path instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// Error for an invalid cell size.
    /// This variant is returned when the cell edge length is zero.
    #[error("Invalid cell size: {0}")]
    InvalidCellSize(&'static str),
    /// Error for invalid grid dimensions.
    /// This variant is returned when the viewport cannot hold a single cell
    /// or the cell count would overflow.
    #[error("Invalid grid dimensions: {0}")]
    InvalidDimensions(&'static str),
}
