//! Map-related functionality for navigation.
//!
//! This module provides the static obstacle grid and the geometry types
//! used to move between world space and cell space.

pub mod grid;
pub mod point_types;

pub use grid::{GridModel, Obstacle};
pub use point_types::{Cell, WorldPoint, WorldRect};
