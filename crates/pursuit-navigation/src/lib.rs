//! Grid navigation for a top-down pursuit simulation.
//!
//! A [`GridModel`] is built once from obstacle rectangles and then answers
//! walkability queries. [`PathFinder`] runs A* over it with 8-connected
//! movement, orthogonal steps costing 1 and diagonal steps costing sqrt(2).
//!
//! ```
//! use pursuit_navigation::{Cell, GridModel, Obstacle, PathFinder};
//!
//! let grid = GridModel::build(400, 400, 20, &[Obstacle::cell(5, 5)]).unwrap();
//! let path = PathFinder::default().find_path(Cell::new(0, 0), Cell::new(10, 10), &grid);
//! assert_eq!(path.first(), Some(&Cell::new(0, 0)));
//! assert!(!path.contains(&Cell::new(5, 5)));
//! ```

#![warn(missing_docs)]

pub mod astar;
pub mod error;
pub mod map;
pub mod open_set;

pub use astar::{astar_search, path_cost, step_cost, Heuristic, PathFinder, SearchStats};
pub use error::NavigationError;
pub use map::{Cell, GridModel, Obstacle, WorldPoint, WorldRect};
pub use open_set::{BinaryHeapOpenSet, LinearScanOpenSet, NodeId, OpenSet, OpenSetKind};
