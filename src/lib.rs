//! # grid_astar_layouts
//!
//! Two implementations of [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) on a
//! uniform-cost 4-connected grid, kept side by side so their memory layouts can be
//! compared:
//!
//! - [ObjectSolver] searches a graph of [Tile]s that carry their own mutable search state
//!   and refer to their neighbours by [TileId] handle.
//! - [FlatSolver] copies the level into a contiguous array of value [Node]s addressed by
//!   row-major index and keeps its open and closed sets as index collections.
//!
//! Levels come from a seeded procedural [generator] that scatters noise walls and stamps
//! rectangular rooms with doors. Both solvers report a [PathResult], which [stats]
//! aggregates into rolling windows and per-size summaries.
//!
//! ```
//! use grid_astar_layouts::{FlatSolver, Level, ObjectSolver, Pathfinder, Point};
//!
//! let mut level = Level::open(3, 3);
//! let start = Point::new(0, 0);
//! let target = Point::new(2, 2);
//! let flat = FlatSolver::new().find_path(&mut level, start, target).unwrap();
//! let object = ObjectSolver::new().find_path(&mut level, start, target).unwrap();
//! assert_eq!(flat.path_length, Some(4));
//! assert_eq!(object.path_length, Some(4));
//! ```
mod error;
pub mod generator;
pub mod level;
pub mod neighbours;
pub mod solver;
pub mod stats;

pub use error::GridError;
pub use generator::{generate, GeneratorConfig, LevelGenerator};
pub use grid_util::point::Point;
pub use level::{Level, Position, Tile, TileId, TileRecord};
pub use solver::flat::{FlatSearch, FlatSolver, Node};
pub use solver::object::ObjectSolver;
pub use solver::{manhattan, PathResult, Pathfinder, Route};
pub use stats::{RunSummary, StatCategory, Stats};
