use std::time::Duration;

use grid_util::point::Point;

use crate::{error::GridError, level::Level};

pub mod flat;
pub mod object;

/// Metrics of a single search. The open and closed sizes are taken when the search loop
/// ends, not at their peak.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    /// Wall-clock time of the search loop in milliseconds.
    pub time_to_finish: f64,
    pub found_path: bool,
    pub open_size: usize,
    pub closed_size: usize,
    /// Number of moves from start to target. [None] when no path was found.
    pub path_length: Option<usize>,
}

/// A [PathResult] together with the cells of the path, start first.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub result: PathResult,
    pub path: Option<Vec<Point>>,
}

/// A single-goal search on a [Level].
///
/// Solvers take the level mutably since the object model keeps its search state in the
/// tiles. Each call starts from a clean state, so repeated searches on one level agree.
pub trait Pathfinder {
    /// Short label used in logs and exported statistics.
    fn name(&self) -> &'static str;

    /// Searches for a path from `start` to `target`. Fails only if either point lies
    /// outside the level; an unreachable target yields `found_path == false`.
    fn find_path(
        &mut self,
        level: &mut Level,
        start: Point,
        target: Point,
    ) -> Result<PathResult, GridError>;

    /// Like [find_path](Self::find_path), but also backtracks the cells of the path.
    fn find_route(
        &mut self,
        level: &mut Level,
        start: Point,
        target: Point,
    ) -> Result<Route, GridError>;
}

/// Manhattan distance. Admissible and consistent on a uniform-cost 4-grid.
pub fn manhattan(p1: &Point, p2: &Point) -> i32 {
    p1.manhattan_distance(p2)
}

pub(crate) fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
