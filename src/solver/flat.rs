//! A* over a flat, owned array of value nodes addressed by row-major index.
use std::time::Instant;

use fxhash::{FxBuildHasher, FxHashSet};
use grid_util::point::Point;
use log::{debug, warn};

use crate::{
    error::GridError,
    level::Level,
    neighbours::{index_of, neumann_neighbours},
    solver::{manhattan, millis, PathResult, Pathfinder, Route},
};

/// Cost of a node that has not been reached.
pub const INFINITE_COST: i32 = i32::MAX;

/// Share of the cell count reserved up front for the open and closed sets.
pub const DEFAULT_CAPACITY_FACTOR: f32 = 0.25;

/// Per-cell search state of the flat solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node {
    pub x: i32,
    pub y: i32,
    pub walkable: bool,
    pub f: i32,
    pub g: i32,
    pub h: i32,
    pub index: usize,
    pub reached_from: Option<usize>,
}

impl Node {
    fn update_f(&mut self) {
        self.f = self.g.saturating_add(self.h);
    }

    pub fn set_g(&mut self, g: i32) {
        self.g = g;
        self.update_f();
    }

    pub fn calculate_h_cost(&mut self, target: &Point) {
        self.h = manhattan(&Point::new(self.x, self.y), target);
        self.update_f();
    }
}

/// The state left behind by one flat search. Owns its node array; dropping it discards the
/// search.
#[derive(Clone, Debug)]
pub struct FlatSearch {
    nodes: Vec<Node>,
    start: usize,
    target: usize,
    result: PathResult,
}

impl FlatSearch {
    pub fn result(&self) -> PathResult {
        self.result
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Indices from target back to start, following `reached_from`.
    fn backwards_indices(&self) -> Option<Vec<usize>> {
        let path: Vec<usize> = std::iter::successors(Some(self.target), |&ix| {
            (ix != self.start)
                .then(|| self.nodes[ix].reached_from)
                .flatten()
        })
        .take(self.nodes.len() + 1)
        .collect();
        if path.last() == Some(&self.start) && path.len() <= self.nodes.len() {
            Some(path)
        } else {
            None
        }
    }

    /// The cells of the path, start first. [None] if no path was found.
    pub fn path(&self) -> Option<Vec<Point>> {
        if !self.result.found_path {
            return None;
        }
        let mut path = self
            .backwards_indices()?
            .into_iter()
            .map(|ix| Point::new(self.nodes[ix].x, self.nodes[ix].y))
            .collect::<Vec<Point>>();
        path.reverse();
        Some(path)
    }
}

/// Searches on a private copy of the level laid out as a contiguous [Node] array.
///
/// The open list holds node indices and is scanned linearly for the lowest `f`. The scan
/// keeps the last of several equal minima, and removal swaps in the last element, so the
/// list order shifts between expansions. Every heuristic is computed when the level is
/// imported.
#[derive(Clone, Debug)]
pub struct FlatSolver {
    capacity_factor: f32,
}

impl Default for FlatSolver {
    fn default() -> FlatSolver {
        FlatSolver {
            capacity_factor: DEFAULT_CAPACITY_FACTOR,
        }
    }
}

impl FlatSolver {
    pub fn new() -> FlatSolver {
        FlatSolver::default()
    }

    /// Reserves `factor` times the cell count for the open and closed sets. The factor is
    /// clamped to `[0, 1]`; NaN falls back to [DEFAULT_CAPACITY_FACTOR].
    pub fn with_capacity_factor(factor: f32) -> FlatSolver {
        let capacity_factor = if factor.is_nan() {
            DEFAULT_CAPACITY_FACTOR
        } else {
            factor.clamp(0.0, 1.0)
        };
        FlatSolver { capacity_factor }
    }

    pub fn capacity_factor(&self) -> f32 {
        self.capacity_factor
    }

    /// Copies the level into a fresh node array with `g` and `f` unset and `h` towards
    /// `target`.
    pub fn import_level(level: &Level, target: &Point) -> Vec<Node> {
        level
            .tiles()
            .iter()
            .map(|tile| {
                let mut node = Node {
                    x: tile.position.x,
                    y: tile.position.y,
                    walkable: tile.walkable,
                    f: INFINITE_COST,
                    g: INFINITE_COST,
                    h: 0,
                    index: index_of(tile.position, level.width()),
                    reached_from: None,
                };
                node.calculate_h_cost(target);
                node
            })
            .collect()
    }

    fn lowest_f_index(nodes: &[Node], open_list: &[usize]) -> usize {
        let mut lowest_f = INFINITE_COST;
        let mut lowest = 0;
        for (i, &ix) in open_list.iter().enumerate() {
            if nodes[ix].f <= lowest_f {
                lowest_f = nodes[ix].f;
                lowest = i;
            }
        }
        lowest
    }

    /// Runs a search and hands back its state, from which the result and path can be read.
    pub fn search(
        &self,
        level: &Level,
        start: Point,
        target: Point,
    ) -> Result<FlatSearch, GridError> {
        let (width, height) = (level.width(), level.height());
        let start_ix = level.require_tile_id(start)?.index();
        let target_ix = level.require_tile_id(target)?.index();
        let mut nodes = FlatSolver::import_level(level, &target);
        nodes[start_ix].set_g(0);

        let capacity = (nodes.len() as f32 * self.capacity_factor) as usize;
        let mut open_list: Vec<usize> = Vec::with_capacity(capacity);
        let mut closed_list: FxHashSet<usize> =
            FxHashSet::with_capacity_and_hasher(capacity, FxBuildHasher::default());
        let mut found_path = false;

        let before = Instant::now();
        open_list.push(start_ix);
        while !open_list.is_empty() {
            let lowest = FlatSolver::lowest_f_index(&nodes, &open_list);
            let current = nodes[open_list.swap_remove(lowest)];
            if current.index == target_ix {
                found_path = true;
                break;
            }
            closed_list.insert(current.index);
            for neighbour in neumann_neighbours(Point::new(current.x, current.y), width, height) {
                let ix = index_of(neighbour, width);
                let node = &mut nodes[ix];
                if !node.walkable || closed_list.contains(&ix) {
                    continue;
                }
                if node.g > current.g + 1 {
                    node.set_g(current.g + 1);
                    node.reached_from = Some(current.index);
                }
                if !open_list.contains(&ix) {
                    open_list.push(ix);
                }
            }
        }
        let elapsed = before.elapsed();

        let mut search = FlatSearch {
            nodes,
            start: start_ix,
            target: target_ix,
            result: PathResult {
                time_to_finish: millis(elapsed),
                found_path,
                open_size: open_list.len(),
                closed_size: closed_list.len(),
                path_length: None,
            },
        };
        if found_path {
            search.result.path_length = search.backwards_indices().map(|path| path.len() - 1);
            if search.result.path_length.is_none() {
                warn!("Path to {} does not lead back to {}", target, start);
            }
        }
        debug!("{} search {} -> {}: {:?}", self.name(), start, target, search.result);
        Ok(search)
    }
}

impl Pathfinder for FlatSolver {
    fn name(&self) -> &'static str {
        "DOD"
    }

    fn find_path(
        &mut self,
        level: &mut Level,
        start: Point,
        target: Point,
    ) -> Result<PathResult, GridError> {
        self.search(level, start, target).map(|search| search.result())
    }

    fn find_route(
        &mut self,
        level: &mut Level,
        start: Point,
        target: Point,
    ) -> Result<Route, GridError> {
        let search = self.search(level, start, target)?;
        Ok(Route {
            result: search.result(),
            path: search.path(),
        })
    }
}
