//! A* over the object model: tiles carry their own cost and predecessor and are linked
//! to their neighbours by handle.
use std::time::Instant;

use fxhash::FxBuildHasher;
use grid_util::point::Point;
use indexmap::IndexSet;
use itertools::Itertools;
use log::{debug, warn};
use smallvec::SmallVec;

use crate::{
    error::GridError,
    level::{Level, TileId},
    neighbours::N_NEIGHBOURS,
    solver::{millis, PathResult, Pathfinder, Route},
};

type FxIndexSet<K> = IndexSet<K, FxBuildHasher>;

/// Searches directly on the tiles of a [Level], mutating their cost, heuristic and
/// predecessor in place.
///
/// The open list is an unordered sequence scanned linearly for the lowest total cost;
/// among equal costs the tile found first wins. Tiles discovered by one expansion are
/// put in front of the list as a batch.
#[derive(Clone, Debug, Default)]
pub struct ObjectSolver {
    open_list: Vec<TileId>,
    closed_list: FxIndexSet<TileId>,
}

impl ObjectSolver {
    pub fn new() -> ObjectSolver {
        ObjectSolver::default()
    }

    /// The open list as it was left by the last search.
    pub fn open_list(&self) -> &[TileId] {
        &self.open_list
    }

    /// The closed tiles of the last search, in expansion order.
    pub fn closed_list(&self) -> impl Iterator<Item = &TileId> {
        self.closed_list.iter()
    }

    fn lowest_total_cost(&self, level: &Level) -> Option<usize> {
        self.open_list
            .iter()
            .position_min_by_key(|&&id| level.tile(id).total_cost().unwrap_or(i32::MAX))
    }

    /// Relaxes the walkable, unclosed neighbours of `current` and returns those not yet on
    /// the open list, with their heuristic computed.
    fn find_valid_neighbours(
        &self,
        level: &mut Level,
        current: TileId,
        target: Point,
    ) -> SmallVec<[TileId; N_NEIGHBOURS]> {
        let source_cost = level.tile(current).cost_to_reach.unwrap_or_default();
        let neighbours = level.tile(current).neighbours.clone();
        let mut valid = SmallVec::new();
        for n in neighbours {
            if !level.tile(n).walkable || self.closed_list.contains(&n) {
                continue;
            }
            let tile = level.tile_mut(n);
            tile.check_if_cheapest_route(current, source_cost);
            if !self.open_list.contains(&n) {
                tile.calculate_heuristic_cost(target);
                valid.push(n);
            }
        }
        valid
    }

    fn path_length(level: &Level, start: TileId, target: TileId) -> Option<usize> {
        let path = level.backwards_path(target);
        if path.last() == Some(&start) {
            Some(path.len() - 1)
        } else {
            warn!(
                "Path to {} does not lead back to {}",
                level.tile(target).position,
                level.tile(start).position
            );
            None
        }
    }
}

impl Pathfinder for ObjectSolver {
    fn name(&self) -> &'static str {
        "OOP"
    }

    fn find_path(
        &mut self,
        level: &mut Level,
        start: Point,
        target: Point,
    ) -> Result<PathResult, GridError> {
        let start_id = level.require_tile_id(start)?;
        let target_id = level.require_tile_id(target)?;
        // Tiles remember the previous search, so they are cleaned before the clock starts.
        level.reset_search_state();
        level.tile_mut(start_id).cost_to_reach = Some(0);
        self.open_list.clear();
        self.open_list.push(start_id);
        self.closed_list.clear();

        let mut found_path = false;
        let before = Instant::now();
        while let Some(ix) = self.lowest_total_cost(level) {
            let current = self.open_list.remove(ix);
            if current == target_id {
                found_path = true;
                break;
            }
            self.closed_list.insert(current);
            let discovered = self.find_valid_neighbours(level, current, target);
            self.open_list.splice(0..0, discovered);
        }
        let elapsed = before.elapsed();

        let path_length = if found_path {
            ObjectSolver::path_length(level, start_id, target_id)
        } else {
            None
        };
        let result = PathResult {
            time_to_finish: millis(elapsed),
            found_path,
            open_size: self.open_list.len(),
            closed_size: self.closed_list.len(),
            path_length,
        };
        debug!("{} search {} -> {}: {:?}", self.name(), start, target, result);
        Ok(result)
    }

    fn find_route(
        &mut self,
        level: &mut Level,
        start: Point,
        target: Point,
    ) -> Result<Route, GridError> {
        let result = self.find_path(level, start, target)?;
        let target_id = level.require_tile_id(target)?;
        let path = result.path_length.map(|_| {
            let mut path = level
                .backwards_path(target_id)
                .into_iter()
                .map(|id| level.tile(id).position)
                .collect::<Vec<Point>>();
            path.reverse();
            path
        });
        Ok(Route { result, path })
    }
}
