use core::fmt;

use grid_util::grid::{BoolGrid, ValueGrid};
use grid_util::point::Point;
use itertools::Itertools;
use log::warn;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

use crate::error::GridError;
use crate::neighbours::{self, N_NEIGHBOURS};

/// Stable handle of a [Tile] inside a [Level]. Wraps the row-major index `y * width + x`,
/// which is also the index the flat solver uses for the same cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(usize);

impl TileId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A cell of the object model. Besides its position and walkability it carries the live
/// search state the object solver mutates in place.
#[derive(Clone, Debug)]
pub struct Tile {
    pub position: Point,
    pub walkable: bool,
    /// [None] until the tile is first reached.
    pub cost_to_reach: Option<i32>,
    pub heuristic_cost: i32,
    pub reached_from: Option<TileId>,
    pub neighbours: SmallVec<[TileId; N_NEIGHBOURS]>,
}

impl Tile {
    pub fn new(position: Point, walkable: bool) -> Tile {
        Tile {
            position,
            walkable,
            cost_to_reach: None,
            heuristic_cost: 0,
            reached_from: None,
            neighbours: SmallVec::new(),
        }
    }

    pub fn total_cost(&self) -> Option<i32> {
        self.cost_to_reach.map(|g| g + self.heuristic_cost)
    }

    /// Relaxes this tile through `source`, reached at `source_cost`. Returns whether the
    /// cost or predecessor changed.
    pub fn check_if_cheapest_route(&mut self, source: TileId, source_cost: i32) -> bool {
        let via_source = source_cost + 1;
        match self.cost_to_reach {
            Some(cost) if cost <= via_source => false,
            _ => {
                self.cost_to_reach = Some(via_source);
                self.reached_from = Some(source);
                true
            }
        }
    }

    pub fn calculate_heuristic_cost(&mut self, target: Point) {
        self.heuristic_cost = self.position.manhattan_distance(&target);
    }

    /// Clears the search state so the tile can take part in a fresh search.
    pub fn reset(&mut self) {
        self.cost_to_reach = None;
        self.heuristic_cost = 0;
        self.reached_from = None;
    }
}

/// Position of a persisted tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl From<Point> for Position {
    fn from(p: Point) -> Position {
        Position { x: p.x, y: p.y }
    }
}

impl From<Position> for Point {
    fn from(p: Position) -> Point {
        Point::new(p.x, p.y)
    }
}

/// Minimal persisted form of a tile: where it is and whether it can be walked on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileRecord {
    pub position: Position,
    pub walkable: bool,
}

/// Arena of [Tile]s addressed by [TileId]. Neighbour lists are handles into the arena, so the
/// tile graph has no owning cycles.
#[derive(Clone, Debug, Default)]
pub struct Level {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Level {
    /// Builds a level from a grid in which [true] marks a blocked cell.
    pub fn from_grid(grid: &BoolGrid) -> Level {
        let (width, height) = (grid.width(), grid.height());
        let tiles = (0..width * height)
            .map(|ix| {
                let p = neighbours::point_of(ix, width);
                Tile::new(p, !grid.get(p.x, p.y))
            })
            .collect();
        let mut level = Level {
            width,
            height,
            tiles,
        };
        level.calculate_neighbours();
        level
    }

    /// A level without any walls.
    pub fn open(width: usize, height: usize) -> Level {
        Level::from_grid(&BoolGrid::new(width, height, false))
    }

    /// Rebuilds a level from persisted records, taking the dimensions from the largest
    /// position present.
    pub fn from_records(records: &[TileRecord]) -> Result<Level, GridError> {
        let extent = |coordinate: fn(&TileRecord) -> i32| {
            let end = records
                .iter()
                .map(|r| i64::from(coordinate(r)) + 1)
                .max()
                .unwrap_or(0)
                .max(0);
            usize::try_from(end).unwrap_or(usize::MAX)
        };
        let width = extent(|r| r.position.x);
        let height = extent(|r| r.position.y);
        Level::from_records_sized(width, height, records)
    }

    /// Rebuilds a `width` x `height` level from persisted records. Every cell must be
    /// described exactly once; record order does not matter. The record count is checked
    /// before any cell is allocated.
    pub fn from_records_sized(
        width: usize,
        height: usize,
        records: &[TileRecord],
    ) -> Result<Level, GridError> {
        let cells = width.saturating_mul(height);
        if records.len() != cells {
            return Err(GridError::MissingRecords {
                expected: cells,
                got: records.len(),
            });
        }
        let mut grid = BoolGrid::new(width, height, true);
        let mut seen = vec![false; cells];
        for record in records {
            let p: Point = record.position.into();
            if !neighbours::in_bounds(p, width, height) {
                return Err(GridError::RecordOutOfBounds {
                    position: record.position,
                });
            }
            let ix = neighbours::index_of(p, width);
            if seen[ix] {
                return Err(GridError::DuplicateRecord {
                    position: record.position,
                });
            }
            seen[ix] = true;
            grid.set(p.x, p.y, !record.walkable);
        }
        Ok(Level::from_grid(&grid))
    }

    /// Row-major records of every tile.
    pub fn to_records(&self) -> Vec<TileRecord> {
        self.tiles
            .iter()
            .map(|t| TileRecord {
                position: t.position.into(),
                walkable: t.walkable,
            })
            .collect()
    }

    /// The walls as a grid in which [true] marks a blocked cell.
    pub fn to_grid(&self) -> BoolGrid {
        let mut grid = BoolGrid::new(self.width, self.height, false);
        for tile in &self.tiles {
            grid.set(tile.position.x, tile.position.y, !tile.walkable);
        }
        grid
    }

    fn calculate_neighbours(&mut self) {
        let index = neighbours::neighbour_index(self.width, self.height);
        for (tile, neighbours) in self.tiles.iter_mut().zip(index) {
            tile.neighbours = neighbours.into_iter().map(TileId).collect();
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        neighbours::in_bounds(point, self.width, self.height)
    }

    pub fn tile_id(&self, point: Point) -> Option<TileId> {
        self.in_bounds(point)
            .then(|| TileId(neighbours::index_of(point, self.width)))
    }

    /// Like [tile_id](Self::tile_id), but treats a miss as a contract violation.
    pub fn require_tile_id(&self, point: Point) -> Result<TileId, GridError> {
        self.tile_id(point).ok_or(GridError::OutOfBounds {
            point,
            width: self.width,
            height: self.height,
        })
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.0]
    }

    pub fn tile_mut(&mut self, id: TileId) -> &mut Tile {
        &mut self.tiles[id.0]
    }

    pub fn tile_at(&self, point: Point) -> Option<&Tile> {
        self.tile_id(point).map(|id| self.tile(id))
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.tile_at(point).map_or(false, |t| t.walkable)
    }

    /// Updates the walkability of a cell. Returns [false] if the point is outside the level.
    pub fn set_walkable(&mut self, point: Point, walkable: bool) -> bool {
        match self.tile_id(point) {
            Some(id) => {
                self.tiles[id.0].walkable = walkable;
                true
            }
            None => false,
        }
    }

    pub fn neighbours(&self, id: TileId) -> &[TileId] {
        &self.tiles[id.0].neighbours
    }

    /// Clears the cost, heuristic and predecessor of every tile.
    pub fn reset_search_state(&mut self) {
        self.tiles.iter_mut().for_each(Tile::reset);
    }

    /// Follows predecessors from `target` until a tile without one is reached. The result
    /// runs from `target` back to the start of the last search.
    pub fn backwards_path(&self, target: TileId) -> Vec<TileId> {
        let mut path: Vec<TileId> =
            std::iter::successors(Some(target), |&id| self.tile(id).reached_from)
                .take(self.tiles.len() + 1)
                .collect();
        // A chain visiting more tiles than exist must contain a cycle.
        if path.len() > self.tiles.len() {
            warn!(
                "Predecessor chain from {} does not terminate",
                self.tile(target).position
            );
            path.clear();
        }
        path
    }

    /// Unions every walkable tile with its walkable cardinal neighbours.
    pub fn generate_components(&self) -> UnionFind<usize> {
        let mut components = UnionFind::new(self.tiles.len());
        for (ix, tile) in self.tiles.iter().enumerate() {
            if !tile.walkable {
                continue;
            }
            for n in &tile.neighbours {
                if n.0 > ix && self.tiles[n.0].walkable {
                    components.union(ix, n.0);
                }
            }
        }
        components
    }

    /// Checks whether a walkable route joins `start` and `goal`.
    pub fn reachable(&self, start: Point, goal: Point) -> bool {
        match (self.tile_id(start), self.tile_id(goal)) {
            (Some(s), Some(g)) => {
                start == goal
                    || (self.tile(s).walkable
                        && self.tile(g).walkable
                        && self.generate_components().equiv(s.0, g.0))
            }
            _ => false,
        }
    }

    /// Number of walkable tiles connected to `point`, itself included. Zero for blocked or
    /// absent points.
    pub fn component_size(&self, point: Point) -> usize {
        let Some(id) = self.tile_id(point).filter(|&id| self.tile(id).walkable) else {
            return 0;
        };
        let components = self.generate_components();
        let root = components.find(id.0);
        self.tiles
            .iter()
            .enumerate()
            .filter(|(ix, t)| t.walkable && components.find(*ix) == root)
            .count()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in (0..self.height).rev() {
            let row = self.tiles[y * self.width..(y + 1) * self.width]
                .iter()
                .map(|t| if t.walkable { '.' } else { '#' })
                .join("");
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
