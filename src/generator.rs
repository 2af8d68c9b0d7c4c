//! Procedural levels: random noise walls followed by rectangular rooms with doors.
use grid_util::grid::{BoolGrid, ValueGrid};
use grid_util::point::Point;
use itertools::iproduct;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::GridError;
use crate::level::Level;

/// Knobs of the level generator. The defaults give 120x80 levels with sparse noise and rooms.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    /// Chance that a noise cell becomes a wall. The draw is doubled after a wall, which
    /// discourages long wall runs.
    pub wall_probability: f32,
    /// Rooms per ten cells.
    pub room_density: f32,
    pub average_room_size: i32,
    /// Room extents vary by up to `average_room_size * room_size_variation` either way.
    pub room_size_variation: f32,
    pub min_doors: usize,
    /// Exclusive upper bound on the doors of a room, unless equal to `min_doors`.
    pub max_doors: usize,
}

impl Default for GeneratorConfig {
    fn default() -> GeneratorConfig {
        GeneratorConfig {
            width: 120,
            height: 80,
            wall_probability: 0.1,
            room_density: 0.1,
            average_room_size: 5,
            room_size_variation: 1.0,
            min_doors: 0,
            max_doors: 4,
        }
    }
}

impl GeneratorConfig {
    pub fn with_size(mut self, width: usize, height: usize) -> GeneratorConfig {
        self.width = width;
        self.height = height;
        self
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if !(0.0..=1.0).contains(&self.wall_probability) {
            return Err(GridError::InvalidConfig(
                "wall probability must lie in [0, 1]",
            ));
        }
        if !(self.room_density >= 0.0 && self.room_density.is_finite()) {
            return Err(GridError::InvalidConfig(
                "room density must be finite and non-negative",
            ));
        }
        if self.average_room_size < 0 {
            return Err(GridError::InvalidConfig(
                "average room size must be non-negative",
            ));
        }
        if !(self.room_size_variation >= 0.0 && self.room_size_variation.is_finite()) {
            return Err(GridError::InvalidConfig(
                "room size variation must be finite and non-negative",
            ));
        }
        if self.min_doors > self.max_doors {
            return Err(GridError::InvalidConfig(
                "min doors must not exceed max doors",
            ));
        }
        Ok(())
    }

    /// Number of rooms stamped onto a level of this size.
    pub fn room_count(&self) -> usize {
        (self.room_density * self.width as f32 * self.height as f32 * 0.1) as usize
    }
}

/// Generates the walls of a level. [true] marks a blocked cell.
pub fn generate_walls<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<BoolGrid, GridError> {
    config.validate()?;
    Ok(build_walls(config, rng))
}

/// Generates a level and computes the neighbour index of every tile.
pub fn generate<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Result<Level, GridError> {
    let grid = generate_walls(config, rng)?;
    Ok(Level::from_grid(&grid))
}

/// Expects a validated configuration.
fn build_walls<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> BoolGrid {
    let (width, height) = (config.width, config.height);
    let mut grid = BoolGrid::new(width, height, false);

    let mut has_wall = false;
    for (x, y) in iproduct!(0..width as i32, 0..height as i32) {
        let mut draw: f32 = rng.gen();
        if has_wall {
            draw *= 2.0;
        }
        has_wall = draw <= config.wall_probability;
        grid.set(x, y, has_wall);
    }

    let rooms = config.room_count();
    for _ in 0..rooms {
        let room = Room::random(config, rng);
        add_room(&mut grid, &room, rng);
    }

    if width > 0 && height > 0 {
        grid.set(0, 0, false);
        grid.set(width as i32 - 1, height as i32 - 1, false);
    }
    debug!("Generated {width}x{height} walls with {rooms} rooms");
    grid
}

/// Anchor, extents and door count of one room. Extents are clamped to the larger grid
/// dimension; anything beyond it would be clipped anyway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Room {
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    doors: usize,
}

impl Room {
    /// Expects a non-empty grid.
    fn random<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Room {
        let x = rng.gen_range(0..config.width) as i64;
        let y = rng.gen_range(0..config.height) as i64;
        let limit = config.width.max(config.height) as i64;
        let width = room_extent(config, rng).clamp(-limit, limit);
        let height = room_extent(config, rng).clamp(-limit, limit);
        let doors = if config.max_doors > config.min_doors {
            rng.gen_range(config.min_doors..config.max_doors)
        } else {
            config.min_doors
        };
        Room {
            x,
            y,
            width,
            height,
            doors,
        }
    }

    /// Border cells inside a `width` x `height` grid, in stamping order. Corners appear
    /// twice; negative extents give no cells.
    fn border(&self, width: usize, height: usize) -> Vec<Point> {
        let in_grid = |x: i64, y: i64| {
            (x >= 0 && y >= 0 && x < width as i64 && y < height as i64)
                .then(|| Point::new(x as i32, y as i32))
        };
        let horizontal = (self.x..=self.x + self.width)
            .flat_map(|x| [in_grid(x, self.y), in_grid(x, self.y + self.height)]);
        let vertical = (self.y..self.y + self.height)
            .flat_map(|y| [in_grid(self.x, y), in_grid(self.x + self.width, y)]);
        horizontal.chain(vertical).flatten().collect()
    }
}

/// Room extent `average ± average * variation`, truncated toward zero.
fn room_extent<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> i64 {
    let spread = config.average_room_size as f64 * config.room_size_variation as f64;
    i64::from(config.average_room_size).saturating_add(rng.gen_range(-spread..=spread) as i64)
}

/// Stamps the border of `room` onto the grid and punches its doors into random border
/// cells. Border cells outside the grid are skipped, so rooms may be clipped or empty.
fn add_room<R: Rng + ?Sized>(grid: &mut BoolGrid, room: &Room, rng: &mut R) {
    let walls = room.border(grid.width(), grid.height());
    for p in &walls {
        grid.set(p.x, p.y, true);
    }
    if walls.is_empty() {
        return;
    }
    for _ in 0..room.doors {
        let door = walls[rng.gen_range(0..walls.len())];
        grid.set(door.x, door.y, false);
    }
}

/// Owns a seeded random source and produces a stream of levels from one configuration.
#[derive(Clone, Debug)]
pub struct LevelGenerator<R = StdRng> {
    config: GeneratorConfig,
    rng: R,
}

impl LevelGenerator<StdRng> {
    pub fn new(config: GeneratorConfig, seed: u64) -> Result<LevelGenerator<StdRng>, GridError> {
        LevelGenerator::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> LevelGenerator<R> {
    pub fn with_rng(config: GeneratorConfig, rng: R) -> Result<LevelGenerator<R>, GridError> {
        config.validate()?;
        info!(
            "Level generator {}x{}: walls {}, room density {}, doors {}..{}",
            config.width,
            config.height,
            config.wall_probability,
            config.room_density,
            config.min_doors,
            config.max_doors
        );
        Ok(LevelGenerator { config, rng })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Changes the configuration for subsequent levels, keeping the random stream.
    pub fn set_config(&mut self, config: GeneratorConfig) -> Result<(), GridError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn next_level(&mut self) -> Level {
        Level::from_grid(&build_walls(&self.config, &mut self.rng))
    }
}
