use grid_util::point::Point;
use thiserror::Error;

use crate::level::Position;

/// Errors raised by level construction, generation and search setup. Lookups that merely
/// miss the grid are not errors; they return [None].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// A start or target handed to a solver lies outside the level.
    #[error("{point} lies outside the {width}x{height} level")]
    OutOfBounds {
        point: Point,
        width: usize,
        height: usize,
    },
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("tile record at ({}, {}) lies outside the level", .position.x, .position.y)]
    RecordOutOfBounds { position: Position },
    #[error("tile record at ({}, {}) appears more than once", .position.x, .position.y)]
    DuplicateRecord { position: Position },
    #[error("expected {expected} tile records, got {got}")]
    MissingRecords { expected: usize, got: usize },
}
