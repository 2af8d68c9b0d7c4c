use grid_astar_layouts::GridError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("invalid sweep configuration: {0}")]
    InvalidSweep(&'static str),
    #[error("unknown scenario {0:?}")]
    UnknownScenario(String),
}
