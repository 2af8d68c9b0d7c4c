//! Benchmark harness around `grid_astar_layouts`.
//!
//! Sweeps procedurally generated levels of growing size through both solvers, one
//! density preset at a time, and exports a summary row per layout and size. Levels can
//! be stored as JSON and replayed later.
pub mod driver;
mod error;
pub mod export;
pub mod scenario;
pub mod storage;

pub use driver::{Driver, DriverEvent, DriverState};
pub use error::HarnessError;
pub use export::SummaryRow;
pub use scenario::{DensityScenario, SweepConfig};
