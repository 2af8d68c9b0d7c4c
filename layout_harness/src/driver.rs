//! Finite-state driver that walks every scenario through every level size, one level per
//! step.
use std::time::Instant;

use grid_astar_layouts::{
    FlatSolver, Level, LevelGenerator, ObjectSolver, PathResult, Pathfinder, Point, RunSummary,
    Stats,
};
use log::{info, warn};

use crate::{DensityScenario, HarnessError, SummaryRow, SweepConfig};

/// Consecutive rejected levels per accepted one after which a size is closed early.
const MAX_REJECTIONS_PER_LEVEL: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Solving levels of the current size.
    Running,
    /// All levels of the current size are solved; summaries are due.
    SizeFinished,
    /// The largest size of the current scenario is done.
    ScenarioFinished,
    Done,
}

/// What a single [Driver::step] did.
#[derive(Clone, Debug, PartialEq)]
pub enum DriverEvent {
    LevelSolved {
        dimension: usize,
        level: usize,
        flat: PathResult,
        object: PathResult,
    },
    /// The flat solver found no path and failures are being rejected.
    LevelRejected { dimension: usize },
    /// Summaries of the finished size, flat layout first.
    SizeFinished { rows: Vec<SummaryRow> },
    ScenarioFinished {
        scenario: usize,
        description: String,
        rows: Vec<SummaryRow>,
    },
    Done,
}

struct LayoutRun<S> {
    solver: S,
    results: Vec<PathResult>,
    stats: Stats,
}

impl<S: Pathfinder> LayoutRun<S> {
    fn new(solver: S) -> LayoutRun<S> {
        LayoutRun {
            solver,
            results: Vec::new(),
            stats: Stats::new(),
        }
    }

    /// Solves corner to corner. The update time covers the whole call, level import or
    /// reset included; solve and fail times cover the search loop only.
    fn solve(&mut self, level: &mut Level) -> Result<PathResult, HarnessError> {
        let target = Point::new(level.width() as i32 - 1, level.height() as i32 - 1);
        let before = Instant::now();
        let result = self.solver.find_path(level, Point::new(0, 0), target)?;
        self.stats
            .add_time_per_update(before.elapsed().as_secs_f64() * 1000.0);
        self.stats.record(&result);
        Ok(result)
    }

    fn summary_row(&self, scenario: usize, description: &str, dimension: usize) -> SummaryRow {
        SummaryRow::new(
            self.solver.name(),
            scenario,
            description,
            dimension,
            &RunSummary::from_results(&self.results),
        )
    }
}

/// Steps through the scenarios and level sizes of a sweep. Each level is solved by the flat
/// solver first and then by the object solver, on the same tiles.
pub struct Driver {
    scenarios: Vec<DensityScenario>,
    sweep: SweepConfig,
    state: DriverState,
    scenario: usize,
    dimension: usize,
    current_level: usize,
    rejected: usize,
    generator: LevelGenerator,
    flat: LayoutRun<FlatSolver>,
    object: LayoutRun<ObjectSolver>,
    scenario_rows: Vec<SummaryRow>,
}

impl Driver {
    pub fn new(scenarios: Vec<DensityScenario>, sweep: SweepConfig) -> Result<Driver, HarnessError> {
        sweep.validate()?;
        let first = scenarios
            .first()
            .ok_or(HarnessError::InvalidSweep("at least one scenario is required"))?;
        let generator = LevelGenerator::new(first.generator_config(sweep.start_dimension), sweep.seed)?;
        for scenario in &scenarios {
            scenario.generator_config(sweep.start_dimension).validate()?;
        }
        Ok(Driver {
            dimension: sweep.start_dimension,
            scenarios,
            sweep,
            state: DriverState::Running,
            scenario: 0,
            current_level: 1,
            rejected: 0,
            generator,
            flat: LayoutRun::new(FlatSolver::new()),
            object: LayoutRun::new(ObjectSolver::new()),
            scenario_rows: Vec::new(),
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn scenario(&self) -> &DensityScenario {
        &self.scenarios[self.scenario]
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn current_level(&self) -> usize {
        self.current_level
    }

    /// Rolling timings of the flat solver.
    pub fn flat_stats(&self) -> &Stats {
        &self.flat.stats
    }

    /// Rolling timings of the object solver.
    pub fn object_stats(&self) -> &Stats {
        &self.object.stats
    }

    /// Advances by one transition of the state machine.
    pub fn step(&mut self) -> Result<DriverEvent, HarnessError> {
        match self.state {
            DriverState::Running => self.solve_level(),
            DriverState::SizeFinished => Ok(self.finish_size()),
            DriverState::ScenarioFinished => self.finish_scenario(),
            DriverState::Done => Ok(DriverEvent::Done),
        }
    }

    /// Steps until [DriverState::Done], handing every event to `on_event`.
    pub fn run<F>(&mut self, mut on_event: F) -> Result<(), HarnessError>
    where
        F: FnMut(&DriverEvent) -> Result<(), HarnessError>,
    {
        while self.state != DriverState::Done {
            let event = self.step()?;
            on_event(&event)?;
        }
        Ok(())
    }

    /// Runs the whole sweep and returns every summary row.
    pub fn run_to_completion(&mut self) -> Result<Vec<SummaryRow>, HarnessError> {
        let mut rows = Vec::new();
        self.run(|event| {
            if let DriverEvent::SizeFinished { rows: size_rows } = event {
                rows.extend(size_rows.iter().cloned());
            }
            Ok(())
        })?;
        Ok(rows)
    }

    fn solve_level(&mut self) -> Result<DriverEvent, HarnessError> {
        let mut level = self.generator.next_level();
        let flat = self.flat.solve(&mut level)?;
        let object = self.object.solve(&mut level)?;

        let event = if flat.found_path || !self.sweep.reject_failures {
            self.flat.results.push(flat);
            self.object.results.push(object);
            let event = DriverEvent::LevelSolved {
                dimension: self.dimension,
                level: self.current_level,
                flat,
                object,
            };
            self.current_level += 1;
            self.rejected = 0;
            event
        } else {
            self.rejected += 1;
            DriverEvent::LevelRejected {
                dimension: self.dimension,
            }
        };

        if self.current_level > self.sweep.levels_per_size {
            self.state = DriverState::SizeFinished;
        } else if self.rejected >= MAX_REJECTIONS_PER_LEVEL {
            warn!(
                "{} consecutive {}x{} levels without a path, closing the size after {} levels",
                self.rejected,
                self.dimension,
                self.dimension,
                self.current_level - 1
            );
            self.state = DriverState::SizeFinished;
        }
        Ok(event)
    }

    fn finish_size(&mut self) -> DriverEvent {
        let description = self.scenarios[self.scenario].description.clone();
        let rows = vec![
            self.flat
                .summary_row(self.scenario, &description, self.dimension),
            self.object
                .summary_row(self.scenario, &description, self.dimension),
        ];
        info!(
            "{description} {}x{} done: flat {:.4} ms, object {:.4} ms, success rate {:.2}",
            self.dimension,
            self.dimension,
            rows[0].mean_time_ms,
            rows[1].mean_time_ms,
            rows[0].success_rate
        );
        self.scenario_rows.extend(rows.iter().cloned());
        self.flat.results.clear();
        self.object.results.clear();
        self.current_level = 1;
        self.rejected = 0;
        self.dimension += self.sweep.step;
        if self.dimension > self.sweep.max_dimension {
            self.state = DriverState::ScenarioFinished;
        } else {
            self.state = DriverState::Running;
            self.configure_generator();
        }
        DriverEvent::SizeFinished { rows }
    }

    fn finish_scenario(&mut self) -> Result<DriverEvent, HarnessError> {
        let event = DriverEvent::ScenarioFinished {
            scenario: self.scenario,
            description: self.scenarios[self.scenario].description.clone(),
            rows: std::mem::take(&mut self.scenario_rows),
        };
        if self.scenario + 1 >= self.scenarios.len() {
            info!("All scenarios finished");
            self.state = DriverState::Done;
        } else {
            self.scenario += 1;
            self.dimension = self.sweep.start_dimension;
            self.current_level = 1;
            self.state = DriverState::Running;
            info!("Switching to {}", self.scenarios[self.scenario].description);
            self.configure_generator();
        }
        Ok(event)
    }

    fn configure_generator(&mut self) {
        let config = self.scenarios[self.scenario].generator_config(self.dimension);
        if let Err(e) = self.generator.set_config(config) {
            // Every scenario was validated in `new`; only the size changes afterwards.
            warn!("Keeping previous generator configuration: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_sweep() -> SweepConfig {
        SweepConfig {
            start_dimension: 4,
            step: 4,
            max_dimension: 12,
            levels_per_size: 3,
            reject_failures: false,
            seed: 7,
        }
    }

    #[test]
    fn walks_every_size_of_every_scenario() {
        let mut driver = Driver::new(DensityScenario::presets(), small_sweep()).unwrap();
        let rows = driver.run_to_completion().unwrap();
        // 3 scenarios x 3 sizes x 2 layouts
        assert_eq!(rows.len(), 18);
        assert_eq!(driver.state(), DriverState::Done);
        assert_eq!(rows[0].layout, "DOD");
        assert_eq!(rows[1].layout, "OOP");
        assert!(rows.iter().all(|r| r.runs == 3));
        let dimensions: Vec<usize> = rows.iter().step_by(2).map(|r| r.dimension).collect();
        assert_eq!(dimensions, vec![4, 8, 12, 4, 8, 12, 4, 8, 12]);
        assert_eq!(rows[17].description, "HighDensity");
    }

    #[test]
    fn layouts_agree_on_every_level() {
        let mut driver = Driver::new(
            vec![DensityScenario::medium_density()],
            SweepConfig {
                levels_per_size: 10,
                ..small_sweep()
            },
        )
        .unwrap();
        driver
            .run(|event| {
                if let DriverEvent::LevelSolved { flat, object, .. } = event {
                    assert_eq!(flat.found_path, object.found_path);
                    assert_eq!(flat.path_length, object.path_length);
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(driver.flat_stats().update_time.len(), 30);
    }

    #[test]
    fn state_machine_transitions() {
        let sweep = SweepConfig {
            start_dimension: 5,
            step: 5,
            max_dimension: 5,
            levels_per_size: 1,
            ..small_sweep()
        };
        let mut driver = Driver::new(vec![DensityScenario::low_density()], sweep).unwrap();
        assert!(matches!(
            driver.step().unwrap(),
            DriverEvent::LevelSolved { dimension: 5, level: 1, .. }
        ));
        assert_eq!(driver.state(), DriverState::SizeFinished);
        assert!(matches!(driver.step().unwrap(), DriverEvent::SizeFinished { .. }));
        assert_eq!(driver.state(), DriverState::ScenarioFinished);
        match driver.step().unwrap() {
            DriverEvent::ScenarioFinished { rows, .. } => assert_eq!(rows.len(), 2),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(driver.state(), DriverState::Done);
        assert_eq!(driver.step().unwrap(), DriverEvent::Done);
    }

    /// With a wall probability of one, an open noise cell is always followed by a wall in
    /// its column, so no two vertically adjacent cells are open away from the forced
    /// corners and no 6x6 level has a path.
    #[test]
    fn rejected_levels_are_not_counted() {
        let scenario = DensityScenario {
            description: "Walled".to_owned(),
            wall_probability: 1.0,
            room_density: 0.0,
            min_doors: 0,
            max_doors: 0,
        };
        let sweep = SweepConfig {
            start_dimension: 6,
            step: 1,
            max_dimension: 6,
            levels_per_size: 2,
            reject_failures: true,
            seed: 3,
        };
        let mut driver = Driver::new(vec![scenario], sweep).unwrap();
        let mut rejected = 0;
        let mut solved = 0;
        let mut rows = Vec::new();
        driver
            .run(|event| {
                match event {
                    DriverEvent::LevelRejected { dimension } => {
                        assert_eq!(*dimension, 6);
                        rejected += 1;
                    }
                    DriverEvent::LevelSolved { .. } => solved += 1,
                    DriverEvent::SizeFinished { rows: size_rows } => {
                        rows.extend(size_rows.iter().cloned())
                    }
                    _ => {}
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(solved, 0);
        assert_eq!(rejected, MAX_REJECTIONS_PER_LEVEL);
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.runs, 0);
            assert_eq!(row.success_rate, 0.0);
            assert_eq!(row.mean_path_length, None);
        }
        assert_eq!(driver.state(), DriverState::Done);
        assert_eq!(driver.flat_stats().fail_time.total_samples(), MAX_REJECTIONS_PER_LEVEL);
    }

    #[test]
    fn empty_scenario_list_is_rejected() {
        assert!(Driver::new(Vec::new(), small_sweep()).is_err());
    }
}
