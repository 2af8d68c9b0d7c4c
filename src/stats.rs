//! Rolling and per-batch aggregation of [PathResult]s.
use num_traits::ToPrimitive;

use crate::solver::PathResult;

/// Window size of a [StatCategory].
pub const SAMPLE_SIZE: usize = 1000;

/// Arithmetic mean of the values, [None] for an empty input.
pub fn mean<T, I>(values: I) -> Option<f64>
where
    T: ToPrimitive,
    I: IntoIterator<Item = T>,
{
    let (sum, count) = values
        .into_iter()
        .filter_map(|v| v.to_f64())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// A named ring buffer of the most recent samples.
#[derive(Clone, Debug)]
pub struct StatCategory {
    pub name: String,
    data: Vec<f64>,
    capacity: usize,
    data_index: usize,
}

impl StatCategory {
    pub fn new(name: impl Into<String>) -> StatCategory {
        StatCategory::with_capacity(name, SAMPLE_SIZE)
    }

    /// A zero capacity is raised to one.
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> StatCategory {
        let capacity = capacity.max(1);
        StatCategory {
            name: name.into(),
            data: Vec::with_capacity(capacity),
            capacity,
            data_index: 0,
        }
    }

    /// Adds a sample, overwriting the oldest one once the window is full.
    pub fn add_data_point(&mut self, value: f64) {
        let slot = self.data_index % self.capacity;
        if slot < self.data.len() {
            self.data[slot] = value;
        } else {
            self.data.push(value);
        }
        self.data_index += 1;
    }

    /// Mean over the filled part of the window.
    pub fn average(&self) -> Option<f64> {
        mean(self.data.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Samples added over the whole lifetime, including overwritten ones.
    pub fn total_samples(&self) -> usize {
        self.data_index
    }
}

/// The rolling timing categories of a benchmark run.
#[derive(Clone, Debug)]
pub struct Stats {
    pub update_time: StatCategory,
    pub solve_time: StatCategory,
    pub fail_time: StatCategory,
    pub step_time: StatCategory,
}

impl Default for Stats {
    fn default() -> Stats {
        Stats {
            update_time: StatCategory::new("Update Time"),
            solve_time: StatCategory::new("Solve Time"),
            fail_time: StatCategory::new("Fail Time"),
            step_time: StatCategory::new("Time per 1000 steps"),
        }
    }
}

impl Stats {
    pub fn new() -> Stats {
        Stats::default()
    }

    pub fn add_time_per_update(&mut self, time: f64) {
        self.update_time.add_data_point(time);
    }

    pub fn add_solve_time(&mut self, time: f64) {
        self.solve_time.add_data_point(time);
    }

    pub fn add_fail_time(&mut self, time: f64) {
        self.fail_time.add_data_point(time);
    }

    /// Records `time` normalised to 1000 steps. Ignored for zero steps.
    pub fn add_step_time(&mut self, steps: usize, time: f64) {
        if steps > 0 {
            self.step_time
                .add_data_point(time / steps as f64 * 1000.0);
        }
    }

    /// Files a search under solve or fail time and its per-expansion cost under step time.
    pub fn record(&mut self, result: &PathResult) {
        if result.found_path {
            self.add_solve_time(result.time_to_finish);
        } else {
            self.add_fail_time(result.time_to_finish);
        }
        self.add_step_time(result.closed_size, result.time_to_finish);
    }

    pub fn categories(&self) -> [&StatCategory; 4] {
        [
            &self.update_time,
            &self.solve_time,
            &self.fail_time,
            &self.step_time,
        ]
    }
}

/// Aggregate of many searches at one grid size; the unit in which the two layouts are
/// compared.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub runs: usize,
    pub found: usize,
    pub mean_time_ms: f64,
    /// Found runs over all runs.
    pub success_rate: f64,
    pub mean_open_size: f64,
    pub mean_closed_size: f64,
    /// Mean over found runs only; [None] if no run found a path.
    pub mean_path_length: Option<f64>,
}

impl RunSummary {
    pub fn from_results(results: &[PathResult]) -> RunSummary {
        let runs = results.len();
        let found = results.iter().filter(|r| r.found_path).count();
        RunSummary {
            runs,
            found,
            mean_time_ms: mean(results.iter().map(|r| r.time_to_finish)).unwrap_or_default(),
            success_rate: if runs > 0 {
                found as f64 / runs as f64
            } else {
                0.0
            },
            mean_open_size: mean(results.iter().map(|r| r.open_size)).unwrap_or_default(),
            mean_closed_size: mean(results.iter().map(|r| r.closed_size)).unwrap_or_default(),
            mean_path_length: mean(
                results
                    .iter()
                    .filter(|r| r.found_path)
                    .filter_map(|r| r.path_length),
            ),
        }
    }
}
