use grid_astar_layouts::GeneratorConfig;
use serde::{Deserialize, Serialize};

use crate::HarnessError;

/// A named set of generator knobs. Room size and its variation keep the generator defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityScenario {
    pub description: String,
    pub wall_probability: f32,
    pub room_density: f32,
    pub min_doors: usize,
    pub max_doors: usize,
}

impl DensityScenario {
    pub fn low_density() -> DensityScenario {
        DensityScenario {
            description: "LowDensity".to_owned(),
            wall_probability: 0.0,
            room_density: 0.1,
            min_doors: 0,
            max_doors: 4,
        }
    }

    pub fn medium_density() -> DensityScenario {
        DensityScenario {
            description: "MediumDensity".to_owned(),
            wall_probability: 0.1,
            room_density: 0.1,
            min_doors: 0,
            max_doors: 4,
        }
    }

    pub fn high_density() -> DensityScenario {
        DensityScenario {
            description: "HighDensity".to_owned(),
            wall_probability: 0.15,
            room_density: 0.2,
            min_doors: 4,
            max_doors: 10,
        }
    }

    /// Low, medium and high density, in the order a full run visits them.
    pub fn presets() -> Vec<DensityScenario> {
        vec![
            DensityScenario::low_density(),
            DensityScenario::medium_density(),
            DensityScenario::high_density(),
        ]
    }

    /// Looks a preset up by description, ignoring case and an optional "density" suffix.
    pub fn by_name(name: &str) -> Result<DensityScenario, HarnessError> {
        let wanted = name.to_lowercase();
        let wanted = wanted.trim_end_matches("density");
        DensityScenario::presets()
            .into_iter()
            .find(|s| s.description.to_lowercase().trim_end_matches("density") == wanted)
            .ok_or_else(|| HarnessError::UnknownScenario(name.to_owned()))
    }

    /// Generator configuration for a square level of the given dimension.
    pub fn generator_config(&self, dimension: usize) -> GeneratorConfig {
        GeneratorConfig {
            wall_probability: self.wall_probability,
            room_density: self.room_density,
            min_doors: self.min_doors,
            max_doors: self.max_doors,
            ..GeneratorConfig::default()
        }
        .with_size(dimension, dimension)
    }
}

/// Which level sizes are visited and how many levels are solved per size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub start_dimension: usize,
    pub step: usize,
    pub max_dimension: usize,
    pub levels_per_size: usize,
    /// Regenerate levels on which the flat solver finds no path instead of counting them.
    pub reject_failures: bool,
    pub seed: u64,
}

impl Default for SweepConfig {
    fn default() -> SweepConfig {
        SweepConfig {
            start_dimension: 10,
            step: 10,
            max_dimension: 100,
            levels_per_size: 50,
            reject_failures: false,
            seed: 0,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.start_dimension == 0 {
            return Err(HarnessError::InvalidSweep("start dimension must be positive"));
        }
        if self.step == 0 {
            return Err(HarnessError::InvalidSweep("step must be positive"));
        }
        if self.start_dimension > self.max_dimension {
            return Err(HarnessError::InvalidSweep(
                "start dimension exceeds max dimension",
            ));
        }
        if self.levels_per_size == 0 {
            return Err(HarnessError::InvalidSweep("levels per size must be positive"));
        }
        Ok(())
    }

    pub fn dimensions(&self) -> impl Iterator<Item = usize> {
        (self.start_dimension..=self.max_dimension).step_by(self.step.max(1))
    }
}
