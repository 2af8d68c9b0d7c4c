//! layout_bench - compares the object-model and flat-array A* solvers
//!
//! Usage:
//!   layout_bench run [--output <dir>] [--scenario <name>]... [--levels-per-size <n>]
//!   layout_bench generate <dir> [--count <n>] [--size <n>] [--scenario <name>]
//!   layout_bench replay <dir>

use clap::{Parser, Subcommand};
use grid_astar_layouts::{FlatSolver, LevelGenerator, ObjectSolver, Pathfinder, Point};
use layout_harness::{
    export::save_scenario,
    storage::{load_levels, save_level},
    DensityScenario, Driver, DriverEvent, HarnessError, SweepConfig,
};
use log::{error, info};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "layout_bench")]
#[command(about = "Object-model versus flat-array A* on generated levels", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep level sizes for each scenario and export per-size summaries
    Run {
        /// Directory receiving one CSV file per scenario and layout
        #[arg(short, long, default_value = "stats")]
        output: PathBuf,

        /// Scenario preset (low, medium, high); repeat for several. Defaults to all three
        #[arg(short, long)]
        scenario: Vec<String>,

        #[arg(long, default_value_t = 10)]
        start_dimension: usize,

        #[arg(long, default_value_t = 10)]
        step: usize,

        #[arg(long, default_value_t = 100)]
        max_dimension: usize,

        #[arg(long, default_value_t = 50)]
        levels_per_size: usize,

        /// Regenerate levels without a path instead of counting them
        #[arg(long)]
        reject_failures: bool,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Generate levels and store them as JSON
    Generate {
        /// Output directory
        output: PathBuf,

        #[arg(short, long, default_value_t = 10)]
        count: usize,

        /// Width and height of each level
        #[arg(long, default_value_t = 50)]
        size: usize,

        #[arg(short, long, default_value = "medium")]
        scenario: String,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Solve stored levels corner to corner with both solvers
    Replay {
        /// Directory searched recursively for .json levels
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let outcome = match cli.command {
        Commands::Run {
            output,
            scenario,
            start_dimension,
            step,
            max_dimension,
            levels_per_size,
            reject_failures,
            seed,
        } => {
            let sweep = SweepConfig {
                start_dimension,
                step,
                max_dimension,
                levels_per_size,
                reject_failures,
                seed,
            };
            run(output, scenario, sweep)
        }
        Commands::Generate {
            output,
            count,
            size,
            scenario,
            seed,
        } => generate(output, count, size, &scenario, seed),
        Commands::Replay { input } => replay(input),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(output: PathBuf, names: Vec<String>, sweep: SweepConfig) -> Result<(), HarnessError> {
    let scenarios = if names.is_empty() {
        DensityScenario::presets()
    } else {
        names
            .iter()
            .map(|name| DensityScenario::by_name(name))
            .collect::<Result<Vec<_>, _>>()?
    };
    let before = Instant::now();
    let mut driver = Driver::new(scenarios, sweep)?;
    driver.run(|event| {
        if let DriverEvent::ScenarioFinished {
            description, rows, ..
        } = event
        {
            save_scenario(&output, description, rows)?;
        }
        Ok(())
    })?;
    for (layout, stats) in [("DOD", driver.flat_stats()), ("OOP", driver.object_stats())] {
        for category in stats.categories() {
            if let Some(average) = category.average() {
                info!("{layout} {}: {average:.7}", category.name);
            }
        }
    }
    info!("Total runtime: {:.2?}", before.elapsed());
    Ok(())
}

fn generate(
    output: PathBuf,
    count: usize,
    size: usize,
    scenario: &str,
    seed: u64,
) -> Result<(), HarnessError> {
    let scenario = DensityScenario::by_name(scenario)?;
    let mut generator = LevelGenerator::new(scenario.generator_config(size), seed)?;
    for i in 0..count {
        let level = generator.next_level();
        let name = format!("{}_{size}x{size}_{i:03}", scenario.description);
        save_level(&level, &output, &name)?;
    }
    info!("Wrote {count} levels to {}", output.display());
    Ok(())
}

fn replay(input: PathBuf) -> Result<(), HarnessError> {
    let mut flat = FlatSolver::new();
    let mut object = ObjectSolver::new();
    for (path, mut level) in load_levels(&input)? {
        if level.is_empty() {
            continue;
        }
        let start = Point::new(0, 0);
        let target = Point::new(level.width() as i32 - 1, level.height() as i32 - 1);
        let flat_result = flat.find_path(&mut level, start, target)?;
        let object_result = object.find_path(&mut level, start, target)?;
        println!("{}", path.display());
        for (name, result) in [
            (flat.name(), flat_result),
            (object.name(), object_result),
        ] {
            println!(
                "\t{name}: found {}, length {:?}, open {}, closed {}, {:.4} ms",
                result.found_path,
                result.path_length,
                result.open_size,
                result.closed_size,
                result.time_to_finish
            );
        }
    }
    Ok(())
}
