//! # Slicer CLI
//!
//! Command-line front end over [`slicer::pipeline::run`]. This binary is
//! the concrete instance of the spec's §6 "CLI surface (external
//! collaborator)": it parses flags, loads meshes and configuration, runs
//! the core pipeline, and hands the resulting [`plan_types::Plan`] to the
//! optional text G-code writer. None of this wiring is part of the core's
//! contract — `slicer::pipeline::run` stays a pure function of
//! `(&Configuration, Vec<Mesh>) -> Result<Plan, SlicerError>` regardless of
//! how this binary chooses to drive it.
//!
//! ## Usage
//!
//! ```text
//! slicer -c printer.toml -m part.stl -m bracket.stl -o out.gcode -v
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config_types::Configuration;
use slicer::config::ConfigLoader;
use slicer::pipeline::{self, Phase, Progress};
use slicer::{gcode, io::stl, SlicerError};

/// Slices one or more STL models into a layered toolpath plan and writes
/// the resulting G-code.
#[derive(Parser, Debug)]
#[command(name = "slicer")]
#[command(version)]
#[command(about = "Slices triangle meshes into a layered G-code toolpath plan")]
struct Cli {
    /// Configuration file (TOML). Falls back to built-in defaults if absent.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Mesh file to slice; repeatable to plate multiple models in one run.
    #[arg(short = 'm', long = "model", value_name = "FILE", required = true)]
    models: Vec<PathBuf>,

    /// Output G-code file path.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: PathBuf,

    /// Enables debug-level progress logging.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref(), cli.verbose)?;

    let meshes = cli
        .models
        .iter()
        .map(|path| stl::load(path))
        .collect::<Result<Vec<_>, SlicerError>>()?;

    info!(models = meshes.len(), "loaded meshes");

    let mut cb = |p: Progress| match p.phase {
        Phase::Arranging => info!("arranging plate"),
        Phase::Slicing => info!("slicing layers"),
        Phase::Reconstructing if p.current == p.total => info!(layers = p.total, "reconstructed contours"),
        Phase::Infilling if p.current == p.total => info!(layers = p.total, "generated infill"),
        _ => {}
    };

    let plan = pipeline::run(&config, meshes, Some(&mut cb))?;
    info!(layers = plan.layer_count(), "slicing complete");

    let file = File::create(&cli.output)
        .map_err(|e| SlicerError::Io(cli.output.display().to_string(), e.to_string()))?;
    let mut writer = BufWriter::new(file);
    gcode::write(&plan, &config, &mut writer)?;

    info!(path = %cli.output.display(), "wrote G-code");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_model_flag() {
        let cli = Cli::parse_from([
            "slicer",
            "-m",
            "a.stl",
            "-m",
            "b.stl",
            "-o",
            "out.gcode",
        ]);
        assert_eq!(cli.models, vec![PathBuf::from("a.stl"), PathBuf::from("b.stl")]);
        assert_eq!(cli.output, PathBuf::from("out.gcode"));
        assert!(!cli.verbose);
    }

    #[test]
    fn default_config_is_used_when_no_path_given() {
        let config = ConfigLoader::load::<&std::path::Path>(None, false).unwrap();
        assert_eq!(config.quality, Configuration::default().quality);
    }
}
