mod args;
mod cutter;

use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use std::path::PathBuf;

use crate::args::Args;
use crate::cutter::config_reader::{read_config, CutterConfig};
use crate::cutter::io_common::next_version_path;
use crate::cutter::recalc::recalculator_for;
use crate::cutter::CutResult;

/// The configuration of the run: the config file if given, else the
/// defaults, with the command line overrides applied.
fn run_config(args: &Args) -> CutResult<CutterConfig> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => CutterConfig::default(),
    };
    if let Some(n) = args.questions {
        config.question_count = n;
    }
    if args.no_recalc {
        config.recalculation.enabled = false;
    }
    debug!("run_config: {:?}", config);
    Ok(config)
}

fn run(args: &Args) -> CutResult<(PathBuf, PathBuf)> {
    let config = run_config(args)?;
    let input = PathBuf::from(args.input.as_str());
    let output = match &args.output {
        Some(p) => PathBuf::from(p.as_str()),
        None => next_version_path(&config.output_directory, &config.output_base_name)?,
    };
    let recalculator = recalculator_for(&config.recalculation);
    let summary = cutter::process_workbook(&input, &output, &config, recalculator.as_ref())?;

    if let Some(dest) = &args.summary {
        cutter::write_summary(&summary, dest)?;
    }
    if let Some(reference) = &args.reference {
        cutter::check_summary(&summary, reference)?;
    }
    Ok((input, output))
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
    debug!("args: {:?}", args);

    match run(&args) {
        Ok((input, output)) => {
            info!("Run finished");
            println!(
                "Successfully processed: {} -> {}",
                input.display(),
                output.display()
            );
        }
        Err(e) => {
            println!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
