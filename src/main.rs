//! Tile Index - inspect the resolution pyramid of an acquired tile grid.

use std::io::Read;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tile_position_index::{
    config::{Cli, Command, IndexArgs, LookupConfig, SummaryConfig},
    Error, PositionIndex, PositionList,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Summary(config) => run_summary(config),
        Command::Lookup(config) => run_lookup(config),
    }
}

// =============================================================================
// Shared Setup
// =============================================================================

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tile_position_index=debug"
    } else {
        "tile_position_index=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Read the position list named by `args`.
fn read_positions(args: &IndexArgs) -> Result<String, String> {
    let mut text = String::new();
    if args.reads_stdin() {
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
    } else {
        text = std::fs::read_to_string(&args.positions)
            .map_err(|e| format!("Failed to read {}: {}", args.positions.display(), e))?;
    }
    Ok(text)
}

/// Validate arguments, read the position list and build the index.
fn load_index(args: &IndexArgs) -> Result<PositionIndex, String> {
    args.validate()?;
    let geometry = args.geometry.to_geometry().map_err(|e| e.to_string())?;
    let text = read_positions(args)?;

    let index = PositionList::from_json(&text)
        .map_err(Error::from)
        .and_then(|list| PositionIndex::from_position_list(geometry, list, args.max_level))
        .map_err(|e| e.to_string())?;

    debug!(
        tiles = index.num_positions(),
        levels = index.num_res_levels(),
        "loaded position list"
    );
    Ok(index)
}

// =============================================================================
// Summary Command
// =============================================================================

#[derive(Serialize)]
struct Summary {
    tiles: usize,
    min_row: i32,
    min_col: i32,
    num_rows: u64,
    num_cols: u64,
    levels: Vec<usize>,
}

fn run_summary(config: SummaryConfig) -> ExitCode {
    init_logging(config.index.verbose);

    let index = match load_index(&config.index) {
        Ok(index) => index,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let summary = Summary {
        tiles: index.num_positions(),
        min_row: index.min_row(),
        min_col: index.min_col(),
        num_rows: index.num_rows(),
        num_cols: index.num_cols(),
        levels: (0..index.num_res_levels() as u32)
            .map(|level| index.num_nodes_at_level(level))
            .collect(),
    };

    if config.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize summary: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("Tiles:  {}", summary.tiles);
    println!(
        "Extent: {} rows x {} cols starting at ({}, {})",
        summary.num_rows, summary.num_cols, summary.min_row, summary.min_col
    );
    println!("Levels: {}", summary.levels.len());
    for (level, count) in summary.levels.iter().enumerate() {
        println!("  level {:>2}: {} node(s)", level, count);
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Lookup Command
// =============================================================================

fn run_lookup(config: LookupConfig) -> ExitCode {
    init_logging(config.index.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let index = match load_index(&config.index) {
        Ok(index) => index,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = index.node_info(config.tile, config.level).and_then(|info| {
        index
            .full_res_position_index(info.position_index, config.level)
            .map(|representative| (info, representative))
    });

    match result {
        Ok((info, representative)) => {
            let json = serde_json::json!({
                "tile": config.tile,
                "node": info,
                "representative_tile": representative,
            });
            println!("{:#}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Lookup failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
