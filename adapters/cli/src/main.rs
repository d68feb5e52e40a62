#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for the Pacific Command air operations model.

mod path_transfer;
mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pacific_command_core::{reference, Event, GridCell, MissionKind};
use pacific_command_system_flight_path::FlightPath;
use pacific_command_world::TheaterMap;

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "pacific-command", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert between map references and grid indices
    Grid {
        #[command(subcommand)]
        action: GridAction,
    },
    /// Plot the flight path a mission would fly
    Route {
        /// Map reference the mission departs from
        origin: String,
        /// Map reference of the mission target
        target: String,
        /// Mission type tag
        #[arg(short, long, default_value = "naval-strike")]
        mission: String,
        /// Number of rows on the theater map
        #[arg(long, default_value_t = 60)]
        rows: u32,
        /// Number of columns on the theater map
        #[arg(long, default_value_t = 80)]
        columns: u32,
    },
    /// Fly every mission of a scenario file
    Simulate {
        /// Path to the scenario toml file
        scenario: PathBuf,
        /// Upper bound on the number of turns to process
        #[arg(short, long, default_value_t = 50)]
        turns: u32,
    },
    /// Print the path stored in a transfer string
    Decode {
        /// Transfer string produced by `route` or `simulate`
        transfer: String,
    },
}

#[derive(Subcommand)]
enum GridAction {
    /// Resolve a map reference such as G20 to zero-based indices
    Parse {
        /// Map reference to resolve
        reference: String,
    },
    /// Build the map reference of zero-based indices
    Format {
        /// Zero-based row index
        row: u32,
        /// Zero-based column index
        column: u32,
    },
}

/// Entry point for the Pacific Command command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Grid { action } => grid(action),
        Commands::Route {
            origin,
            target,
            mission,
            rows,
            columns,
        } => route(&origin, &target, &mission, TheaterMap::new(rows, columns)),
        Commands::Simulate { scenario, turns } => simulate(scenario, turns),
        Commands::Decode { transfer } => decode(&transfer),
    }
}

fn grid(action: GridAction) -> Result<()> {
    match action {
        GridAction::Parse { reference: text } => {
            let (row, column) = reference::parse(&text)?;
            println!(
                "{} -> row {row}, column {column}",
                reference::format(row, column)
            );
        }
        GridAction::Format { row, column } => {
            println!("{}", reference::format(row, column));
        }
    }
    Ok(())
}

fn route(origin: &str, target: &str, mission: &str, theater: TheaterMap) -> Result<()> {
    let kind = MissionKind::from_tag(mission)?;
    let mut path = FlightPath::new(kind);
    path.start(origin, target, &theater)
        .with_context(|| format!("failed to plot {kind} route {origin} -> {target}"))?;

    println!("{kind}: {}", join(path.cells()));
    println!(
        "{} cells, target at step {}",
        path.cells().len(),
        path.target_index()
    );
    println!("{}", path_transfer::encode(&path.data()));
    Ok(())
}

fn simulate(scenario: PathBuf, turns: u32) -> Result<()> {
    let scenario = Scenario::load(&scenario)?;
    let report = scenario.run(turns);

    for event in &report.events {
        if let Some(line) = describe(event) {
            log::info!("{line}");
        }
    }
    for (index, reason) in &report.skipped {
        println!("skipped mission {index}: {reason}");
    }

    println!("{} turns", report.turns);
    for mission in report.missions.iter() {
        println!(
            "{} {} {:?} at {} ({} to go) {}",
            mission.id,
            mission.kind,
            mission.state,
            mission.cell,
            mission.distance_to_end,
            path_transfer::encode(&mission.path)
        );
    }
    Ok(())
}

fn decode(transfer: &str) -> Result<()> {
    let data = path_transfer::decode(transfer).context("failed to decode path transfer string")?;
    let path = FlightPath::from_data(&data).context("transfer string holds an invalid path")?;

    println!("{}: {}", path.mission(), join(path.cells()));
    match path.current_cell() {
        Some(cell) => println!("at {cell}, {} to go", path.distance_to_end()),
        None => println!("not started"),
    }
    Ok(())
}

fn join(cells: &[GridCell]) -> String {
    cells
        .iter()
        .map(GridCell::reference)
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::TheaterConfigured { rows, columns } => {
            format!("theater is {rows} rows by {columns} columns")
        }
        Event::MissionLaunched {
            mission,
            kind,
            path_length,
        } => format!("{mission} launched {kind} over {path_length} cells"),
        Event::MissionRestored {
            mission,
            kind,
            cell,
        } => format!("{mission} restored {kind} at {cell}"),
        Event::MissionRejected { reason } => format!("launch rejected: {reason}"),
        Event::TurnAdvanced { turn } => format!("turn {turn}"),
        Event::MissionMoved { mission, segment } => {
            format!("{mission} flew {}", join(segment))
        }
        Event::MissionOverTarget { mission, cell } => format!("{mission} over target {cell}"),
        Event::MissionRecalled { mission, cell } => format!("{mission} recalled at {cell}"),
        Event::RecallIgnored { .. } => return None,
        Event::MissionCompleted { mission, cell } => format!("{mission} landed at {cell}"),
        Event::MissionEnded { mission, cell } => format!("{mission} ended at {cell}"),
        Event::MissionNotFound { mission } => format!("{mission} does not exist"),
    };
    Some(line)
}
