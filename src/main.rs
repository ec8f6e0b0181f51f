//! Filament Kinetics - entry point
//!
//! Headless kinetic simulation of filament self-assembly.
//!
//! CLI Usage:
//!   cargo run                          # Run with default parameters
//!   cargo run -- -n 5000               # Custom step count
//!   cargo run -- -c events.ctl         # Load event definitions
//!   cargo run -- --csv 100             # CSV export every 100 steps

use std::collections::HashSet;
use std::time::Instant;

use anyhow::Result;
use filament_kinetics::{
    config::{load_control_file, EventLine, Parameters},
    export::{export_metrics_json, CsvExporter},
    kinetics::{EventRegistry, EventTarget},
    network::ActiveCellNetwork,
    state::PolymerId,
};
use rand::prelude::*;

/// Parsed command-line options
struct CliOptions {
    steps: usize,
    control_path: Option<String>,
    params_dir: Option<String>,
    nucleation_seeds: usize,
    csv_interval: u64,
    json_snapshot: bool,
}

/// Parse CLI arguments
fn parse_args() -> CliOptions {
    let args: Vec<String> = std::env::args().collect();
    let mut options = CliOptions {
        steps: 2000,
        control_path: None,
        params_dir: None,
        nucleation_seeds: 20,
        csv_interval: 0,
        json_snapshot: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--steps" => {
                i += 1;
                if i < args.len() {
                    options.steps = args[i].parse().unwrap_or(2000);
                }
            }
            "-c" | "--control" => {
                i += 1;
                if i < args.len() {
                    options.control_path = Some(args[i].clone());
                }
            }
            "-p" | "--params" => {
                i += 1;
                if i < args.len() {
                    options.params_dir = Some(args[i].clone());
                }
            }
            "--nucleate" => {
                i += 1;
                if i < args.len() {
                    options.nucleation_seeds = args[i].parse().unwrap_or(20);
                }
            }
            "--csv" => {
                i += 1;
                if i < args.len() {
                    options.csv_interval = args[i].parse().unwrap_or(100);
                }
            }
            "--json" => options.json_snapshot = true,
            "--help" | "-h" => {
                println!("Filament Kinetics");
                println!();
                println!("Usage: filament-kinetics [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --steps N      Number of simulation steps (default: 2000)");
                println!("  -c, --control F    Event control file (token format)");
                println!("  -p, --params DIR   Parameter directory (JSON files)");
                println!("      --nucleate K   Nucleation seeds to plant (default: 20)");
                println!("      --csv N        Export CSV time series every N steps");
                println!("      --json         Export a JSON metrics snapshot at the end");
                println!("  -h, --help         Show this help");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    options
}

/// Default event set used when no control file is given
fn default_event_lines() -> Vec<EventLine> {
    vec![
        EventLine::new("PolymerFormsBondTriple", "50 1.5 10.0 1.0"),
        EventLine::new("BondBindsToPolymerHead", "100 1.5 10.0 1.0"),
        EventLine::new("BondBindsToPolymerTail", "100 1.5 10.0 1.0"),
    ]
}

fn main() -> Result<()> {
    env_logger::init();

    let options = parse_args();

    println!("=== Filament Kinetics ===\n");

    // Load parameters
    let params = match &options.params_dir {
        Some(dir) => Parameters::load_from_dir(dir),
        None => Parameters::load_or_default(),
    };
    println!(
        "Grid: {}x{}x{} cells, width {:.2}",
        params.grid.cells_per_axis[0],
        params.grid.cells_per_axis[1],
        params.grid.cells_per_axis[2],
        params.grid.cell_width
    );
    println!("Free bonds: {}", params.population.bond_count);

    // Build the network
    let mut net = ActiveCellNetwork::new(&params)?;
    let brownian = params.dynamics.brownian();

    // Load or default the event definitions
    let registry = EventRegistry::with_defaults();
    let event_lines = match &options.control_path {
        Some(path) => load_control_file(path)?,
        None => default_event_lines(),
    };

    // Nucleation lines are planted on sampled free bonds now; growth lines
    // become templates attached to each polymer as it appears
    let mut growth_templates: Vec<EventLine> = Vec::new();
    let mut nucleation_lines: Vec<EventLine> = Vec::new();
    for line in event_lines {
        if line.kind == "PolymerFormsBondTriple" {
            nucleation_lines.push(line);
        } else {
            growth_templates.push(line);
        }
    }

    let mut seeds: Vec<_> = net
        .state
        .bonds
        .iter()
        .filter(|b| b.is_free() && !b.phantom)
        .map(|b| b.id)
        .collect();
    seeds.shuffle(&mut net.state.rng);
    seeds.truncate(options.nucleation_seeds);

    for line in &nucleation_lines {
        for &seed in &seeds {
            let event = registry.create_from_line(line, EventTarget::FreeBond(seed))?;
            net.add_event(event);
        }
    }
    println!(
        "Events planted: {} nucleation, {} growth template(s)",
        net.event_count(),
        growth_templates.len()
    );

    let mut csv = if options.csv_interval > 0 {
        Some(CsvExporter::new(options.csv_interval)?)
    } else {
        None
    };

    println!("\n--- Running {} steps ---\n", options.steps);

    let mut tended_polymers: HashSet<PolymerId> = HashSet::new();
    let start_time = Instant::now();

    for step in 0..options.steps {
        net.step();
        net.state.integrate_brownian(&brownian);

        // Give every freshly nucleated polymer its growth events
        let new_polymers: Vec<PolymerId> = net
            .state
            .polymers
            .iter()
            .map(|p| p.id)
            .filter(|id| !tended_polymers.contains(id))
            .collect();
        for polymer in new_polymers {
            for line in &growth_templates {
                let event = registry.create_from_line(line, EventTarget::Polymer(polymer))?;
                net.add_event(event);
            }
            tended_polymers.insert(polymer);
        }

        if let Some(csv) = &mut csv {
            csv.maybe_record(&net.metrics())?;
        }

        // Report progress every 10%
        if options.steps >= 10 && step % (options.steps / 10) == 0 {
            let m = net.metrics();
            println!(
                "  {:3.0}%: step={}, polymers={}, mean_len={:.2}, free={}, commits={}",
                (step as f32 / options.steps as f32) * 100.0,
                step,
                m.polymer_count,
                m.mean_polymer_length,
                m.free_bonds,
                m.commits
            );
        }
    }
    let elapsed = start_time.elapsed();

    if let Some(csv) = &mut csv {
        csv.record(&net.metrics())?;
        csv.flush()?;
        println!("\nCSV time series written: {}", csv.path().display());
    }

    let metrics = net.metrics();
    if options.json_snapshot {
        let path = export_metrics_json(&metrics)?;
        println!("JSON snapshot written: {}", path.display());
    }

    println!("\n=== Results ===");
    println!("Elapsed time: {:.2?}", elapsed);
    println!(
        "Steps per second: {:.0}",
        options.steps as f32 / elapsed.as_secs_f32()
    );
    println!();
    println!("Polymers nucleated: {}", metrics.nucleations);
    println!("Live polymers: {}", metrics.polymer_count);
    println!("Mean polymer length: {:.2}", metrics.mean_polymer_length);
    println!("Longest polymer: {}", metrics.longest_polymer);
    println!("Growth commits: {}", metrics.commits);
    println!("Capture releases: {}", metrics.releases);
    println!("Free bonds remaining: {}", metrics.free_bonds);
    println!(
        "Last sweep: {} pairs tested, {} in range",
        metrics.pairs_tested, metrics.pairs_in_range
    );

    Ok(())
}
