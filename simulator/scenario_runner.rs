// Scenario Runner - Load and execute swarm scenario YAML files
//
// Usage:
//   cargo run --bin scenario_runner scenarios/default_swarm.yaml
//   cargo run --bin scenario_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner scenarios/default_swarm.yaml --seed 0x1234...

mod swarm_scenario;

use std::env;
use std::fs;
use std::path::Path;
use std::thread;

use log::LevelFilter;
use simple_logger::SimpleLogger;

use swarm_scenario::{LoggingEventSink, ScenarioFile};
use swarm_sim::SwarmController;

fn main() {
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Warn).env().init() {
        eprintln!("logger init failed: {}", e);
    }

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} scenarios/default_swarm.yaml", args[0]);
        eprintln!("  {} scenarios/", args[0]);
        eprintln!("  {} scenarios/default_swarm.yaml --seed 0x123456...", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);

    let seed: Option<[u8; 32]> = if args.len() >= 4 && args[2] == "--seed" {
        Some(parse_seed_hex(&args[3]))
    } else {
        None
    };

    if path.is_file() {
        run_scenario_file(path, seed);
    } else if path.is_dir() {
        run_scenario_directory(path, seed);
    } else {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    }
}

fn run_scenario_directory(dir: &Path, seed: Option<[u8; 32]>) {
    let mut scenarios = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str());
            if ext == Some("yaml") || ext == Some("yml") {
                scenarios.push(path);
            }
        }
    }

    scenarios.sort();

    if scenarios.is_empty() {
        eprintln!("No .yaml files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("Found {} scenario(s) to run\n", scenarios.len());

    for (i, scenario_path) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, scenarios.len(), scenario_path.display());
        run_scenario_file(scenario_path, seed);
    }
}

fn run_scenario_file(path: &Path, seed: Option<[u8; 32]>) {
    println!("Loading scenario from: {}", path.display());

    let scenario = ScenarioFile::load(path).unwrap_or_else(|e| {
        eprintln!("Failed to load {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let name = scenario
        .meta
        .name
        .clone()
        .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_default();
    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  {}{}║", name, " ".repeat(54_usize.saturating_sub(name.len())));
    println!("╚════════════════════════════════════════════════════════╝\n");

    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc);
    }

    let config = scenario.swarm_config(seed).unwrap_or_else(|e| {
        eprintln!("Invalid scenario {}: {}", path.display(), e);
        std::process::exit(1);
    });
    let schedule = scenario.schedule().unwrap_or_else(|e| {
        eprintln!("Invalid scenario {}: {}", path.display(), e);
        std::process::exit(1);
    });

    println!("Configuration:");
    println!("  Initial Peers: {}", config.initial_peers);
    println!("  Total Chunks: {}", config.total_chunks);
    println!("  Stall Threshold: {}", config.stall_threshold());
    println!("  Churn: {:?}", config.churn);
    println!("  Max Ticks: {}", scenario.run.max_ticks);
    println!("\nStarting simulation...\n");

    let sink = Box::new(LoggingEventSink::new(scenario.run.event_logging));
    let mut controller = SwarmController::new_with_sink(config, sink).unwrap_or_else(|e| {
        eprintln!("Failed to build swarm: {}", e);
        std::process::exit(1);
    });

    let summary = if scenario.run.realtime {
        controller.start();
        while controller.is_running() && controller.tick_count() < scenario.run.max_ticks {
            controller.tick();
            println!("{}", controller.snapshot().progress_line());
            thread::sleep(schedule.tick_interval());
        }
        controller.summary()
    } else {
        controller.run(scenario.run.max_ticks)
    };

    summary.print_summary();

    if let Some(ref out) = scenario.run.summary_path {
        match summary.to_yaml() {
            Ok(yaml) => match fs::write(out, yaml) {
                Ok(()) => println!("\nSummary written to {}", out),
                Err(e) => eprintln!("Failed to write {}: {}", out, e),
            },
            Err(e) => eprintln!("Failed to encode summary: {}", e),
        }
    }

    println!("\n✓ Scenario complete!\n");
}

fn parse_seed_hex(hex: &str) -> [u8; 32] {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    let mut seed = [0u8; 32];

    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        if i >= 32 {
            break;
        }
        let byte = std::str::from_utf8(chunk)
            .ok()
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or_else(|| {
                eprintln!("Invalid hex seed: {}", hex);
                std::process::exit(1);
            });
        seed[i] = byte;
    }

    seed
}
