// Console harness
//
// Usage: swarm-sim [peers] [chunks] [max_ticks]

use std::env;
use std::process;
use std::thread;
use std::time::Duration;

use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use swarm_sim::{SwarmConfig, SwarmController};

fn parse_arg(args: &[String], index: usize, default: usize) -> usize {
    match args.get(index) {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            eprintln!("Invalid argument {:?}: {}", raw, e);
            process::exit(1);
        }),
        None => default,
    }
}

fn main() {
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Info).env().init() {
        eprintln!("logger init failed: {}", e);
    }

    let args: Vec<String> = env::args().collect();
    let initial_peers = parse_arg(&args, 1, 6);
    let total_chunks = parse_arg(&args, 2, 10);
    let max_ticks = parse_arg(&args, 3, 100);

    let mut controller = SwarmController::new(SwarmConfig::with_size(initial_peers, total_chunks))
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        });

    info!("Starting P2P simulation with {} peers.", initial_peers);
    controller.start();

    while controller.is_running() && (controller.tick_count() as usize) < max_ticks {
        controller.tick();
        println!("{}", controller.snapshot().progress_line());
        thread::sleep(Duration::from_millis(20));
    }

    info!("Simulation ended.");
    controller.summary().print_summary();
}
