// Swarm Sweep
//
// Runs one configuration over many seeds and reports how often the download
// target completes, stalls, or is still running at the tick cap.
//
// Run with: cargo run --example swarm_sweep [runs] [peers] [chunks]

use std::env;

use log::info;
use simple_logger::SimpleLogger;

use swarm_sim::{SimState, SwarmConfig, SwarmController};

const MAX_TICKS: u64 = 1000;

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    let args: Vec<usize> = env::args()
        .skip(1)
        .map(|a| a.parse().expect("numeric argument"))
        .collect();
    let runs = args.first().copied().unwrap_or(200);
    let peers = args.get(1).copied().unwrap_or(20);
    let chunks = args.get(2).copied().unwrap_or(50);

    println!("╔════════════════════════════════════════════════════════╗");
    println!("║  SWARM SWEEP                                           ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    println!("  Runs: {}  Peers: {}  Chunks: {}\n", runs, peers, chunks);

    let mut completed = 0;
    let mut stalled = 0;
    let mut capped = 0;
    let mut completion_ticks = Vec::new();
    let mut transfers = 0;

    for run in 0..runs {
        let mut seed = [0u8; 32];
        seed[..8].copy_from_slice(&(run as u64).to_le_bytes());

        let config = SwarmConfig {
            seed: Some(seed),
            ..SwarmConfig::with_size(peers, chunks)
        };
        let mut controller = SwarmController::new(config).unwrap();
        let summary = controller.run(MAX_TICKS);
        transfers += summary.totals.transfers;

        match controller.state() {
            SimState::Completed => {
                completed += 1;
                completion_ticks.push(summary.ticks);
            }
            SimState::Stalled => stalled += 1,
            _ => capped += 1,
        }
    }

    let pct = |n: usize| n as f64 * 100.0 / runs.max(1) as f64;
    println!("═══ Outcomes ═══");
    println!("  Completed: {} ({:.1}%)", completed, pct(completed));
    println!("  Stalled:   {} ({:.1}%)", stalled, pct(stalled));
    println!("  Cap hit:   {} ({:.1}%)", capped, pct(capped));

    if !completion_ticks.is_empty() {
        completion_ticks.sort_unstable();
        let avg = completion_ticks.iter().sum::<u64>() as f64 / completion_ticks.len() as f64;
        println!("\n═══ Completion Time ═══");
        println!(
            "  min={} median={} max={} avg={:.1} ticks",
            completion_ticks[0],
            completion_ticks[completion_ticks.len() / 2],
            completion_ticks[completion_ticks.len() - 1],
            avg
        );
    }

    info!("avg transfers per run: {:.1}", transfers as f64 / runs.max(1) as f64);
}
