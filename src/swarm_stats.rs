// Swarm Statistics

use serde::Serialize;

use crate::swarm_graph::Swarm;
use crate::swarm_interface::{PeerId, SimTick};
use crate::swarm_role::PeerRole;

// ============================================================================
// Per-tick Snapshot
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub seeders: usize,
    pub leechers: usize,
    pub supernodes: usize,
    pub clients: usize,
}

impl RoleCounts {
    pub fn from_swarm(swarm: &Swarm) -> Self {
        let mut counts = Self::default();
        for peer in swarm.iter() {
            match peer.role() {
                PeerRole::Seeder => counts.seeders += 1,
                PeerRole::Leecher => counts.leechers += 1,
                PeerRole::Supernode => counts.supernodes += 1,
                PeerRole::Client => counts.clients += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.seeders + self.leechers + self.supernodes + self.clients
    }
}

/// Observable swarm state between two ticks
#[derive(Debug, Clone, Serialize)]
pub struct SwarmSnapshot {
    pub tick: SimTick,
    pub state: &'static str,
    pub population: usize,
    pub roles: RoleCounts,
    pub edges: usize,
    pub average_degree: f64,
    /// Chunk hand-offs in the last tick
    pub transfers: usize,
    pub target: PeerId,
    pub target_owned: usize,
    pub total_chunks: usize,
    pub progress: f64,
}

impl SwarmSnapshot {
    pub fn progress_line(&self) -> String {
        format!(
            "Tick {}: Download progress: {}/{} chunks ({:.0}%), {} peers, {} transfers",
            self.tick,
            self.target_owned,
            self.total_chunks,
            self.progress * 100.0,
            self.population,
            self.transfers
        )
    }
}

// ============================================================================
// Run Summary
// ============================================================================

/// Final state of one peer for reports
#[derive(Debug, Clone, Serialize)]
pub struct PeerReport {
    pub id: PeerId,
    pub role: PeerRole,
    pub owned_chunks: usize,
    pub connections: usize,
    pub upload_speed: f64,
    pub download_speed: f64,
}

impl PeerReport {
    pub fn from_swarm(swarm: &Swarm) -> Vec<Self> {
        swarm
            .iter()
            .map(|p| PeerReport {
                id: p.id(),
                role: p.role(),
                owned_chunks: p.owned_count(),
                connections: p.connection_count(),
                upload_speed: p.upload_speed(),
                download_speed: p.download_speed(),
            })
            .collect()
    }
}

/// Counters accumulated over a whole run
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunTotals {
    pub transfers: usize,
    pub joins: usize,
    pub departures: usize,
    pub peak_population: usize,
    pub min_population: usize,
}

impl RunTotals {
    pub fn starting_at(population: usize) -> Self {
        Self {
            peak_population: population,
            min_population: population,
            ..Self::default()
        }
    }

    pub fn observe_population(&mut self, population: usize) {
        self.peak_population = self.peak_population.max(population);
        self.min_population = self.min_population.min(population);
    }
}

/// Complete simulation result
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Random seed used, hex encoded, when the controller drew it
    pub seed: Option<String>,
    pub ticks: SimTick,
    pub final_state: &'static str,
    pub stall_threshold: usize,
    pub totals: RunTotals,
    pub final_snapshot: SwarmSnapshot,
    pub peers: Vec<PeerReport>,
}

pub fn seed_to_hex(seed: &[u8; 32]) -> String {
    let mut out = String::with_capacity(66);
    out.push_str("0x");
    for b in seed {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

impl RunSummary {
    pub fn target_complete(&self) -> bool {
        self.final_snapshot.target_owned == self.final_snapshot.total_chunks
    }

    /// The whole summary as a YAML document, for saving alongside a scenario
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║    SWARM SIMULATION RESULTS                            ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        if let Some(ref seed) = self.seed {
            println!("Seed: {}", seed);
        }
        println!("Ticks: {}", self.ticks);
        println!("Outcome: {}", self.final_state);
        println!("Stall threshold: {} ticks", self.stall_threshold);
        println!();

        let snap = &self.final_snapshot;
        println!("═══ Final Swarm ═══");
        println!("  Peers: {}", snap.population);
        println!(
            "  Roles: {} Seeder, {} Leecher, {} Supernode, {} Client",
            snap.roles.seeders, snap.roles.leechers, snap.roles.supernodes, snap.roles.clients
        );
        println!("  Edges: {} (avg degree {:.1})", snap.edges, snap.average_degree);
        println!(
            "  Population: min={}, max={}",
            self.totals.min_population, self.totals.peak_population
        );
        println!();

        println!("═══ Churn & Transfers ═══");
        println!("  Joins: {}", self.totals.joins);
        println!("  Departures: {}", self.totals.departures);
        println!("  Chunk transfers: {}", self.totals.transfers);
        println!();

        println!("═══ Final Network Snapshot ═══");
        for peer in &self.peers {
            println!(
                "  Peer {} [{}]: {} chunks, {} connections",
                peer.id, peer.role, peer.owned_chunks, peer.connections
            );
        }
        println!(
            "  Download target: Peer {} - COMPLETE? {}",
            snap.target,
            if self.target_complete() { "YES" } else { "NO" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swarm_role::Bandwidth;

    #[test]
    fn test_role_counts() {
        let bw = Bandwidth {
            upload: 60.0,
            download: 120.0,
        };
        let mut swarm = Swarm::new(2);
        swarm.spawn(PeerRole::Client, (0.0, 0.0), bw);
        swarm.spawn(PeerRole::Seeder, (0.0, 0.0), bw);
        swarm.spawn(PeerRole::Seeder, (0.0, 0.0), bw);
        swarm.spawn(PeerRole::Supernode, (0.0, 0.0), bw);

        let counts = RoleCounts::from_swarm(&swarm);
        assert_eq!(counts.clients, 1);
        assert_eq!(counts.seeders, 2);
        assert_eq!(counts.supernodes, 1);
        assert_eq!(counts.leechers, 0);
        assert_eq!(counts.total(), swarm.len());

        let reports = PeerReport::from_swarm(&swarm);
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[1].owned_chunks, 2);
        assert_eq!(reports[0].owned_chunks, 0);
    }

    #[test]
    fn test_run_totals_population_bounds() {
        let mut totals = RunTotals::starting_at(10);
        totals.observe_population(12);
        totals.observe_population(7);
        totals.observe_population(9);
        assert_eq!(totals.peak_population, 12);
        assert_eq!(totals.min_population, 7);
    }

    #[test]
    fn test_summary_to_yaml() {
        use crate::swarm_config::{ChurnConfig, SwarmConfig};
        use crate::swarm_controller::SwarmController;
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let bw = Bandwidth {
            upload: 60.0,
            download: 120.0,
        };
        let mut swarm = Swarm::new(1);
        let target = swarm.spawn(PeerRole::Client, (0.0, 0.0), bw);
        let seeder = swarm.spawn(PeerRole::Seeder, (0.0, 0.0), bw);
        swarm.connect(target, seeder).unwrap();

        let config = SwarmConfig {
            churn: ChurnConfig::disabled(),
            ..SwarmConfig::default()
        };
        let mut c =
            SwarmController::from_swarm(config, swarm, target, StdRng::seed_from_u64(0)).unwrap();
        let yaml = c.run(10).to_yaml().unwrap();

        let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(doc["final_state"].as_str(), Some("Completed"));
        assert_eq!(doc["ticks"].as_u64(), Some(1));
        assert_eq!(doc["totals"]["transfers"].as_u64(), Some(1));
        assert_eq!(doc["final_snapshot"]["target_owned"].as_u64(), Some(1));
        assert_eq!(doc["peers"].as_sequence().map(|p| p.len()), Some(2));
        assert_eq!(doc["peers"][1]["role"].as_str(), Some("Seeder"));
        assert!(doc["seed"].is_null());
    }

    #[test]
    fn test_seed_to_hex() {
        let mut seed = [0u8; 32];
        seed[0] = 0xab;
        seed[31] = 0x01;
        let hex = seed_to_hex(&seed);
        assert_eq!(hex.len(), 66);
        assert!(hex.starts_with("0xab00"));
        assert!(hex.ends_with("01"));
    }
}
