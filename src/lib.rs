//! # swarm-sim - BitTorrent-style swarm simulation
//!
//! A logical model of a peer-to-peer file-sharing swarm. Peers with different
//! roles exchange fixed-size chunks over a random connection graph while peers
//! join and leave. One distinguished peer, the download target, is tracked
//! until it owns the whole file (completed) or stops making progress (stalled).
//!
//! ## Core Components
//!
//! - **Peer**: layout position, adjacency (peer ids), owned chunks, bandwidth, per-tick transfer log
//! - **PeerRole**: Seeder, Leecher, Supernode or Client, as plain data on the peer
//! - **Swarm**: the insertion-ordered peer table that owns all edges
//! - **SwarmController**: churn, chunk propagation, progress and stall tracking
//!
//! There is no network I/O. A driver (timer, test loop, console harness) calls
//! `tick()` and reads state back through the query methods.
//!
//! ```no_run
//! use swarm_sim::{SwarmConfig, SwarmController};
//!
//! let mut controller = SwarmController::new(SwarmConfig::with_size(20, 50)).unwrap();
//! controller.start();
//! while controller.is_running() && controller.tick_count() < 1000 {
//!     controller.tick();
//!     println!("{:.0}%", controller.download_progress() * 100.0);
//! }
//! ```

pub mod swarm_config;
pub mod swarm_controller;
pub mod swarm_graph;
pub mod swarm_interface;
pub mod swarm_peer;
pub mod swarm_role;
pub mod swarm_stats;

// Re-export commonly used types
pub use swarm_config::{
    parse_byte_size, BandwidthConfig, ChurnConfig, FileSpec, LayoutConfig, RoleMix, SwarmConfig,
    TickSchedule, TopologyConfig, MAX_TOTAL_CHUNKS,
};
pub use swarm_controller::{SimState, SwarmController};
pub use swarm_graph::Swarm;
pub use swarm_interface::{
    ChunkIndex, Event, EventSink, NoOpSink, PeerId, SimTick, SwarmError, Transfer,
};
pub use swarm_peer::Peer;
pub use swarm_role::{Bandwidth, PeerRole};
pub use swarm_stats::{PeerReport, RoleCounts, RunSummary, RunTotals, SwarmSnapshot};
