// Swarm Controller
//
// Owns the peer population and advances it one tick at a time:
// churn, then chunk propagation, then progress/stall bookkeeping.

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::swarm_config::SwarmConfig;
use crate::swarm_graph::Swarm;
use crate::swarm_interface::{
    Event, EventSink, NoOpSink, PeerId, SimTick, SwarmError, Transfer,
};
use crate::swarm_peer::Peer;
use crate::swarm_role::PeerRole;
use crate::swarm_stats::{
    seed_to_hex, PeerReport, RoleCounts, RunSummary, RunTotals, SwarmSnapshot,
};

// ============================================================================
// Controller State Machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimState {
    /// Constructed, not started
    Idle,
    /// Accepting ticks
    Running,
    /// Download target owns every chunk
    Completed,
    /// Download target made no progress for the stall threshold
    Stalled,
    /// Stopped from outside before reaching an outcome
    Halted,
}

impl SimState {
    pub fn name(&self) -> &'static str {
        match self {
            SimState::Idle => "Idle",
            SimState::Running => "Running",
            SimState::Completed => "Completed",
            SimState::Stalled => "Stalled",
            SimState::Halted => "Halted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SimState::Completed | SimState::Stalled)
    }
}

pub struct SwarmController<R: Rng = StdRng> {
    config: SwarmConfig,
    rng: R,
    seed_used: Option<[u8; 32]>,
    swarm: Swarm,
    download_target: PeerId,
    state: SimState,
    tick_count: SimTick,
    stall_threshold: usize,
    last_chunk_count: usize,
    ticks_since_last_progress: usize,
    totals: RunTotals,
    event_sink: Box<dyn EventSink>,
}

impl SwarmController<StdRng> {
    /// Create a controller seeded from `config.seed`, or from fresh entropy
    pub fn new(config: SwarmConfig) -> Result<Self, SwarmError> {
        let seed = config.seed.unwrap_or_else(|| {
            let mut seed = [0u8; 32];
            rand::thread_rng().fill(&mut seed);
            seed
        });

        let mut controller = Self::with_rng(config, StdRng::from_seed(seed))?;
        controller.seed_used = Some(seed);
        Ok(controller)
    }

    /// Create a controller with a custom event sink for debugging/analysis
    pub fn new_with_sink(
        config: SwarmConfig,
        event_sink: Box<dyn EventSink>,
    ) -> Result<Self, SwarmError> {
        let mut controller = Self::new(config)?;
        controller.event_sink = event_sink;
        Ok(controller)
    }

    /// Build a default-configured swarm and start it right away
    pub fn launch(initial_peers: usize, total_chunks: usize) -> Result<Self, SwarmError> {
        let mut controller = Self::new(SwarmConfig::with_size(initial_peers, total_chunks))?;
        controller.start();
        Ok(controller)
    }
}

impl<R: Rng> SwarmController<R> {
    /// Create the initial population and random connection graph from `rng`
    pub fn with_rng(config: SwarmConfig, mut rng: R) -> Result<Self, SwarmError> {
        config.validate()?;

        let mut swarm = Swarm::new(config.total_chunks);
        for i in 0..config.initial_peers {
            let role = PeerRole::for_initial_index(i, &config.roles, &mut rng);
            let id = swarm.spawn_random(role, &config, &mut rng);
            debug!("Created peer {}: {}", id, role);
        }

        // All ordered pairs; the reverse trial of a connected pair is a no-op
        let ids = swarm.ids();
        for &a in &ids {
            for &b in &ids {
                if a != b && rng.gen_bool(config.topology.connect_probability) {
                    swarm.connect(a, b)?;
                }
            }
        }

        // Peer 0 is always the client
        let target = ids.first().copied().ok_or(SwarmError::EmptySwarm)?;

        info!(
            "swarm created: {} peers, {} chunks, {} edges",
            swarm.len(),
            config.total_chunks,
            swarm.edge_count()
        );

        Self::assemble(config, swarm, target, rng)
    }

    /// Adopt a hand-built swarm. The target must exist and be protected from churn.
    pub fn from_swarm(
        mut config: SwarmConfig,
        swarm: Swarm,
        target: PeerId,
        rng: R,
    ) -> Result<Self, SwarmError> {
        config.initial_peers = swarm.len();
        config.total_chunks = swarm.total_chunks();
        config.validate()?;

        Self::assemble(config, swarm, target, rng)
    }

    fn assemble(config: SwarmConfig, swarm: Swarm, target: PeerId, rng: R) -> Result<Self, SwarmError> {
        let target_peer = swarm.get(target).ok_or(SwarmError::UnknownPeer(target))?;
        if target_peer.can_disconnect() {
            return Err(SwarmError::TargetCanDisconnect(target));
        }
        let last_chunk_count = target_peer.owned_count();

        if let Some(extra) = swarm
            .iter()
            .find(|p| p.role() == PeerRole::Client && p.id() != target)
        {
            return Err(SwarmError::ExtraClient(extra.id()));
        }

        Ok(Self {
            stall_threshold: config.stall_threshold(),
            totals: RunTotals::starting_at(swarm.len()),
            config,
            rng,
            seed_used: None,
            swarm,
            download_target: target,
            state: SimState::Idle,
            tick_count: 0,
            last_chunk_count,
            ticks_since_last_progress: 0,
            event_sink: Box::new(NoOpSink),
        })
    }

    pub fn set_event_sink(&mut self, event_sink: Box<dyn EventSink>) {
        self.event_sink = event_sink;
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// `Idle -> Running`; ignored in any other state
    pub fn start(&mut self) {
        if self.state == SimState::Idle {
            info!("simulation started with {} peers", self.swarm.len());
            self.set_state(SimState::Running);
        }
    }

    /// Halt from outside. Completed/Stalled keep their outcome.
    pub fn stop(&mut self) {
        if matches!(self.state, SimState::Idle | SimState::Running) {
            info!("simulation stopped at tick {}", self.tick_count);
            self.set_state(SimState::Halted);
        }
    }

    fn set_state(&mut self, to: SimState) {
        let from = self.state;
        self.state = to;
        self.event_sink.log(
            self.tick_count,
            Event::StateChange {
                from_state: from.name(),
                to_state: to.name(),
            },
        );
    }

    /// Advance exactly one step. A no-op unless `Running`.
    pub fn tick(&mut self) {
        if self.state != SimState::Running {
            return;
        }

        self.tick_count += 1;

        for peer in self.swarm.iter_mut() {
            peer.clear_transfers();
        }

        if self.config.churn.enabled {
            self.simulate_churn();
        }
        self.totals.observe_population(self.swarm.len());

        let moved = self.simulate_chunk_transfers();
        self.totals.transfers += moved;

        self.update_progress();
        self.check_termination();
    }

    /// Tick until a terminal state, a stop, or `max_ticks` more ticks
    pub fn run(&mut self, max_ticks: SimTick) -> RunSummary {
        self.start();
        for _ in 0..max_ticks {
            if !self.is_running() {
                break;
            }
            self.tick();
        }
        self.summary()
    }

    // ========================================================================
    // Churn
    // ========================================================================

    fn simulate_churn(&mut self) {
        let departure_probability = self.config.churn.departure_probability;
        let arrival_probability = self.config.churn.arrival_probability;

        if self.rng.gen_bool(departure_probability)
            && self.swarm.len() > self.config.churn.min_population
        {
            let index = self.rng.gen_range(0..self.swarm.len());
            if let Some(id) = self.swarm.id_at(index) {
                if self.swarm[id].can_disconnect() {
                    if let Some(peer) = self.swarm.remove(id) {
                        info!("{}: peer {} ({}) disconnected", self.tick_count, id, peer.role());
                        self.totals.departures += 1;
                        self.event_sink.log(
                            self.tick_count,
                            Event::PeerLeft {
                                peer: id,
                                role: peer.role().name(),
                            },
                        );
                    }
                }
            }
        }

        if self.rng.gen_bool(arrival_probability) {
            // Picks are drawn from the population before the newcomer joins
            let mut picks = Vec::with_capacity(self.config.churn.arrival_connections);
            for _ in 0..self.config.churn.arrival_connections {
                let index = self.rng.gen_range(0..self.swarm.len());
                if let Some(id) = self.swarm.id_at(index) {
                    picks.push(id);
                }
            }

            let id = self
                .swarm
                .spawn_random(PeerRole::Leecher, &self.config, &mut self.rng);
            for other in picks {
                // Duplicate picks collapse into one edge
                if let Err(e) = self.swarm.connect(id, other) {
                    debug!("skipping edge {} -> {}: {}", id, other, e);
                }
            }

            let connections = self.swarm[id].connection_count();
            info!(
                "{}: peer {} joined with {} connections",
                self.tick_count, id, connections
            );
            self.totals.joins += 1;
            self.event_sink
                .log(self.tick_count, Event::PeerJoined { peer: id, connections });
        }
    }

    // ========================================================================
    // Chunk Propagation
    // ========================================================================

    /// One pull round in insertion order. Each pulling peer takes at most one
    /// chunk per tick, from the first neighbour that has something it lacks.
    fn simulate_chunk_transfers(&mut self) -> usize {
        let mut moved = 0;

        for id in self.swarm.ids() {
            let pull = {
                let puller = &self.swarm[id];
                if !puller.role().pulls() || puller.is_complete() {
                    continue;
                }
                puller.connections().find_map(|neighbour| {
                    let source = self.swarm.get(*neighbour)?;
                    puller
                        .first_wanted_from(source)
                        .map(|chunk| (*neighbour, chunk))
                })
            };

            let Some((sender, chunk)) = pull else {
                continue;
            };

            let Some(puller) = self.swarm.get_mut(id) else {
                continue;
            };
            if puller.receive_chunk(chunk) != Ok(true) {
                continue;
            }
            let transfer = Transfer {
                sender,
                receiver: id,
                chunk,
            };
            puller.add_transfer(transfer);
            moved += 1;

            debug!(
                "Tick {}: peer {} received chunk {} from peer {}",
                self.tick_count, id, chunk, sender
            );
            self.event_sink.log(
                self.tick_count,
                Event::ChunkTransferred {
                    sender,
                    receiver: id,
                    chunk,
                },
            );
        }

        moved
    }

    // ========================================================================
    // Progress / Stall
    // ========================================================================

    fn update_progress(&mut self) {
        let owned = self.swarm[self.download_target].owned_count();
        if owned > self.last_chunk_count {
            self.last_chunk_count = owned;
            self.ticks_since_last_progress = 0;
        } else {
            self.ticks_since_last_progress += 1;
        }
        trace!(
            "{}: target owns {}/{}, {} ticks without progress",
            self.tick_count,
            owned,
            self.config.total_chunks,
            self.ticks_since_last_progress
        );
    }

    fn check_termination(&mut self) {
        let target = &self.swarm[self.download_target];
        if target.is_complete() {
            info!("File download complete at tick {}", self.tick_count);
            let peer = self.download_target;
            self.event_sink
                .log(self.tick_count, Event::DownloadCompleted { peer });
            self.set_state(SimState::Completed);
        } else if self.ticks_since_last_progress >= self.stall_threshold {
            let owned = target.owned_count();
            info!(
                "Download stalled at tick {} with {}/{} chunks",
                self.tick_count, owned, self.config.total_chunks
            );
            let peer = self.download_target;
            self.event_sink
                .log(self.tick_count, Event::DownloadStalled { peer, owned });
            self.set_state(SimState::Stalled);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SimState::Running
    }

    pub fn tick_count(&self) -> SimTick {
        self.tick_count
    }

    pub fn seed_used(&self) -> Option<[u8; 32]> {
        self.seed_used
    }

    /// Live population in insertion order
    pub fn peers(&self) -> impl Iterator<Item = &Peer> + '_ {
        self.swarm.iter()
    }

    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    pub fn download_target(&self) -> &Peer {
        &self.swarm[self.download_target]
    }

    pub fn download_target_id(&self) -> PeerId {
        self.download_target
    }

    /// Target's owned chunks over total, in `[0, 1]`
    pub fn download_progress(&self) -> f64 {
        self.download_target().owned_count() as f64 / self.config.total_chunks as f64
    }

    pub fn total_chunks(&self) -> usize {
        self.config.total_chunks
    }

    pub fn stall_threshold(&self) -> usize {
        self.stall_threshold
    }

    pub fn ticks_since_last_progress(&self) -> usize {
        self.ticks_since_last_progress
    }

    /// Every transfer made during the last tick
    pub fn transfers(&self) -> Vec<Transfer> {
        self.swarm
            .iter()
            .flat_map(|p| p.active_transfers().iter().copied())
            .collect()
    }

    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    pub fn snapshot(&self) -> SwarmSnapshot {
        let population = self.swarm.len();
        let edges = self.swarm.edge_count();
        let target = self.download_target();
        SwarmSnapshot {
            tick: self.tick_count,
            state: self.state.name(),
            population,
            roles: RoleCounts::from_swarm(&self.swarm),
            edges,
            average_degree: if population > 0 {
                2.0 * edges as f64 / population as f64
            } else {
                0.0
            },
            transfers: self.swarm.iter().map(|p| p.active_transfers().len()).sum(),
            target: self.download_target,
            target_owned: target.owned_count(),
            total_chunks: self.config.total_chunks,
            progress: self.download_progress(),
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed_used.as_ref().map(seed_to_hex),
            ticks: self.tick_count,
            final_state: self.state.name(),
            stall_threshold: self.stall_threshold,
            totals: self.totals,
            final_snapshot: self.snapshot(),
            peers: PeerReport::from_swarm(&self.swarm),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
