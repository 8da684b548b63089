use std::collections::BTreeSet;

use indexmap::IndexSet;

use crate::swarm_interface::{ChunkIndex, PeerId, SwarmError, Transfer};
use crate::swarm_role::{Bandwidth, PeerRole};

/// A peer in the swarm: a layout point, its adjacency, and its chunk state.
///
/// Adjacency holds peer ids only and is resolved through [`crate::Swarm`].
/// It is symmetric as long as edges are only changed through the swarm's
/// `connect`/`disconnect`, which is why the setters here are crate-private.
#[derive(Debug, Clone)]
pub struct Peer {
    id: PeerId,
    x: f64,
    y: f64,
    role: PeerRole,
    connections: IndexSet<PeerId>,
    owned_chunks: BTreeSet<ChunkIndex>,
    total_chunks: usize,
    bandwidth: Bandwidth,
    active_transfers: Vec<Transfer>,
}

impl Peer {
    pub fn new(
        id: PeerId,
        role: PeerRole,
        position: (f64, f64),
        total_chunks: usize,
        bandwidth: Bandwidth,
    ) -> Self {
        let owned_chunks = if role.starts_complete() {
            (0..total_chunks).collect()
        } else {
            BTreeSet::new()
        };

        Self {
            id,
            x: position.0,
            y: position.1,
            role,
            connections: IndexSet::new(),
            owned_chunks,
            total_chunks,
            bandwidth,
            active_transfers: Vec::new(),
        }
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn role(&self) -> PeerRole {
        self.role
    }

    pub fn can_disconnect(&self) -> bool {
        self.role.can_disconnect()
    }

    pub fn upload_speed(&self) -> f64 {
        self.bandwidth.upload
    }

    pub fn download_speed(&self) -> f64 {
        self.bandwidth.download
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.bandwidth
    }

    // ========================================================================
    // Connectivity
    // ========================================================================

    /// Neighbour ids in the order the edges were made
    pub fn connections(&self) -> impl Iterator<Item = &PeerId> + '_ {
        self.connections.iter()
    }

    pub fn is_connected_to(&self, other: PeerId) -> bool {
        self.connections.contains(&other)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Advisory only: `connect` never consults it
    pub fn can_accept_more_connections(&self) -> bool {
        match self.role.connection_cap() {
            Some(cap) => self.connections.len() < cap,
            None => true,
        }
    }

    pub(crate) fn add_connection(&mut self, other: PeerId) -> bool {
        self.connections.insert(other)
    }

    pub(crate) fn remove_connection(&mut self, other: PeerId) -> bool {
        self.connections.shift_remove(&other)
    }

    // ========================================================================
    // Chunks
    // ========================================================================

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    pub fn owned_chunks(&self) -> &BTreeSet<ChunkIndex> {
        &self.owned_chunks
    }

    pub fn has_chunk(&self, chunk: ChunkIndex) -> bool {
        self.owned_chunks.contains(&chunk)
    }

    /// Record a chunk as owned. Returns `Ok(false)` if it was already owned.
    pub fn receive_chunk(&mut self, chunk: ChunkIndex) -> Result<bool, SwarmError> {
        if chunk >= self.total_chunks {
            return Err(SwarmError::ChunkOutOfRange {
                chunk,
                total: self.total_chunks,
            });
        }
        Ok(self.owned_chunks.insert(chunk))
    }

    pub fn owned_count(&self) -> usize {
        self.owned_chunks.len()
    }

    pub fn missing_chunks(&self) -> Vec<ChunkIndex> {
        (0..self.total_chunks)
            .filter(|c| !self.owned_chunks.contains(c))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.owned_chunks.len() == self.total_chunks
    }

    /// Lowest chunk `source` owns that this peer lacks
    pub fn first_wanted_from(&self, source: &Peer) -> Option<ChunkIndex> {
        source
            .owned_chunks
            .iter()
            .copied()
            .find(|c| !self.owned_chunks.contains(c))
    }

    // ========================================================================
    // Transfer log
    // ========================================================================

    pub fn active_transfers(&self) -> &[Transfer] {
        &self.active_transfers
    }

    pub(crate) fn add_transfer(&mut self, transfer: Transfer) {
        self.active_transfers.push(transfer);
    }

    pub(crate) fn clear_transfers(&mut self) {
        self.active_transfers.clear();
    }
}
