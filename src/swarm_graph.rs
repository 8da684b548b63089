// Peer table and connection graph
//
// Peers live in one insertion-ordered table keyed by id. Edges are stored as
// id sets on both endpoints and are only ever changed here, which keeps the
// adjacency symmetric.

use hashbrown::HashSet;
use indexmap::IndexMap;
use rand::Rng;

use crate::swarm_config::SwarmConfig;
use crate::swarm_interface::{PeerId, SwarmError};
use crate::swarm_peer::Peer;
use crate::swarm_role::{Bandwidth, PeerRole};

#[derive(Debug, Clone)]
pub struct Swarm {
    peers: IndexMap<PeerId, Peer>,
    total_chunks: usize,
    next_id: PeerId,
}

impl Swarm {
    pub fn new(total_chunks: usize) -> Self {
        Self {
            peers: IndexMap::new(),
            total_chunks,
            next_id: 0,
        }
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    /// Add a peer with the next sequential id. Ids are never reused.
    pub fn spawn(&mut self, role: PeerRole, position: (f64, f64), bandwidth: Bandwidth) -> PeerId {
        let id = self.next_id;
        self.next_id += 1;
        self.peers
            .insert(id, Peer::new(id, role, position, self.total_chunks, bandwidth));
        id
    }

    /// Add a peer with layout and bandwidth drawn from `config`
    pub fn spawn_random<R: Rng + ?Sized>(
        &mut self,
        role: PeerRole,
        config: &SwarmConfig,
        rng: &mut R,
    ) -> PeerId {
        let x = rng.gen_range(config.layout.x.0..config.layout.x.1);
        let y = rng.gen_range(config.layout.y.0..config.layout.y.1);
        let bandwidth = Bandwidth::draw(role, &config.bandwidth, rng);
        self.spawn(role, (x, y), bandwidth)
    }

    /// Remove a peer and sever every edge it had
    pub fn remove(&mut self, id: PeerId) -> Option<Peer> {
        let peer = self.peers.shift_remove(&id)?;
        for neighbour in peer.connections() {
            if let Some(other) = self.peers.get_mut(neighbour) {
                other.remove_connection(id);
            }
        }
        Some(peer)
    }

    /// Symmetric, idempotent edge insert. Self-loops are ignored.
    ///
    /// Returns `Ok(true)` if a new edge was created.
    pub fn connect(&mut self, a: PeerId, b: PeerId) -> Result<bool, SwarmError> {
        self.check_known(a)?;
        self.check_known(b)?;
        if a == b {
            return Ok(false);
        }
        let mut added = false;
        if let Some(peer) = self.peers.get_mut(&a) {
            added |= peer.add_connection(b);
        }
        if let Some(peer) = self.peers.get_mut(&b) {
            added |= peer.add_connection(a);
        }
        Ok(added)
    }

    /// Symmetric edge removal, a no-op when not connected
    pub fn disconnect(&mut self, a: PeerId, b: PeerId) -> Result<bool, SwarmError> {
        self.check_known(a)?;
        self.check_known(b)?;
        let mut removed = false;
        if let Some(peer) = self.peers.get_mut(&a) {
            removed |= peer.remove_connection(b);
        }
        if let Some(peer) = self.peers.get_mut(&b) {
            removed |= peer.remove_connection(a);
        }
        Ok(removed)
    }

    fn check_known(&self, id: PeerId) -> Result<(), SwarmError> {
        if self.peers.contains_key(&id) {
            Ok(())
        } else {
            Err(SwarmError::UnknownPeer(id))
        }
    }

    pub fn get(&self, id: PeerId) -> Option<&Peer> {
        self.peers.get(&id)
    }

    /// Mutable access for seeding chunk state. Edges stay under swarm control.
    pub fn get_mut(&mut self, id: PeerId) -> Option<&mut Peer> {
        self.peers.get_mut(&id)
    }

    pub fn contains(&self, id: PeerId) -> bool {
        self.peers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Peers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Peer> + '_ {
        self.peers.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Peer> + '_ {
        self.peers.values_mut()
    }

    pub fn ids(&self) -> Vec<PeerId> {
        self.peers.keys().copied().collect()
    }

    /// Id at a position in insertion order
    pub fn id_at(&self, index: usize) -> Option<PeerId> {
        self.peers.get_index(index).map(|(id, _)| *id)
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        let mut edges: HashSet<(PeerId, PeerId)> = HashSet::new();
        for peer in self.peers.values() {
            for &other in peer.connections() {
                edges.insert((peer.id().min(other), peer.id().max(other)));
            }
        }
        edges.len()
    }

    /// Every edge has its mirror and points at a live peer
    pub fn is_symmetric(&self) -> bool {
        self.peers.values().all(|peer| {
            peer.connections().all(|other| {
                self.peers
                    .get(other)
                    .map_or(false, |o| o.is_connected_to(peer.id()))
            })
        })
    }
}

impl std::ops::Index<PeerId> for Swarm {
    type Output = Peer;

    /// Panics if the peer is not in the swarm
    fn index(&self, id: PeerId) -> &Peer {
        &self.peers[&id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bw() -> Bandwidth {
        Bandwidth {
            upload: 75.0,
            download: 150.0,
        }
    }

    #[test]
    fn test_sequential_ids() {
        let mut swarm = Swarm::new(4);
        assert_eq!(swarm.spawn(PeerRole::Client, (0.0, 0.0), bw()), 0);
        assert_eq!(swarm.spawn(PeerRole::Seeder, (0.0, 0.0), bw()), 1);
        assert_eq!(swarm.spawn(PeerRole::Leecher, (0.0, 0.0), bw()), 2);

        swarm.remove(2);
        // Removed ids are not handed out again
        assert_eq!(swarm.spawn(PeerRole::Leecher, (0.0, 0.0), bw()), 3);
        assert_eq!(swarm.ids(), vec![0, 1, 3]);
    }

    #[test]
    fn test_connect_symmetric_and_idempotent() {
        let mut swarm = Swarm::new(1);
        let a = swarm.spawn(PeerRole::Client, (0.0, 0.0), bw());
        let b = swarm.spawn(PeerRole::Seeder, (0.0, 0.0), bw());

        assert_eq!(swarm.connect(a, b), Ok(true));
        assert_eq!(swarm.connect(b, a), Ok(false));
        assert_eq!(swarm.connect(a, b), Ok(false));

        assert!(swarm.get(a).unwrap().is_connected_to(b));
        assert!(swarm.get(b).unwrap().is_connected_to(a));
        assert_eq!(swarm.get(a).unwrap().connection_count(), 1);
        assert_eq!(swarm.edge_count(), 1);
        assert!(swarm.is_symmetric());
    }

    #[test]
    fn test_no_self_loops() {
        let mut swarm = Swarm::new(1);
        let a = swarm.spawn(PeerRole::Leecher, (0.0, 0.0), bw());
        assert_eq!(swarm.connect(a, a), Ok(false));
        assert_eq!(swarm.get(a).unwrap().connection_count(), 0);
    }

    #[test]
    fn test_disconnect() {
        let mut swarm = Swarm::new(1);
        let a = swarm.spawn(PeerRole::Leecher, (0.0, 0.0), bw());
        let b = swarm.spawn(PeerRole::Leecher, (0.0, 0.0), bw());
        let c = swarm.spawn(PeerRole::Leecher, (0.0, 0.0), bw());

        swarm.connect(a, b).unwrap();
        assert_eq!(swarm.disconnect(b, a), Ok(true));
        assert_eq!(swarm.disconnect(a, b), Ok(false));
        assert_eq!(swarm.disconnect(a, c), Ok(false));
        assert_eq!(swarm.edge_count(), 0);
        assert!(swarm.is_symmetric());
    }

    #[test]
    fn test_unknown_peer() {
        let mut swarm = Swarm::new(1);
        let a = swarm.spawn(PeerRole::Leecher, (0.0, 0.0), bw());
        assert_eq!(swarm.connect(a, 99), Err(SwarmError::UnknownPeer(99)));
        assert_eq!(swarm.disconnect(42, a), Err(SwarmError::UnknownPeer(42)));
        assert_eq!(swarm.get(a).unwrap().connection_count(), 0);
    }

    #[test]
    fn test_remove_severs_edges() {
        let mut swarm = Swarm::new(1);
        let hub = swarm.spawn(PeerRole::Supernode, (0.0, 0.0), bw());
        let spokes: Vec<PeerId> = (0..5)
            .map(|_| swarm.spawn(PeerRole::Leecher, (0.0, 0.0), bw()))
            .collect();
        for &s in &spokes {
            swarm.connect(hub, s).unwrap();
        }
        swarm.connect(spokes[0], spokes[1]).unwrap();
        assert_eq!(swarm.edge_count(), 6);

        let removed = swarm.remove(hub).unwrap();
        assert_eq!(removed.id(), hub);
        assert!(!swarm.contains(hub));
        assert_eq!(swarm.edge_count(), 1);
        for &s in &spokes {
            assert!(!swarm.get(s).unwrap().is_connected_to(hub));
        }
        assert!(swarm.is_symmetric());
        assert!(swarm.remove(hub).is_none());
    }

    #[test]
    fn test_spawn_random_within_layout() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = SwarmConfig::default();
        let mut swarm = Swarm::new(config.total_chunks);
        for _ in 0..200 {
            let id = swarm.spawn_random(PeerRole::Leecher, &config, &mut rng);
            let (x, y) = swarm.get(id).unwrap().position();
            assert!((100.0..700.0).contains(&x));
            assert!((100.0..500.0).contains(&y));
        }
        // Insertion order is kept
        assert_eq!(swarm.id_at(0), Some(0));
        assert_eq!(swarm.id_at(199), Some(199));
    }
}
