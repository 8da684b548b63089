// Peer roles
//
// Roles are plain data: each variant only changes how a peer is initialised
// (chunks, bandwidth) and a few flags read by the controller. There is no
// per-role behaviour beyond these lookups.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::swarm_config::{BandwidthConfig, RoleMix};
use crate::swarm_interface::SUPERNODE_CONNECTION_CAP;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeerRole {
    /// Starts with every chunk, only serves
    Seeder,
    /// Starts empty and pulls from neighbours
    Leecher,
    /// High-capacity hub: boosted bandwidth, advisory connection cap
    Supernode,
    /// Pulls like a leecher but never leaves; the download target
    Client,
}

impl PeerRole {
    pub const ALL: [PeerRole; 4] = [
        PeerRole::Seeder,
        PeerRole::Leecher,
        PeerRole::Supernode,
        PeerRole::Client,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PeerRole::Seeder => "Seeder",
            PeerRole::Leecher => "Leecher",
            PeerRole::Supernode => "Supernode",
            PeerRole::Client => "Client",
        }
    }

    pub fn starts_complete(&self) -> bool {
        matches!(self, PeerRole::Seeder)
    }

    /// Whether peers of this role initiate chunk pulls
    pub fn pulls(&self) -> bool {
        matches!(self, PeerRole::Leecher | PeerRole::Client)
    }

    pub fn can_disconnect(&self) -> bool {
        !matches!(self, PeerRole::Client)
    }

    /// `(upload, download)` multipliers applied on top of the default draw
    pub fn bandwidth_multipliers(&self) -> (f64, f64) {
        match self {
            PeerRole::Supernode => (2.0, 1.5),
            _ => (1.0, 1.0),
        }
    }

    pub fn connection_cap(&self) -> Option<usize> {
        match self {
            PeerRole::Supernode => Some(SUPERNODE_CONNECTION_CAP),
            _ => None,
        }
    }

    /// Role for the `index`-th peer of the initial population.
    ///
    /// Peer 0 is always the client and peer 1 always a seeder, so every run
    /// starts with a download target and at least one full source.
    pub fn for_initial_index<R: Rng + ?Sized>(index: usize, mix: &RoleMix, rng: &mut R) -> Self {
        match index {
            0 => PeerRole::Client,
            1 => PeerRole::Seeder,
            _ => {
                let r: f64 = rng.gen();
                if r < mix.supernode_fraction {
                    PeerRole::Supernode
                } else if r < mix.supernode_fraction + mix.seeder_fraction {
                    PeerRole::Seeder
                } else {
                    PeerRole::Leecher
                }
            }
        }
    }
}

impl std::fmt::Display for PeerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Descriptive upload/download rates (KB/s). Not consumed by propagation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bandwidth {
    pub upload: f64,
    pub download: f64,
}

impl Bandwidth {
    /// Draw independently from the configured ranges, then apply role multipliers
    pub fn draw<R: Rng + ?Sized>(role: PeerRole, config: &BandwidthConfig, rng: &mut R) -> Self {
        let (up_mul, down_mul) = role.bandwidth_multipliers();
        let upload = rng.gen_range(config.upload.0..config.upload.1);
        let download = rng.gen_range(config.download.0..config.download.1);
        Self {
            upload: upload * up_mul,
            download: download * down_mul,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_role_flags() {
        assert!(PeerRole::Seeder.starts_complete());
        assert!(!PeerRole::Leecher.starts_complete());
        assert!(!PeerRole::Supernode.starts_complete());
        assert!(!PeerRole::Client.starts_complete());

        assert!(PeerRole::Leecher.pulls());
        assert!(PeerRole::Client.pulls());
        assert!(!PeerRole::Seeder.pulls());
        assert!(!PeerRole::Supernode.pulls());

        // Only the client is pinned to the swarm
        for role in PeerRole::ALL {
            assert_eq!(role.can_disconnect(), role != PeerRole::Client);
        }

        assert_eq!(PeerRole::Supernode.connection_cap(), Some(12));
        assert_eq!(PeerRole::Leecher.connection_cap(), None);
    }

    #[test]
    fn test_initial_roles_fixed_slots() {
        let mut rng = StdRng::seed_from_u64(7);
        let mix = RoleMix::default();
        assert_eq!(PeerRole::for_initial_index(0, &mix, &mut rng), PeerRole::Client);
        assert_eq!(PeerRole::for_initial_index(1, &mix, &mut rng), PeerRole::Seeder);

        // Later slots never produce another client
        for i in 2..500 {
            assert_ne!(PeerRole::for_initial_index(i, &mix, &mut rng), PeerRole::Client);
        }
    }

    #[test]
    fn test_role_mix_proportions() {
        let mut rng = StdRng::seed_from_u64(42);
        let mix = RoleMix::default();
        let n = 10_000;
        let supernodes = (0..n)
            .filter(|_| PeerRole::for_initial_index(5, &mix, &mut rng) == PeerRole::Supernode)
            .count();
        let fraction = supernodes as f64 / n as f64;
        assert!(fraction > 0.17 && fraction < 0.23, "supernode fraction {}", fraction);
    }

    #[test]
    fn test_bandwidth_ranges() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = BandwidthConfig::default();

        for _ in 0..1000 {
            let b = Bandwidth::draw(PeerRole::Leecher, &config, &mut rng);
            assert!(b.upload >= 50.0 && b.upload < 150.0);
            assert!(b.download >= 100.0 && b.download < 300.0);

            let s = Bandwidth::draw(PeerRole::Supernode, &config, &mut rng);
            assert!(s.upload >= 100.0 && s.upload < 300.0);
            assert!(s.download >= 150.0 && s.download < 450.0);
        }
    }
}
