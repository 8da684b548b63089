// all the same numeric type of some size to allow casting/interop
pub type PeerId = u64;
pub type SimTick = u64;

/// Index of one fixed-size chunk of the shared file, in `[0, total_chunks)`
pub type ChunkIndex = usize;

pub const KB: u64 = 1_024;
pub const MB: u64 = 1_048_576;
pub const GB: u64 = 1_073_741_824;

/// Wall-clock duration of one tick at speed multiplier 1.0 (driver layer only)
pub const DEFAULT_TICK_DURATION_MS: u64 = 500;

/// Connection ceiling reported by supernodes (advisory, never enforced by connect)
pub const SUPERNODE_CONNECTION_CAP: usize = 12;

/// One chunk hand-off that happened during the current tick.
///
/// Only valid for the tick that produced it: every peer's transfer log is cleared
/// when the next tick starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub sender: PeerId,
    pub receiver: PeerId,
    pub chunk: ChunkIndex,
}

// ============================================================================
// Errors
// ============================================================================

/// Errors reported while building or configuring a swarm
#[derive(Debug, Clone, PartialEq)]
pub enum SwarmError {
    /// A swarm needs at least the download target
    EmptySwarm,

    /// The shared file must have at least one chunk
    NoChunks,

    /// Chunk index outside `[0, total)`
    ChunkOutOfRange { chunk: ChunkIndex, total: usize },

    /// Peer id not present in the swarm
    UnknownPeer(PeerId),

    /// The download target must be protected from churn
    TargetCanDisconnect(PeerId),

    /// A probability outside `[0.0, 1.0]`
    InvalidProbability { name: &'static str, value: f64 },

    /// An empty or inverted `[low, high)` range
    InvalidRange { name: &'static str, low: f64, high: f64 },

    /// A byte size that could not be parsed or is zero
    InvalidSize(String),

    /// Speed multiplier outside the supported band
    InvalidSpeed(f64),

    /// More chunks than a peer's ownership set is allowed to track
    TooManyChunks { total: usize, max: usize },

    /// A second Client besides the download target
    ExtraClient(PeerId),
}

impl std::fmt::Display for SwarmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwarmError::EmptySwarm => write!(f, "swarm must contain at least one peer"),
            SwarmError::NoChunks => write!(f, "file must contain at least one chunk"),
            SwarmError::ChunkOutOfRange { chunk, total } => {
                write!(f, "chunk {} out of range (total {})", chunk, total)
            }
            SwarmError::UnknownPeer(id) => write!(f, "unknown peer {}", id),
            SwarmError::TargetCanDisconnect(id) => {
                write!(f, "download target {} is not protected from churn", id)
            }
            SwarmError::InvalidProbability { name, value } => {
                write!(f, "{} must be within [0, 1], got {}", name, value)
            }
            SwarmError::InvalidRange { name, low, high } => {
                write!(f, "{} range [{}, {}) is empty", name, low, high)
            }
            SwarmError::InvalidSize(s) => write!(f, "invalid size: {}", s),
            SwarmError::InvalidSpeed(v) => write!(f, "speed multiplier {} out of range", v),
            SwarmError::TooManyChunks { total, max } => {
                write!(f, "{} chunks exceeds the limit of {}", total, max)
            }
            SwarmError::ExtraClient(id) => {
                write!(f, "peer {} is a second client, only the download target may be one", id)
            }
        }
    }
}

impl std::error::Error for SwarmError {}

// ============================================================================
// Event Logging System
// ============================================================================

/// Events emitted by the swarm controller for debugging and analysis
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A new peer joined through churn
    PeerJoined { peer: PeerId, connections: usize },
    /// A peer left through churn
    PeerLeft { peer: PeerId, role: &'static str },
    /// A chunk moved between neighbours
    ChunkTransferred {
        sender: PeerId,
        receiver: PeerId,
        chunk: ChunkIndex,
    },
    /// The download target owns every chunk
    DownloadCompleted { peer: PeerId },
    /// The download target made no progress for the stall threshold
    DownloadStalled { peer: PeerId, owned: usize },
    /// Controller lifecycle change
    StateChange {
        from_state: &'static str,
        to_state: &'static str,
    },
}

/// Trait for consuming events from the swarm controller
pub trait EventSink {
    fn log(&mut self, tick: SimTick, event: Event);
}

/// No-op event sink for production use (zero overhead)
pub struct NoOpSink;

impl EventSink for NoOpSink {
    #[inline(always)]
    fn log(&mut self, _tick: SimTick, _event: Event) {}
}
