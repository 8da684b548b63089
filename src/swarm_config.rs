// Swarm Simulation Configuration

use std::time::Duration;

use serde::Deserialize;

use crate::swarm_interface::{SwarmError, DEFAULT_TICK_DURATION_MS, GB, KB, MB};

/// Upper bound on `total_chunks`; every seeder holds a full chunk set in memory
pub const MAX_TOTAL_CHUNKS: usize = 1_000_000;

/// Main simulation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Peers created at construction (peer 0 is the download target)
    pub initial_peers: usize,

    /// Number of chunks in the shared file
    pub total_chunks: usize,

    /// Random seed for reproducibility
    pub seed: Option<[u8; 32]>,

    pub churn: ChurnConfig,
    pub topology: TopologyConfig,
    pub roles: RoleMix,
    pub bandwidth: BandwidthConfig,
    pub layout: LayoutConfig,
}

/// Peer arrival/departure applied once per tick
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChurnConfig {
    pub enabled: bool,
    /// Chance per tick that one random peer is picked for removal
    pub departure_probability: f64,
    /// Chance per tick that one new leecher joins
    pub arrival_probability: f64,
    /// Departures only happen while the population exceeds this
    pub min_population: usize,
    /// Random picks (with replacement) a newcomer connects to
    pub arrival_connections: usize,
}

/// Initial connection graph
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Connect probability for each ordered pair of distinct peers
    pub connect_probability: f64,
}

/// Role distribution for initial peers past the fixed client/seeder slots
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoleMix {
    pub supernode_fraction: f64,
    pub seeder_fraction: f64,
}

/// Default bandwidth draw ranges `[low, high)` in KB/s
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BandwidthConfig {
    pub upload: (f64, f64),
    pub download: (f64, f64),
}

/// Layout box for peer coordinates (cosmetic)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

// ============================================================================
// Default Configurations
// ============================================================================

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            initial_peers: 10,
            total_chunks: 10,
            seed: None,
            churn: ChurnConfig::default(),
            topology: TopologyConfig::default(),
            roles: RoleMix::default(),
            bandwidth: BandwidthConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            departure_probability: 0.05,
            arrival_probability: 0.1,
            min_population: 3,
            arrival_connections: 3,
        }
    }
}

impl ChurnConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            connect_probability: 0.2,
        }
    }
}

impl Default for RoleMix {
    fn default() -> Self {
        Self {
            supernode_fraction: 0.2,
            seeder_fraction: 0.3,
        }
    }
}

impl Default for BandwidthConfig {
    fn default() -> Self {
        Self {
            upload: (50.0, 150.0),
            download: (100.0, 300.0),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            x: (100.0, 700.0),
            y: (100.0, 500.0),
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

fn check_probability(name: &'static str, value: f64) -> Result<(), SwarmError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SwarmError::InvalidProbability { name, value })
    }
}

fn check_range(name: &'static str, (low, high): (f64, f64)) -> Result<(), SwarmError> {
    if low.is_finite() && high.is_finite() && low < high {
        Ok(())
    } else {
        Err(SwarmError::InvalidRange { name, low, high })
    }
}

impl SwarmConfig {
    /// Shorthand for the common `(peers, chunks)` form with default everything else
    pub fn with_size(initial_peers: usize, total_chunks: usize) -> Self {
        Self {
            initial_peers,
            total_chunks,
            ..Self::default()
        }
    }

    /// Ticks without target progress before the run counts as stalled
    pub fn stall_threshold(&self) -> usize {
        stall_threshold(self.total_chunks)
    }

    pub fn validate(&self) -> Result<(), SwarmError> {
        if self.initial_peers == 0 {
            return Err(SwarmError::EmptySwarm);
        }
        if self.total_chunks == 0 {
            return Err(SwarmError::NoChunks);
        }
        if self.total_chunks > MAX_TOTAL_CHUNKS {
            return Err(SwarmError::TooManyChunks {
                total: self.total_chunks,
                max: MAX_TOTAL_CHUNKS,
            });
        }
        check_probability("departure_probability", self.churn.departure_probability)?;
        check_probability("arrival_probability", self.churn.arrival_probability)?;
        check_probability("connect_probability", self.topology.connect_probability)?;
        check_probability("supernode_fraction", self.roles.supernode_fraction)?;
        check_probability("seeder_fraction", self.roles.seeder_fraction)?;
        check_probability(
            "supernode_fraction + seeder_fraction",
            self.roles.supernode_fraction + self.roles.seeder_fraction,
        )?;
        check_range("upload", self.bandwidth.upload)?;
        check_range("download", self.bandwidth.download)?;
        check_range("layout.x", self.layout.x)?;
        check_range("layout.y", self.layout.y)?;
        Ok(())
    }
}

pub fn stall_threshold(total_chunks: usize) -> usize {
    (total_chunks / 4).max(10)
}

// ============================================================================
// File Size Derivation
// ============================================================================

/// File and chunk sizes in bytes, used only to derive the chunk count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSpec {
    pub file_size: u64,
    pub chunk_size: u64,
}

impl FileSpec {
    pub fn new(file_size: u64, chunk_size: u64) -> Result<Self, SwarmError> {
        if chunk_size == 0 {
            return Err(SwarmError::InvalidSize("chunk size is zero".to_string()));
        }
        if file_size == 0 {
            return Err(SwarmError::InvalidSize("file size is zero".to_string()));
        }
        Ok(Self {
            file_size,
            chunk_size,
        })
    }

    pub fn parse(file_size: &str, chunk_size: &str) -> Result<Self, SwarmError> {
        Self::new(parse_byte_size(file_size)?, parse_byte_size(chunk_size)?)
    }

    /// `ceil(file_size / chunk_size)`
    pub fn total_chunks(&self) -> usize {
        self.file_size.div_ceil(self.chunk_size) as usize
    }
}

/// Parse sizes like `"512"`, `"64 KB"`, `"1.5MB"` or `"2 GB"` (binary multiples)
pub fn parse_byte_size(input: &str) -> Result<u64, SwarmError> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| SwarmError::InvalidSize(input.to_string()))?;

    let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "KB" | "K" => KB,
        "MB" | "M" => MB,
        "GB" | "G" => GB,
        _ => return Err(SwarmError::InvalidSize(input.to_string())),
    };

    let bytes = value * multiplier as f64;
    // u64::MAX rounds up to 2^64 as f64, so that value is already out of range
    if !bytes.is_finite() || bytes < 0.0 || bytes.fract() != 0.0 || bytes >= u64::MAX as f64 {
        return Err(SwarmError::InvalidSize(input.to_string()));
    }

    Ok(bytes as u64)
}

// ============================================================================
// Driver Cadence
// ============================================================================

/// Wall-clock pacing for drivers. One `tick()` is always one simulation step;
/// the multiplier only changes how often a driver calls it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSchedule {
    speed_multiplier: f64,
}

impl TickSchedule {
    pub const MIN_SPEED: f64 = 0.1;
    pub const MAX_SPEED: f64 = 5.0;

    pub fn new(speed_multiplier: f64) -> Result<Self, SwarmError> {
        if !(Self::MIN_SPEED..=Self::MAX_SPEED).contains(&speed_multiplier) {
            return Err(SwarmError::InvalidSpeed(speed_multiplier));
        }
        Ok(Self { speed_multiplier })
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis((DEFAULT_TICK_DURATION_MS as f64 / self.speed_multiplier) as u64)
    }
}

impl Default for TickSchedule {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stall_threshold() {
        assert_eq!(stall_threshold(1), 10);
        assert_eq!(stall_threshold(10), 10);
        assert_eq!(stall_threshold(40), 10);
        assert_eq!(stall_threshold(50), 12);
        assert_eq!(stall_threshold(400), 100);
        assert_eq!(SwarmConfig::with_size(5, 80).stall_threshold(), 20);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SwarmConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert_eq!(
            SwarmConfig::with_size(0, 10).validate(),
            Err(SwarmError::EmptySwarm)
        );
        assert_eq!(
            SwarmConfig::with_size(5, 0).validate(),
            Err(SwarmError::NoChunks)
        );

        let mut config = SwarmConfig::default();
        config.churn.arrival_probability = 1.5;
        assert!(matches!(
            config.validate(),
            Err(SwarmError::InvalidProbability { name: "arrival_probability", .. })
        ));

        let mut config = SwarmConfig::default();
        config.roles.seeder_fraction = 0.9;
        assert!(matches!(
            config.validate(),
            Err(SwarmError::InvalidProbability { .. })
        ));

        let mut config = SwarmConfig::default();
        config.bandwidth.upload = (150.0, 50.0);
        assert!(matches!(config.validate(), Err(SwarmError::InvalidRange { .. })));
    }

    #[test]
    fn test_file_spec_chunks() {
        assert_eq!(FileSpec::new(10 * MB, MB).unwrap().total_chunks(), 10);
        assert_eq!(FileSpec::new(10 * MB + 1, MB).unwrap().total_chunks(), 11);
        assert_eq!(FileSpec::new(1, MB).unwrap().total_chunks(), 1);
        assert!(FileSpec::new(10, 0).is_err());
        assert!(FileSpec::new(0, 10).is_err());
    }

    #[test]
    fn test_parse_byte_size() {
        assert_eq!(parse_byte_size("512").unwrap(), 512);
        assert_eq!(parse_byte_size("64 KB").unwrap(), 64 * KB);
        assert_eq!(parse_byte_size("1.5MB").unwrap(), MB + MB / 2);
        assert_eq!(parse_byte_size(" 2 gb ").unwrap(), 2 * GB);
        assert!(parse_byte_size("ten MB").is_err());
        assert!(parse_byte_size("10 TB").is_err());
        assert!(parse_byte_size("-1 KB").is_err());

        let spec = FileSpec::parse("10 MB", "1 MB").unwrap();
        assert_eq!(spec.total_chunks(), 10);
    }

    #[test]
    fn test_parse_byte_size_rejects_partial_and_huge() {
        assert_eq!(
            parse_byte_size("1.5 B"),
            Err(SwarmError::InvalidSize("1.5 B".to_string()))
        );
        assert_eq!(
            parse_byte_size("20000000000 GB"),
            Err(SwarmError::InvalidSize("20000000000 GB".to_string()))
        );
        assert!(parse_byte_size("0.3 KB").is_err());
        assert_eq!(parse_byte_size("0.5 KB").unwrap(), 512);
        assert_eq!(parse_byte_size("16 GB").unwrap(), 16 * GB);
    }

    #[test]
    fn test_validate_caps_total_chunks() {
        assert!(SwarmConfig::with_size(5, MAX_TOTAL_CHUNKS).validate().is_ok());
        assert_eq!(
            SwarmConfig::with_size(5, MAX_TOTAL_CHUNKS + 1).validate(),
            Err(SwarmError::TooManyChunks {
                total: MAX_TOTAL_CHUNKS + 1,
                max: MAX_TOTAL_CHUNKS,
            })
        );

        // 16 GB in 1 B chunks parses fine but is refused once it becomes a config
        let chunks = FileSpec::parse("16 GB", "1").unwrap().total_chunks();
        assert!(matches!(
            SwarmConfig::with_size(5, chunks).validate(),
            Err(SwarmError::TooManyChunks { .. })
        ));
    }

    #[test]
    fn test_tick_schedule() {
        assert_eq!(TickSchedule::default().tick_interval(), Duration::from_millis(500));
        assert_eq!(
            TickSchedule::new(2.0).unwrap().tick_interval(),
            Duration::from_millis(250)
        );
        assert_eq!(
            TickSchedule::new(0.5).unwrap().tick_interval(),
            Duration::from_millis(1000)
        );
        assert!(TickSchedule::new(0.0).is_err());
        assert!(TickSchedule::new(10.0).is_err());
    }

    #[test]
    fn test_yaml_overrides_keep_defaults() {
        let yaml = "initial_peers: 25\nchurn:\n  arrival_probability: 0.0\n";
        let config: SwarmConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.initial_peers, 25);
        assert_eq!(config.total_chunks, 10);
        assert_eq!(config.churn.arrival_probability, 0.0);
        assert_eq!(config.churn.departure_probability, 0.05);
        assert_eq!(config.topology.connect_probability, 0.2);
    }
}
