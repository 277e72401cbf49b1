use std::env;
use std::path::PathBuf;
use std::time::Duration;

use derivative::Derivative;

/// Index of a frame in the frame table
pub type FrameId = usize;
/// Index of a transaction worker in the roster. Doubles as the owner identity of a frame
pub type WorkerId = usize;

/// The head of the circular frame sequence
pub const HEAD_FRAME_ID: FrameId = 0;
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const EXTRA_FAULT_ODDS: u32 = 4;
pub const MAX_DELAY_SECS: u64 = 2;
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Names of the transaction streams run when no roster is given on the command line
pub const DEFAULT_ROSTER: [&str; 5] = ["Vlad", "Frank", "Bigfoot", "Casper", "Gomez"];

pub fn cwd() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Tunables for one simulation run
#[derive(Derivative, Debug, Clone)]
#[derivative(Default)]
pub struct SimConfig {
    /// a section faults spontaneously with 1-in-`extra_fault_odds` odds. 0 turns spontaneous faults off
    #[derivative(Default(value = "EXTRA_FAULT_ODDS"))]
    pub extra_fault_odds: u32,
    #[derivative(Default(value = "TICK_INTERVAL"))]
    pub tick_interval: Duration,
    #[derivative(Default(value = "MAX_DELAY_SECS"))]
    pub max_delay_secs: u64,
    #[derivative(Default(value = "true"))]
    pub section_delay: bool,
    #[derivative(Default(value = "true"))]
    pub abort_on_fatal: bool,
    pub seed: Option<u64>,
}

impl SimConfig {
    /// Deterministic configuration: no delays, no spontaneous faults, errors returned instead of aborting
    pub fn quiet() -> Self {
        SimConfig {
            extra_fault_odds: 0,
            tick_interval: Duration::from_millis(50),
            section_delay: false,
            abort_on_fatal: false,
            seed: Some(0),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SimConfig::default();
        assert_eq!(config.extra_fault_odds, 4);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.max_delay_secs, 2);
        assert!(config.section_delay);
        assert!(config.abort_on_fatal);
        assert!(config.seed.is_none());
    }

    #[test]
    fn quiet_keeps_delay_bound() {
        let config = SimConfig::quiet();
        assert_eq!(config.extra_fault_odds, 0);
        assert!(!config.section_delay);
        assert!(!config.abort_on_fatal);
        assert_eq!(config.max_delay_secs, MAX_DELAY_SECS);
    }
}
