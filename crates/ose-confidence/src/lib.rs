//! OSE Confidence: the feedback side of the advisory loop
//!
//! Each registered service contributes one quality observation. The
//! observation moves the confidence of every applied pattern by an
//! exponential moving average and is kept for batch synergy analysis.
//!
//! ```
//! use ose_confidence::ConfidenceStore;
//!
//! let store = ConfidenceStore::new();
//! store.seed("circuit-breaker-v1", 0.85).unwrap();
//!
//! let updated = store.apply("circuit-breaker-v1", 0.65).unwrap();
//! assert!((updated.confidence - 0.83).abs() < 1e-9);
//! ```

pub mod observations;
pub mod store;
pub mod synergy;

pub use observations::{Observation, ObservationLog, DEFAULT_OBSERVATION_CAPACITY};
pub use store::{
    ConfidenceError, ConfidenceStore, ConfidenceUpdater, PatternConfidence,
    LEARNING_RATE,
};
pub use synergy::{detect_synergies, SynergyPair, MIN_PAIR_OBSERVATIONS, SYNERGY_MARGIN};
