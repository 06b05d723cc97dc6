//! OSE Quality: the Xi advisory quality function
//!
//! Scores one deployed service's outcome along three axes and combines them
//! into a single value used to steer pattern confidence.
//!
//! # Example
//!
//! ```
//! use ose_quality::{actionability, impact, relevance, Incident, QualityScore, Severity};
//!
//! let r = relevance(2, 3, 0.845)?;
//! let a = actionability(180, 1247);
//! let i = impact(4, 4, &[Incident::new(Severity::Sev3, "cache stampede")])?;
//!
//! let score = QualityScore::calculate(r, a, i)?;
//! println!("{}", score);
//! # Ok::<(), ose_quality::ScoreError>(())
//! ```

pub mod incident;
pub mod level;
pub mod xi;

pub use incident::{stability_factor, Incident, Severity};
pub use level::QualityLevel;
pub use xi::{actionability, impact, relevance, QualityScore, ScoreError};
