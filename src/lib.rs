//! # Gridbloom
//!
//! A Bloom filter false-positive simulator. A random set of grid cells is
//! inserted into a small Bloom filter, then every cell of the grid is queried
//! in row-major order and each answer is classified against the true set.
//!
//! The scan is driven in bounded batches by a [`ScanDriver`], which reports
//! classified cells and running counters to a [`ScanObserver`]. Rendering is
//! left entirely to the observer.
//!
//! Note on naming: the `hits` counter counts true negatives (the filter
//! correctly said "absent"), while [`ScanObserver::on_hit`] fires for true
//! positives. `misses` and `on_miss` both refer to false positives.

pub mod bloom;
pub mod config;
pub mod driver;
pub mod engine;
pub mod ground_truth;
pub mod hash;
pub mod key;
pub mod utils;

pub use bloom::{BloomFilter, BloomStats};
pub use config::SimulationConfig;
pub use driver::{BatchReport, ScanDriver, ScanObserver, ScanReport, ScanSession};
pub use engine::{Outcome, SimulationEngine, StepEvent};
pub use ground_truth::GroundTruthSet;
pub use hash::{Djb2Hash, HashFunction, XorShiftHash};
pub use key::GridKey;

// Python bindings
#[cfg(feature = "python")]
pub mod python_module;

/// Common error types for the library
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridBloomError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Invalid key: {0:?} is not a canonical \"x,y\" key")]
    InvalidKey(String),
    #[error("A scan is already in progress")]
    ScanInProgress,
}

pub type Result<T> = std::result::Result<T, GridBloomError>;
