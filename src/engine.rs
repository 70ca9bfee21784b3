//! Simulation engine: ground-truth generation and the steppable scan
//!
//! The engine owns the filter and the true set, and walks a row-major cursor
//! over the whole grid (x first, then y), grading one cell per step.

use crate::{BloomFilter, GridKey, GroundTruthSet, Result, SimulationConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Classification of one filter answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// "Probably present" and really present
    TruePositive,
    /// "Probably present" but never added
    FalsePositive,
    /// "Definitely absent"; always correct since the filter is sound
    TrueNegative,
}

/// One graded cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    pub key: GridKey,
    pub outcome: Outcome,
}

/// Running counters.
///
/// `hits` counts true negatives and `misses` counts false positives. True
/// positives only advance `checks`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub checks: u64,
    pub hits: u64,
    pub misses: u64,
}

impl Counters {
    /// `misses / checks * 100`, once there is at least one check and one miss
    pub fn false_positive_rate(&self) -> Option<f64> {
        if self.checks > 0 && self.misses > 0 {
            Some(self.misses as f64 / self.checks as f64 * 100.0)
        } else {
            None
        }
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::TruePositive => {}
            Outcome::FalsePositive => self.misses += 1,
            Outcome::TrueNegative => self.hits += 1,
        }
        self.checks += 1;
    }
}

pub struct SimulationEngine {
    config: SimulationConfig,
    filter: BloomFilter,
    truth: GroundTruthSet,
    counters: Counters,
    cursor: GridKey,
}

impl SimulationEngine {
    /// Validate `config`, then build the filter and generate the ground truth.
    ///
    /// Uses `config.seed` when present, fresh entropy otherwise.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        match config.seed {
            Some(seed) => Self::with_rng(config, &mut StdRng::seed_from_u64(seed)),
            None => Self::with_rng(config, &mut StdRng::from_entropy()),
        }
    }

    /// Same as [`SimulationEngine::new`] with a caller-provided RNG
    pub fn with_rng<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let mut engine = SimulationEngine {
            config: config.clone(),
            filter: BloomFilter::with_size(config.filter_bits, config.hash_count)?,
            truth: GroundTruthSet::default(),
            counters: Counters::default(),
            cursor: GridKey::new(0, 0),
        };
        engine.generate_ground_truth(config.item_count, rng);
        Ok(engine)
    }

    fn generate_ground_truth<R: Rng + ?Sized>(&mut self, item_count: usize, rng: &mut R) {
        debug!(
            item_count,
            grid_side = self.config.grid_side,
            "Generating ground truth"
        );
        self.truth = GroundTruthSet::generate(self.config.grid_side, item_count, rng);
        for key in self.truth.iter() {
            self.filter.insert(key);
        }
        debug!(
            load_factor = self.filter.load_factor(),
            "Filter populated"
        );
    }

    /// Grade the cell under the cursor and advance. `None` once the scan is done.
    pub fn step(&mut self) -> Option<StepEvent> {
        if self.is_complete() {
            return None;
        }

        let key = self.cursor;
        let outcome = if self.filter.contains(&key) {
            if self.truth.contains(&key) {
                Outcome::TruePositive
            } else {
                Outcome::FalsePositive
            }
        } else {
            debug_assert!(!self.truth.contains(&key), "false negative at {}", key);
            Outcome::TrueNegative
        };
        self.counters.record(outcome);

        self.cursor.x += 1;
        if self.cursor.x == self.config.grid_side {
            self.cursor.x = 0;
            self.cursor.y += 1;
        }

        Some(StepEvent { key, outcome })
    }

    /// Run up to `max_steps` steps, stopping early at the end of the grid
    pub fn step_batch(&mut self, max_steps: usize) -> Vec<StepEvent> {
        let mut events = Vec::with_capacity(max_steps.min(self.remaining()));
        while events.len() < max_steps {
            match self.step() {
                Some(event) => events.push(event),
                None => break,
            }
        }
        events
    }

    pub fn is_complete(&self) -> bool {
        self.cursor.y >= self.config.grid_side
    }

    /// Cells not yet scanned
    pub fn remaining(&self) -> usize {
        self.config.cell_count() - self.counters.checks as usize
    }

    /// The next cell to scan
    pub fn cursor(&self) -> GridKey {
        self.cursor
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn filter(&self) -> &BloomFilter {
        &self.filter
    }

    pub fn ground_truth(&self) -> &GroundTruthSet {
        &self.truth
    }
}
