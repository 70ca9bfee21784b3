//! Simulation configuration and validation

use crate::bloom::{DEFAULT_HASH_COUNT, DEFAULT_SIZE};
use crate::{GridBloomError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GRID_SIDE: u32 = 150;
pub const DEFAULT_ITEM_COUNT: usize = 100;
pub const DEFAULT_BATCH_SIZE: usize = 500;
/// Largest accepted grid side; the engine allocates one slot per cell, so
/// this caps setup at 16M cells.
pub const MAX_GRID_SIDE: u32 = 4096;

/// Parameters of one simulation run, fixed for its lifetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Side of the square grid; the key space has `grid_side^2` cells
    pub grid_side: u32,
    /// Probe indices per key
    pub hash_count: u32,
    /// Cells inserted into the filter, at most `grid_side^2`
    pub item_count: usize,
    /// Filter size in bits
    pub filter_bits: usize,
    /// Steps per scheduling tick
    pub batch_size: usize,
    /// Fixed RNG seed; fresh entropy when absent
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_side: DEFAULT_GRID_SIDE,
            hash_count: DEFAULT_HASH_COUNT,
            item_count: DEFAULT_ITEM_COUNT,
            filter_bits: DEFAULT_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Total number of cells in the key space
    pub fn cell_count(&self) -> usize {
        (self.grid_side as usize).saturating_mul(self.grid_side as usize)
    }

    /// Check every parameter before anything is built from it
    pub fn validate(&self) -> Result<()> {
        if self.grid_side == 0 {
            return Err(GridBloomError::InvalidParameter(
                "Grid side must be > 0".to_string(),
            ));
        }
        let side = self.grid_side as usize;
        if self.grid_side > MAX_GRID_SIDE || side.checked_mul(side).is_none() {
            return Err(GridBloomError::InvalidParameter(format!(
                "Grid side {} exceeds the maximum of {}",
                self.grid_side, MAX_GRID_SIDE
            )));
        }
        if self.hash_count == 0 {
            return Err(GridBloomError::InvalidParameter(
                "Number of hashes must be > 0".to_string(),
            ));
        }
        if self.filter_bits == 0 {
            return Err(GridBloomError::InvalidParameter(
                "Filter bit count must be > 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(GridBloomError::InvalidParameter(
                "Batch size must be > 0".to_string(),
            ));
        }
        if self.item_count > self.cell_count() {
            return Err(GridBloomError::InvalidParameter(format!(
                "Item count {} exceeds the {} cells of the grid",
                self.item_count,
                self.cell_count()
            )));
        }
        Ok(())
    }

    /// Parse a JSON config without validating it, so callers can still
    /// override fields; missing fields take their defaults
    pub fn parse_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GridBloomError::InvalidParameter(e.to_string()))
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config = Self::parse_json(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cell_count(), 22_500);
        assert_eq!(config.filter_bits, 4096);
        assert_eq!(config.hash_count, 2);
    }

    #[test]
    fn test_rejects_zero_parameters() {
        let base = SimulationConfig::default();
        for config in [
            SimulationConfig { grid_side: 0, ..base.clone() },
            SimulationConfig { hash_count: 0, ..base.clone() },
            SimulationConfig { filter_bits: 0, ..base.clone() },
            SimulationConfig { batch_size: 0, ..base.clone() },
        ] {
            assert!(matches!(
                config.validate(),
                Err(GridBloomError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_item_count_bounds() {
        let full = SimulationConfig {
            item_count: 22_500,
            ..SimulationConfig::default()
        };
        assert!(full.validate().is_ok());

        let over = SimulationConfig {
            item_count: 22_501,
            ..SimulationConfig::default()
        };
        assert!(over.validate().is_err());

        let empty = SimulationConfig {
            item_count: 0,
            ..SimulationConfig::default()
        };
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config =
            SimulationConfig::from_json(r#"{"hash_count": 3, "item_count": 250, "seed": 5}"#)
                .unwrap();
        assert_eq!(config.hash_count, 3);
        assert_eq!(config.item_count, 250);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.grid_side, DEFAULT_GRID_SIDE);

        assert!(SimulationConfig::from_json(r#"{"batch_size": 0}"#).is_err());
        assert!(SimulationConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_parse_json_defers_validation() {
        // 200 items do not fit a 10 x 10 grid until the side is raised
        let mut config =
            SimulationConfig::parse_json(r#"{"grid_side": 10, "item_count": 200}"#).unwrap();
        assert!(config.validate().is_err());

        config.grid_side = 20;
        assert!(config.validate().is_ok());
        assert!(SimulationConfig::parse_json("{").is_err());
    }

    #[test]
    fn test_rejects_oversized_grid() {
        let huge = SimulationConfig {
            grid_side: u32::MAX,
            item_count: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(GridBloomError::InvalidParameter(_))
        ));
        assert!(crate::SimulationEngine::new(&huge).is_err());

        let just_over = SimulationConfig {
            grid_side: MAX_GRID_SIDE + 1,
            ..SimulationConfig::default()
        };
        assert!(just_over.validate().is_err());

        let at_cap = SimulationConfig {
            grid_side: MAX_GRID_SIDE,
            ..SimulationConfig::default()
        };
        assert!(at_cap.validate().is_ok());
        assert_eq!(at_cap.cell_count(), 16_777_216);
    }
}
