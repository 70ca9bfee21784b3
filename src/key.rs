//! Grid positions and their canonical string form
//!
//! Every key hashed by the filter is the string `"x,y"`. `GridKey` is the
//! typed form of that string: both directions are lossless, so equality on
//! the pair is equality on the canonical string.

use crate::{GridBloomError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A cell position on the square grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridKey {
    pub x: u32,
    pub y: u32,
}

impl GridKey {
    pub fn new(x: u32, y: u32) -> Self {
        GridKey { x, y }
    }

    /// Map a flat slot index onto the grid as `(i / side, i % side)`
    pub fn from_flat(index: usize, side: u32) -> Self {
        let side = side as usize;
        GridKey {
            x: (index / side) as u32,
            y: (index % side) as u32,
        }
    }

    /// The canonical `"x,y"` string used for hashing
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Parse a canonical key, rejecting anything that would not round-trip
    pub fn parse(s: &str) -> Result<Self> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| GridBloomError::InvalidKey(s.to_string()))?;
        Ok(GridKey {
            x: parse_component(x).ok_or_else(|| GridBloomError::InvalidKey(s.to_string()))?,
            y: parse_component(y).ok_or_else(|| GridBloomError::InvalidKey(s.to_string()))?,
        })
    }

    /// Whether this key lies on a grid with the given side
    pub fn within(&self, side: u32) -> bool {
        self.x < side && self.y < side
    }
}

// Plain decimal digits, no sign, no leading zeros except "0" itself.
fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for GridKey {
    type Err = GridBloomError;

    fn from_str(s: &str) -> Result<Self> {
        GridKey::parse(s)
    }
}
