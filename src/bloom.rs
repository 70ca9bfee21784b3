//! Standard Bloom filter implementation
//!
//! A space-efficient probabilistic data structure for membership testing over
//! canonical grid keys. Bits are packed eight to a byte, least significant bit
//! first, and are never cleared once set.

use crate::hash::{scheme_name, ProbePair};
use crate::{GridBloomError, GridKey, Result};
use bit_vec::BitVec;

pub const DEFAULT_SIZE: usize = 4096;
pub const DEFAULT_HASH_COUNT: u32 = 2;

/// A standard Bloom filter
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter {
    /// Bit array storing the filter data, one byte per block
    bits: BitVec<u8>,
    /// Number of probe indices per key
    hash_count: u32,
    /// Number of keys added (for statistics)
    count: usize,
}

impl BloomFilter {
    /// Create a Bloom filter with `size` bits and `hash_count` probes per key
    pub fn with_size(size: usize, hash_count: u32) -> Result<Self> {
        if size == 0 {
            return Err(GridBloomError::InvalidParameter(
                "Bit count must be > 0".to_string(),
            ));
        }
        if hash_count == 0 {
            return Err(GridBloomError::InvalidParameter(
                "Number of hashes must be > 0".to_string(),
            ));
        }

        Ok(Self::zeroed(size, hash_count))
    }

    // Callers guarantee size > 0 and hash_count > 0.
    fn zeroed(size: usize, hash_count: u32) -> Self {
        let mut bits = BitVec::<u8>::default();
        bits.grow(size, false);

        BloomFilter {
            bits,
            hash_count,
            count: 0,
        }
    }

    /// Add a canonical `"x,y"` key
    pub fn add(&mut self, key: &str) -> Result<()> {
        GridKey::parse(key)?;
        self.set_probes(key);
        Ok(())
    }

    /// Returns true if the key is definitely absent
    pub fn not_in_set(&self, key: &str) -> Result<bool> {
        GridKey::parse(key)?;
        Ok(!self.all_probes_set(key))
    }

    /// Returns true if the key is probably present, false if definitely absent
    pub fn likely(&self, key: &str) -> Result<bool> {
        Ok(!self.not_in_set(key)?)
    }

    /// Insert a typed key; it is canonical by construction
    pub fn insert(&mut self, key: &GridKey) {
        self.set_probes(&key.canonical());
    }

    /// Check a typed key
    pub fn contains(&self, key: &GridKey) -> bool {
        self.all_probes_set(&key.canonical())
    }

    fn set_probes(&mut self, key: &str) {
        let size = self.bits.len() as u64;
        for index in ProbePair::new(key, size).indices(self.hash_count, size) {
            self.bits.set(index, true);
        }
        self.count += 1;
    }

    fn all_probes_set(&self, key: &str) -> bool {
        let size = self.bits.len() as u64;
        ProbePair::new(key, size)
            .indices(self.hash_count, size)
            .all(|index| self.bits.get(index).unwrap_or(false))
    }

    /// Read a single bit
    pub fn bit(&self, index: usize) -> bool {
        self.bits.get(index).unwrap_or(false)
    }

    /// Packed storage, `ceil(size / 8)` bytes; bit `i` is `bytes[i / 8] >> (i % 8)`
    pub fn as_bytes(&self) -> Vec<u8> {
        self.bits.blocks().collect()
    }

    /// Number of bits currently set
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&bit| bit).count()
    }

    /// Get the current load factor (fraction of bits set)
    pub fn load_factor(&self) -> f64 {
        self.count_ones() as f64 / self.bits.len() as f64
    }

    /// Get the estimated false positive rate from the current fill
    pub fn estimated_fpr(&self) -> f64 {
        self.load_factor().powi(self.hash_count as i32)
    }

    /// Get statistics about the filter
    pub fn stats(&self) -> BloomStats {
        BloomStats {
            capacity: self.bits.len(),
            num_hash_functions: self.hash_count,
            hash_scheme: scheme_name(),
            elements_inserted: self.count,
            load_factor: self.load_factor(),
            estimated_fpr: self.estimated_fpr(),
        }
    }

    /// Get the number of keys added
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if nothing was added
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get the capacity (number of bits)
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Get the number of probes per key
    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }
}

impl Default for BloomFilter {
    fn default() -> Self {
        Self::zeroed(DEFAULT_SIZE, DEFAULT_HASH_COUNT)
    }
}

/// Statistics about a Bloom filter
#[derive(Debug, Clone)]
pub struct BloomStats {
    pub capacity: usize,
    pub num_hash_functions: u32,
    pub hash_scheme: String,
    pub elements_inserted: usize,
    pub load_factor: f64,
    pub estimated_fpr: f64,
}

impl std::fmt::Display for BloomStats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "BloomFilter Stats:\n\
             - Capacity: {} bits\n\
             - Hash functions: {} ({})\n\
             - Elements inserted: {}\n\
             - Load factor: {:.3}\n\
             - Estimated FPR: {:.6}",
            self.capacity,
            self.num_hash_functions,
            self.hash_scheme,
            self.elements_inserted,
            self.load_factor,
            self.estimated_fpr
        )
    }
}
