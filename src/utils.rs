//! Utility functions for Bloom filters

use crate::SimulationConfig;

/// Theoretical false positive probability `(1 - e^(-kn/m))^k` for a filter of
/// `m` bits holding `n` keys with `k` probes each
pub fn theoretical_fpr(hash_count: u32, items: usize, bits: usize) -> f64 {
    if items == 0 || bits == 0 {
        return 0.0;
    }
    let k = hash_count as f64;
    let n = items as f64;
    let m = bits as f64;
    (1.0 - (-k * n / m).exp()).powi(hash_count as i32)
}

/// Optimal number of hash functions: k = (m/n) * ln(2)
pub fn optimal_hash_count(bits: usize, items: usize) -> u32 {
    if items == 0 {
        return 1;
    }
    let k = (bits as f64 / items as f64) * std::f64::consts::LN_2;
    (k.round() as u32).clamp(1, 20) // Reasonable bounds
}

/// Expected `misses / checks * 100` after a full scan.
///
/// Only the `cells - items` absent cells can produce false positives, so the
/// theoretical rate is scaled by their share of the grid.
pub fn expected_scan_rate(config: &SimulationConfig) -> f64 {
    let cells = config.cell_count();
    if cells == 0 {
        return 0.0;
    }
    let absent = (cells - config.item_count.min(cells)) as f64;
    theoretical_fpr(config.hash_count, config.item_count, config.filter_bits) * absent
        / cells as f64
        * 100.0
}
