//! Hash functions for Bloom filters
//!
//! Two string hashes combined by double hashing: probe `i` lands on
//! `(h1 + i * h2) mod m`. Both read the bytes of the canonical key and
//! reduce through the absolute value. Shifts are taken on the state cut to
//! 32 bits, the way a JavaScript number behaves under `<<`.

/// Trait for hash functions used in Bloom filters
pub trait HashFunction: Send + Sync {
    /// Hash a key with the given modulus
    fn hash(&self, key: &str, modulus: u64) -> u64;

    /// Get a name/identifier for this hash function
    fn name(&self) -> String;
}

/// DJB2 rolling hash: h = (h << 5) + h + c, seeded at 5381
///
/// Only the shift wraps to 32 bits; the sum keeps full precision, so the
/// state outgrows `i32` for keys longer than three bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Djb2Hash;

impl Djb2Hash {
    pub const SEED: i64 = 5381;

    /// Raw state after consuming `key`
    pub fn raw(key: &str) -> i64 {
        key.bytes().fold(Self::SEED, |hash, byte| {
            i64::from((hash as i32).wrapping_shl(5)) + hash + i64::from(byte)
        })
    }
}

impl HashFunction for Djb2Hash {
    fn hash(&self, key: &str, modulus: u64) -> u64 {
        reduce(Self::raw(key).unsigned_abs(), modulus)
    }

    fn name(&self) -> String {
        "djb2".to_string()
    }
}

/// XOR-shift rolling hash: h = (h << 3) ^ c, seeded at 0
#[derive(Debug, Clone, Copy, Default)]
pub struct XorShiftHash;

impl XorShiftHash {
    /// Raw 32-bit state after consuming `key`
    pub fn raw(key: &str) -> i32 {
        key.bytes()
            .fold(0i32, |hash, byte| hash.wrapping_shl(3) ^ byte as i32)
    }
}

impl HashFunction for XorShiftHash {
    fn hash(&self, key: &str, modulus: u64) -> u64 {
        reduce(u64::from(Self::raw(key).unsigned_abs()), modulus)
    }

    fn name(&self) -> String {
        "xorshift3".to_string()
    }
}

fn reduce(magnitude: u64, modulus: u64) -> u64 {
    if modulus == 0 {
        return 0;
    }
    magnitude % modulus
}

/// Base and step of the probe sequence for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePair {
    pub base: u64,
    pub step: u64,
}

impl ProbePair {
    /// Probe pair from the filter's hashes: DJB2 for the base, XOR-shift for the step
    pub fn new(key: &str, modulus: u64) -> Self {
        Self::with_hashers(&Djb2Hash, &XorShiftHash, key, modulus)
    }

    /// Probe pair from any two hash functions
    pub fn with_hashers<A, B>(base: &A, step: &B, key: &str, modulus: u64) -> Self
    where
        A: HashFunction + ?Sized,
        B: HashFunction + ?Sized,
    {
        ProbePair {
            base: base.hash(key, modulus),
            step: step.hash(key, modulus),
        }
    }

    /// The `count` bit indices probed for this key
    pub fn indices(self, count: u32, modulus: u64) -> impl Iterator<Item = usize> {
        (0..u64::from(count)).map(move |i| {
            (self.base.wrapping_add(i.wrapping_mul(self.step)) % modulus) as usize
        })
    }
}

/// Names of the base and step hashes, e.g. `djb2+xorshift3`
pub fn scheme_name() -> String {
    format!("{}+{}", Djb2Hash.name(), XorShiftHash.name())
}
