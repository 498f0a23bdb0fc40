//! Hash function selection and per-table seeds.

use crate::error::DictError;
use core::fmt;
use hashbrown::HashSet;
use rand::Rng;

/// Multiplier of the deterministic seed formula `seed_i = i * SEED_MULTIPLIER`.
/// Odd, so the formula yields distinct seeds for every table index.
pub const SEED_MULTIPLIER: u64 = 2_654_435_761;

/// Function used to hash serialized keys, seeded once per table.
#[derive(Copy, Clone, Default)]
pub enum HashFunction {
    /// XXH3 64-bit.
    #[default]
    Xxh3,
    Custom(fn(&[u8], u64) -> u64),
}

impl HashFunction {
    #[inline]
    pub fn hash(&self, bytes: &[u8], seed: u64) -> u64 {
        match self {
            HashFunction::Xxh3 => xxhash_rust::xxh3::xxh3_64_with_seed(bytes, seed),
            HashFunction::Custom(f) => f(bytes, seed),
        }
    }
}

impl fmt::Debug for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashFunction::Xxh3 => f.write_str("Xxh3"),
            HashFunction::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// How the per-table seeds are chosen at construction.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum SeedStrategy {
    /// `seed_i = i * SEED_MULTIPLIER` (wrapping). Reproducible across runs.
    #[default]
    Multiplicative,
    /// Exactly `array_count` distinct caller-chosen seeds.
    Explicit(Vec<u64>),
    /// Distinct seeds drawn from the thread-local RNG.
    Random,
}

impl SeedStrategy {
    pub(crate) fn generate(&self, array_count: u16) -> Result<Vec<u64>, DictError> {
        let n = usize::from(array_count);
        match self {
            SeedStrategy::Multiplicative => Ok((0..u64::from(array_count))
                .map(|i| i.wrapping_mul(SEED_MULTIPLIER))
                .collect()),
            SeedStrategy::Explicit(seeds) => {
                if seeds.len() != n {
                    return Err(DictError::config(format!(
                        "expected {n} seeds, got {}",
                        seeds.len()
                    )));
                }
                let unique: HashSet<u64> = seeds.iter().copied().collect();
                if unique.len() != n {
                    return Err(DictError::config("seeds must be distinct"));
                }
                Ok(seeds.clone())
            }
            SeedStrategy::Random => {
                let mut rng = rand::thread_rng();
                let mut seen = HashSet::with_capacity(n);
                let mut seeds = Vec::with_capacity(n);
                while seeds.len() < n {
                    let seed = rng.gen::<u64>();
                    if seen.insert(seed) {
                        seeds.push(seed);
                    }
                }
                Ok(seeds)
            }
        }
    }
}
