// rov_runtime/src/runtime/core/prng.rs

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A newtype wrapper around `ChaCha8Rng` owned by the synthetic sensor source.
/// Seeded runs are reproducible; unseeded runs draw from the OS.
pub struct SensorRng(pub ChaCha8Rng);

impl SensorRng {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self(rng)
    }
}
