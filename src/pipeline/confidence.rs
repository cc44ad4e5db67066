//! The confidence figure shown next to an estimate.
//!
//! This is a presentation flourish, not a statistical property of any model:
//! [`CosmeticConfidence`] draws a uniform integer percentage independent of the
//! inputs and the prediction. It sits behind [`ConfidenceSource`] so a real
//! uncertainty estimate can replace it without touching the pipeline.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const CONFIDENCE_MIN: u8 = 85;
pub const CONFIDENCE_MAX: u8 = 97;

pub trait ConfidenceSource: Send + Sync {
    /// Percentage in `[CONFIDENCE_MIN, CONFIDENCE_MAX]`.
    fn confidence_percent(&self) -> u8;
}

/// Uniform random confidence in `[85, 97]`.
pub struct CosmeticConfidence {
    rng: Mutex<StdRng>,
}

impl CosmeticConfidence {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence, for tests and `--seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ConfidenceSource for CosmeticConfidence {
    fn confidence_percent(&self) -> u8 {
        // A panic while holding the lock cannot leave the RNG in a bad state.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(CONFIDENCE_MIN..=CONFIDENCE_MAX)
    }
}
