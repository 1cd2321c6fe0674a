//! Independent per-line sampling.

use crate::error::{LintError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Keeps each line with a fixed probability, independently of all others.
#[derive(Debug)]
pub struct Sampler {
    ratio: f64,
    rng: StdRng,
}

impl Sampler {
    /// Create a sampler keeping lines with probability `ratio`.
    ///
    /// With a `seed` the sequence of decisions is reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::InvalidSampleRatio`] unless `0 <= ratio <= 1`.
    pub fn new(ratio: f64, seed: Option<u64>) -> Result<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(LintError::InvalidSampleRatio(ratio));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Sampler { ratio, rng })
    }

    /// Sampler that keeps everything.
    #[must_use]
    pub fn keep_all() -> Self {
        Sampler {
            ratio: 1.0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Configured ratio.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Decide for the next line.
    pub fn keep(&mut self) -> bool {
        if self.ratio >= 1.0 {
            return true;
        }
        if self.ratio <= 0.0 {
            return false;
        }
        self.rng.random::<f64>() <= self.ratio
    }
}
