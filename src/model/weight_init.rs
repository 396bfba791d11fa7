use rand::distributions::{Distribution, Uniform};
use rand::thread_rng;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::error::{LayerConfError, Result};

// Below this many elements a single thread fills the slice
pub const PARALLEL_INIT_THRESHOLD: usize = 10_000;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum WeightInit {
    #[default]
    Xavier,             // Good for tanh activation
    He,                 // Good for ReLU activation
    LeCun,              // Good for SELU activation
    UniformRandom {     // Simple uniform random in range
        min: f32,
        max: f32,
    },
    Constant(f32),
}

impl WeightInit {
    /// Rejects settings that cannot be sampled from. Filling with a scheme
    /// that passed this check never panics.
    pub fn validate(&self) -> Result<()> {
        match *self {
            WeightInit::UniformRandom { min, max } if !(min.is_finite() && max.is_finite()) => {
                Err(LayerConfError::InvalidArgument(format!(
                    "UniformRandom bounds must be finite: min = {}, max = {}",
                    min, max
                )))
            }
            WeightInit::UniformRandom { min, max } if min > max => {
                Err(LayerConfError::InvalidArgument(format!(
                    "UniformRandom requires min <= max: min = {}, max = {}",
                    min, max
                )))
            }
            _ => Ok(()),
        }
    }

    // Box-Muller transform to generate normal distribution
    fn normal_sample<R: Rng>(rng: &mut R, mean: f32, std_dev: f32) -> f32 {
        // Lower bound keeps ln() finite
        let uniform = Uniform::new(f32::MIN_POSITIVE, 1.0);

        let u1 = uniform.sample(rng);
        let u2 = uniform.sample(rng);

        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }

    fn fill_with<R: Rng>(&self, rng: &mut R, dst: &mut [f32], fan_in: usize, fan_out: usize) {
        let fan_in = fan_in.max(1);
        let fan_out = fan_out.max(1);

        match self {
            WeightInit::Xavier => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                let dist = Uniform::new_inclusive(-limit, limit);
                dst.iter_mut().for_each(|v| *v = dist.sample(rng));
            },

            WeightInit::He => {
                let std_dev = (2.0 / fan_in as f32).sqrt();
                dst.iter_mut().for_each(|v| *v = Self::normal_sample(rng, 0.0, std_dev));
            },

            WeightInit::LeCun => {
                let std_dev = (1.0 / fan_in as f32).sqrt();
                dst.iter_mut().for_each(|v| *v = Self::normal_sample(rng, 0.0, std_dev));
            },

            WeightInit::UniformRandom { min, max } => {
                let dist = Uniform::new_inclusive(*min, *max);
                dst.iter_mut().for_each(|v| *v = dist.sample(rng));
            },

            WeightInit::Constant(value) => {
                dst.fill(*value);
            },
        }
    }

    /// Overwrites every element of `dst`. For a dense layer `fan_in` is the
    /// input width and `fan_out` the output width.
    pub fn fill(&self, dst: &mut [f32], fan_in: usize, fan_out: usize) {
        let mut rng = thread_rng();
        self.fill_with(&mut rng, dst, fan_in, fan_out);
    }

    // Each chunk draws from its own thread's generator
    pub fn par_fill(&self, dst: &mut [f32], fan_in: usize, fan_out: usize, chunk_size: usize) {
        dst.par_chunks_mut(chunk_size.max(1)).for_each(|chunk| {
            let mut rng = thread_rng();
            self.fill_with(&mut rng, chunk, fan_in, fan_out);
        });
    }

    pub fn init(&self, dst: &mut [f32], fan_in: usize, fan_out: usize) {
        if dst.len() < PARALLEL_INIT_THRESHOLD {
            self.fill(dst, fan_in, fan_out);
        } else {
            self.par_fill(dst, fan_in, fan_out, PARALLEL_INIT_THRESHOLD);
        }
    }
}
