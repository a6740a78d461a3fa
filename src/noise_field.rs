//! Coherent noise field driving orb deformation.
//!
//! Wraps seeded OpenSimplex noise sampled along each vertex direction, with
//! time folded into the input coordinates so the field drifts smoothly as
//! playback progresses.

use glam::Vec3;
use noise::{NoiseFn, OpenSimplex};

use crate::params::NoiseParams;

/// Deterministic noise field over vertex directions plus a time axis
pub struct NoiseField {
    simplex: OpenSimplex,
    params: NoiseParams,
    seed: u32,
}

impl NoiseField {
    /// Create a noise field, drawing a session seed when none is pinned
    pub fn new(params: NoiseParams) -> Self {
        let seed = params.seed.unwrap_or_else(|| fastrand::u32(..));
        Self {
            simplex: OpenSimplex::new(seed),
            params,
            seed,
        }
    }

    /// Seed backing the permutation table (for logging/reproduction)
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Sample the field at a unit direction and elapsed time.
    ///
    /// Returns `noise * intensity`; the raw noise value is roughly in
    /// [-1, 1]. Deterministic for a given seed, and continuous in both the
    /// direction and time arguments so frame-to-frame deformation stays
    /// visually smooth.
    pub fn sample(&self, dir: Vec3, time_ms: f32) -> f32 {
        let t = time_ms * self.params.rate;
        let [sx, sy, sz] = self.params.time_scale;
        let value = self.simplex.get([
            (dir.x + t * sx) as f64,
            (dir.y + t * sy) as f64,
            (dir.z + t * sz) as f64,
        ]) as f32;
        value * self.params.intensity
    }
}
