//! Orb mesh geometry and noise field parameters.

/// Orb mesh geometry (fixed at construction)
#[derive(Debug, Clone)]
pub struct OrbGeometry {
    /// Undeformed distance from mesh center to every vertex
    /// Reference value: 10.0
    pub base_radius: f32,

    /// Icosahedron subdivision level (3 = 642 vertices)
    pub detail: u32,
}

impl Default for OrbGeometry {
    fn default() -> Self {
        Self {
            base_radius: 10.0,
            detail: 3,
        }
    }
}

/// Noise field parameters
#[derive(Debug, Clone)]
pub struct NoiseParams {
    /// Multiplier applied to every noise sample
    /// Reference value: 5.0
    pub intensity: f32,

    /// Field evolution rate per millisecond of elapsed time
    /// Reference value: 1e-5
    pub rate: f32,

    /// Per-axis time scaling; each vertex direction is offset by
    /// time_ms * rate * time_scale[axis] before sampling. Deliberately
    /// anisotropic so the deformation drifts rather than pulses.
    /// Reference value: [70, 800, 9]
    pub time_scale: [f32; 3],

    /// Permutation table seed. None draws a fresh seed per session.
    pub seed: Option<u32>,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            intensity: 5.0,
            rate: 1e-5,
            time_scale: [70.0, 800.0, 9.0],
            seed: None,
        }
    }
}

/// Clamp policy bounding the deformed vertex radius
#[derive(Debug, Clone)]
pub struct RadiusClamp {
    /// Whether clamping is applied at all
    pub enabled: bool,

    /// Lower bound as a fraction of the base radius
    pub min_factor: f32,

    /// Upper bound as a fraction of the base radius
    pub max_factor: f32,
}

impl Default for RadiusClamp {
    fn default() -> Self {
        Self {
            enabled: true,
            min_factor: 0.5,
            max_factor: 1.5,
        }
    }
}

impl RadiusClamp {
    /// Bound a deformed radius relative to the base radius
    pub fn apply(&self, base_radius: f32, radius: f32) -> f32 {
        if self.enabled {
            radius.clamp(base_radius * self.min_factor, base_radius * self.max_factor)
        } else {
            radius
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_clamp_bounds() {
        let clamp = RadiusClamp::default();
        assert_eq!(clamp.apply(10.0, 100.0), 15.0);
        assert_eq!(clamp.apply(10.0, -3.0), 5.0);
        assert_eq!(clamp.apply(10.0, 12.0), 12.0);
    }

    #[test]
    fn test_radius_clamp_disabled_passes_through() {
        let clamp = RadiusClamp {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(clamp.apply(10.0, 100.0), 100.0);
    }
}
