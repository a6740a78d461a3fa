//! High-level orb system with audio-reactive deformation.

use crate::audio::ModulationLevels;
use crate::noise_field::NoiseField;
use crate::orb::OrbMesh;
use crate::params::{NoiseParams, OrbGeometry, RadiusClamp};

/// Orb system owning the mesh, its noise field, and the clamp policy
pub struct OrbSystem {
    pub mesh: OrbMesh,
    field: NoiseField,
    clamp: RadiusClamp,
    /// Set by a deform pass, cleared when the renderer re-uploads geometry
    dirty: bool,
}

impl OrbSystem {
    /// Create a new orb system with specified parameters
    pub fn new(geometry: OrbGeometry, noise: NoiseParams, clamp: RadiusClamp) -> Self {
        Self {
            mesh: OrbMesh::new(&geometry),
            field: NoiseField::new(noise),
            clamp,
            dirty: true, // initial upload
        }
    }

    /// Noise seed in use this session (for logging/reproduction)
    pub fn noise_seed(&self) -> u32 {
        self.field.seed()
    }

    /// Run one deformation pass with the current modulation scalars.
    ///
    /// # Arguments
    /// * `time_s` - Wall-clock elapsed time in seconds
    /// * `levels` - Bass/treble scalars from the modulation reducer
    pub fn update(&mut self, time_s: f32, levels: ModulationLevels) {
        let time_ms = time_s * 1000.0;
        self.mesh
            .deform(levels.bass, levels.treble, time_ms, &self.field, &self.clamp);
        self.dirty = true;
    }

    /// Whether geometry changed since the last upload; reading clears it
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
