//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Units (seconds, decibels, radians, etc.)
//! - Documented ranges and meanings
//! - Type safety where possible

mod audio;
mod orb;
mod render;

// Re-export all types
pub use audio::{ModulationMapping, PlaybackConfig, SpectrumConfig};
pub use orb::{NoiseParams, OrbGeometry, RadiusClamp};
pub use render::RenderConfig;
