//! Orb mesh construction and audio-reactive deformation.

mod mesh;
mod system;

// Re-export public types
pub use mesh::{OrbMesh, Vertex};
pub use system::OrbSystem;
