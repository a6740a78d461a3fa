//! Fixed view camera looking at the orb from +Z.

use glam::{Mat4, Vec3};

use crate::params::RenderConfig;

/// Camera system producing the view-projection matrix each frame
pub struct CameraSystem;

impl CameraSystem {
    pub fn new() -> Self {
        Self
    }

    /// Create view-projection matrix for rendering.
    ///
    /// The eye sits on +Z at `camera_distance` looking at the origin; the
    /// aspect ratio comes from the live render config, so a viewport
    /// resize is reflected on the very next frame.
    pub fn view_proj(&self, render_config: &RenderConfig) -> Mat4 {
        let eye = Vec3::new(0.0, 0.0, render_config.camera_distance);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            render_config.aspect_ratio(),
            render_config.near_plane,
            render_config.far_plane,
        );

        proj * view
    }
}

impl Default for CameraSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_proj_matrix_is_finite_and_nontrivial() {
        let camera = CameraSystem::new();
        let view_proj = camera.view_proj(&RenderConfig::default());

        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(view_proj.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_resize_changes_projection() {
        let camera = CameraSystem::new();
        let mut config = RenderConfig::default();

        let before = camera.view_proj(&config);
        config.resize(500, 1000);
        let after = camera.view_proj(&config);

        assert_ne!(before, after);
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let camera = CameraSystem::new();
        let view_proj = camera.view_proj(&RenderConfig::default());

        let clip = view_proj * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }
}
