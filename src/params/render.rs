//! Rendering and camera configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Field of view (degrees)
    /// Reference value: 45
    pub fov_degrees: f32,

    /// Near clipping plane
    pub near_plane: f32,

    /// Far clipping plane
    pub far_plane: f32,

    /// Camera distance from the orb center along +Z
    /// Reference value: 100
    pub camera_distance: f32,

    /// Orb spin speed (radians per second of wall-clock time)
    /// Reference value: 0.3 ≈ 0.005 rad/frame at 60 fps
    pub rotation_speed_rad_per_s: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 45.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            camera_distance: 100.0,
            rotation_speed_rad_per_s: 0.3,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height as f32
    }

    /// Track a viewport resize; zero dimensions are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.window_width = width;
            self.window_height = height;
        }
    }
}
