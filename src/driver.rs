//! Render driver lifecycle state machine.
//!
//! The per-frame callback is only re-scheduled while the driver is in
//! `Running`; flipping to `Disposed` before tearing down graphics
//! resources cancels the pending tick deterministically instead of
//! leaving a dangling callback.

/// Lifecycle of the scene/render driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// No scene yet, no loop running
    Idle,
    /// Scene and camera set up, loop not started
    Ready,
    /// Continuous per-frame ticking
    Running,
    /// Resources released; nothing may be scheduled
    Disposed,
}

impl DriverState {
    /// Scene construction finished (window + render system exist)
    pub fn on_scene_ready(self) -> Self {
        match self {
            DriverState::Idle => DriverState::Ready,
            other => other,
        }
    }

    /// First audio load attempt completed; the loop starts regardless of
    /// whether the load succeeded (a failed load leaves a static mesh)
    pub fn on_track_loaded(self) -> Self {
        match self {
            DriverState::Ready => DriverState::Running,
            other => other,
        }
    }

    /// Explicit teardown; terminal
    pub fn on_teardown(self) -> Self {
        DriverState::Disposed
    }

    /// Whether the next frame callback may be scheduled
    pub fn schedules_frames(&self) -> bool {
        matches!(self, DriverState::Running)
    }

    /// Whether an incoming redraw request should be honored
    pub fn accepts_redraw(&self) -> bool {
        matches!(self, DriverState::Ready | DriverState::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let state = DriverState::Idle
            .on_scene_ready()
            .on_track_loaded();
        assert_eq!(state, DriverState::Running);
        assert!(state.schedules_frames());

        let state = state.on_teardown();
        assert_eq!(state, DriverState::Disposed);
        assert!(!state.schedules_frames());
        assert!(!state.accepts_redraw());
    }

    #[test]
    fn test_track_load_before_scene_is_ignored() {
        assert_eq!(DriverState::Idle.on_track_loaded(), DriverState::Idle);
    }

    #[test]
    fn test_disposed_is_terminal() {
        let state = DriverState::Disposed;
        assert_eq!(state.on_scene_ready(), DriverState::Disposed);
        assert_eq!(state.on_track_loaded(), DriverState::Disposed);
    }

    #[test]
    fn test_ready_draws_but_does_not_self_schedule() {
        let state = DriverState::Ready;
        assert!(state.accepts_redraw());
        assert!(!state.schedules_frames());
    }
}
