//! Pulseorb - an audio-reactive orb visualizer
//!
//! Plays an audio file and deforms a wireframe icosphere to it: bass
//! swells the whole surface, treble lets a drifting noise field ripple
//! through it.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use glam::Mat4;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use pulseorb::audio::{ModulationReducer, PlaybackSystem, SpectrumAnalyzer};
use pulseorb::camera::CameraSystem;
use pulseorb::cli::Args;
use pulseorb::driver::DriverState;
use pulseorb::orb::OrbSystem;
use pulseorb::params::{ModulationMapping, RenderConfig, SpectrumConfig};
use pulseorb::rendering::{RenderSystem, Uniforms};

/// Seek step per arrow-key press, as a fraction of track duration
const SEEK_STEP: f32 = 0.05;

/// Volume step per arrow-key press
const VOLUME_STEP: f32 = 0.05;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Pipeline systems
    orb: OrbSystem,
    camera: CameraSystem,
    playback: PlaybackSystem,
    analyzer: SpectrumAnalyzer,
    reducer: ModulationReducer,

    // Configuration and lifecycle
    args: Args,
    render_config: RenderConfig,
    state: DriverState,

    // Time tracking
    start_time: Instant,
}

impl App {
    fn new(args: Args) -> Result<Self> {
        let orb = OrbSystem::new(args.orb_geometry(), args.noise_params(), args.radius_clamp());
        let playback = PlaybackSystem::new(args.playback_config());
        let analyzer = SpectrumAnalyzer::new(SpectrumConfig::default(), playback.tap_buffer())?;

        println!("Noise seed: {}", orb.noise_seed());

        Ok(Self {
            window: None,
            render_system: None,
            orb,
            camera: CameraSystem::new(),
            playback,
            analyzer,
            reducer: ModulationReducer::new(ModulationMapping::default()),
            args,
            render_config: RenderConfig::default(),
            state: DriverState::Idle,
            start_time: Instant::now(),
        })
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        // The cancellable next-frame schedule: nothing is requested once
        // the driver leaves Running
        if self.state.schedules_frames() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        // Create window
        let window_attributes = Window::default_attributes()
            .with_title("Pulseorb - Audio-Reactive Orb")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                eprintln!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        // Initialize rendering system
        let render_system =
            match pollster::block_on(RenderSystem::new(Arc::clone(&window), &self.orb.mesh)) {
                Ok(render_system) => render_system,
                Err(e) => {
                    eprintln!("Failed to initialize renderer: {}", e);
                    event_loop.exit();
                    return;
                }
            };

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.state = self.state.on_scene_ready();

        // Load the track; a rejected load is not fatal, the loop still
        // runs with a static mesh
        match self.playback.load(&self.args.track) {
            Ok(()) => println!("Playing: {}", self.args.track.display()),
            Err(e) => eprintln!("Failed to load {}: {}", self.args.track.display(), e),
        }
        self.state = self.state.on_track_loaded();

        println!("\nPulseorb is running!");
        println!("Space: play/pause  Left/Right: seek  Up/Down: volume  Esc: quit\n");
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.state = self.state.on_teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.render_config.resize(size.width, size.height);
                if let Some(render_system) = &mut self.render_system {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key),
            WindowEvent::RedrawRequested => {
                if self.state.accepts_redraw() {
                    self.render_frame();
                }
            }
            _ => {}
        }
    }
}

impl App {
    fn handle_key(&mut self, event_loop: &winit::event_loop::ActiveEventLoop, key: KeyCode) {
        match key {
            KeyCode::Escape => {
                self.state = self.state.on_teardown();
                event_loop.exit();
            }
            KeyCode::Space => self.playback.toggle_play(),
            KeyCode::ArrowLeft => self
                .playback
                .seek(self.playback.position_fraction() - SEEK_STEP),
            KeyCode::ArrowRight => self
                .playback
                .seek(self.playback.position_fraction() + SEEK_STEP),
            KeyCode::ArrowUp => self.playback.set_volume(self.playback.volume() + VOLUME_STEP),
            KeyCode::ArrowDown => self.playback.set_volume(self.playback.volume() - VOLUME_STEP),
            _ => {}
        }
    }

    /// Render a single frame: sample -> reduce -> deform -> draw.
    /// Runs to completion before the next tick can be scheduled.
    fn render_frame(&mut self) {
        let Some(ref render_system) = self.render_system else {
            return;
        };

        // Get current time
        let time_s = self.start_time.elapsed().as_secs_f32();

        // Current spectrum reduced to the two modulation scalars
        let levels = self.reducer.reduce(self.analyzer.sample());

        // Deform the orb
        self.orb.update(time_s, levels);

        // Spin the orb at a wall-clock rate, frame rate independent
        let model = Mat4::from_rotation_y(time_s * self.render_config.rotation_speed_rad_per_s);
        let mvp = self.camera.view_proj(&self.render_config) * model;

        // Re-upload geometry only when a deform pass touched it
        if self.orb.take_dirty() {
            render_system.update_vertices(&self.orb.mesh.vertices);
        }

        render_system.update_uniforms(&Uniforms {
            mvp: mvp.to_cols_array_2d(),
            time: time_s,
            bass: levels.bass,
            treble: levels.treble,
            _padding: 0.0,
        });

        // Render
        match render_system.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_system.reconfigure();
            }
            Err(e) => eprintln!("Render error: {:?}", e),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Pulseorb - audio-reactive orb visualizer");
    println!("Initializing systems...\n");

    let mut app = App::new(args)?;
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
