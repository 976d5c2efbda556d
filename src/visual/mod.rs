//! The ferrofluid engine: a software-rendered, audio-reactive 3D blob.
//!
//! The engine holds no thread and schedules nothing; an external loop calls
//! `tick` once per refresh. Every tick runs mode-blend → deform → rasterize
//! strictly in sequence into the engine-owned RGBA surface.

pub mod deform;
pub mod envelope;
pub mod math;
pub mod mesh;
pub mod noise;
pub mod profile;
pub mod raster;

pub use envelope::EnvelopeSmoother;
pub use math::Vec3;
pub use mesh::Mesh;
pub use noise::NoiseField;
pub use profile::{AGGRESSIVE_MODE, MODE_COUNT, ModeBlender, ModeProfile, PROFILES, mode_name};

/// Reference frame delta when the host does not measure one (60 Hz).
pub const DEFAULT_TICK_DT: f32 = 0.016;

#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pub subdivision: u32,
    pub seed: u64,
    pub size_px: usize,
    pub mode: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            subdivision: 3,
            seed: 42,
            size_px: 256,
            mode: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Running,
}

pub struct FluidEngine {
    mesh: Mesh,
    noise: NoiseField,
    blender: ModeBlender,
    envelope: EnvelopeSmoother,
    // A switch arriving mid-tick applies atomically at the next tick start.
    pending_mode: Option<usize>,
    time: f32,
    size: usize,
    state: EngineState,
    disposed: bool,

    // Per-frame working buffers, reused across ticks.
    positions: Vec<Vec3>,
    displacements: Vec<f32>,
    projected: Vec<[f32; 3]>,
    visible: Vec<(u32, f32)>,
    pixels: Vec<u8>,
}

impl FluidEngine {
    pub fn new(cfg: EngineConfig) -> Self {
        let mesh = Mesh::build(cfg.subdivision);
        let mode = cfg.mode.min(MODE_COUNT - 1);
        let mut engine = Self {
            mesh,
            noise: NoiseField::new(cfg.seed),
            blender: ModeBlender::new(mode),
            envelope: EnvelopeSmoother::new(),
            pending_mode: None,
            time: 0.0,
            size: 0,
            state: EngineState::Stopped,
            disposed: false,
            positions: Vec::new(),
            displacements: Vec::new(),
            projected: Vec::new(),
            visible: Vec::new(),
            pixels: Vec::new(),
        };
        engine.resize(cfg.size_px);
        engine
    }

    pub fn start(&mut self) {
        if !self.disposed {
            self.state = EngineState::Running;
        }
    }

    pub fn stop(&mut self) {
        self.state = EngineState::Stopped;
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Feed raw host levels; may be called at a cadence decoupled from
    /// ticks. The next tick sees the latest smoothed values.
    pub fn set_audio_levels(&mut self, rms: f32, peak: f32) {
        self.envelope.update(rms, peak);
    }

    /// Request a mode switch; applied at the start of the next tick.
    /// Out-of-range indices clamp to the last mode.
    pub fn set_mode(&mut self, index: usize) {
        self.pending_mode = Some(index.min(MODE_COUNT - 1));
    }

    /// Square surface side in pixels; radius bounds scale with it.
    pub fn resize(&mut self, size_px: usize) {
        if self.disposed {
            return;
        }
        self.size = size_px;
        let n = size_px.saturating_mul(size_px).saturating_mul(4);
        self.pixels.resize(n, 0);
    }

    /// One frame. A no-op while stopped, disposed, or with a zero-size
    /// surface; never fails, the worst case is a skipped frame.
    pub fn tick(&mut self, dt: f32) {
        if self.disposed || self.state != EngineState::Running || self.size == 0 {
            return;
        }

        if let Some(mode) = self.pending_mode.take() {
            self.blender.select(mode);
        }
        self.blender.tick();

        let profile = *self.blender.current();
        self.time += dt * profile.noise_speed;

        let influence =
            deform::audio_influence(self.envelope.smooth_rms(), self.envelope.smooth_peak());

        deform::displace(
            &self.noise,
            &self.mesh,
            &profile,
            self.blender.target_index() == AGGRESSIVE_MODE,
            self.time,
            influence,
            &mut self.positions,
            &mut self.displacements,
        );

        raster::render(
            &mut self.pixels,
            self.size,
            &self.mesh,
            &self.positions,
            &self.displacements,
            &profile,
            influence,
            &mut self.projected,
            &mut self.visible,
        );
    }

    /// RGBA8 contents of the drawing surface, row-major, side `size()`.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Signed per-vertex displacements of the last tick.
    pub fn displacements(&self) -> &[f32] {
        &self.displacements
    }

    /// Faces that survived culling on the last tick.
    pub fn visible_face_count(&self) -> usize {
        self.visible.len()
    }

    pub fn current_profile(&self) -> &ModeProfile {
        self.blender.current()
    }

    pub fn mode_index(&self) -> usize {
        self.blender.target_index()
    }

    pub fn mode_label(&self) -> &'static str {
        mode_name(self.blender.target_index())
    }

    pub fn blend_progress(&self) -> f32 {
        self.blender.progress()
    }

    pub fn smoothed_levels(&self) -> (f32, f32) {
        (self.envelope.smooth_rms(), self.envelope.smooth_peak())
    }

    /// Back to the constructed state: time zero, envelope discharged, the
    /// selected mode applied without a transition. The surface keeps its
    /// size but is not redrawn until the next tick.
    pub fn reset(&mut self) {
        if self.disposed {
            return;
        }
        let mode = self.pending_mode.take().unwrap_or(self.blender.target_index());
        self.blender.reset(mode);
        self.envelope.reset();
        self.time = 0.0;
    }

    /// Deterministic teardown: stops the engine and releases per-frame
    /// buffers. Every call after this is a no-op.
    pub fn dispose(&mut self) {
        self.state = EngineState::Stopped;
        self.disposed = true;
        self.positions = Vec::new();
        self.displacements = Vec::new();
        self.projected = Vec::new();
        self.visible = Vec::new();
        self.pixels = Vec::new();
        self.size = 0;
    }
}
