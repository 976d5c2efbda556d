//! The three visual modes and the morph state between them.
//!
//! A mode is a bundle of style constants; switching never snaps. The blender
//! keeps one continuously interpolated profile and glides it toward the
//! selected target a little every tick.

use crate::visual::math::lerp;

pub const MODE_COUNT: usize = 3;

/// Progress advances by this much per tick; ~50 ticks to completion.
const PROGRESS_STEP: f32 = 0.02;
/// Fraction of the remaining gap covered per tick at full ease.
const GLIDE: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeProfile {
    pub hue_base: f32,
    pub saturation: f32,
    pub noise_speed: f32,
    pub noise_scale: f32,
    pub spike_amount: f32,
    pub glow_intensity: f32,
    pub specular_exponent: f32,
    pub base_color: [f32; 3],
    pub glow_color: [f32; 3],
}

/// Built-in modes. Hue identities follow the plugin UI: Tube is the orange
/// house style, Tape shifts gold, Solid sits in the red end and is the
/// spiky, aggressive one.
pub const PROFILES: [ModeProfile; MODE_COUNT] = [
    // Tube
    ModeProfile {
        hue_base: 16.0,
        saturation: 0.86,
        noise_speed: 0.6,
        noise_scale: 1.8,
        spike_amount: 0.55,
        glow_intensity: 0.9,
        specular_exponent: 18.0,
        base_color: [255.0, 107.0, 53.0],
        glow_color: [255.0, 60.0, 30.0],
    },
    // Tape
    ModeProfile {
        hue_base: 41.0,
        saturation: 0.74,
        noise_speed: 0.42,
        noise_scale: 1.4,
        spike_amount: 0.34,
        glow_intensity: 0.72,
        specular_exponent: 9.0,
        base_color: [232.0, 178.0, 66.0],
        glow_color: [205.0, 140.0, 42.0],
    },
    // Solid
    ModeProfile {
        hue_base: -4.0,
        saturation: 0.92,
        noise_speed: 0.85,
        noise_scale: 2.3,
        spike_amount: 0.82,
        glow_intensity: 1.05,
        specular_exponent: 28.0,
        base_color: [226.0, 54.0, 38.0],
        glow_color: [185.0, 32.0, 24.0],
    },
];

/// Index of the mode that gets the fixed high-frequency deform octave.
pub const AGGRESSIVE_MODE: usize = 2;

pub fn mode_name(index: usize) -> &'static str {
    match index {
        0 => "Tube",
        1 => "Tape",
        _ => "Solid",
    }
}

pub struct ModeBlender {
    current: ModeProfile,
    target: usize,
    progress: f32,
}

impl ModeBlender {
    pub fn new(initial: usize) -> Self {
        let idx = initial.min(MODE_COUNT - 1);
        Self {
            current: PROFILES[idx],
            target: idx,
            progress: 1.0,
        }
    }

    /// Begin morphing toward `index`. The current interpolated profile is
    /// the new transition start; out-of-range indices clamp rather than
    /// fail (caller-contract defense).
    pub fn select(&mut self, index: usize) {
        self.target = index.min(MODE_COUNT - 1);
        self.progress = 0.0;
    }

    /// One blend step. Progress rises monotonically to 1 and holds; the
    /// eased glide keeps converging on the target so a long-idle blender
    /// sits within float epsilon of it.
    pub fn tick(&mut self) {
        self.progress = (self.progress + PROGRESS_STEP).min(1.0);
        let inv = 1.0 - self.progress;
        let eased = 1.0 - inv * inv * inv;
        let t = eased * GLIDE;
        let target = &PROFILES[self.target];
        let c = &mut self.current;
        c.hue_base = lerp(c.hue_base, target.hue_base, t);
        c.saturation = lerp(c.saturation, target.saturation, t);
        c.noise_speed = lerp(c.noise_speed, target.noise_speed, t);
        c.noise_scale = lerp(c.noise_scale, target.noise_scale, t);
        c.spike_amount = lerp(c.spike_amount, target.spike_amount, t);
        c.glow_intensity = lerp(c.glow_intensity, target.glow_intensity, t);
        c.specular_exponent = lerp(c.specular_exponent, target.specular_exponent, t);
        for i in 0..3 {
            c.base_color[i] = lerp(c.base_color[i], target.base_color[i], t);
            c.glow_color[i] = lerp(c.glow_color[i], target.glow_color[i], t);
        }
    }

    pub fn current(&self) -> &ModeProfile {
        &self.current
    }

    pub fn target_index(&self) -> usize {
        self.target
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn reset(&mut self, index: usize) {
        let idx = index.min(MODE_COUNT - 1);
        self.current = PROFILES[idx];
        self.target = idx;
        self.progress = 1.0;
    }
}
