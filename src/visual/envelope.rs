//! Attack/release envelope follower over the two host-supplied audio scalars.

// Instant attack so transients land on the very next frame; the release
// matches a natural drum decay (same constants the plugin UI uses).
const ATTACK: f32 = 1.0;
const RELEASE: f32 = 0.15;

#[derive(Clone, Copy, Debug, Default)]
pub struct EnvelopeSmoother {
    raw_rms: f32,
    raw_peak: f32,
    smooth_rms: f32,
    smooth_peak: f32,
}

impl EnvelopeSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw level sample at host cadence. Inputs are expected in
    /// [0, ~3] and are deliberately not clamped.
    pub fn update(&mut self, raw_rms: f32, raw_peak: f32) -> (f32, f32) {
        self.raw_rms = raw_rms;
        self.raw_peak = raw_peak;
        self.smooth_rms = follow(self.smooth_rms, raw_rms);
        self.smooth_peak = follow(self.smooth_peak, raw_peak);
        (self.smooth_rms, self.smooth_peak)
    }

    pub fn smooth_rms(&self) -> f32 {
        self.smooth_rms
    }

    pub fn smooth_peak(&self) -> f32 {
        self.smooth_peak
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn follow(smoothed: f32, raw: f32) -> f32 {
    let coeff = if raw > smoothed { ATTACK } else { RELEASE };
    smoothed + (raw - smoothed) * coeff
}
