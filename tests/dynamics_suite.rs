use ferroviz::visual::deform;
use ferroviz::visual::profile::{MODE_COUNT, ModeBlender, PROFILES};
use ferroviz::visual::EnvelopeSmoother;

#[test]
fn envelope_attack_is_instant() {
    let mut env = EnvelopeSmoother::new();
    let (rms, peak) = env.update(0.8, 1.0);
    assert_eq!(rms, 0.8);
    assert_eq!(peak, 1.0);
}

#[test]
fn envelope_release_decays_geometrically() {
    let mut env = EnvelopeSmoother::new();
    env.update(1.0, 1.0);
    let mut prev = 1.0f32;
    for _ in 0..40 {
        let (rms, _) = env.update(0.0, 0.0);
        assert!((rms - prev * 0.85).abs() < 1e-6);
        assert!(rms >= 0.0);
        prev = rms;
    }
}

#[test]
fn envelope_silence_never_goes_negative() {
    let mut env = EnvelopeSmoother::new();
    env.update(0.5, 2.0);
    for _ in 0..500 {
        let (rms, peak) = env.update(0.0, 0.0);
        assert!(rms >= 0.0 && peak >= 0.0);
    }
    let (rms, peak) = env.update(0.0, 0.0);
    assert!(rms < 1e-6 && peak < 1e-6);
}

#[test]
fn envelope_tracks_rising_input_exactly() {
    // With instant attack, a monotonically rising signal is passed through.
    let mut env = EnvelopeSmoother::new();
    for i in 1..=10 {
        let v = i as f32 * 0.1;
        let (rms, _) = env.update(v, v);
        assert_eq!(rms, v);
    }
}

#[test]
fn envelope_reset_discharges() {
    let mut env = EnvelopeSmoother::new();
    env.update(1.0, 3.0);
    env.reset();
    assert_eq!(env.smooth_rms(), 0.0);
    assert_eq!(env.smooth_peak(), 0.0);
}

#[test]
fn audio_influence_clamps_to_unit_range() {
    assert_eq!(deform::audio_influence(0.0, 0.0), 0.0);
    assert_eq!(deform::audio_influence(2.0, 2.0), 1.0);
    let mid = deform::audio_influence(0.1, 0.1);
    assert!((mid - 0.37).abs() < 1e-6);
}

#[test]
fn blend_progress_rises_monotonically_to_one() {
    let mut blender = ModeBlender::new(0);
    assert_eq!(blender.progress(), 1.0);

    blender.select(1);
    assert_eq!(blender.progress(), 0.0);

    let mut prev = 0.0f32;
    for _ in 0..49 {
        blender.tick();
        assert!(blender.progress() >= prev);
        prev = blender.progress();
    }
    assert!(blender.progress() < 1.0, "completed too early");

    for _ in 0..11 {
        blender.tick();
    }
    assert_eq!(blender.progress(), 1.0);

    blender.tick();
    assert_eq!(blender.progress(), 1.0, "progress must hold at 1");
}

#[test]
fn blend_converges_to_the_target_profile() {
    let mut blender = ModeBlender::new(0);
    blender.select(1);
    for _ in 0..200 {
        blender.tick();
    }
    let got = blender.current();
    let want = &PROFILES[1];
    for ch in 0..3 {
        assert!(
            (got.base_color[ch] - want.base_color[ch]).abs() < 1.0,
            "base channel {ch}: {} vs {}",
            got.base_color[ch],
            want.base_color[ch]
        );
        assert!((got.glow_color[ch] - want.glow_color[ch]).abs() < 1.0);
    }
    assert!((got.noise_scale - want.noise_scale).abs() < 1e-3);
    assert!((got.spike_amount - want.spike_amount).abs() < 1e-3);
    assert!((got.specular_exponent - want.specular_exponent).abs() < 1e-2);
}

#[test]
fn blend_never_snaps_mid_transition() {
    let mut blender = ModeBlender::new(0);
    blender.select(2);
    let mut prev = blender.current().base_color[0];
    for _ in 0..100 {
        blender.tick();
        let cur = blender.current().base_color[0];
        // The red channel moves 255 -> 226; each step must be a small glide.
        assert!((cur - prev).abs() < 8.0, "channel jumped {prev} -> {cur}");
        prev = cur;
    }
}

#[test]
fn reselecting_mid_blend_starts_from_the_interpolated_state() {
    let mut blender = ModeBlender::new(0);
    blender.select(1);
    for _ in 0..10 {
        blender.tick();
    }
    let mid = *blender.current();
    blender.select(2);
    assert_eq!(blender.progress(), 0.0);
    assert_eq!(blender.current().base_color, mid.base_color);
}

#[test]
fn blender_clamps_out_of_range_selection() {
    let mut blender = ModeBlender::new(0);
    blender.select(MODE_COUNT + 5);
    assert_eq!(blender.target_index(), MODE_COUNT - 1);
}
