use ferroviz::visual::{
    DEFAULT_TICK_DT, EngineConfig, EngineState, FluidEngine, MODE_COUNT, Mesh, NoiseField,
    PROFILES, deform, raster,
};

fn test_config() -> EngineConfig {
    EngineConfig {
        subdivision: 3,
        seed: 42,
        size_px: 64,
        mode: 0,
    }
}

#[test]
fn culling_keeps_roughly_the_front_hemisphere() {
    let mesh = Mesh::build(3);
    let mut visible = Vec::new();
    raster::cull_and_sort(&mesh.faces, &mesh.vertices, &mut visible);

    // The icosphere is centrally symmetric, so faces pair up front/back;
    // only faces edge-on to the view can tip either way.
    let half = mesh.face_count() as i64 / 2;
    let n = visible.len() as i64;
    assert!((n - half).abs() <= 2, "visible {n}, expected ~{half}");

    for pair in visible.windows(2) {
        assert!(pair[0].1 <= pair[1].1, "painter order not ascending");
    }
}

#[test]
fn displacement_is_reproducible_across_instances() {
    let mut a = FluidEngine::new(test_config());
    let mut b = FluidEngine::new(test_config());
    a.start();
    b.start();
    a.tick(0.0);
    b.tick(0.0);

    assert_eq!(a.displacements().len(), a.mesh().vertex_count());
    assert_eq!(a.displacements().len(), b.displacements().len());
    for (da, db) in a.displacements().iter().zip(b.displacements()) {
        assert_eq!(da.to_bits(), db.to_bits());
    }
    assert_eq!(a.pixels(), b.pixels());
}

#[test]
fn silent_engine_matches_a_pure_noise_displace() {
    let mut engine = FluidEngine::new(test_config());
    engine.start();
    engine.tick(0.0);

    let noise = NoiseField::new(42);
    let mesh = Mesh::build(3);
    let mut positions = Vec::new();
    let mut displacements = Vec::new();
    deform::displace(
        &noise,
        &mesh,
        &PROFILES[0],
        false,
        0.0,
        0.0,
        &mut positions,
        &mut displacements,
    );

    for (de, dm) in engine.displacements().iter().zip(&displacements) {
        assert_eq!(de.to_bits(), dm.to_bits());
    }
}

#[test]
fn solid_mode_keeps_its_fixed_deform_octave() {
    // Solid's third octave is pinned at scale 8.0 / weight 0.15 regardless
    // of the profile's own noise scale; the other modes derive theirs.
    let mut engine = FluidEngine::new(EngineConfig {
        mode: 2,
        ..test_config()
    });
    engine.start();
    engine.tick(0.0);

    let noise = NoiseField::new(42);
    let mesh = Mesh::build(3);
    let mut positions = Vec::new();
    let mut pinned = Vec::new();
    deform::displace(
        &noise,
        &mesh,
        &PROFILES[2],
        true,
        0.0,
        0.0,
        &mut positions,
        &mut pinned,
    );
    for (de, dp) in engine.displacements().iter().zip(&pinned) {
        assert_eq!(de.to_bits(), dp.to_bits());
    }

    let mut derived = Vec::new();
    deform::displace(
        &noise,
        &mesh,
        &PROFILES[2],
        false,
        0.0,
        0.0,
        &mut positions,
        &mut derived,
    );
    assert!(
        pinned.iter().zip(&derived).any(|(a, b)| a != b),
        "pinned octave made no difference"
    );
}

#[test]
fn mode_switch_settles_on_the_target_colors() {
    let mut engine = FluidEngine::new(test_config());
    engine.start();
    engine.set_mode(1);
    for _ in 0..200 {
        engine.tick(DEFAULT_TICK_DT);
    }
    assert_eq!(engine.mode_index(), 1);
    assert_eq!(engine.blend_progress(), 1.0);
    let got = engine.current_profile();
    for ch in 0..3 {
        assert!((got.base_color[ch] - PROFILES[1].base_color[ch]).abs() < 1.0);
    }
}

#[test]
fn out_of_range_mode_clamps_to_last() {
    let mut engine = FluidEngine::new(test_config());
    engine.start();
    engine.set_mode(99);
    engine.tick(DEFAULT_TICK_DT);
    assert_eq!(engine.mode_index(), MODE_COUNT - 1);
}

#[test]
fn stopped_engine_skips_ticks() {
    let mut engine = FluidEngine::new(test_config());
    engine.tick(DEFAULT_TICK_DT);
    assert!(engine.displacements().is_empty());
    assert_eq!(engine.state(), EngineState::Stopped);

    engine.start();
    engine.tick(DEFAULT_TICK_DT);
    assert!(!engine.displacements().is_empty());

    engine.stop();
    let frozen: Vec<u8> = engine.pixels().to_vec();
    engine.set_mode(1);
    engine.tick(DEFAULT_TICK_DT);
    assert_eq!(engine.pixels(), &frozen[..], "stopped tick redrew");
}

#[test]
fn zero_size_surface_is_a_noop() {
    let mut engine = FluidEngine::new(EngineConfig {
        size_px: 0,
        ..test_config()
    });
    engine.start();
    engine.tick(DEFAULT_TICK_DT);
    assert!(engine.displacements().is_empty());
    assert!(engine.pixels().is_empty());
}

#[test]
fn dispose_is_terminal() {
    let mut engine = FluidEngine::new(test_config());
    engine.start();
    engine.tick(DEFAULT_TICK_DT);
    engine.dispose();
    assert!(engine.pixels().is_empty());
    assert_eq!(engine.size(), 0);

    engine.start();
    assert_eq!(engine.state(), EngineState::Stopped);
    engine.tick(DEFAULT_TICK_DT);
    assert!(engine.displacements().is_empty());
}

#[test]
fn tick_paints_the_blob_into_the_surface() {
    let size = 96;
    let mut engine = FluidEngine::new(EngineConfig {
        size_px: size,
        ..test_config()
    });
    engine.start();
    engine.tick(DEFAULT_TICK_DT);

    let px = engine.pixels();
    assert_eq!(px.len(), size * size * 4);

    let center = ((size / 2) * size + size / 2) * 4;
    assert_ne!(
        [px[center], px[center + 1], px[center + 2]],
        [6, 8, 12],
        "center pixel still background"
    );
    assert_eq!(px[center + 3], 255);

    // Corners sit outside every layer and keep the clear color.
    assert_eq!([px[0], px[1], px[2]], [6, 8, 12]);
}

#[test]
fn audio_widens_the_blob() {
    assert_eq!(raster::base_radius(100, 0.0), 30.0);
    assert_eq!(raster::base_radius(100, 1.0), 36.0);

    let mut engine = FluidEngine::new(test_config());
    engine.start();
    engine.set_audio_levels(1.0, 1.0);
    assert_eq!(engine.smoothed_levels(), (1.0, 1.0));
}

#[test]
fn reset_restarts_the_clock() {
    let mut loud = FluidEngine::new(test_config());
    loud.start();
    loud.set_audio_levels(0.8, 0.9);
    for _ in 0..30 {
        loud.tick(DEFAULT_TICK_DT);
    }
    loud.reset();
    loud.tick(0.0);

    let mut fresh = FluidEngine::new(test_config());
    fresh.start();
    fresh.tick(0.0);

    for (da, db) in loud.displacements().iter().zip(fresh.displacements()) {
        assert_eq!(da.to_bits(), db.to_bits());
    }
}

#[test]
fn visible_faces_update_each_tick() {
    let mut engine = FluidEngine::new(test_config());
    engine.start();
    engine.tick(DEFAULT_TICK_DT);
    let n = engine.visible_face_count();
    assert!(n > 0 && n < engine.mesh().face_count());
}
