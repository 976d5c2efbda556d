//! Per-frame vertex displacement: noise octaves plus audio spikes.

use crate::visual::math::Vec3;
use crate::visual::mesh::Mesh;
use crate::visual::noise::NoiseField;
use crate::visual::profile::ModeProfile;

/// How strongly the smoothed levels push the surface, 0..1.
pub fn audio_influence(smooth_rms: f32, smooth_peak: f32) -> f32 {
    (smooth_rms * 2.5 + smooth_peak * 1.2).clamp(0.0, 1.0)
}

/// Displace every vertex of `mesh` for time `t`, writing scaled positions
/// and signed displacement scalars into the caller's buffers. Pure function
/// of its inputs; the buffers are resized to the vertex count.
///
/// `aggressive` selects the fixed high-frequency third octave used by the
/// Solid mode. That branch is a deliberate special case of one preset, not
/// a per-profile parameter.
pub fn displace(
    noise: &NoiseField,
    mesh: &Mesh,
    profile: &ModeProfile,
    aggressive: bool,
    t: f32,
    influence: f32,
    positions: &mut Vec<Vec3>,
    displacements: &mut Vec<f32>,
) {
    let n_verts = mesh.vertex_count();
    positions.resize(n_verts, Vec3::new(0.0, 0.0, 0.0));
    displacements.resize(n_verts, 0.0);

    let s1 = profile.noise_scale;
    let s2 = profile.noise_scale * 2.5;
    let (s3, w3) = if aggressive {
        (8.0, 0.15)
    } else {
        (profile.noise_scale * 4.0, 0.1)
    };

    for (i, &base) in mesh.vertices.iter().enumerate() {
        // Two base octaves drift at different per-axis rates so the surface
        // never settles into a standing pattern.
        let n1 = noise.sample3(base.x * s1 + t * 0.9, base.y * s1 + t * 0.7, base.z * s1 + t * 1.1);
        let n2 = noise.sample3(base.x * s2 + t * 1.3, base.y * s2 + t * 1.7, base.z * s2 + t * 0.8);
        let n3 = noise.sample3(base.x * s3 - t * 1.5, base.y * s3 + t * 1.2, base.z * s3 + t * 1.9);

        let mut d = n1 * 0.4 + n2 * 0.2 + n3 * w3;

        // Audio-reactive spikes ride on their own fast-moving octave.
        let spike = noise.sample3(
            base.x * 2.0 + t * 2.0,
            base.y * 2.0 + t * 1.5,
            base.z * 2.0 + t * 1.0,
        );
        d += influence * profile.spike_amount * (0.5 + spike * 0.5);

        let scale = 1.0 + d * (0.25 + influence * 0.25);
        positions[i] = base.scaled(scale);
        displacements[i] = d;
    }
}
