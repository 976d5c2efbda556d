//! Software rasterizer: projection, culling, painter sort, per-face shading
//! and the layered glow composite, all into an RGBA8 square surface.

use crate::visual::math::Vec3;
use crate::visual::mesh::Mesh;
use crate::visual::profile::ModeProfile;
use std::cmp::Ordering;

const BACKGROUND: [u8; 3] = [6, 8, 12];

/// Key light, upper-left and slightly toward the viewer.
pub fn light_dir() -> Vec3 {
    Vec3::new(-0.5, 0.7, 0.6).normalized()
}

/// Orthographic view straight down +z; no perspective divide anywhere.
pub fn view_dir() -> Vec3 {
    Vec3::new(0.0, 0.0, 1.0)
}

/// Blob radius in pixels for the current audio influence. The band scales
/// with the surface so the blob keeps its proportion on resize.
pub fn base_radius(size: usize, influence: f32) -> f32 {
    let min_r = size as f32 * 0.30;
    let max_r = size as f32 * 0.36;
    min_r + (max_r - min_r) * influence
}

/// Screen-space x,y around the surface center; z kept for depth only.
pub fn project(positions: &[Vec3], radius: f32, cx: f32, cy: f32, out: &mut Vec<[f32; 3]>) {
    out.clear();
    out.reserve(positions.len());
    for p in positions {
        out.push([cx + p.x * radius, cy - p.y * radius, p.z]);
    }
}

/// Backface cull + painter sort. A face survives when its cross-product
/// normal points toward the viewer (z > 0); survivors are ordered by
/// ascending average vertex z so the farthest paint first.
pub fn cull_and_sort(faces: &[[u32; 3]], positions: &[Vec3], visible: &mut Vec<(u32, f32)>) {
    visible.clear();
    for (fi, &[a, b, c]) in faces.iter().enumerate() {
        let pa = positions[a as usize];
        let pb = positions[b as usize];
        let pc = positions[c as usize];
        let normal = pb.sub(pa).cross(pc.sub(pa));
        if normal.z <= 0.0 {
            continue;
        }
        let depth = (pa.z + pb.z + pc.z) * (1.0 / 3.0);
        visible.push((fi as u32, depth));
    }
    visible.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
}

/// Diffuse + specular face color. `heat` brightens displaced, audio-pushed
/// regions so spikes read hotter than the resting surface.
pub fn shade_face(
    normal: Vec3,
    avg_displacement: f32,
    influence: f32,
    profile: &ModeProfile,
) -> [u8; 3] {
    let light = light_dir();
    let diffuse = normal.dot(light).max(0.0);
    let half = light.add(view_dir()).normalized();
    let specular = normal.dot(half).max(0.0).powf(profile.specular_exponent);

    let heat = 0.5 + avg_displacement * 0.8 + influence * 0.3;
    let lit = 0.25 + diffuse * 0.75;

    let mut out = [0u8; 3];
    for ch in 0..3 {
        let c = profile.base_color[ch] * lit * heat + 255.0 * specular * 0.85;
        out[ch] = c.clamp(0.0, 255.0) as u8;
    }
    out
}

pub fn render(
    px: &mut [u8],
    size: usize,
    mesh: &Mesh,
    positions: &[Vec3],
    displacements: &[f32],
    profile: &ModeProfile,
    influence: f32,
    projected: &mut Vec<[f32; 3]>,
    visible: &mut Vec<(u32, f32)>,
) {
    let frame_len = size.saturating_mul(size).saturating_mul(4);
    if px.len() < frame_len || size == 0 {
        return;
    }

    clear(px, size);

    let cx = size as f32 * 0.5;
    let cy = size as f32 * 0.5;
    let radius = base_radius(size, influence);

    project(positions, radius, cx, cy, projected);
    cull_and_sort(&mesh.faces, positions, visible);

    // Layer 1: outer radial glow, widened by audio.
    radial_glow(
        px,
        size,
        cx,
        cy,
        radius * (1.55 + influence * 0.45),
        profile.glow_color,
        (0.35 * profile.glow_intensity).min(1.0),
        false,
    );

    // Layer 2: shaded triangles, farthest first.
    for &(fi, _) in visible.iter() {
        let [a, b, c] = mesh.faces[fi as usize];
        let (ai, bi, ci) = (a as usize, b as usize, c as usize);
        let normal = positions[bi]
            .sub(positions[ai])
            .cross(positions[ci].sub(positions[ai]))
            .normalized();
        let avg_disp =
            (displacements[ai] + displacements[bi] + displacements[ci]) * (1.0 / 3.0);
        let color = shade_face(normal, avg_disp, influence, profile);
        fill_triangle(px, size, projected[ai], projected[bi], projected[ci], color);
    }

    // Layer 3: fixed specular highlight toward the key light.
    radial_glow(
        px,
        size,
        cx - radius * 0.35,
        cy - radius * 0.35,
        radius * 0.45,
        [255.0, 255.0, 255.0],
        0.30,
        false,
    );

    // Layer 4: additive core glow.
    let core = [
        profile.glow_color[0] * profile.glow_intensity,
        profile.glow_color[1] * profile.glow_intensity,
        profile.glow_color[2] * profile.glow_intensity,
    ];
    radial_glow(px, size, cx, cy, radius * 0.6, core, 0.45, true);
}

fn clear(px: &mut [u8], size: usize) {
    for p in px.chunks_exact_mut(4).take(size * size) {
        p[0] = BACKGROUND[0];
        p[1] = BACKGROUND[1];
        p[2] = BACKGROUND[2];
        p[3] = 255;
    }
}

/// Radial gradient disc. Alpha falls off quadratically toward the rim;
/// `additive` saturating-adds instead of alpha blending.
fn radial_glow(
    px: &mut [u8],
    size: usize,
    cx: f32,
    cy: f32,
    radius: f32,
    color: [f32; 3],
    peak_alpha: f32,
    additive: bool,
) {
    if radius <= 0.0 {
        return;
    }
    let x0 = ((cx - radius).floor().max(0.0)) as usize;
    let y0 = ((cy - radius).floor().max(0.0)) as usize;
    let x1 = ((cx + radius).ceil() as usize).min(size.saturating_sub(1));
    let y1 = ((cy + radius).ceil() as usize).min(size.saturating_sub(1));
    let inv_r = 1.0 / radius;

    for y in y0..=y1 {
        let dy = y as f32 + 0.5 - cy;
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - cx;
            let d = (dx * dx + dy * dy).sqrt() * inv_r;
            if d >= 1.0 {
                continue;
            }
            let fall = (1.0 - d) * (1.0 - d);
            let a = peak_alpha * fall;
            let i = (y * size + x) * 4;
            if additive {
                for ch in 0..3 {
                    let add = (color[ch] * a) as u16;
                    px[i + ch] = (px[i + ch] as u16 + add).min(255) as u8;
                }
            } else {
                for ch in 0..3 {
                    let cur = px[i + ch] as f32;
                    px[i + ch] = (cur * (1.0 - a) + color[ch] * a) as u8;
                }
            }
        }
    }
}

/// Flat-shaded triangle fill via edge functions over the bounding box.
fn fill_triangle(px: &mut [u8], size: usize, a: [f32; 3], b: [f32; 3], c: [f32; 3], color: [u8; 3]) {
    let min_x = a[0].min(b[0]).min(c[0]).floor().max(0.0) as usize;
    let min_y = a[1].min(b[1]).min(c[1]).floor().max(0.0) as usize;
    let max_x = (a[0].max(b[0]).max(c[0]).ceil() as usize).min(size.saturating_sub(1));
    let max_y = (a[1].max(b[1]).max(c[1]).ceil() as usize).min(size.saturating_sub(1));
    if min_x > max_x || min_y > max_y {
        return;
    }

    let area = edge(a, b, c);
    if area.abs() < 1e-6 {
        return;
    }
    // Winding in screen space depends on the y flip; test against the
    // triangle's own orientation instead of assuming one.
    let sign = area.signum();

    for y in min_y..=max_y {
        let pyf = y as f32 + 0.5;
        for x in min_x..=max_x {
            let p = [x as f32 + 0.5, pyf, 0.0];
            let w0 = edge(a, b, p) * sign;
            let w1 = edge(b, c, p) * sign;
            let w2 = edge(c, a, p) * sign;
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                let i = (y * size + x) * 4;
                px[i] = color[0];
                px[i + 1] = color[1];
                px[i + 2] = color[2];
                px[i + 3] = 255;
            }
        }
    }
}

fn edge(a: [f32; 3], b: [f32; 3], p: [f32; 3]) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}
