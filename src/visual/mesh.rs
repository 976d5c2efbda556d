//! Icosphere construction.
//!
//! The mesh is built once at a fixed subdivision level and its topology is
//! read-only afterwards; every per-frame quantity lives in transient buffers
//! owned by the engine, so the shared-edge graph needs no pointers, just an
//! arena of vertices plus index triples.

use crate::visual::math::Vec3;
use std::collections::HashMap;

pub struct Mesh {
    /// Unit-sphere base positions. For a unit sphere the vertex normal is
    /// the position itself.
    pub vertices: Vec<Vec3>,
    /// Counter-clockwise (viewed from outside) vertex index triples.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Builds the icosphere: a regular icosahedron subdivided `level` times,
    /// new vertices renormalized onto the unit sphere. Pure function of
    /// `level`: vertices = 2 + 10·4^level, faces = 20·4^level.
    pub fn build(level: u32) -> Mesh {
        let phi = (1.0 + 5.0f32.sqrt()) / 2.0;

        let mut vertices: Vec<Vec3> = [
            (-1.0, phi, 0.0),
            (1.0, phi, 0.0),
            (-1.0, -phi, 0.0),
            (1.0, -phi, 0.0),
            (0.0, -1.0, phi),
            (0.0, 1.0, phi),
            (0.0, -1.0, -phi),
            (0.0, 1.0, -phi),
            (phi, 0.0, -1.0),
            (phi, 0.0, 1.0),
            (-phi, 0.0, -1.0),
            (-phi, 0.0, 1.0),
        ]
        .iter()
        .map(|&(x, y, z)| Vec3::new(x, y, z).normalized())
        .collect();

        let mut faces: Vec<[u32; 3]> = vec![
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];

        for _ in 0..level {
            let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
            let mut next = Vec::with_capacity(faces.len() * 4);
            for [a, b, c] in faces {
                let ab = edge_midpoint(&mut vertices, &mut midpoints, a, b);
                let bc = edge_midpoint(&mut vertices, &mut midpoints, b, c);
                let ca = edge_midpoint(&mut vertices, &mut midpoints, c, a);
                next.push([a, ab, ca]);
                next.push([b, bc, ab]);
                next.push([c, ca, bc]);
                next.push([ab, bc, ca]);
            }
            faces = next;
        }

        Mesh { vertices, faces }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Midpoint of an undirected edge, memoized so shared edges produce a single
/// vertex. The key sorts the endpoints; direction does not matter.
fn edge_midpoint(
    vertices: &mut Vec<Vec3>,
    cache: &mut HashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let key = if a < b { (a, b) } else { (b, a) };
    if let Some(&idx) = cache.get(&key) {
        return idx;
    }
    let mid = vertices[a as usize]
        .midpoint(vertices[b as usize])
        .normalized();
    let idx = vertices.len() as u32;
    vertices.push(mid);
    cache.insert(key, idx);
    idx
}
