//! Seeded 3D gradient noise on a simplex lattice.
//!
//! Built from scratch so the blob animation is bit-reproducible for a fixed
//! seed: same permutation table, same gradients, no platform-dependent
//! library behavior. Each call is allocation-free and O(1); the deformer
//! samples it several times per vertex per frame.

const SKEW: f32 = 1.0 / 3.0;
const UNSKEW: f32 = 1.0 / 6.0;

// 12 mid-edge gradients of a cube; isotropic enough for a blob surface.
const GRAD: [[f32; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

pub struct NoiseField {
    // 256-entry seeded permutation, duplicated so `perm[i + 256]` never wraps.
    perm: [u8; 512],
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        let mut table = [0u8; 256];
        for (i, v) in table.iter_mut().enumerate() {
            *v = i as u8;
        }
        let mut rng = fastrand::Rng::with_seed(seed);
        // Fisher-Yates over the full table.
        for i in (1..256usize).rev() {
            let j = rng.usize(..=i);
            table.swap(i, j);
        }

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&table);
        perm[256..].copy_from_slice(&table);
        Self { perm }
    }

    fn grad_index(&self, i: i32, j: i32, k: i32) -> usize {
        let p = &self.perm;
        let idx = (i & 255) as usize;
        let jdx = (j & 255) as usize;
        let kdx = (k & 255) as usize;
        (p[idx + p[jdx + p[kdx] as usize] as usize] % 12) as usize
    }

    /// Sample the field at (x, y, z). Output is continuous and stays in
    /// roughly [-1, 1] (never outside [-1.2, 1.2]).
    pub fn sample3(&self, x: f32, y: f32, z: f32) -> f32 {
        // Skew into simplex cell space and find the containing cell origin.
        let s = (x + y + z) * SKEW;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let k = (z + s).floor();

        let t = (i + j + k) * UNSKEW;
        let x0 = x - (i - t);
        let y0 = y - (j - t);
        let z0 = z - (k - t);

        // Rank the offsets to pick which of the six simplices we are in.
        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - i1 as f32 + UNSKEW;
        let y1 = y0 - j1 as f32 + UNSKEW;
        let z1 = z0 - k1 as f32 + UNSKEW;
        let x2 = x0 - i2 as f32 + 2.0 * UNSKEW;
        let y2 = y0 - j2 as f32 + 2.0 * UNSKEW;
        let z2 = z0 - k2 as f32 + 2.0 * UNSKEW;
        let x3 = x0 - 1.0 + 3.0 * UNSKEW;
        let y3 = y0 - 1.0 + 3.0 * UNSKEW;
        let z3 = z0 - 1.0 + 3.0 * UNSKEW;

        let ib = i as i32;
        let jb = j as i32;
        let kb = k as i32;

        let mut total = 0.0f32;
        let corners = [
            (x0, y0, z0, self.grad_index(ib, jb, kb)),
            (x1, y1, z1, self.grad_index(ib + i1, jb + j1, kb + k1)),
            (x2, y2, z2, self.grad_index(ib + i2, jb + j2, kb + k2)),
            (x3, y3, z3, self.grad_index(ib + 1, jb + 1, kb + 1)),
        ];
        for (dx, dy, dz, gi) in corners {
            let w = 0.6 - dx * dx - dy * dy - dz * dz;
            if w > 0.0 {
                let g = GRAD[gi];
                let w2 = w * w;
                total += w2 * w2 * (g[0] * dx + g[1] * dy + g[2] * dz);
            }
        }

        // Fixed scale pulls the corner sums into roughly [-1, 1].
        32.0 * total
    }
}
