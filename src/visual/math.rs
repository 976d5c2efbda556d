/// Immutable float triple used for positions, normals and directions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, o: Vec3) -> f32 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn cross(self, o: Vec3) -> Vec3 {
        Vec3::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy. A degenerate input falls back to +z instead of
    /// producing NaN; unreachable for a well-formed icosphere.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len < 1e-12 {
            return Vec3::new(0.0, 0.0, 1.0);
        }
        self.scaled(1.0 / len)
    }

    pub fn scaled(self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }

    pub fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }

    pub fn midpoint(self, o: Vec3) -> Vec3 {
        Vec3::new(
            (self.x + o.x) * 0.5,
            (self.y + o.y) * 0.5,
            (self.z + o.z) * 0.5,
        )
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_guards_zero_vector() {
        let v = Vec3::new(0.0, 0.0, 0.0).normalized();
        assert!(v.x.is_finite() && v.y.is_finite() && v.z.is_finite());
        assert!((v.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cross_is_orthogonal() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-2.0, 0.5, 1.0);
        let c = a.cross(b);
        assert!(c.dot(a).abs() < 1e-4);
        assert!(c.dot(b).abs() < 1e-4);
    }
}
