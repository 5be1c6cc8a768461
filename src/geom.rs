/// A point or direction on the horizontal (x, z) plane, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub z: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, z: 0.0 };

    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Unit vector for a yaw angle; yaw 0 faces -z, positive yaw turns toward +x.
    pub fn from_yaw(yaw: f32) -> Self {
        Self::new(yaw.sin(), -yaw.cos())
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Returns `None` for (near-)zero or non-finite vectors.
    pub fn normalized(self) -> Option<Vec2> {
        let len = self.length();
        if !len.is_finite() || len <= f32::EPSILON {
            return None;
        }
        Some(Vec2::new(self.x / len, self.z / len))
    }

    /// Quarter turn clockwise seen from above (+x right, +z down).
    pub fn right_of(self) -> Vec2 {
        Vec2::new(-self.z, self.x)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.z - rhs.z)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.z * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_rejects_zero() {
        assert_eq!(Vec2::ZERO.normalized(), None);
        let n = Vec2::new(3.0, 4.0).normalized().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn right_of_north_is_east() {
        let north = Vec2::from_yaw(0.0);
        let east = north.right_of();
        assert!((east.x - 1.0).abs() < 1e-6);
        assert!(east.z.abs() < 1e-6);
    }
}
