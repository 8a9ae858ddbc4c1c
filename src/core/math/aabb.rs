use glam::Vec3;

use super::RigidTransform;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    pub fn from_half_extents(center: Vec3, half: Vec3) -> Self {
        Self { min: center - half, max: center + half }
    }

    /// Grow by `d` on every side.
    pub fn thicken(&mut self, d: f32) {
        self.min -= Vec3::splat(d);
        self.max += Vec3::splat(d);
    }

    pub fn thickened(mut self, d: f32) -> Self {
        self.thicken(d);
        self
    }

    pub fn grow_to_include(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        self.min.cmple(p).all() && p.cmple(self.max).all()
    }

    /// Full size along each axis.
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Bounds of this box after transforming its eight corners.
    pub fn transformed(&self, tm: &RigidTransform) -> Aabb {
        let mut out = Aabb::from_point(tm.transform_point(self.min));
        for i in 1..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = tm.transform_point(corner);
            out.min = out.min.min(p);
            out.max = out.max.max(p);
        }
        out
    }

    /// Signed distance to the box surface (negative inside).
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        let half = self.extents() * 0.5;
        let q = (p - self.center()).abs() - half;
        let outside = q.max(Vec3::ZERO).length();
        let inside = q.max_element().min(0.0);
        outside + inside
    }
}
