use glam::{Quat, Vec3};

/// Rigid transform (rotation then translation).
///
/// Composition follows the "child then parent" convention used throughout the
/// clustering code: `child.then(parent)` maps a point from the child frame
/// into whatever space `parent` maps into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidTransform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl RigidTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self { translation, rotation }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, rotation: Quat::IDENTITY }
    }

    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * p + self.translation
    }

    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.rotation * v
    }

    #[inline]
    pub fn inverse_transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.inverse() * (p - self.translation)
    }

    pub fn inverse(&self) -> Self {
        let inv_rot = self.rotation.inverse();
        Self {
            translation: inv_rot * -self.translation,
            rotation: inv_rot,
        }
    }

    /// Apply `self` first, then `parent`.
    pub fn then(&self, parent: &RigidTransform) -> Self {
        Self {
            translation: parent.rotation * self.translation + parent.translation,
            rotation: (parent.rotation * self.rotation).normalize(),
        }
    }

    /// `self` expressed in the frame of `other` (both given in the same space).
    pub fn relative_to(&self, other: &RigidTransform) -> Self {
        let inv_rot = other.rotation.inverse();
        Self {
            translation: inv_rot * (self.translation - other.translation),
            rotation: (inv_rot * self.rotation).normalize(),
        }
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn relative_then_parent_restores_world() {
        let parent = RigidTransform::new(Vec3::new(3.0, -1.0, 2.0), Quat::from_rotation_y(0.7));
        let child = RigidTransform::new(Vec3::new(-2.0, 4.0, 0.5), Quat::from_rotation_x(1.1));

        let local = child.relative_to(&parent);
        let back = local.then(&parent);

        assert!(approx(back.translation, child.translation));
        assert!(back.rotation.abs_diff_eq(child.rotation, 1e-4) || back.rotation.abs_diff_eq(-child.rotation, 1e-4));
    }

    #[test]
    fn inverse_point_round_trip() {
        let t = RigidTransform::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_z(0.3));
        let p = Vec3::new(-4.0, 0.5, 9.0);
        assert!(approx(t.inverse_transform_point(t.transform_point(p)), p));
        assert!(approx(t.inverse().transform_point(t.transform_point(p)), p));
    }
}
