//! Implicit collision geometry.
//!
//! Shapes are a closed set of variants selected once at build time. Child
//! geometry is shared by handle, so wrapping a child inside a cluster union
//! never copies its level set or point data.

mod level_set;
mod points;

use std::sync::Arc;

use crate::core::math::{Aabb, RigidTransform, Vec3};

pub use level_set::{LevelSet, UniformGrid};
pub use points::clean_collision_points;

/// Shared, immutable geometry handle stored per particle.
pub type GeometryHandle = Arc<Geometry>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImplicitKind {
    Sphere,
    Cuboid,
    Transformed,
    Union,
    LevelSet,
    /// Geometry the analytic collision paths know nothing about (particle-only shapes).
    Opaque,
}

#[derive(Clone, Debug)]
pub enum Implicit {
    Sphere { center: Vec3, radius: f32 },
    Cuboid(Aabb),
    Transformed { object: GeometryHandle, transform: RigidTransform },
    Union(Vec<Implicit>),
    LevelSet(LevelSet),
    Opaque { bounds: Option<Aabb> },
}

impl Implicit {
    pub fn kind(&self) -> ImplicitKind {
        match self {
            Implicit::Sphere { .. } => ImplicitKind::Sphere,
            Implicit::Cuboid(_) => ImplicitKind::Cuboid,
            Implicit::Transformed { .. } => ImplicitKind::Transformed,
            Implicit::Union(_) => ImplicitKind::Union,
            Implicit::LevelSet(_) => ImplicitKind::LevelSet,
            Implicit::Opaque { .. } => ImplicitKind::Opaque,
        }
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        match self {
            Implicit::Sphere { center, radius } => {
                Some(Aabb::from_half_extents(*center, Vec3::splat(radius.max(0.0))))
            }
            Implicit::Cuboid(b) => Some(*b),
            Implicit::Transformed { object, transform } => {
                object.bounding_box().map(|b| b.transformed(transform))
            }
            Implicit::Union(objects) => {
                let mut out: Option<Aabb> = None;
                for b in objects.iter().filter_map(Implicit::bounding_box) {
                    match out.as_mut() {
                        Some(acc) => acc.grow_to_include(&b),
                        None => out = Some(b),
                    }
                }
                out
            }
            Implicit::LevelSet(ls) => Some(ls.grid().bounds()),
            Implicit::Opaque { bounds } => *bounds,
        }
    }

    /// Signed distance (negative inside). Unbounded shapes report `f32::MAX`.
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        match self {
            Implicit::Sphere { center, radius } => (p - *center).length() - radius,
            Implicit::Cuboid(b) => b.signed_distance(p),
            Implicit::Transformed { object, transform } => {
                object.signed_distance(transform.inverse_transform_point(p))
            }
            Implicit::Union(objects) => objects
                .iter()
                .map(|o| o.signed_distance(p))
                .fold(f32::MAX, f32::min),
            Implicit::LevelSet(ls) => ls.signed_distance(p),
            Implicit::Opaque { bounds } => bounds.map_or(f32::MAX, |b| b.signed_distance(p)),
        }
    }
}

/// Collision shape of one particle.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub implicit: Implicit,
    /// Skip sphere/box fast paths and collide through points / signed distance only.
    pub ignore_analytic_collisions: bool,
}

impl Geometry {
    pub fn new(implicit: Implicit) -> Self {
        Self { implicit, ignore_analytic_collisions: false }
    }

    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::new(Implicit::Sphere { center, radius })
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::new(Implicit::Cuboid(Aabb::from_half_extents(Vec3::ZERO, half_extents)))
    }

    pub fn opaque(bounds: Option<Aabb>) -> Self {
        Self::new(Implicit::Opaque { bounds })
    }

    pub fn kind(&self) -> ImplicitKind {
        self.implicit.kind()
    }

    pub fn has_bounding_box(&self) -> bool {
        self.implicit.bounding_box().is_some()
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        self.implicit.bounding_box()
    }

    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.implicit.signed_distance(p)
    }

    pub fn into_handle(self) -> GeometryHandle {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn union_of_transformed_boxes() {
        let cube = Geometry::cuboid(Vec3::splat(1.0)).into_handle();
        let union = Implicit::Union(vec![
            Implicit::Transformed {
                object: cube.clone(),
                transform: RigidTransform::from_translation(Vec3::new(-2.0, 0.0, 0.0)),
            },
            Implicit::Transformed {
                object: cube,
                transform: RigidTransform::new(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY),
            },
        ]);

        let b = union.bounding_box().unwrap();
        assert!((b.min.x + 3.0).abs() < 1e-5);
        assert!((b.max.x - 3.0).abs() < 1e-5);
        assert!(union.signed_distance(Vec3::new(2.0, 0.0, 0.0)) < 0.0);
        assert!(union.signed_distance(Vec3::ZERO) > 0.0);
    }

    #[test]
    fn opaque_without_bounds_has_no_box() {
        let g = Geometry::opaque(None);
        assert!(!g.has_bounding_box());
        assert_eq!(g.kind(), ImplicitKind::Opaque);
        assert_eq!(g.signed_distance(Vec3::ZERO), f32::MAX);
    }
}
