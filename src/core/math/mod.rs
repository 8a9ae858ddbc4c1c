//! Small math layer on top of `glam`: rigid transforms, boxes and inertia helpers.

mod aabb;
mod inertia;
mod transform;

pub use aabb::Aabb;
pub use inertia::{diagonalize, inverse_diagonal, parallel_axis, rotate_tensor, PrincipalInertia};
pub use transform::RigidTransform;

pub use glam::{Mat3, Quat, Vec3};
