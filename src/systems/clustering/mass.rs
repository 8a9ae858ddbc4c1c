use crate::core::math::{diagonalize, inverse_diagonal, parallel_axis, rotate_tensor, Mat3, Quat, Vec3};
use crate::domain::{ParticleIndex, ParticleStore};

/// Aggregate the children's mass properties into `target`.
///
/// A child with zero inverse mass makes the whole cluster kinematic: its state
/// is copied verbatim and the rest are ignored. Otherwise mass is summed,
/// inertia is gathered about the center of mass and diagonalized, and the
/// cluster's rotation becomes the principal frame.
pub(crate) fn update_mass_properties(particles: &mut ParticleStore, children: &[ParticleIndex], target: ParticleIndex) {
    if let Some(&anchor) = children.iter().find(|&&c| particles.inv_m[c] == 0.0) {
        particles.x[target] = particles.x[anchor];
        particles.r[target] = particles.r[anchor];
        particles.p[target] = particles.p[anchor];
        particles.q[target] = particles.q[anchor];
        particles.v[target] = particles.v[anchor];
        particles.w[target] = particles.w[anchor];
        particles.pre_v[target] = particles.pre_v[anchor];
        particles.pre_w[target] = particles.pre_w[anchor];
        particles.m[target] = particles.m[anchor];
        particles.i[target] = particles.i[anchor];
        particles.inv_m[target] = 0.0;
        particles.inv_i[target] = Mat3::ZERO;
        return;
    }

    let mut mass = 0.0f32;
    let mut com = Vec3::ZERO;
    let mut velocity = Vec3::ZERO;
    let mut spin = Vec3::ZERO;
    for &child in children {
        let m = particles.m[child];
        mass += m;
        com += particles.x[child] * m;
        velocity += particles.v[child] * m;
        spin += particles.w[child] * m;
    }

    if mass <= 0.0 {
        debug_assert!(children.is_empty(), "cluster children carry no mass");
        particles.m[target] = 0.0;
        particles.inv_m[target] = 0.0;
        particles.i[target] = Mat3::ZERO;
        particles.inv_i[target] = Mat3::ZERO;
        return;
    }

    com /= mass;
    velocity /= mass;

    let mut inertia = Mat3::ZERO;
    let mut orbital = Vec3::ZERO;
    for &child in children {
        let m = particles.m[child];
        let offset = particles.x[child] - com;
        inertia += rotate_tensor(particles.i[child], particles.r[child]);
        inertia += parallel_axis(offset, m);
        orbital += offset.cross(particles.v[child] * m);
    }
    let angular = (spin + orbital) / mass;

    let principal = diagonalize(inertia);
    let rotation: Quat = principal.rotation;
    let local_inertia = principal.tensor();

    particles.x[target] = com;
    particles.p[target] = com;
    particles.r[target] = rotation;
    particles.q[target] = rotation;
    particles.v[target] = velocity;
    particles.w[target] = angular;
    particles.pre_v[target] = velocity;
    particles.pre_w[target] = angular;
    particles.m[target] = mass;
    particles.inv_m[target] = 1.0 / mass;
    particles.i[target] = local_inertia;
    particles.inv_i[target] = inverse_diagonal(local_inertia);
}
