use crate::core::math::{Quat, Vec3};
use crate::domain::ParticleStore;

use super::{IslandBodies, Integrator};

/// Semi-implicit Euler with gravity.
#[derive(Clone, Copy, Debug)]
pub struct EulerIntegrator {
    pub gravity: Vec3,
}

impl EulerIntegrator {
    pub fn new(gravity: Vec3) -> Self {
        Self { gravity }
    }
}

impl Default for EulerIntegrator {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -980.0, 0.0))
    }
}

impl Integrator for EulerIntegrator {
    fn integrate(&self, particles: &ParticleStore, bodies: &mut IslandBodies, dt: f32) {
        for (index, body) in bodies.iter_mut() {
            // Kinematic bodies keep their velocity; only dynamics feel gravity.
            if particles.inv_m[index] != 0.0 {
                body.v += self.gravity * dt;
            }
            body.p += body.v * dt;
            let spin = Quat::from_scaled_axis(body.w * dt);
            body.q = (spin * body.q).normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BodyDesc;

    #[test]
    fn gravity_only_moves_dynamic_bodies() {
        let mut particles = ParticleStore::new();
        let dynamic = particles.add_body(BodyDesc::sphere(1.0, 1.0));
        let anchor = particles.add_body(BodyDesc::sphere(1.0, 1.0).kinematic().with_velocity(Vec3::X));

        let mut bodies = IslandBodies::step_start(&particles, 0, vec![dynamic, anchor]);
        EulerIntegrator::new(Vec3::new(0.0, -10.0, 0.0)).integrate(&particles, &mut bodies, 0.5);

        let d = bodies.get(dynamic).unwrap();
        assert!((d.v.y + 5.0).abs() < 1e-5);
        assert!((d.p.y + 2.5).abs() < 1e-5);

        let a = bodies.get(anchor).unwrap();
        assert_eq!(a.v, Vec3::X);
        assert!((a.p.x - 0.5).abs() < 1e-5);
    }
}
