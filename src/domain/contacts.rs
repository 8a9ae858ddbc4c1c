use crate::core::math::Vec3;

use super::particles::ParticleIndex;

/// One resolved rigid-body contact as reported by the collision solver.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// Body whose collision points were tested.
    pub particle: ParticleIndex,
    /// Body whose implicit surface was tested against, if any (`None` for static scenery).
    pub levelset: Option<ParticleIndex>,
    /// World-space contact location.
    pub location: Vec3,
    pub normal: Vec3,
    /// Penetration depth (negative when overlapping).
    pub phi: f32,
    pub accumulated_impulse: Vec3,
}

impl Contact {
    pub fn new(particle: ParticleIndex, levelset: Option<ParticleIndex>, location: Vec3, impulse: Vec3) -> Self {
        Self {
            particle,
            levelset,
            location,
            normal: Vec3::Y,
            phi: 0.0,
            accumulated_impulse: impulse,
        }
    }

    pub fn involves(&self, index: ParticleIndex) -> bool {
        self.particle == index || self.levelset == Some(index)
    }
}
