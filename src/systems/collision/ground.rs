use std::collections::{HashMap, HashSet};

use crate::core::math::{RigidTransform, Vec3};
use crate::domain::{Contact, ParticleIndex, ParticleStore};
use crate::systems::evolution::IslandBodies;

use super::CollisionSolver;

/// Box-vs-plane contacts against a horizontal ground at `height`.
///
/// The impulse each contact will need is predicted when the contact is
/// generated, so strain is available as soon as `update_constraints` ran.
/// Externally queued impacts are merged into the next contact generation.
#[derive(Clone, Debug)]
pub struct GroundPlaneCollisions {
    pub height: f32,
    pub restitution: f32,
    contacts: Vec<Contact>,
    pending_impacts: Vec<Contact>,
    by_island: HashMap<usize, Vec<usize>>,
}

impl GroundPlaneCollisions {
    pub fn new(height: f32, restitution: f32) -> Self {
        Self {
            height,
            restitution: restitution.clamp(0.0, 1.0),
            contacts: Vec::new(),
            pending_impacts: Vec::new(),
            by_island: HashMap::new(),
        }
    }

    /// Record a strike on `particle` that shows up as a contact on the next update.
    pub fn queue_impact(&mut self, particle: ParticleIndex, location: Vec3, impulse: Vec3) {
        self.pending_impacts.push(Contact::new(particle, None, location, impulse));
    }

    /// Forget last step's contacts. Queued impacts are kept.
    pub fn begin_step(&mut self) {
        self.contacts.clear();
        self.by_island.clear();
    }

    fn world_min_y(&self, particles: &ParticleStore, index: ParticleIndex, tm: &RigidTransform) -> Option<f32> {
        let geometry = particles.geometry[index].as_ref()?;
        geometry.bounding_box().map(|b| b.transformed(tm).min.y)
    }
}

impl Default for GroundPlaneCollisions {
    fn default() -> Self {
        Self::new(0.0, 0.2)
    }
}

impl CollisionSolver for GroundPlaneCollisions {
    fn constraints(&self) -> &[Contact] {
        &self.contacts
    }

    fn remove_constraints(&mut self, removed: &HashSet<ParticleIndex>) {
        self.contacts
            .retain(|c| !removed.contains(&c.particle) && !c.levelset.map_or(false, |l| removed.contains(&l)));
        self.by_island.clear();
    }

    fn update_constraints(
        &mut self,
        particles: &ParticleStore,
        _dt: f32,
        _added: &HashSet<ParticleIndex>,
        active: &[ParticleIndex],
    ) {
        // Only the islands of `active` are regenerated; the rest keep their contacts.
        let rebuilt: HashSet<usize> = active.iter().filter_map(|&i| particles.island[i]).collect();
        self.contacts.retain(|c| {
            particles
                .island
                .get(c.particle)
                .copied()
                .flatten()
                .map_or(false, |island| !rebuilt.contains(&island))
        });
        self.by_island.clear();

        for &index in active {
            if particles.disabled[index] {
                continue;
            }
            let Some(geometry) = particles.geometry[index].as_ref() else {
                continue;
            };
            let Some(local) = geometry.bounding_box() else {
                continue;
            };
            let world = local.transformed(&particles.predicted_transform(index));
            let phi = world.min.y - self.height;
            if phi >= 0.0 {
                continue;
            }

            let vn = particles.v[index].y;
            let magnitude = if particles.inv_m[index] != 0.0 && vn < 0.0 {
                particles.m[index] * -vn * (1.0 + self.restitution)
            } else {
                0.0
            };
            let center = world.center();
            self.contacts.push(Contact {
                particle: index,
                levelset: None,
                location: Vec3::new(center.x, self.height, center.z),
                normal: Vec3::Y,
                phi,
                accumulated_impulse: Vec3::Y * magnitude,
            });
        }

        self.contacts.append(&mut self.pending_impacts);
    }

    fn update_acceleration_structures(&mut self, _particles: &ParticleStore, active: &[ParticleIndex], island: usize) {
        let members: HashSet<ParticleIndex> = active.iter().copied().collect();
        let ids = self
            .contacts
            .iter()
            .enumerate()
            .filter(|(_, c)| members.contains(&c.particle))
            .map(|(id, _)| id)
            .collect();
        self.by_island.insert(island, ids);
    }

    fn apply(&self, particles: &ParticleStore, bodies: &mut IslandBodies, _dt: f32) {
        let Some(ids) = self.by_island.get(&bodies.island()) else {
            return;
        };
        for &id in ids {
            let contact = &self.contacts[id];
            if particles.inv_m[contact.particle] == 0.0 {
                continue;
            }
            if let Some(body) = bodies.get_mut(contact.particle) {
                if body.v.y < 0.0 {
                    body.v.y = -body.v.y * self.restitution;
                }
            }
        }
    }

    fn apply_push_out(&self, particles: &ParticleStore, bodies: &mut IslandBodies, _dt: f32) {
        let Some(ids) = self.by_island.get(&bodies.island()) else {
            return;
        };
        for &id in ids {
            let index = self.contacts[id].particle;
            if particles.inv_m[index] == 0.0 {
                continue;
            }
            let Some(body) = bodies.get_mut(index) else {
                continue;
            };
            let tm = RigidTransform::new(body.p, body.q);
            if let Some(min_y) = self.world_min_y(particles, index, &tm) {
                if min_y < self.height {
                    body.p.y += self.height - min_y;
                }
            }
        }
    }
}
