use std::collections::HashSet;

use crate::domain::{Contact, ParticleIndex, ParticleStore};
use crate::systems::evolution::IslandBodies;

use super::CollisionSolver;

/// Replays externally supplied contacts.
///
/// Useful for scripted strikes and for driving the fracture engine without a
/// narrow phase. Resolution is a no-op; only the recorded impulses matter.
#[derive(Clone, Debug, Default)]
pub struct ContactList {
    contacts: Vec<Contact>,
}

impl ContactList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_contacts(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }

    pub fn push(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }
}

impl CollisionSolver for ContactList {
    fn constraints(&self) -> &[Contact] {
        &self.contacts
    }

    fn remove_constraints(&mut self, removed: &HashSet<ParticleIndex>) {
        self.contacts
            .retain(|c| !removed.contains(&c.particle) && !c.levelset.map_or(false, |l| removed.contains(&l)));
    }

    fn update_constraints(&mut self, _: &ParticleStore, _: f32, _: &HashSet<ParticleIndex>, _: &[ParticleIndex]) {}

    fn update_acceleration_structures(&mut self, _: &ParticleStore, _: &[ParticleIndex], _: usize) {}

    fn apply(&self, _: &ParticleStore, _: &mut IslandBodies, _: f32) {}

    fn apply_push_out(&self, _: &ParticleStore, _: &mut IslandBodies, _: f32) {}
}
