//! Collision solver seam consumed by the clustering engine.

mod contact_list;
mod ground;

use std::collections::HashSet;

use crate::domain::{Contact, ParticleIndex, ParticleStore};
use crate::systems::evolution::IslandBodies;

pub use contact_list::ContactList;
pub use ground::GroundPlaneCollisions;

/// Contact generation and resolution.
///
/// `apply` and `apply_push_out` only read the store and write the island's
/// [`IslandBodies`], so they may run for several islands at once.
pub trait CollisionSolver: Sync {
    /// Every contact resolved so far this step, with its accumulated impulse.
    fn constraints(&self) -> &[Contact];

    /// Drop all contacts touching any of `removed`.
    fn remove_constraints(&mut self, removed: &HashSet<ParticleIndex>);

    /// Regenerate contacts for `active`; `added` are bodies that became active this step.
    fn update_constraints(
        &mut self,
        particles: &ParticleStore,
        dt: f32,
        added: &HashSet<ParticleIndex>,
        active: &[ParticleIndex],
    );

    /// Refresh per-island lookup structures.
    fn update_acceleration_structures(&mut self, particles: &ParticleStore, active: &[ParticleIndex], island: usize);

    /// Velocity-level resolution of the island's contacts.
    fn apply(&self, particles: &ParticleStore, bodies: &mut IslandBodies, dt: f32);

    /// Position-level de-penetration of the island's contacts.
    fn apply_push_out(&self, particles: &ParticleStore, bodies: &mut IslandBodies, dt: f32);
}
