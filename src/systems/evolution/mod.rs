//! Integration seam.
//!
//! Integration and collision resolution run per island. Each island task reads
//! the shared [`ParticleStore`] and works on an [`IslandBodies`] scratch copy of
//! the kinematic state of its own particles; results are written back after
//! the (possibly parallel) section ends. Islands are disjoint, so the write-back
//! never conflicts.

mod euler;

use std::collections::HashMap;

use crate::core::math::{Quat, Vec3};
use crate::domain::{ParticleIndex, ParticleStore};

pub use euler::EulerIntegrator;

/// Kinematic state being solved for one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub p: Vec3,
    pub q: Quat,
    pub v: Vec3,
    pub w: Vec3,
}

/// Per-island working set.
#[derive(Clone, Debug, Default)]
pub struct IslandBodies {
    island: usize,
    indices: Vec<ParticleIndex>,
    states: Vec<BodyState>,
    slots: HashMap<ParticleIndex, usize>,
}

impl IslandBodies {
    fn build(island: usize, indices: Vec<ParticleIndex>, state: impl Fn(ParticleIndex) -> BodyState) -> Self {
        let states: Vec<BodyState> = indices.iter().map(|&i| state(i)).collect();
        let slots = indices.iter().enumerate().map(|(slot, &i)| (i, slot)).collect();
        Self { island, indices, states, slots }
    }

    /// State restored to the start of the step: `p = x`, `q = r`, `v = pre_v`, `w = pre_w`.
    pub fn step_start(particles: &ParticleStore, island: usize, indices: Vec<ParticleIndex>) -> Self {
        Self::build(island, indices, |i| BodyState {
            p: particles.x[i],
            q: particles.r[i],
            v: particles.pre_v[i],
            w: particles.pre_w[i],
        })
    }

    /// State as currently predicted.
    pub fn predicted(particles: &ParticleStore, island: usize, indices: Vec<ParticleIndex>) -> Self {
        Self::build(island, indices, |i| BodyState {
            p: particles.p[i],
            q: particles.q[i],
            v: particles.v[i],
            w: particles.w[i],
        })
    }

    pub fn island(&self) -> usize {
        self.island
    }

    pub fn indices(&self) -> &[ParticleIndex] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, index: ParticleIndex) -> Option<&BodyState> {
        self.slots.get(&index).map(|&s| &self.states[s])
    }

    pub fn get_mut(&mut self, index: ParticleIndex) -> Option<&mut BodyState> {
        match self.slots.get(&index) {
            Some(&s) => Some(&mut self.states[s]),
            None => None,
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ParticleIndex, &mut BodyState)> {
        self.indices.iter().copied().zip(self.states.iter_mut())
    }

    /// Scatter the solved state back into the store.
    pub fn write_back(&self, particles: &mut ParticleStore) {
        for (&i, s) in self.indices.iter().zip(self.states.iter()) {
            particles.p[i] = s.p;
            particles.q[i] = s.q;
            particles.v[i] = s.v;
            particles.w[i] = s.w;
        }
    }
}

/// Advances the bodies of one island over `dt`.
pub trait Integrator: Sync {
    fn integrate(&self, particles: &ParticleStore, bodies: &mut IslandBodies, dt: f32);
}

/// Awake, enabled members of `island`, sorted.
pub fn live_island_members(particles: &ParticleStore, members: impl IntoIterator<Item = ParticleIndex>) -> Vec<ParticleIndex> {
    let mut out: Vec<ParticleIndex> = members
        .into_iter()
        .filter(|&i| !particles.sleeping[i] && !particles.disabled[i])
        .collect();
    out.sort_unstable();
    out
}
