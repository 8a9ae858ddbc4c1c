use std::collections::HashSet;

use crate::core::math::Vec3;
use crate::domain::{BodyDesc, ParticleIndex};

use super::{WorldCore, DEFAULT_ISLAND};

pub(super) fn add_body(world: &mut WorldCore, mut desc: BodyDesc) -> ParticleIndex {
    let island = desc.island.unwrap_or(DEFAULT_ISLAND);
    desc.island = Some(island);
    let index = world.particles.add_body(desc);
    world.islands.insert(index, Some(island));
    index
}

pub(super) fn set_strain_threshold(world: &mut WorldCore, index: ParticleIndex, threshold: f32) {
    if index < world.particles.len() {
        world.clustering.set_strain_threshold(index, threshold);
    }
}

/// Checks the request before handing it to the clustering engine, which
/// treats bad input as a programming error.
pub(super) fn create_cluster(world: &mut WorldCore, children: &[ParticleIndex]) -> Result<ParticleIndex, String> {
    if children.is_empty() {
        return Err("a cluster needs at least one child".to_string());
    }

    let mut seen = HashSet::with_capacity(children.len());
    for &child in children {
        if child >= world.particles.len() {
            return Err(format!("particle {} does not exist", child));
        }
        if !seen.insert(child) {
            return Err(format!("particle {} listed twice", child));
        }
        if world.particles.disabled[child] {
            return Err(format!("particle {} is disabled or already clustered", child));
        }
    }

    Ok(world
        .clustering
        .create_cluster_particle(&mut world.particles, &mut world.islands, children))
}

pub(super) fn queue_impact(world: &mut WorldCore, index: ParticleIndex, location: Vec3, impulse: Vec3) {
    if index < world.particles.len() {
        world.collisions.queue_impact(index, location, impulse);
    }
}

pub(super) fn deactivate_cluster(world: &mut WorldCore, index: ParticleIndex) -> Vec<ParticleIndex> {
    if !world.clustering.is_cluster_parent(index) {
        return Vec::new();
    }
    let mut released: Vec<ParticleIndex> = world
        .clustering
        .deactivate_cluster_particle(&mut world.particles, &mut world.islands, index)
        .into_iter()
        .collect();
    released.sort_unstable();
    released
}
