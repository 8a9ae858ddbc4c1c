use std::collections::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::phase_clock::PhaseClock;
use crate::domain::{ParticleIndex, ParticleStore};
use crate::systems::collision::CollisionSolver;
use crate::systems::evolution::{live_island_members, Integrator, IslandBodies};

use super::WorldCore;

type IslandWork = Vec<(usize, Vec<ParticleIndex>)>;

pub(super) fn step(world: &mut WorldCore, dt: f32) -> Vec<ParticleIndex> {
    let perf_on = world.perf_enabled;
    world.step_stats.reset();
    let mut clock = PhaseClock::begin();

    begin_step(&mut world.particles);
    let work = island_work(world);

    // === INTEGRATION ===
    {
        let store: &ParticleStore = &world.particles;
        let integrator = &world.integrator;
        let evolve = |(island, indices): &(usize, Vec<ParticleIndex>)| {
            let mut bodies = IslandBodies::predicted(store, *island, indices.clone());
            integrator.integrate(store, &mut bodies, dt);
            bodies
        };

        #[cfg(feature = "parallel")]
        let solved: Vec<IslandBodies> = work.par_iter().map(evolve).collect();
        #[cfg(not(feature = "parallel"))]
        let solved: Vec<IslandBodies> = work.iter().map(evolve).collect();

        for bodies in &solved {
            bodies.write_back(&mut world.particles);
        }
    }
    let integrate_ms = clock.end_phase();

    // === CONTACTS ===
    let mut active: Vec<ParticleIndex> = work.iter().flat_map(|(_, m)| m.iter().copied()).collect();
    active.sort_unstable();
    world.collisions.begin_step();
    world
        .collisions
        .update_constraints(&world.particles, dt, &HashSet::new(), &active);
    for (island, indices) in &work {
        world
            .collisions
            .update_acceleration_structures(&world.particles, indices, *island);
    }
    {
        let store: &ParticleStore = &world.particles;
        let solver = &world.collisions;
        let resolve = |(island, indices): &(usize, Vec<ParticleIndex>)| {
            let mut bodies = IslandBodies::predicted(store, *island, indices.clone());
            solver.apply(store, &mut bodies, dt);
            solver.apply_push_out(store, &mut bodies, dt);
            bodies
        };

        #[cfg(feature = "parallel")]
        let resolved: Vec<IslandBodies> = work.par_iter().map(resolve).collect();
        #[cfg(not(feature = "parallel"))]
        let resolved: Vec<IslandBodies> = work.iter().map(resolve).collect();

        for bodies in &resolved {
            bodies.write_back(&mut world.particles);
        }
    }
    let contacts = world.collisions.constraints().len() as u32;
    let collide_ms = clock.end_phase();

    // === CLUSTERING ===
    let update = world.clustering.advance_clustering(
        &mut world.particles,
        &mut world.islands,
        &world.integrator,
        &mut world.collisions,
        dt,
    );
    let clustering_ms = clock.end_phase();

    end_step(&mut world.particles);
    world.frame += 1;

    let stats = &mut world.step_stats;
    stats.record_break(world.clustering.stats(), perf_on);
    stats.contacts = contacts;
    stats.active_bodies = world.islands.active_indices.len() as u32;
    stats.particle_count = world.particles.len() as u32;
    if perf_on {
        stats.integrate_ms = integrate_ms;
        stats.collide_ms = collide_ms;
        stats.clustering_ms = clustering_ms;
        stats.step_ms = clock.total_ms();
    }

    let mut activated: Vec<ParticleIndex> = update.activated.into_iter().collect();
    activated.sort_unstable();
    if !activated.is_empty() {
        log::debug!("frame {}: {} bodies activated by fracture", world.frame, activated.len());
    }
    activated
}

/// Predicted state starts from the committed one; step-start velocities are remembered for rewinds.
fn begin_step(particles: &mut ParticleStore) {
    for i in 0..particles.len() {
        if particles.disabled[i] {
            continue;
        }
        particles.p[i] = particles.x[i];
        particles.q[i] = particles.r[i];
        particles.pre_v[i] = particles.v[i];
        particles.pre_w[i] = particles.w[i];
    }
}

fn end_step(particles: &mut ParticleStore) {
    for i in 0..particles.len() {
        if particles.disabled[i] {
            continue;
        }
        particles.x[i] = particles.p[i];
        particles.r[i] = particles.q[i];
    }
}

/// Live members of every non-empty island.
fn island_work(world: &WorldCore) -> IslandWork {
    world
        .islands
        .island_particles
        .iter()
        .enumerate()
        .map(|(island, members)| (island, live_island_members(&world.particles, members.iter().copied())))
        .filter(|(_, members)| !members.is_empty())
        .collect()
}
