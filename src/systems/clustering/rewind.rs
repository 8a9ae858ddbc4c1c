use std::collections::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::domain::{IslandRegistry, ParticleIndex, ParticleStore};
use crate::systems::collision::CollisionSolver;
use crate::systems::evolution::{live_island_members, Integrator, IslandBodies};

use super::{ClusteringUpdate, RigidClustering};

impl RigidClustering {
    /// Re-run the step for the islands a break touched.
    ///
    /// Bodies go back to their step-start state and are integrated again;
    /// then, unless disabled, collisions are regenerated for those islands
    /// and resolved once more. Islands not listed in `update` are left alone.
    pub(crate) fn rewind_and_evolve<I, C>(
        &self,
        particles: &mut ParticleStore,
        islands: &IslandRegistry,
        integrator: &I,
        solver: &mut C,
        update: &ClusteringUpdate,
        dt: f32,
    ) where
        I: Integrator,
        C: CollisionSolver,
    {
        let work: Vec<(usize, Vec<ParticleIndex>)> = update
            .islands_to_rewind
            .iter()
            .filter(|&&island| islands.is_valid_island(island))
            .map(|&island| {
                let members = islands.island_particles[island].iter().copied();
                (island, live_island_members(particles, members))
            })
            .collect();

        let solved = {
            let store: &ParticleStore = particles;
            let evolve = |(island, indices): &(usize, Vec<ParticleIndex>)| {
                let mut bodies = IslandBodies::step_start(store, *island, indices.clone());
                integrator.integrate(store, &mut bodies, dt);
                bodies
            };

            #[cfg(feature = "parallel")]
            let solved: Vec<IslandBodies> = work.par_iter().map(evolve).collect();
            #[cfg(not(feature = "parallel"))]
            let solved: Vec<IslandBodies> = work.iter().map(evolve).collect();
            solved
        };
        for bodies in &solved {
            bodies.write_back(particles);
        }

        if !self.config.rewind_collision_solve {
            return;
        }

        let broken: HashSet<ParticleIndex> = update.modified_parents.keys().copied().collect();
        solver.remove_constraints(&broken);

        // Sleeping bodies still collide; only disabled ones are left out.
        let mut enabled: Vec<ParticleIndex> = update
            .islands_to_rewind
            .iter()
            .filter(|&&island| islands.is_valid_island(island))
            .flat_map(|&island| islands.island_particles[island].iter().copied())
            .filter(|&i| !particles.disabled[i])
            .collect();
        enabled.sort_unstable();
        enabled.dedup();

        solver.update_constraints(particles, dt, &update.activated, &enabled);
        for (island, indices) in &work {
            solver.update_acceleration_structures(particles, indices, *island);
        }

        let resolved = {
            let store: &ParticleStore = particles;
            let solver: &C = solver;
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
            resolved
        };
        for bodies in &resolved {
            bodies.write_back(particles);
        }

        log::trace!("rewound {} islands ({} bodies)", work.len(), enabled.len());
    }
}
