use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::core::math::{RigidTransform, Vec3};
use crate::core::phase_clock::PhaseClock;
use crate::domain::{IslandRegistry, ParticleIndex, ParticleStore};
use crate::systems::collision::CollisionSolver;
use crate::systems::evolution::Integrator;

use super::{BreakStats, RigidClustering};

/// What one `advance_clustering` call changed.
#[derive(Clone, Debug, Default)]
pub struct ClusteringUpdate {
    /// Released children plus newly created internal clusters.
    pub activated: HashSet<ParticleIndex>,
    /// Broken parents and what each one activated.
    pub modified_parents: BTreeMap<ParticleIndex, HashSet<ParticleIndex>>,
    pub islands_to_rewind: BTreeSet<usize>,
}

impl ClusteringUpdate {
    pub fn is_empty(&self) -> bool {
        self.modified_parents.is_empty()
    }
}

/// Parent state captured before any of its children are touched.
struct ParentSnapshot {
    island: Option<usize>,
    sleeping: bool,
    /// Step-start world transform.
    anchor: RigidTransform,
    v: Vec3,
    w: Vec3,
    pre_v: Vec3,
    pre_w: Vec3,
}

impl ParentSnapshot {
    fn of(particles: &ParticleStore, parent: ParticleIndex) -> Self {
        Self {
            island: particles.island[parent],
            sleeping: particles.sleeping[parent],
            anchor: particles.world_transform(parent),
            v: particles.v[parent],
            w: particles.w[parent],
            pre_v: particles.pre_v[parent],
            pre_w: particles.pre_w[parent],
        }
    }
}

impl RigidClustering {
    /// Break clusters under the strain of this step's contacts.
    ///
    /// Runs after the collision solver has resolved contacts and before the
    /// predicted state is committed. Islands that lost a cluster are rewound
    /// to the start of the step and solved again with the new bodies.
    pub fn advance_clustering<I, C>(
        &mut self,
        particles: &mut ParticleStore,
        islands: &mut IslandRegistry,
        integrator: &I,
        solver: &mut C,
        dt: f32,
    ) -> ClusteringUpdate
    where
        I: Integrator,
        C: CollisionSolver,
    {
        let mut clock = PhaseClock::begin();
        let mut stats = BreakStats::default();
        let mut update = ClusteringUpdate::default();

        let strains = self.compute_strain_from_collision(particles, solver.constraints());
        stats.strain_entries = strains.len() as u32;
        stats.strain_ms = clock.end_phase();

        for parent in self.cluster_parents() {
            if particles.sleeping[parent] || particles.disabled[parent] || particles.inv_m[parent] == 0.0 {
                continue;
            }
            stats.clusters_evaluated += 1;

            let island = particles.island[parent];
            let activated = self.modify_cluster_particle(particles, islands, parent, &strains, &mut stats);
            if activated.is_empty() {
                continue;
            }

            stats.clusters_broken += 1;
            if let Some(island) = island {
                update.islands_to_rewind.insert(island);
            }
            update.activated.extend(activated.iter().copied());
            update.modified_parents.insert(parent, activated);
        }
        stats.break_ms = clock.end_phase();

        if !update.is_empty() && self.config.rewind_on_break {
            self.rewind_and_evolve(particles, islands, integrator, solver, &update, dt);
            stats.islands_rewound = update.islands_to_rewind.len() as u32;
        }
        stats.rewind_ms = clock.end_phase();

        if !update.is_empty() {
            log::debug!(
                "clustering: {} of {} clusters broke, {} activated, {} islands rewound ({:.3} ms)",
                stats.clusters_broken,
                stats.clusters_evaluated,
                update.activated.len(),
                stats.islands_rewound,
                stats.strain_ms + stats.break_ms + stats.rewind_ms
            );
        }
        self.stats = stats;
        update
    }

    /// Release the children of `parent` whose strain reached their threshold.
    ///
    /// Survivors regroup into internal clusters by connectivity; isolated
    /// survivors are released too. If anything changed the parent is disabled.
    fn modify_cluster_particle(
        &mut self,
        particles: &mut ParticleStore,
        islands: &mut IslandRegistry,
        parent: ParticleIndex,
        strains: &HashMap<ParticleIndex, f32>,
        stats: &mut BreakStats,
    ) -> HashSet<ParticleIndex> {
        let Some(children) = self.parent_to_children.get(&parent) else {
            debug_assert!(false, "modifying {} which is not a cluster", parent);
            return HashSet::new();
        };

        let (released, survivors): (Vec<ParticleIndex>, Vec<ParticleIndex>) = children
            .iter()
            .copied()
            .partition(|&child| strains.get(&child).copied().unwrap_or(0.0) >= self.strain_threshold(child));
        if released.is_empty() {
            return HashSet::new();
        }

        let snapshot = ParentSnapshot::of(particles, parent);
        let mut activated = HashSet::with_capacity(released.len() + survivors.len());
        let mut regrouped = 0u32;

        for &child in &released {
            self.release_child(particles, islands, &snapshot, child);
            activated.insert(child);
        }

        let groups = if self.config.use_connectivity {
            self.connectivity.connected_components(&survivors)
        } else if survivors.is_empty() {
            Vec::new()
        } else {
            vec![survivors]
        };

        for group in groups {
            if let [single] = group.as_slice() {
                self.release_child(particles, islands, &snapshot, *single);
                activated.insert(*single);
            } else {
                let internal = self.spawn_internal_cluster(particles, islands, &snapshot, parent, &group);
                activated.insert(internal);
                regrouped += 1;
            }
        }

        stats.internal_clusters_created += regrouped;
        stats.children_released += activated.len() as u32 - regrouped;
        self.disable_parent(particles, islands, parent);
        log::trace!("cluster {} broke into {} pieces", parent, activated.len());
        activated
    }

    /// Release every direct child of `index` regardless of strain and disable it.
    ///
    /// Nested clusters among the children are released whole.
    pub fn deactivate_cluster_particle(
        &mut self,
        particles: &mut ParticleStore,
        islands: &mut IslandRegistry,
        index: ParticleIndex,
    ) -> HashSet<ParticleIndex> {
        let Some(children) = self.parent_to_children.get(&index).cloned() else {
            debug_assert!(false, "deactivating {} which has no children", index);
            return HashSet::new();
        };
        debug_assert!(!particles.disabled[index], "deactivating disabled cluster {}", index);

        let snapshot = ParentSnapshot::of(particles, index);
        for &child in &children {
            self.release_child(particles, islands, &snapshot, child);
        }
        self.disable_parent(particles, islands, index);

        log::debug!("cluster {} deactivated, {} children released", index, children.len());
        children.into_iter().collect()
    }

    fn release_child(
        &mut self,
        particles: &mut ParticleStore,
        islands: &mut IslandRegistry,
        parent: &ParentSnapshot,
        child: ParticleIndex,
    ) {
        particles.island[child] = parent.island;
        islands.add_to_island(parent.island, child);
        particles.disabled[child] = false;
        particles.set_sleeping(child, parent.sleeping);
        if !parent.sleeping {
            islands.active_indices.insert(child);
        }

        self.cluster_ids.remove(&child);
        let frame = self
            .child_to_parent
            .remove(&child)
            .unwrap_or(RigidTransform::IDENTITY)
            .then(&parent.anchor);
        particles.x[child] = frame.translation;
        particles.r[child] = frame.rotation;
        particles.p[child] = frame.translation;
        particles.q[child] = frame.rotation;

        self.seed_velocity(particles, parent, child);
        particles.restore_inverse_mass(child);
        self.connectivity.remove(child);
    }

    fn spawn_internal_cluster(
        &mut self,
        particles: &mut ParticleStore,
        islands: &mut IslandRegistry,
        parent: &ParentSnapshot,
        parent_index: ParticleIndex,
        group: &[ParticleIndex],
    ) -> ParticleIndex {
        let index = self.create_internal_cluster_particle(particles, islands, group, parent.island, parent.anchor);

        if let Some(&threshold) = self.strain_thresholds.get(&parent_index) {
            self.strain_thresholds.insert(index, threshold);
        }
        particles.set_sleeping(index, parent.sleeping);
        if parent.sleeping {
            islands.active_indices.remove(&index);
        }
        particles.p[index] = particles.x[index];
        particles.q[index] = particles.r[index];
        self.seed_velocity(particles, parent, index);
        index
    }

    /// Velocities of a body split off from `parent`: inherited, or at rest.
    fn seed_velocity(&self, particles: &mut ParticleStore, parent: &ParentSnapshot, index: ParticleIndex) {
        if self.config.children_inherit_velocity {
            particles.v[index] = parent.v;
            particles.w[index] = parent.w;
            particles.pre_v[index] = parent.pre_v;
            particles.pre_w[index] = parent.pre_w;
        } else {
            particles.v[index] = Vec3::ZERO;
            particles.w[index] = Vec3::ZERO;
            particles.pre_v[index] = Vec3::ZERO;
            particles.pre_w[index] = Vec3::ZERO;
        }
    }

    fn disable_parent(&mut self, particles: &mut ParticleStore, islands: &mut IslandRegistry, parent: ParticleIndex) {
        particles.disabled[parent] = true;
        islands.active_indices.remove(&parent);
        islands.remove_from_island(particles.island[parent], parent);
        particles.island[parent] = None;

        self.parent_to_children.remove(&parent);
        self.cluster_ids.remove(&parent);
        self.internal_clusters.remove(&parent);
        self.strain_thresholds.remove(&parent);
    }
}
