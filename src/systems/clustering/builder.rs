use std::sync::Arc;

use crate::core::math::RigidTransform;
use crate::domain::{IslandRegistry, ParticleIndex, ParticleStore};

use super::connectivity::ConnectivityNode;
use super::geometry::{unify_children, ChildShape};
use super::mass::update_mass_properties;
use super::RigidClustering;

impl RigidClustering {
    /// Group `children` under a new cluster particle and return its index.
    ///
    /// The cluster joins the island of the first child, sleeps only if every
    /// child sleeps, and gets a connectivity graph over its children.
    pub fn create_cluster_particle(
        &mut self,
        particles: &mut ParticleStore,
        islands: &mut IslandRegistry,
        children: &[ParticleIndex],
    ) -> ParticleIndex {
        debug_assert!(!children.is_empty(), "cluster created without children");
        debug_assert!(
            children.iter().all(|c| !self.cluster_ids.contains_key(c)),
            "child already belongs to a cluster"
        );

        let index = particles.add_particles(1);
        let asleep = children.iter().all(|&c| particles.sleeping[c]);

        self.parent_to_children.insert(index, children.to_vec());
        particles.disabled[index] = false;

        update_mass_properties(particles, children, index);
        self.update_geometry(particles, islands, children, index);

        let island = children.first().and_then(|&c| particles.island[c]);
        self.update_island_particles(particles, islands, index, island);
        self.update_connectivity_graph(particles, index);

        particles.set_sleeping(index, asleep);
        if !asleep {
            islands.active_indices.insert(index);
        }

        log::debug!(
            "cluster {} created from {} children (mass {:.3}, island {:?})",
            index,
            children.len(),
            particles.m[index],
            island
        );
        index
    }

    /// Regroup children that already belong to a cluster being broken.
    ///
    /// The children are first placed at `world` through their existing
    /// `child_to_parent` frames, then aggregated like any other cluster. No
    /// connectivity is built: the surviving edges between them are kept.
    pub fn create_internal_cluster_particle(
        &mut self,
        particles: &mut ParticleStore,
        islands: &mut IslandRegistry,
        children: &[ParticleIndex],
        island: Option<usize>,
        world: RigidTransform,
    ) -> ParticleIndex {
        debug_assert!(!children.is_empty(), "internal cluster created without children");

        let index = particles.add_particles(1);
        self.internal_clusters.insert(index);
        self.parent_to_children.insert(index, children.to_vec());
        particles.disabled[index] = false;
        islands.active_indices.insert(index);

        for &child in children {
            let frame = self
                .child_to_parent
                .get(&child)
                .copied()
                .unwrap_or(RigidTransform::IDENTITY)
                .then(&world);
            particles.x[child] = frame.translation;
            particles.r[child] = frame.rotation;
        }

        update_mass_properties(particles, children, index);
        self.update_geometry(particles, islands, children, index);
        self.update_island_particles(particles, islands, index, island);

        log::trace!("internal cluster {} regrouped {} children", index, children.len());
        index
    }

    /// Attach `children` to `target`: record frames, disable them and build the union geometry.
    pub(crate) fn update_geometry(
        &mut self,
        particles: &mut ParticleStore,
        islands: &mut IslandRegistry,
        children: &[ParticleIndex],
        target: ParticleIndex,
    ) {
        let cluster_tm = particles.world_transform(target);

        let mut frames = Vec::with_capacity(children.len());
        for &child in children {
            let frame = particles.world_transform(child).relative_to(&cluster_tm);
            self.child_to_parent.insert(child, frame);
            self.cluster_ids.insert(child, target);
            particles.disabled[child] = true;
            islands.active_indices.remove(&child);
            frames.push(frame);
        }

        let unified = {
            let shapes: Vec<ChildShape<'_>> = children
                .iter()
                .zip(frames)
                .map(|(&child, frame)| ChildShape {
                    geometry: particles.geometry[child].as_ref(),
                    frame,
                    points: particles.collision_points[child].as_deref(),
                })
                .collect();
            unify_children(&self.config, &shapes)
        };

        particles.geometry[target] = Some(Arc::new(unified.geometry));
        particles.resize_collision_points(target, unified.points.len());
        if let Some(cloud) = particles.collision_points[target].as_mut() {
            cloud.copy_from_slice(&unified.points);
        }
    }

    /// Put the cluster in `island` and take its children out of it.
    fn update_island_particles(
        &self,
        particles: &mut ParticleStore,
        islands: &mut IslandRegistry,
        index: ParticleIndex,
        island: Option<usize>,
    ) {
        particles.island[index] = island;
        islands.add_to_island(island, index);
        for &child in self.children(index) {
            islands.remove_from_island(island, child);
            islands.remove_from_island(particles.island[child], child);
        }
    }

    /// Connect the children of `index` whose bounds touch.
    fn update_connectivity_graph(&mut self, particles: &ParticleStore, index: ParticleIndex) {
        let nodes: Vec<ConnectivityNode> = self
            .children(index)
            .iter()
            .map(|&child| ConnectivityNode {
                index: child,
                local_bounds: particles.geometry[child].as_ref().and_then(|g| g.bounding_box()),
                child_to_parent: self.child_to_parent(child).unwrap_or(RigidTransform::IDENTITY),
                strain_threshold: self.strain_threshold(child),
            })
            .collect();
        self.connectivity.build(&nodes, self.config.connectivity_thickening);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Implicit;
    use crate::core::math::Vec3;
    use crate::domain::BodyDesc;

    fn boxes(particles: &mut ParticleStore, islands: &mut IslandRegistry, xs: &[f32]) -> Vec<ParticleIndex> {
        xs.iter()
            .map(|&x| {
                let i = particles.add_body(BodyDesc::cuboid(Vec3::splat(1.0), 1.0).at(Vec3::new(x, 0.0, 0.0)).in_island(0));
                islands.insert(i, Some(0));
                i
            })
            .collect()
    }

    #[test]
    fn cluster_takes_over_children() {
        let mut particles = ParticleStore::new();
        let mut islands = IslandRegistry::with_islands(1);
        let children = boxes(&mut particles, &mut islands, &[0.0, 2.0, 4.0]);
        let mut clustering = RigidClustering::default();

        let parent = clustering.create_cluster_particle(&mut particles, &mut islands, &children);

        assert!(!particles.disabled[parent]);
        assert!(islands.active_indices.contains(&parent));
        assert!(islands.island_particles[0].contains(&parent));
        assert_eq!(particles.island[parent], Some(0));
        for &c in &children {
            assert!(particles.disabled[c]);
            assert!(!islands.active_indices.contains(&c));
            assert!(!islands.island_particles[0].contains(&c));
            assert_eq!(clustering.cluster_id(c), Some(parent));
        }
        assert_eq!(clustering.children(parent), children.as_slice());
        assert!(!clustering.is_internal(parent));
        assert_eq!(clustering.connectivity().edge_count(), 2);
        assert!(clustering.connectivity().is_symmetric());
        assert_eq!(particles.collision_points[parent].as_ref().map(Vec::len), Some(24 - 8));
    }

    #[test]
    fn child_frames_compose_back_to_world() {
        let mut particles = ParticleStore::new();
        let mut islands = IslandRegistry::with_islands(1);
        let children = boxes(&mut particles, &mut islands, &[-3.0, 1.0]);
        let mut clustering = RigidClustering::default();
        let parent = clustering.create_cluster_particle(&mut particles, &mut islands, &children);

        let parent_tm = particles.world_transform(parent);
        for &c in &children {
            let world = clustering.child_to_parent(c).map(|f| f.then(&parent_tm));
            let world = world.map(|w| w.translation).unwrap_or(Vec3::splat(f32::NAN));
            assert!((world - particles.x[c]).length() < 1e-4);
        }
        assert!(matches!(
            particles.geometry[parent].as_ref().map(|g| &g.implicit),
            Some(Implicit::Union(objects)) if objects.len() == 2
        ));
    }

    #[test]
    fn cluster_sleeps_only_when_all_children_sleep() {
        let mut particles = ParticleStore::new();
        let mut islands = IslandRegistry::with_islands(1);
        let children = boxes(&mut particles, &mut islands, &[0.0, 2.0]);
        particles.set_sleeping(children[0], true);
        let mut clustering = RigidClustering::default();
        let awake = clustering.create_cluster_particle(&mut particles, &mut islands, &children);
        assert!(!particles.sleeping[awake]);

        let more = boxes(&mut particles, &mut islands, &[10.0, 12.0]);
        for &c in &more {
            particles.set_sleeping(c, true);
        }
        let asleep = clustering.create_cluster_particle(&mut particles, &mut islands, &more);
        assert!(particles.sleeping[asleep]);
        assert!(!islands.active_indices.contains(&asleep));
    }

    #[test]
    fn internal_cluster_is_placed_at_the_given_world() {
        let mut particles = ParticleStore::new();
        let mut islands = IslandRegistry::with_islands(1);
        let children = boxes(&mut particles, &mut islands, &[0.0, 2.0, 4.0]);
        let mut clustering = RigidClustering::default();
        let parent = clustering.create_cluster_particle(&mut particles, &mut islands, &children);

        let moved = RigidTransform::from_translation(Vec3::new(0.0, 5.0, 0.0)).then(&particles.world_transform(parent));
        let group = [children[1], children[2]];
        let internal = clustering.create_internal_cluster_particle(&mut particles, &mut islands, &group, Some(0), moved);

        assert!(clustering.is_internal(internal));
        assert_eq!(clustering.cluster_id(children[1]), Some(internal));
        assert!((particles.x[internal] - Vec3::new(3.0, 5.0, 0.0)).length() < 1e-4);
        assert!((particles.m[internal] - 2.0).abs() < 1e-5);
        assert!(islands.island_particles[0].contains(&internal));
    }
}
