use std::collections::HashMap;

use crate::core::math::{Aabb, Vec3};
use crate::domain::{Contact, ParticleIndex, ParticleStore};

use super::RigidClustering;

impl RigidClustering {
    /// Total impulse magnitude each cluster child received this step.
    ///
    /// Both sides of every contact are considered. A side that is a cluster
    /// parent spreads the impulse onto each direct child whose bounds lie
    /// within `contact_thickening` of the contact point, measured in the
    /// parent's predicted frame. Nested clusters are not descended into.
    pub fn compute_strain_from_collision(
        &self,
        particles: &ParticleStore,
        contacts: &[Contact],
    ) -> HashMap<ParticleIndex, f32> {
        let mut strains = HashMap::new();

        for contact in contacts {
            let impulse = contact.accumulated_impulse.length();
            if impulse < self.config.min_strain_impulse {
                continue;
            }

            self.tally_contact(particles, contact.particle, contact.location, impulse, &mut strains);
            if let Some(other) = contact.levelset.filter(|&l| l != contact.particle) {
                self.tally_contact(particles, other, contact.location, impulse, &mut strains);
            }
        }

        strains
    }

    fn tally_contact(
        &self,
        particles: &ParticleStore,
        parent: ParticleIndex,
        location: Vec3,
        impulse: f32,
        strains: &mut HashMap<ParticleIndex, f32>,
    ) {
        let Some(children) = self.parent_to_children.get(&parent) else {
            return;
        };

        let local = particles.predicted_transform(parent).inverse_transform_point(location);
        let contact_box = Aabb::from_point(local).thickened(self.config.contact_thickening);

        for &child in children {
            let Some(bounds) = particles.geometry[child].as_ref().and_then(|g| g.bounding_box()) else {
                continue;
            };
            let Some(frame) = self.child_to_parent.get(&child) else {
                continue;
            };
            if bounds.transformed(frame).intersects(&contact_box) {
                *strains.entry(child).or_insert(0.0) += impulse;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BodyDesc, ClusteringConfig, IslandRegistry};

    fn row_of_three() -> (RigidClustering, ParticleStore, Vec<ParticleIndex>, ParticleIndex) {
        let mut particles = ParticleStore::new();
        let mut islands = IslandRegistry::with_islands(1);
        let children: Vec<ParticleIndex> = [0.0, 10.0, 20.0]
            .iter()
            .map(|&x| {
                let i = particles.add_body(BodyDesc::cuboid(Vec3::splat(1.0), 1.0).at(Vec3::new(x, 0.0, 0.0)).in_island(0));
                islands.insert(i, Some(0));
                i
            })
            .collect();

        let config = ClusteringConfig { contact_thickening: 2.0, ..ClusteringConfig::default() };
        let mut clustering = RigidClustering::new(config);
        let parent = clustering.create_cluster_particle(&mut particles, &mut islands, &children);
        (clustering, particles, children, parent)
    }

    #[test]
    fn impulse_goes_to_children_near_the_contact() {
        let (clustering, particles, children, parent) = row_of_three();
        let contacts = [Contact::new(parent, None, Vec3::new(-1.0, 0.0, 0.0), Vec3::X * 5.0)];

        let strains = clustering.compute_strain_from_collision(&particles, &contacts);
        assert_eq!(strains.len(), 1);
        assert!((strains[&children[0]] - 5.0).abs() < 1e-5);
    }

    #[test]
    fn both_sides_and_repeated_contacts_accumulate() {
        let (clustering, particles, children, parent) = row_of_three();
        let contacts = [
            Contact::new(99, Some(parent), Vec3::new(20.0, 0.0, 0.0), Vec3::Y * 2.0),
            Contact::new(parent, None, Vec3::new(21.0, 0.0, 0.0), Vec3::Y * 3.0),
        ];

        let strains = clustering.compute_strain_from_collision(&particles, &contacts);
        assert!((strains[&children[2]] - 5.0).abs() < 1e-5);
        assert!(!strains.contains_key(&children[0]));
    }

    #[test]
    fn negligible_impulses_and_plain_bodies_are_ignored() {
        let (clustering, particles, children, parent) = row_of_three();
        let contacts = [
            Contact::new(parent, None, Vec3::ZERO, Vec3::X * 1e-6),
            Contact::new(children[1], None, Vec3::new(10.0, 0.0, 0.0), Vec3::X * 100.0),
        ];
        assert!(clustering.compute_strain_from_collision(&particles, &contacts).is_empty());
    }

    #[test]
    fn strain_is_a_pure_function_of_the_contacts() {
        let (clustering, particles, _, parent) = row_of_three();
        let contacts = [Contact::new(parent, None, Vec3::new(10.0, 1.0, 0.0), Vec3::Z * 4.0)];
        let first = clustering.compute_strain_from_collision(&particles, &contacts);
        let second = clustering.compute_strain_from_collision(&particles, &contacts);
        assert_eq!(first, second);
    }
}
