use std::collections::HashSet;

use super::particles::ParticleIndex;

/// Active set and island partition shared with the solver.
///
/// Islands are disjoint: a particle appears in at most one set.
#[derive(Default, Debug)]
pub struct IslandRegistry {
    pub active_indices: HashSet<ParticleIndex>,
    pub island_particles: Vec<HashSet<ParticleIndex>>,
}

impl IslandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_islands(count: usize) -> Self {
        Self {
            active_indices: HashSet::new(),
            island_particles: vec![HashSet::new(); count],
        }
    }

    pub fn is_valid_island(&self, island: usize) -> bool {
        island < self.island_particles.len()
    }

    /// Make sure `island` exists.
    pub fn ensure_island(&mut self, island: usize) {
        if island >= self.island_particles.len() {
            self.island_particles.resize_with(island + 1, HashSet::new);
        }
    }

    /// Register an awake body as active and a member of `island`.
    pub fn insert(&mut self, index: ParticleIndex, island: Option<usize>) {
        self.active_indices.insert(index);
        if let Some(island) = island {
            self.ensure_island(island);
            self.island_particles[island].insert(index);
        }
    }

    pub fn add_to_island(&mut self, island: Option<usize>, index: ParticleIndex) {
        if let Some(set) = island.and_then(|i| self.island_particles.get_mut(i)) {
            set.insert(index);
        }
    }

    pub fn remove_from_island(&mut self, island: Option<usize>, index: ParticleIndex) {
        if let Some(set) = island.and_then(|i| self.island_particles.get_mut(i)) {
            set.remove(&index);
        }
    }

    /// Sorted members of `island`, for deterministic iteration.
    pub fn sorted_members(&self, island: usize) -> Vec<ParticleIndex> {
        let mut out: Vec<ParticleIndex> = self
            .island_particles
            .get(island)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_island_is_ignored() {
        let mut reg = IslandRegistry::with_islands(1);
        reg.add_to_island(Some(4), 7);
        reg.add_to_island(None, 7);
        assert!(reg.island_particles[0].is_empty());

        reg.insert(3, Some(2));
        assert_eq!(reg.island_particles.len(), 3);
        assert_eq!(reg.sorted_members(2), vec![3]);
        assert!(reg.active_indices.contains(&3));
    }
}
