use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::math::{Aabb, RigidTransform};
use crate::domain::ParticleIndex;

/// Undirected edge as seen from one endpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectivityEdge {
    pub sibling: ParticleIndex,
    /// Mean of the two endpoints' strain thresholds.
    pub strain: f32,
}

/// What the graph needs to know about one cluster child.
#[derive(Clone, Copy, Debug)]
pub struct ConnectivityNode {
    pub index: ParticleIndex,
    /// Bounds in the child's own frame, if its geometry has any.
    pub local_bounds: Option<Aabb>,
    pub child_to_parent: RigidTransform,
    pub strain_threshold: f32,
}

/// Adjacency between children of the same cluster.
#[derive(Clone, Debug, Default)]
pub struct ConnectivityGraph {
    edges: HashMap<ParticleIndex, Vec<ConnectivityEdge>>,
}

impl ConnectivityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edges(&self, index: ParticleIndex) -> &[ConnectivityEdge] {
        self.edges.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_edges(&self, index: ParticleIndex) -> bool {
        self.edges.get(&index).map_or(false, |e| !e.is_empty())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum::<usize>() / 2
    }

    /// Connect every pair of children whose boxes overlap.
    ///
    /// The test runs in the first child's frame with its box grown by
    /// `thickening`. All pairs are tested; clusters are expected to be small.
    pub fn build(&mut self, nodes: &[ConnectivityNode], thickening: f32) {
        for (i, a) in nodes.iter().enumerate() {
            let Some(bounds_a) = a.local_bounds else {
                continue;
            };
            let box_a = bounds_a.thickened(thickening);

            for b in &nodes[i + 1..] {
                let Some(bounds_b) = b.local_bounds else {
                    continue;
                };
                let b_in_a = b.child_to_parent.relative_to(&a.child_to_parent);
                if bounds_b.transformed(&b_in_a).intersects(&box_a) {
                    let strain = a.strain_threshold * 0.5 + b.strain_threshold * 0.5;
                    self.add_edge(a.index, b.index, strain);
                }
            }
        }
    }

    /// Insert `a <-> b` unless it already exists.
    pub fn add_edge(&mut self, a: ParticleIndex, b: ParticleIndex, strain: f32) {
        debug_assert_ne!(a, b, "self edge on particle {}", a);
        if self.edges(a).iter().any(|e| e.sibling == b) {
            return;
        }
        self.edges.entry(a).or_default().push(ConnectivityEdge { sibling: b, strain });
        self.edges.entry(b).or_default().push(ConnectivityEdge { sibling: a, strain });
    }

    /// Remove `index` and every reciprocal edge pointing at it.
    pub fn remove(&mut self, index: ParticleIndex) {
        let Some(edges) = self.edges.remove(&index) else {
            return;
        };
        for edge in edges {
            if let Some(sibling_edges) = self.edges.get_mut(&edge.sibling) {
                if let Some(pos) = sibling_edges.iter().position(|e| e.sibling == index) {
                    sibling_edges.swap_remove(pos);
                }
                if sibling_edges.is_empty() {
                    self.edges.remove(&edge.sibling);
                }
            }
        }
    }

    /// Partition `candidates` into groups connected through edges that stay inside `candidates`.
    ///
    /// Groups come out in the order their first member appears in `candidates`.
    pub fn connected_components(&self, candidates: &[ParticleIndex]) -> Vec<Vec<ParticleIndex>> {
        let allowed: HashSet<ParticleIndex> = candidates.iter().copied().collect();
        let mut visited: HashSet<ParticleIndex> = HashSet::with_capacity(candidates.len());
        let mut groups = Vec::new();
        let mut queue = VecDeque::new();

        for &start in candidates {
            if !visited.insert(start) {
                continue;
            }
            let mut group = vec![start];
            queue.push_back(start);
            while let Some(current) = queue.pop_front() {
                for edge in self.edges(current) {
                    if allowed.contains(&edge.sibling) && visited.insert(edge.sibling) {
                        group.push(edge.sibling);
                        queue.push_back(edge.sibling);
                    }
                }
            }
            groups.push(group);
        }

        groups
    }

    /// Every edge has a reciprocal with the same weight.
    pub fn is_symmetric(&self) -> bool {
        self.edges.iter().all(|(&a, edges)| {
            edges.iter().all(|e| {
                self.edges(e.sibling)
                    .iter()
                    .any(|back| back.sibling == a && back.strain == e.strain)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vec3;

    fn node(index: ParticleIndex, x: f32, threshold: f32) -> ConnectivityNode {
        ConnectivityNode {
            index,
            local_bounds: Some(Aabb::from_half_extents(Vec3::ZERO, Vec3::splat(1.0))),
            child_to_parent: RigidTransform::from_translation(Vec3::new(x, 0.0, 0.0)),
            strain_threshold: threshold,
        }
    }

    #[test]
    fn touching_children_get_symmetric_averaged_edges() {
        let mut graph = ConnectivityGraph::new();
        graph.build(&[node(0, 0.0, 10.0), node(1, 2.0, 20.0), node(2, 50.0, 5.0)], 1.0);

        assert_eq!(graph.edges(0), &[ConnectivityEdge { sibling: 1, strain: 15.0 }]);
        assert_eq!(graph.edges(1), &[ConnectivityEdge { sibling: 0, strain: 15.0 }]);
        assert!(graph.edges(2).is_empty());
        assert!(graph.is_symmetric());
    }

    #[test]
    fn chain_is_fully_connected() {
        let mut graph = ConnectivityGraph::new();
        graph.build(&[node(0, 0.0, 1.0), node(1, 2.0, 1.0), node(2, 4.0, 1.0), node(3, 6.0, 1.0)], 0.5);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.connected_components(&[0, 1, 2, 3]).len(), 1);
    }

    #[test]
    fn child_without_bounds_stays_isolated() {
        let mut graph = ConnectivityGraph::new();
        let mut lonely = node(1, 0.0, 1.0);
        lonely.local_bounds = None;
        graph.build(&[node(0, 0.0, 1.0), lonely], 1.0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn remove_drops_both_directions() {
        let mut graph = ConnectivityGraph::new();
        graph.add_edge(0, 1, 1.0);
        graph.add_edge(1, 2, 1.0);
        graph.add_edge(0, 1, 1.0);
        assert_eq!(graph.edge_count(), 2);

        graph.remove(1);
        assert!(!graph.has_edges(0));
        assert!(!graph.has_edges(2));
        assert!(graph.is_symmetric());
    }

    #[test]
    fn components_respect_candidate_set() {
        let mut graph = ConnectivityGraph::new();
        graph.add_edge(0, 1, 1.0);
        graph.add_edge(1, 2, 1.0);
        graph.add_edge(3, 4, 1.0);

        let groups = graph.connected_components(&[0, 2, 3, 4]);
        assert_eq!(groups, vec![vec![0], vec![2], vec![3, 4]]);
    }
}
