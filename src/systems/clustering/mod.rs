//! Rigid clustering.
//!
//! A cluster is an ordinary particle whose mass, geometry and collision points
//! are aggregated from a set of children. While the relation exists the
//! children are disabled and carried along through their `child_to_parent`
//! frames. Each step the contacts resolved by the collision solver are turned
//! into per-child strain; children whose strain reaches their threshold break
//! off, the survivors regroup by connectivity, and the islands that changed
//! are rewound and re-solved so the break takes effect in the same step.

mod builder;
mod connectivity;
mod fracture;
mod geometry;
mod mass;
mod rewind;
mod strain;

use std::collections::{HashMap, HashSet};

use crate::core::math::RigidTransform;
use crate::domain::{ClusteringConfig, ParticleIndex};

pub use connectivity::{ConnectivityEdge, ConnectivityGraph, ConnectivityNode};
pub use fracture::ClusteringUpdate;

/// Counters and phase timings for the last `advance_clustering` call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BreakStats {
    pub clusters_evaluated: u32,
    pub clusters_broken: u32,
    pub children_released: u32,
    pub internal_clusters_created: u32,
    pub islands_rewound: u32,
    pub strain_entries: u32,
    pub strain_ms: f64,
    pub break_ms: f64,
    pub rewind_ms: f64,
}

/// Cluster bookkeeping and the per-step fracture driver.
pub struct RigidClustering {
    config: ClusteringConfig,
    parent_to_children: HashMap<ParticleIndex, Vec<ParticleIndex>>,
    cluster_ids: HashMap<ParticleIndex, ParticleIndex>,
    child_to_parent: HashMap<ParticleIndex, RigidTransform>,
    internal_clusters: HashSet<ParticleIndex>,
    strain_thresholds: HashMap<ParticleIndex, f32>,
    connectivity: ConnectivityGraph,
    stats: BreakStats,
}

impl RigidClustering {
    pub fn new(config: ClusteringConfig) -> Self {
        Self {
            config,
            parent_to_children: HashMap::new(),
            cluster_ids: HashMap::new(),
            child_to_parent: HashMap::new(),
            internal_clusters: HashSet::new(),
            strain_thresholds: HashMap::new(),
            connectivity: ConnectivityGraph::new(),
            stats: BreakStats::default(),
        }
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ClusteringConfig) {
        self.config = config;
    }

    /// Direct children of `parent`, empty if it is not a cluster.
    pub fn children(&self, parent: ParticleIndex) -> &[ParticleIndex] {
        self.parent_to_children
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn cluster_id(&self, child: ParticleIndex) -> Option<ParticleIndex> {
        self.cluster_ids.get(&child).copied()
    }

    pub fn child_to_parent(&self, child: ParticleIndex) -> Option<RigidTransform> {
        self.child_to_parent.get(&child).copied()
    }

    /// Created by regrouping survivors of a break rather than by the caller.
    pub fn is_internal(&self, parent: ParticleIndex) -> bool {
        self.internal_clusters.contains(&parent)
    }

    /// Strain a particle withstands before it breaks off. Unbreakable unless set.
    pub fn strain_threshold(&self, index: ParticleIndex) -> f32 {
        self.strain_thresholds.get(&index).copied().unwrap_or(f32::MAX)
    }

    pub fn set_strain_threshold(&mut self, index: ParticleIndex, threshold: f32) {
        self.strain_thresholds.insert(index, threshold);
    }

    pub fn connectivity(&self) -> &ConnectivityGraph {
        &self.connectivity
    }

    pub fn is_cluster_parent(&self, index: ParticleIndex) -> bool {
        self.parent_to_children.contains_key(&index)
    }

    /// Every live cluster parent in ascending index order.
    pub fn cluster_parents(&self) -> Vec<ParticleIndex> {
        let mut parents: Vec<ParticleIndex> = self.parent_to_children.keys().copied().collect();
        parents.sort_unstable();
        parents
    }

    pub fn stats(&self) -> &BreakStats {
        &self.stats
    }
}

impl Default for RigidClustering {
    fn default() -> Self {
        Self::new(ClusteringConfig::default())
    }
}
