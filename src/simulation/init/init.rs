use crate::domain::{ClusteringConfig, IslandRegistry, ParticleStore};
use crate::systems::clustering::RigidClustering;
use crate::systems::collision::GroundPlaneCollisions;
use crate::systems::evolution::EulerIntegrator;

use super::step_stats::StepStats;
use super::{WorldCore, DEFAULT_ISLAND};

pub(super) fn create_world_core(config: ClusteringConfig) -> WorldCore {
    WorldCore {
        particles: ParticleStore::new(),
        islands: IslandRegistry::with_islands(DEFAULT_ISLAND + 1),
        clustering: RigidClustering::new(config),
        integrator: EulerIntegrator::default(),
        collisions: GroundPlaneCollisions::default(),
        frame: 0,
        perf_enabled: false,
        step_stats: StepStats::default(),
    }
}
