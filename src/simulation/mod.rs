//! World - rigid bodies, clusters and the per-step pipeline.
//!
//! The world only orchestrates: integration and contacts come from the
//! collaborators in `systems/`, cluster bookkeeping and fracture from
//! [`RigidClustering`]. One step is
//!
//! 1. seed the predicted state from the step-start state,
//! 2. integrate every island,
//! 3. generate and resolve ground contacts,
//! 4. advance clustering (break, regroup, rewind touched islands),
//! 5. commit the predicted state.

use crate::core::math::Vec3;
use crate::domain::{BodyDesc, ClusteringConfig, IslandRegistry, ParticleIndex, ParticleStore};
use crate::systems::clustering::RigidClustering;
use crate::systems::collision::GroundPlaneCollisions;
use crate::systems::evolution::EulerIntegrator;

#[path = "perf/step_stats.rs"]
mod step_stats;
#[path = "step/step.rs"]
mod step;
#[path = "commands/commands.rs"]
mod commands;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
mod facade;

pub use facade::World;
pub use step_stats::StepStats;

/// Island new bodies land in unless their descriptor names one.
pub const DEFAULT_ISLAND: usize = 0;

/// The simulation world
pub struct WorldCore {
    particles: ParticleStore,
    islands: IslandRegistry,
    clustering: RigidClustering,
    integrator: EulerIntegrator,
    collisions: GroundPlaneCollisions,

    // State
    frame: u64,

    // Perf metrics
    perf_enabled: bool,
    step_stats: StepStats,
}

impl WorldCore {
    /// Empty world with default gravity, a ground plane at `y = 0` and default clustering.
    pub fn new() -> Self {
        init::create_world_core(ClusteringConfig::default())
    }

    pub fn with_config(config: ClusteringConfig) -> Self {
        init::create_world_core(config)
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.particles
    }

    pub fn islands(&self) -> &IslandRegistry {
        &self.islands
    }

    pub fn clustering(&self) -> &RigidClustering {
        &self.clustering
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Replace the clustering tunables from JSON; missing fields take their defaults.
    pub fn load_config_json(&mut self, json: &str) -> Result<(), String> {
        settings::load_config_json(self, json)
    }

    pub fn config_json(&self) -> String {
        settings::config_json(self)
    }

    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) {
        settings::set_gravity(self, x, y, z);
    }

    pub fn set_ground(&mut self, height: f32, restitution: f32) {
        settings::set_ground(self, height, restitution);
    }

    /// Enable or disable per-step timings (counters are always collected)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    pub fn get_step_stats(&self) -> StepStats {
        settings::get_step_stats(self)
    }

    pub fn add_body(&mut self, desc: BodyDesc) -> ParticleIndex {
        commands::add_body(self, desc)
    }

    pub fn set_strain_threshold(&mut self, index: ParticleIndex, threshold: f32) {
        commands::set_strain_threshold(self, index, threshold);
    }

    pub fn create_cluster(&mut self, children: &[ParticleIndex]) -> Result<ParticleIndex, String> {
        commands::create_cluster(self, children)
    }

    /// Strike `index` with `impulse` at world `location` on the next step.
    pub fn queue_impact(&mut self, index: ParticleIndex, location: Vec3, impulse: Vec3) {
        commands::queue_impact(self, index, location, impulse);
    }

    /// Release every child of `index`. Returns the released children, sorted.
    pub fn deactivate_cluster(&mut self, index: ParticleIndex) -> Vec<ParticleIndex> {
        commands::deactivate_cluster(self, index)
    }

    /// Advance by `dt` seconds. Returns the bodies activated by fracture, sorted.
    pub fn step(&mut self, dt: f32) -> Vec<ParticleIndex> {
        step::step(self, dt)
    }
}

impl Default for WorldCore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
