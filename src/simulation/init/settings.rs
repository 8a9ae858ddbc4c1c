use crate::core::math::Vec3;
use crate::domain::ClusteringConfig;
use crate::systems::collision::GroundPlaneCollisions;

use super::step_stats::StepStats;
use super::WorldCore;

pub(super) fn load_config_json(world: &mut WorldCore, json: &str) -> Result<(), String> {
    let config = ClusteringConfig::from_json(json)?;
    log::info!("clustering config loaded: {}", config.to_json());
    world.clustering.set_config(config);
    Ok(())
}

pub(super) fn config_json(world: &WorldCore) -> String {
    world.clustering.config().to_json()
}

pub(super) fn set_gravity(world: &mut WorldCore, x: f32, y: f32, z: f32) {
    world.integrator.gravity = Vec3::new(x, y, z);
}

pub(super) fn set_ground(world: &mut WorldCore, height: f32, restitution: f32) {
    world.collisions = GroundPlaneCollisions::new(height, restitution);
}

pub(super) fn enable_perf_metrics(world: &mut WorldCore, enabled: bool) {
    world.perf_enabled = enabled;
}

pub(super) fn get_step_stats(world: &WorldCore) -> StepStats {
    world.step_stats.clone()
}
