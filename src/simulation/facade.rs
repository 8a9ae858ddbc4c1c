use wasm_bindgen::prelude::*;

use crate::core::math::Vec3;
use crate::domain::BodyDesc;

use super::step_stats::StepStats;
use super::WorldCore;

#[wasm_bindgen]
pub struct World {
    core: WorldCore,
}

#[wasm_bindgen]
impl World {
    /// Create an empty world with default clustering settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { core: WorldCore::new() }
    }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 { self.core.particle_count() as u32 }

    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u64 { self.core.frame() }

    /// Enable or disable per-step timings
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    /// Get last step stats snapshot (timings are zero when perf is disabled)
    pub fn get_step_stats(&self) -> StepStats {
        self.core.get_step_stats()
    }

    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) {
        self.core.set_gravity(x, y, z);
    }

    pub fn set_ground(&mut self, height: f32, restitution: f32) {
        self.core.set_ground(height, restitution);
    }

    pub fn load_config(&mut self, json: String) -> Result<(), JsValue> {
        self.core
            .load_config_json(&json)
            .map_err(|e| JsValue::from_str(&e))?;
        Ok(())
    }

    pub fn get_config_json(&self) -> String {
        self.core.config_json()
    }

    // === BODIES ===

    /// Add a box centered at (x, y, z) with half extents (hx, hy, hz).
    /// Returns the particle index
    pub fn add_box(&mut self, x: f32, y: f32, z: f32, hx: f32, hy: f32, hz: f32, mass: f32) -> u32 {
        let desc = BodyDesc::cuboid(Vec3::new(hx, hy, hz), mass).at(Vec3::new(x, y, z));
        self.core.add_body(desc) as u32
    }

    /// Add a sphere centered at (x, y, z). Returns the particle index
    pub fn add_sphere(&mut self, x: f32, y: f32, z: f32, radius: f32, mass: f32) -> u32 {
        let desc = BodyDesc::sphere(radius, mass).at(Vec3::new(x, y, z));
        self.core.add_body(desc) as u32
    }

    pub fn set_strain_threshold(&mut self, index: u32, threshold: f32) {
        self.core.set_strain_threshold(index as usize, threshold);
    }

    // === CLUSTERS ===

    /// Group bodies into a cluster. Returns the cluster's particle index
    pub fn create_cluster(&mut self, children: Vec<u32>) -> Result<u32, JsValue> {
        let children: Vec<usize> = children.into_iter().map(|c| c as usize).collect();
        let index = self
            .core
            .create_cluster(&children)
            .map_err(|e| JsValue::from_str(&e))?;
        Ok(index as u32)
    }

    /// Release every child of a cluster. Returns the released children
    pub fn deactivate_cluster(&mut self, index: u32) -> Vec<u32> {
        self.core
            .deactivate_cluster(index as usize)
            .into_iter()
            .map(|i| i as u32)
            .collect()
    }

    /// Strike a body on the next step
    pub fn queue_impact(&mut self, index: u32, x: f32, y: f32, z: f32, ix: f32, iy: f32, iz: f32) {
        self.core
            .queue_impact(index as usize, Vec3::new(x, y, z), Vec3::new(ix, iy, iz));
    }

    /// Step the simulation forward by `dt` seconds.
    /// Returns the bodies that broke loose this step
    pub fn step(&mut self, dt: f32) -> Vec<u32> {
        self.core.step(dt).into_iter().map(|i| i as u32).collect()
    }

    // === QUERIES ===

    /// [x, y, z], empty for unknown indices
    pub fn position(&self, index: u32) -> Vec<f32> {
        let particles = self.core.particles();
        match particles.x.get(index as usize) {
            Some(p) => p.to_array().to_vec(),
            None => Vec::new(),
        }
    }

    /// [x, y, z, w], empty for unknown indices
    pub fn rotation(&self, index: u32) -> Vec<f32> {
        let particles = self.core.particles();
        match particles.r.get(index as usize) {
            Some(q) => q.to_array().to_vec(),
            None => Vec::new(),
        }
    }

    pub fn is_disabled(&self, index: u32) -> bool {
        self.core
            .particles()
            .disabled
            .get(index as usize)
            .copied()
            .unwrap_or(true)
    }

    pub fn is_cluster(&self, index: u32) -> bool {
        self.core.clustering().is_cluster_parent(index as usize)
    }

    pub fn children(&self, index: u32) -> Vec<u32> {
        self.core
            .clustering()
            .children(index as usize)
            .iter()
            .map(|&c| c as u32)
            .collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
