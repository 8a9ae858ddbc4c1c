use serde::{Deserialize, Serialize};

/// Tunables for clustering, breaking and the rewind pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Regroup surviving children by connectivity after a break.
    pub use_connectivity: bool,
    /// Released children take the parent's linear/angular velocity.
    pub children_inherit_velocity: bool,
    /// Rewind and re-integrate islands touched by a break within the same step.
    pub rewind_on_break: bool,
    /// Also re-resolve collisions for the rewound islands.
    pub rewind_collision_solve: bool,
    /// Voxelize cluster geometry into a level set.
    pub use_level_set: bool,
    pub min_level_set_dimension: usize,
    pub max_level_set_dimension: usize,
    /// Smallest extent that still gets a level set; also the target cell size.
    pub min_level_set_size: f32,
    pub level_set_ghost_cells: usize,
    /// Collision points closer than this collapse into one.
    pub snap_distance: f32,
    /// Interior points are only pruned while more than this many remain.
    pub min_cleaned_points_before_removing_internals: usize,
    /// Half size of the box around a contact used to find strained children.
    pub contact_thickening: f32,
    /// Margin applied to child boxes when building connectivity.
    pub connectivity_thickening: f32,
    /// Impulses below this magnitude produce no strain.
    pub min_strain_impulse: f32,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            use_connectivity: true,
            children_inherit_velocity: true,
            rewind_on_break: true,
            rewind_collision_solve: true,
            use_level_set: false,
            min_level_set_dimension: 4,
            max_level_set_dimension: 20,
            min_level_set_size: 50.0,
            level_set_ghost_cells: 1,
            snap_distance: 1.0,
            min_cleaned_points_before_removing_internals: 10,
            contact_thickening: 100.0,
            connectivity_thickening: 1.0,
            min_strain_impulse: 1e-4,
        }
    }
}

impl ClusteringConfig {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: ClusteringConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_level_set_dimension == 0 {
            return Err("min_level_set_dimension must be at least 1".to_string());
        }
        if self.min_level_set_dimension > self.max_level_set_dimension {
            return Err(format!(
                "min_level_set_dimension ({}) exceeds max_level_set_dimension ({})",
                self.min_level_set_dimension, self.max_level_set_dimension
            ));
        }
        let distances = [
            ("min_level_set_size", self.min_level_set_size),
            ("snap_distance", self.snap_distance),
            ("contact_thickening", self.contact_thickening),
            ("connectivity_thickening", self.connectivity_thickening),
            ("min_strain_impulse", self.min_strain_impulse),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be finite and non-negative, got {}", name, value));
            }
        }
        if self.min_level_set_size == 0.0 {
            return Err("min_level_set_size must be positive".to_string());
        }
        Ok(())
    }
}
