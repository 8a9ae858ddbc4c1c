use wasm_bindgen::prelude::*;

use crate::systems::clustering::BreakStats;

#[wasm_bindgen]
#[derive(Clone, Default)]
pub struct StepStats {
    pub(super) step_ms: f64,
    pub(super) integrate_ms: f64,
    pub(super) collide_ms: f64,
    pub(super) clustering_ms: f64,
    pub(super) strain_ms: f64,
    pub(super) break_ms: f64,
    pub(super) rewind_ms: f64,
    pub(super) contacts: u32,
    pub(super) strain_entries: u32,
    pub(super) clusters_evaluated: u32,
    pub(super) clusters_broken: u32,
    pub(super) children_released: u32,
    pub(super) internal_clusters_created: u32,
    pub(super) islands_rewound: u32,
    pub(super) active_bodies: u32,
    pub(super) particle_count: u32,
}

impl StepStats {
    pub(crate) fn reset(&mut self) {
        *self = StepStats::default();
    }

    /// Copy the clustering counters; timings only when `with_timings`.
    pub(crate) fn record_break(&mut self, stats: &BreakStats, with_timings: bool) {
        self.strain_entries = stats.strain_entries;
        self.clusters_evaluated = stats.clusters_evaluated;
        self.clusters_broken = stats.clusters_broken;
        self.children_released = stats.children_released;
        self.internal_clusters_created = stats.internal_clusters_created;
        self.islands_rewound = stats.islands_rewound;
        if with_timings {
            self.strain_ms = stats.strain_ms;
            self.break_ms = stats.break_ms;
            self.rewind_ms = stats.rewind_ms;
        }
    }
}

#[wasm_bindgen]
impl StepStats {
    #[wasm_bindgen(getter)]
    pub fn step_ms(&self) -> f64 { self.step_ms }
    #[wasm_bindgen(getter)]
    pub fn integrate_ms(&self) -> f64 { self.integrate_ms }
    #[wasm_bindgen(getter)]
    pub fn collide_ms(&self) -> f64 { self.collide_ms }
    #[wasm_bindgen(getter)]
    pub fn clustering_ms(&self) -> f64 { self.clustering_ms }
    #[wasm_bindgen(getter)]
    pub fn strain_ms(&self) -> f64 { self.strain_ms }
    #[wasm_bindgen(getter)]
    pub fn break_ms(&self) -> f64 { self.break_ms }
    #[wasm_bindgen(getter)]
    pub fn rewind_ms(&self) -> f64 { self.rewind_ms }
    #[wasm_bindgen(getter)]
    pub fn contacts(&self) -> u32 { self.contacts }
    #[wasm_bindgen(getter)]
    pub fn strain_entries(&self) -> u32 { self.strain_entries }
    #[wasm_bindgen(getter)]
    pub fn clusters_evaluated(&self) -> u32 { self.clusters_evaluated }
    #[wasm_bindgen(getter)]
    pub fn clusters_broken(&self) -> u32 { self.clusters_broken }
    #[wasm_bindgen(getter)]
    pub fn children_released(&self) -> u32 { self.children_released }
    #[wasm_bindgen(getter)]
    pub fn internal_clusters_created(&self) -> u32 { self.internal_clusters_created }
    #[wasm_bindgen(getter)]
    pub fn islands_rewound(&self) -> u32 { self.islands_rewound }
    #[wasm_bindgen(getter)]
    pub fn active_bodies(&self) -> u32 { self.active_bodies }
    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 { self.particle_count }
}
