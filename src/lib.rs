//! Shatter Engine - rigid-body clustering and fracture in WASM
//!
//! Many rigid bodies can be welded into one cluster body and later broken
//! apart by collision strain, with the affected islands rewound and re-solved
//! in the same step.
//!
//! Architecture:
//! - core/        - math, implicit geometry, timing
//! - domain/      - particle store, islands, contacts, configuration
//! - systems/     - clustering engine plus the integrator and collision seams
//! - simulation/  - world orchestration and the wasm facade

pub mod core;
pub mod domain;
pub mod systems;
pub mod simulation;

use wasm_bindgen::prelude::*;

// Re-export wasm-bindgen-rayon for thread pool initialization
#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
pub use wasm_bindgen_rayon::init_thread_pool;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    web_sys::console::log_1(&"Shatter WASM engine initialized".into());
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use domain::{BodyDesc, ClusteringConfig, Contact, IslandRegistry, ParticleIndex, ParticleStore};
pub use simulation::{StepStats, World, WorldCore};
pub use systems::clustering::{BreakStats, ClusteringUpdate, RigidClustering};
pub use systems::collision::{CollisionSolver, ContactList, GroundPlaneCollisions};
pub use systems::evolution::{EulerIntegrator, Integrator, IslandBodies};
