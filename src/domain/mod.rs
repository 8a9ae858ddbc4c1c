//! Domain data shared between the clustering engine and its collaborators.

pub mod config;
pub mod contacts;
pub mod islands;
pub mod particles;

pub use config::ClusteringConfig;
pub use contacts::Contact;
pub use islands::IslandRegistry;
pub use particles::{BodyDesc, ParticleIndex, ParticleStore};
