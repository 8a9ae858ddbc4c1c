//! Core building blocks: math, implicit geometry and timing.

pub mod geometry;
pub mod math;
pub(crate) mod phase_clock;
