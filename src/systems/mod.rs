//! Systems: the clustering engine and the solver seams it drives.

pub mod clustering;
pub mod collision;
pub mod evolution;
