//! Shared data structures for simulation well topology
//!
//! This module defines the core value types the importer produces and the
//! centerline calculator consumes:
//! - `Vec3`: model-space point/direction
//! - `WellResultPoint`: one cell connection or one unpositioned segment
//! - `WellResultBranch`: ordered points sharing an ERT branch id
//! - `WellResultFrame`: one well at one timestep

mod frame;
mod result_point;
mod vec3;

pub use frame::*;
pub use result_point::*;
pub use vec3::*;
