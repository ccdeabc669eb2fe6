//! SimWell: simulation well topology and pipe centerlines
//!
//! Reconstructs per-cell well geometry from raw simulator connection records
//! and turns it into continuous 3D polylines for pipe rendering.
//!
//! ## Architecture
//!
//! - **Grid**: arena store of grids and cells, LGRs included
//! - **Source**: serde model of raw well/segment/connection records
//! - **Import**: IJK resolution, LGR host suppression, multi-segment walk
//!   and placeholder interpolation
//! - **SimWell**: per-well frames, timestep mapping and the static frame
//! - **Centerline**: pipe polylines with per-edge attributions
//!
//! Data flows one way: `import` builds `SimWellData`, `centerline` reads it
//! together with the grid.

pub mod centerline;
pub mod config;
pub mod grid;
pub mod import;
pub mod sim_well;
pub mod source;
pub mod types;

pub use centerline::{
    calculate_centerlines, calculate_from_frame, calculate_static_centerlines, CenterlineCache,
    CenterlineSettings, PipeBranch, TimeStepSelection,
};
pub use config::SimWellConfig;
pub use grid::{Cell, CellFace, Grid, GridCase, GridError};
pub use import::{import_case, import_well, ImportError};
pub use sim_well::{CaseWellResults, SimWellData};
pub use source::{CaseFile, RawConnection, RawSegment, RawWell, RawWellTimeStep, SourceError};
pub use types::{
    Vec3, WellProductionType, WellResultBranch, WellResultFrame, WellResultPoint,
};
