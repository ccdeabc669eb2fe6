//! Centerline Calculator
//!
//! Turns one well frame into renderable pipe polylines. Each `PipeBranch`
//! carries one attribution per polyline edge: the result point responsible
//! for the part of the pipe ending at the edge's far point. Edges that only
//! bridge a gap between two cells are attributed to a positioned placeholder
//! at the edge's end, so every attribution can be placed in space.
//!
//! Grid geometry is passed in explicitly; the frame is never modified.

mod cache;
mod calculator;

pub use cache::CenterlineCache;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::GridCase;
use crate::sim_well::SimWellData;
use crate::types::{Vec3, WellResultFrame, WellResultPoint};

/// Pipe construction options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CenterlineSettings {
    /// Split normal wells into branches when a cell lies closer to the well
    /// head than to the previous cell. Never applies to multi-segment wells.
    #[serde(default = "default_true")]
    pub auto_detect_branches: bool,
    /// Route the pipe through every connected cell's center
    #[serde(default)]
    pub use_all_cell_centers: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for CenterlineSettings {
    fn default() -> Self {
        Self {
            auto_detect_branches: true,
            use_all_cell_centers: false,
        }
    }
}

/// Which frame of a well to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStepSelection {
    /// The time-merged frame
    Static,
    /// A global (case) timestep index
    Index(usize),
}

/// One pipe polyline with its per-edge attributions.
///
/// `attributions.len() == points.len() - 1` for every branch produced here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipeBranch {
    pub points: Vec<Vec3>,
    pub attributions: Vec<WellResultPoint>,
}

impl PipeBranch {
    /// Total polyline length
    #[must_use]
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1] - w[0]).length())
            .sum()
    }
}

/// Pipes of a well at a global timestep or for the static frame.
///
/// Empty when the well has no frame at that timestep or the frame has no
/// cell at all.
#[must_use]
pub fn calculate_centerlines(
    grid: &GridCase,
    well: &SimWellData,
    selection: TimeStepSelection,
    settings: CenterlineSettings,
) -> Vec<PipeBranch> {
    let frame = match selection {
        TimeStepSelection::Static => Some(well.static_well_result_frame()),
        TimeStepSelection::Index(i) => well.well_result_frame(i),
    };
    let Some(frame) = frame else {
        debug!(well = %well.well_name, ?selection, "No well result, no centerline");
        return Vec::new();
    };

    let pipes = calculate_from_frame(grid, frame, well.is_multi_segment_well, settings);
    debug!(
        well = %well.well_name,
        ?selection,
        branches = pipes.len(),
        "Calculated centerlines"
    );
    pipes
}

/// Pipes of the time-merged frame.
#[must_use]
pub fn calculate_static_centerlines(
    grid: &GridCase,
    well: &SimWellData,
    settings: CenterlineSettings,
) -> Vec<PipeBranch> {
    calculate_centerlines(grid, well, TimeStepSelection::Static, settings)
}

/// Pipes of a single frame.
#[must_use]
pub fn calculate_from_frame(
    grid: &GridCase,
    frame: &WellResultFrame,
    is_multi_segment_well: bool,
    settings: CenterlineSettings,
) -> Vec<PipeBranch> {
    if !frame.has_any_cell() {
        return Vec::new();
    }
    let mut pipes = calculator::build_pipes(grid, frame, is_multi_segment_well, settings);
    if settings.use_all_cell_centers {
        for pipe in &mut pipes {
            calculator::insert_cell_centers(grid, pipe);
        }
    }
    pipes
}
