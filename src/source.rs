//! Raw Well Connection Source
//!
//! Serde model of the simulator's per-timestep well records as delivered by
//! an external restart-file reader: well heads, completions (connections) and,
//! for multi-segment wells, the segment tree. IJK values are 1-based exactly
//! as reported and are validated by the importer, not here.
//!
//! A JSON "case file" bundles a grid description, the global timestep list
//! and the raw wells so a complete case can be loaded from disk:
//!
//! ```ignore
//! let case_file = CaseFile::load("case.json")?;
//! let grid = case_file.build_grid()?;
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::grid::{GridCase, GridError, RefinementSpec, RegularGridSpec};
use crate::types::WellProductionType;

/// Errors raised while loading a case file
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error reading {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("JSON error in {0}: {1}")]
    Json(PathBuf, serde_json::Error),

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),
}

/// One completion / connection record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawConnection {
    /// Grid the IJK refers to (0 = main grid)
    #[serde(default)]
    pub grid_index: usize,
    /// 1-based I
    pub i: i64,
    /// 1-based J
    pub j: i64,
    /// 1-based K. Fracture-model connections report `k > nk`.
    pub k: i64,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub connection_factor: f64,
    #[serde(default)]
    pub volume_rate: f64,
    #[serde(default)]
    pub oil_rate: f64,
    #[serde(default)]
    pub gas_rate: f64,
    #[serde(default)]
    pub water_rate: f64,
    /// Segment holding this connection (multi-segment wells only)
    #[serde(default)]
    pub segment_id: Option<i32>,
}

/// One multi-segment well segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    pub id: i32,
    pub branch_id: i32,
    /// Segment this one flows into. `None` (or an id that does not exist)
    /// means the segment connects directly to the well head.
    #[serde(default)]
    pub outlet_segment_id: Option<i32>,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub is_connected_to_valve: bool,
}

/// One well at one report step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWellTimeStep {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub production_type: WellProductionType,
    /// Well head definitions, at most one per grid
    #[serde(default)]
    pub well_heads: Vec<RawConnection>,
    #[serde(default)]
    pub connections: Vec<RawConnection>,
    /// Segment tree; empty for normal wells
    #[serde(default)]
    pub segments: Vec<RawSegment>,
}

impl RawWellTimeStep {
    #[must_use]
    pub fn is_multi_segment(&self) -> bool {
        !self.segments.is_empty()
    }
}

/// All report steps of one well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWell {
    pub name: String,
    pub time_steps: Vec<RawWellTimeStep>,
}

impl RawWell {
    /// A well is multi-segment if any of its report steps has a segment tree.
    #[must_use]
    pub fn is_multi_segment(&self) -> bool {
        self.time_steps.iter().any(RawWellTimeStep::is_multi_segment)
    }
}

/// A complete case on disk: grid, global timesteps and raw wells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFile {
    pub grid: RegularGridSpec,
    #[serde(default)]
    pub refinements: Vec<RefinementSpec>,
    pub time_steps: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub wells: Vec<RawWell>,
}

impl CaseFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Io(path.to_path_buf(), e))?;
        let case: Self = serde_json::from_str(&contents)
            .map_err(|e| SourceError::Json(path.to_path_buf(), e))?;
        info!(
            path = %path.display(),
            wells = case.wells.len(),
            time_steps = case.time_steps.len(),
            "Loaded case file"
        );
        Ok(case)
    }

    /// Build the main grid and all refinements, in file order.
    pub fn build_grid(&self) -> Result<GridCase, SourceError> {
        let mut case = GridCase::new(self.grid.build("MAIN")?);
        for refinement in &self.refinements {
            case.add_refinement(refinement)?;
        }
        Ok(case)
    }
}
