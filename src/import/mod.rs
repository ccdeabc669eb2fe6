//! Connection Importer
//!
//! Turns raw per-timestep well records into `SimWellData`:
//!
//! 1. Resolve every well head and connection IJK to a `(grid, cell)` pair,
//!    dropping connections that fall outside their grid.
//! 2. Suppress points on coarse cells that host a connected LGR cell.
//! 3. Build the frame's branches: a single branch for normal wells, the
//!    segment-tree walk with interpolated placeholders for multi-segment
//!    wells.
//!
//! The grid is passed in explicitly and only ever read.

mod msw;
mod sub_cell;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::defaults::NORMAL_WELL_BRANCH_ID;
use crate::config::ImportConfig;
use crate::grid::GridCase;
use crate::sim_well::{CaseWellResults, SimWellData};
use crate::source::{RawConnection, RawWell, RawWellTimeStep};
use crate::types::{WellResultBranch, WellResultFrame, WellResultPoint};

use msw::MswFrameBuilder;
use sub_cell::SubCellSuppression;

/// Errors raised while importing well connections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// A segment without grid connections has no positioned neighbor
    /// anywhere along the segment tree.
    #[error("Well {well}: segment {segment_id} has no position contributions")]
    UnpositionedSegment { well: String, segment_id: i32 },
}

/// Import every well and build the case store.
///
/// With `config.eager_static_paths` the static frames are computed here so
/// later readers never trigger the first computation themselves.
pub fn import_case(
    grid: &GridCase,
    time_steps: Vec<DateTime<Utc>>,
    wells: &[RawWell],
    config: &ImportConfig,
) -> Result<CaseWellResults, ImportError> {
    let mut results = CaseWellResults::new(time_steps);
    for raw in wells {
        results.add_well(import_well(grid, raw)?);
    }
    if config.eager_static_paths {
        results.compute_static_well_paths();
    }

    info!(
        wells = results.wells().len(),
        time_steps = results.time_steps().len(),
        "Imported well connections"
    );
    Ok(results)
}

/// Import one well's report steps. The timestep mapping is left empty; it
/// is computed when the well joins a `CaseWellResults`.
pub fn import_well(grid: &GridCase, raw: &RawWell) -> Result<SimWellData, ImportError> {
    let mut steps: Vec<&RawWellTimeStep> = raw.time_steps.iter().collect();
    steps.sort_by_key(|s| s.timestamp);

    let frames = steps
        .into_iter()
        .map(|step| import_time_step(grid, &raw.name, step))
        .collect::<Result<Vec<_>, _>>()?;

    let mut well = SimWellData::new(raw.name.clone());
    well.is_multi_segment_well = raw.is_multi_segment();
    debug!(
        well = %raw.name,
        frames = frames.len(),
        msw = well.is_multi_segment_well,
        "Imported well"
    );
    well.set_time_step_frames(frames);
    Ok(well)
}

fn import_time_step(
    grid: &GridCase,
    well_name: &str,
    step: &RawWellTimeStep,
) -> Result<WellResultFrame, ImportError> {
    let mut well_heads: Vec<WellResultPoint> = step
        .well_heads
        .iter()
        .filter_map(|c| resolve_connection(grid, well_name, c))
        .map(|mut p| {
            // Well heads carry no simulator open/shut state
            p.is_open = false;
            p
        })
        .collect();
    let connections: Vec<WellResultPoint> = step
        .connections
        .iter()
        .filter_map(|c| resolve_connection(grid, well_name, c))
        .collect();

    let suppression = SubCellSuppression::new(grid, well_heads.iter().chain(&connections));
    if suppression.host_cell_count() > 0 {
        debug!(
            well = %well_name,
            host_cells = suppression.host_cell_count(),
            "Suppressing connections on LGR host cells"
        );
    }
    let connections: Vec<WellResultPoint> = connections
        .into_iter()
        .filter(|p| !suppression.is_suppressed(grid, p))
        .collect();

    // Deepest grid wins; ties keep reported order
    well_heads.sort_by_key(|p| std::cmp::Reverse(p.grid_index));
    let well_head = well_heads
        .into_iter()
        .find(|p| !suppression.is_suppressed(grid, p))
        .unwrap_or_default();

    let branches = if step.is_multi_segment() {
        if well_head.is_cell() || !connections.is_empty() {
            MswFrameBuilder::new(well_name, grid, &step.segments, &connections).build(&well_head)?
        } else {
            debug!(well = %well_name, time = %step.timestamp, "No connections, frame left empty");
            Vec::new()
        }
    } else {
        vec![WellResultBranch {
            ert_branch_id: NORMAL_WELL_BRANCH_ID,
            points: connections,
        }]
    };

    Ok(WellResultFrame {
        timestamp: Some(step.timestamp),
        is_open: step.is_open,
        production_type: step.production_type,
        well_head,
        branches,
    })
}

/// Resolve a 1-based simulator IJK to a cell point.
///
/// K is clamped to the first layer when reported below range. A K beyond the
/// grid is taken as a fracture-model connection and offset by the grid's K
/// count; if it is still out of range the connection is dropped.
fn resolve_connection(
    grid: &GridCase,
    well_name: &str,
    connection: &RawConnection,
) -> Option<WellResultPoint> {
    let Some(target) = grid.grid(connection.grid_index) else {
        warn!(
            well = %well_name,
            grid = connection.grid_index,
            "Connection refers to unknown grid, dropped"
        );
        return None;
    };
    let [ni, nj, nk] = target.dimensions;

    let mut k = connection.k - 1;
    if k < 0 {
        debug!(well = %well_name, k = connection.k, "K below range, clamped to first layer");
        k = 0;
    }
    let nk_signed = i64::try_from(nk).unwrap_or(i64::MAX);
    if k >= nk_signed {
        k -= nk_signed;
    }

    let zero_based = |value: i64, n: usize| usize::try_from(value).ok().filter(|&v| v < n);
    let ijk = (
        zero_based(connection.i - 1, ni),
        zero_based(connection.j - 1, nj),
        zero_based(k, nk),
    );
    let (Some(i), Some(j), Some(k)) = ijk else {
        warn!(
            well = %well_name,
            grid = connection.grid_index,
            i = connection.i,
            j = connection.j,
            k = connection.k,
            "Connection IJK outside grid, dropped"
        );
        return None;
    };
    let cell_index = target.cell_index_from_ijk(i, j, k)?;

    let mut point = WellResultPoint::cell(connection.grid_index, cell_index)
        .with_rates(
            connection.volume_rate,
            connection.oil_rate,
            connection.gas_rate,
            connection.water_rate,
        )
        .with_connection_factor(connection.connection_factor);
    point.ijk = Some([i + 1, j + 1, k + 1]);
    point.is_open = connection.is_open;
    point.segment_id = connection.segment_id;
    Some(point)
}
