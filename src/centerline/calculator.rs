//! Pipe construction state machine

use super::{CenterlineSettings, PipeBranch};
use crate::config::defaults::{DEGENERATE_POINT_DISTANCE_SQUARED, TIP_EXTENSION_FACTOR};
use crate::grid::{Cell, CellFace, GridCase};
use crate::types::{Vec3, WellResultBranch, WellResultFrame, WellResultPoint};

/// Where every well-head-rooted pipe begins
struct WellHeadStart<'a> {
    point: &'a WellResultPoint,
    /// Top face center of the well head cell
    start: Vec3,
    /// Halfway down to the cell center, straight below `start`
    intermediate: Vec3,
}

impl<'a> WellHeadStart<'a> {
    fn new(grid: &GridCase, frame: &'a WellResultFrame) -> Option<Self> {
        let point = frame.well_head_or_start_cell();
        let cell = grid.cell_from_well_result_point(point)?;
        let start = cell.face_center(CellFace::KNeg);
        let intermediate = Vec3::new(start.x, start.y, (start.z + cell.center().z) / 2.0);
        Some(Self {
            point,
            start,
            intermediate,
        })
    }
}

/// One polyline under construction
struct PipeBuilder<'a> {
    grid: &'a GridCase,
    pipe: PipeBranch,
    prev: &'a WellResultPoint,
    prev_is_well_head: bool,
}

impl<'a> PipeBuilder<'a> {
    fn from_well_head(grid: &'a GridCase, well_head: &WellHeadStart<'a>) -> Self {
        Self {
            grid,
            pipe: PipeBranch {
                points: vec![well_head.start, well_head.intermediate],
                attributions: vec![well_head.point.clone()],
            },
            prev: well_head.point,
            prev_is_well_head: true,
        }
    }

    fn from_outlet(grid: &'a GridCase, outlet: &'a WellResultPoint, position: Vec3) -> Self {
        Self {
            grid,
            pipe: PipeBranch {
                points: vec![position],
                attributions: Vec::new(),
            },
            prev: outlet,
            prev_is_well_head: false,
        }
    }

    fn last_point(&self) -> Vec3 {
        self.pipe.points.last().copied().unwrap_or_default()
    }

    fn push(&mut self, point: Vec3, attribution: WellResultPoint) {
        self.pipe.points.push(point);
        self.pipe.attributions.push(attribution);
    }

    /// Leaving the previous cell: the edge up to the exit still lies in it.
    fn push_exit(&mut self, exit: Vec3) {
        if exit.distance_squared(self.last_point()) > DEGENERATE_POINT_DISTANCE_SQUARED {
            self.push(exit, self.prev.clone());
        }
    }

    fn prev_cell(&self) -> Option<&'a Cell> {
        self.grid.cell_from_well_result_point(self.prev)
    }

    /// Cell center of the previous point, or its interpolated position.
    fn prev_position(&self) -> Option<Vec3> {
        self.prev_cell()
            .map(Cell::center)
            .or(self.prev.bottom_position)
    }

    /// Normal-well branch split: the next cell is closer to the well head
    /// than to the cell before it.
    fn needs_split(&self, point: &WellResultPoint, cell: &Cell, well_head_start: Vec3) -> bool {
        if self.prev_is_well_head || self.grid.find_shared_source_face(self.prev, point).is_some() {
            return false;
        }
        let Some(prev_position) = self.prev_position() else {
            return false;
        };
        let center = cell.center();
        center.distance_squared(prev_position) > center.distance_squared(well_head_start)
    }

    fn add_placeholder(&mut self, point: &'a WellResultPoint, position: Vec3) {
        if let Some(exit) = self
            .prev_cell()
            .and_then(|c| c.boundary_point_towards(position))
        {
            self.push_exit(exit);
        }
        self.push(position, point.clone());
        self.prev = point;
        self.prev_is_well_head = false;
    }

    fn add_cell(&mut self, point: &'a WellResultPoint, cell: &Cell) {
        let center = cell.center();
        let shared_face = self.grid.find_shared_source_face(self.prev, point);

        match (shared_face, self.prev_cell()) {
            (Some(face), Some(prev_cell)) => {
                self.push(prev_cell.face_center(face), self.prev.clone());
            }
            (_, prev_cell) => {
                let prev_position = self.prev_position().unwrap_or(center);
                let exit = prev_cell.and_then(|c| c.boundary_point_towards(center));
                if let Some(exit) = exit {
                    self.push_exit(exit);
                }

                // A placeholder inside this cell is already the entry point
                let inside = !self.prev.is_cell() && cell.contains_point(prev_position);
                if !inside {
                    let entry = cell
                        .boundary_point_towards(exit.unwrap_or(prev_position))
                        .unwrap_or(center);
                    self.push(entry, WellResultPoint::positioned(entry));
                }
            }
        }

        self.prev = point;
        self.prev_is_well_head = false;
    }

    /// Extend past the last cell center, or end at the last placeholder.
    fn finish(mut self) -> PipeBranch {
        if let Some(cell) = self.prev_cell() {
            let last = self.last_point();
            let tip = last + (cell.center() - last) * TIP_EXTENSION_FACTOR;
            self.push(tip, self.prev.clone());
        }
        self.pipe
    }
}

/// A multi-segment branch hanging off another branch starts at its outlet
/// point: the first point, taken from the outlet branch, when it is a cell or
/// a placeholder below some other segment.
fn outlet_start_point<'a>(
    grid: &GridCase,
    branch: &'a WellResultBranch,
) -> Option<(&'a WellResultPoint, Vec3)> {
    let first = branch.points.first()?;
    let from_outlet_branch = first.branch_id.is_some_and(|b| b != branch.ert_branch_id);
    if !from_outlet_branch || !(first.is_cell() || first.outlet_segment_id.is_some()) {
        return None;
    }
    let position = match grid.cell_from_well_result_point(first) {
        Some(cell) => cell.center(),
        None => first.bottom_position?,
    };
    Some((first, position))
}

pub(super) fn build_pipes(
    grid: &GridCase,
    frame: &WellResultFrame,
    is_multi_segment_well: bool,
    settings: CenterlineSettings,
) -> Vec<PipeBranch> {
    let Some(well_head) = WellHeadStart::new(grid, frame) else {
        return Vec::new();
    };
    let split_branches = !is_multi_segment_well && settings.auto_detect_branches;

    let mut pipes = Vec::new();
    for branch in &frame.branches {
        let outlet_start = if is_multi_segment_well {
            outlet_start_point(grid, branch)
        } else {
            None
        };
        let (mut builder, first) = match outlet_start {
            Some((outlet, position)) => (PipeBuilder::from_outlet(grid, outlet, position), 1),
            None => (PipeBuilder::from_well_head(grid, &well_head), 0),
        };
        if !branch
            .points
            .iter()
            .skip(first)
            .any(WellResultPoint::is_valid)
        {
            continue;
        }

        let mut idx = first;
        while let Some(point) = branch.points.get(idx) {
            if let Some(cell) = grid.cell_from_well_result_point(point) {
                if split_branches && builder.needs_split(point, cell, well_head.start) {
                    pipes.push(builder.finish());
                    builder = PipeBuilder::from_well_head(grid, &well_head);
                    // Retry the same point on the new branch
                    continue;
                }
                builder.add_cell(point, cell);
            } else if let (false, Some(position)) = (point.is_cell(), point.bottom_position) {
                builder.add_placeholder(point, position);
            }
            idx += 1;
        }
        pipes.push(builder.finish());
    }
    pipes
}

/// Route the pipe through the center of every attributed cell.
///
/// The center goes into the last edge of each run of edges attributed to the
/// same cell, splitting it in two with the same attribution.
pub(super) fn insert_cell_centers(grid: &GridCase, pipe: &mut PipeBranch) {
    let Some(&first) = pipe.points.first() else {
        return;
    };
    let mut points = Vec::with_capacity(pipe.points.len() * 2);
    let mut attributions = Vec::with_capacity(pipe.attributions.len() * 2);
    points.push(first);

    for (k, attribution) in pipe.attributions.iter().enumerate() {
        let Some(&end) = pipe.points.get(k + 1) else {
            break;
        };
        let run_ends = pipe
            .attributions
            .get(k + 1)
            .map_or(true, |next| next.cell_key() != attribution.cell_key());
        let center = if run_ends {
            grid.cell_from_well_result_point(attribution).map(Cell::center)
        } else {
            None
        };

        if let Some(center) = center {
            let start = points.last().copied().unwrap_or(first);
            if center.distance_squared(start) > DEGENERATE_POINT_DISTANCE_SQUARED
                && center.distance_squared(end) > DEGENERATE_POINT_DISTANCE_SQUARED
            {
                points.push(center);
                attributions.push(attribution.clone());
            }
        }
        points.push(end);
        attributions.push(attribution.clone());
    }

    pipe.points = points;
    pipe.attributions = attributions;
}
