//! Well result branches and per-timestep frames

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::WellResultPoint;

/// Production mode of a well at one timestep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellProductionType {
    Producer,
    OilInjector,
    GasInjector,
    WaterInjector,
    #[default]
    Undefined,
}

impl WellProductionType {
    #[must_use]
    pub const fn is_injector(self) -> bool {
        matches!(
            self,
            Self::OilInjector | Self::GasInjector | Self::WaterInjector
        )
    }
}

/// Ordered result points sharing one ERT branch id, outlet end first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellResultBranch {
    pub ert_branch_id: i32,
    pub points: Vec<WellResultPoint>,
}

impl WellResultBranch {
    #[must_use]
    pub const fn new(ert_branch_id: i32) -> Self {
        Self {
            ert_branch_id,
            points: Vec::new(),
        }
    }
}

/// One well's complete topology at one timestep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellResultFrame {
    pub timestamp: Option<DateTime<Utc>>,
    pub is_open: bool,
    pub production_type: WellProductionType,
    pub well_head: WellResultPoint,
    pub branches: Vec<WellResultBranch>,
}

impl WellResultFrame {
    /// First branch point connected to `(grid_index, cell_index)`. The well head
    /// is not considered.
    #[must_use]
    pub fn find_result_cell_well_head_excluded(
        &self,
        grid_index: usize,
        cell_index: usize,
    ) -> Option<&WellResultPoint> {
        self.branches
            .iter()
            .flat_map(|b| b.points.iter())
            .find(|p| p.grid_index == Some(grid_index) && p.cell_index == Some(cell_index))
    }

    /// Like [`Self::find_result_cell_well_head_excluded`], falling back to the
    /// well head.
    ///
    /// A match on the well head only says the cell is part of the pipe. The
    /// well head's open/shut state is not reported by the simulator and must
    /// not be used as a connection state.
    #[must_use]
    pub fn find_result_cell_well_head_included(
        &self,
        grid_index: usize,
        cell_index: usize,
    ) -> Option<&WellResultPoint> {
        self.find_result_cell_well_head_excluded(grid_index, cell_index)
            .or_else(|| {
                (self.well_head.grid_index == Some(grid_index)
                    && self.well_head.cell_index == Some(cell_index))
                .then_some(&self.well_head)
            })
    }

    /// First point whose ERT branch and segment ids match an outlet reference.
    #[must_use]
    pub fn find_result_cell_from_outlet_specification(
        &self,
        branch_id: i32,
        segment_id: i32,
    ) -> Option<&WellResultPoint> {
        self.branches
            .iter()
            .flat_map(|b| b.points.iter())
            .find(|p| p.branch_id == Some(branch_id) && p.segment_id == Some(segment_id))
    }

    /// The well head if it is a cell, otherwise the first cell in branch order,
    /// otherwise the (invalid) well head.
    #[must_use]
    pub fn well_head_or_start_cell(&self) -> &WellResultPoint {
        if self.well_head.is_cell() {
            return &self.well_head;
        }
        self.branches
            .iter()
            .flat_map(|b| b.points.iter())
            .find(|p| p.is_cell())
            .unwrap_or(&self.well_head)
    }

    /// All branch points, branch by branch.
    #[must_use]
    pub fn all_result_points(&self) -> Vec<WellResultPoint> {
        self.branches
            .iter()
            .flat_map(|b| b.points.iter().cloned())
            .collect()
    }

    /// True if the well head or any branch point is a cell
    #[must_use]
    pub fn has_any_cell(&self) -> bool {
        self.well_head.is_cell()
            || self
                .branches
                .iter()
                .any(|b| b.points.iter().any(WellResultPoint::is_cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_head(head: WellResultPoint) -> WellResultFrame {
        let mut branch = WellResultBranch::new(1);
        branch.points.push(WellResultPoint::placeholder(1, 2));
        branch.points.push(WellResultPoint::cell(0, 11).with_segment(Some(1), Some(3)));
        branch.points.push(WellResultPoint::cell(1, 4).with_segment(Some(1), Some(4)));
        WellResultFrame {
            well_head: head,
            branches: vec![branch],
            ..WellResultFrame::default()
        }
    }

    #[test]
    fn test_well_head_preferred_when_cell() {
        let frame = frame_with_head(WellResultPoint::cell(0, 1));
        assert_eq!(frame.well_head_or_start_cell().cell_index, Some(1));
    }

    #[test]
    fn test_start_cell_falls_back_to_first_branch_cell() {
        let frame = frame_with_head(WellResultPoint::default());
        let start = frame.well_head_or_start_cell();
        assert_eq!(start.cell_key(), Some((0, 11)));
    }

    #[test]
    fn test_start_cell_invalid_without_cells() {
        let mut branch = WellResultBranch::new(1);
        branch.points.push(WellResultPoint::placeholder(1, 1));
        let frame = WellResultFrame {
            branches: vec![branch],
            ..WellResultFrame::default()
        };
        assert!(!frame.well_head_or_start_cell().is_valid());
        assert!(!frame.has_any_cell());
    }

    #[test]
    fn test_find_result_cell_well_head_fallback() {
        let frame = frame_with_head(WellResultPoint::cell(0, 1));
        assert!(frame.find_result_cell_well_head_excluded(0, 1).is_none());
        assert!(frame.find_result_cell_well_head_included(0, 1).is_some());
        let hit = frame.find_result_cell_well_head_excluded(1, 4).unwrap();
        assert_eq!(hit.segment_id, Some(4));
    }

    #[test]
    fn test_find_from_outlet_specification() {
        let frame = frame_with_head(WellResultPoint::cell(0, 1));
        let p = frame.find_result_cell_from_outlet_specification(1, 3).unwrap();
        assert_eq!(p.cell_key(), Some((0, 11)));
        assert!(frame.find_result_cell_from_outlet_specification(2, 3).is_none());
    }

    #[test]
    fn test_all_result_points_branch_order() {
        let mut frame = frame_with_head(WellResultPoint::cell(0, 1));
        let mut second = WellResultBranch::new(2);
        second.points.push(WellResultPoint::cell(0, 99));
        frame.branches.push(second);
        let all = frame.all_result_points();
        assert_eq!(all.len(), 4);
        assert_eq!(all[3].cell_index, Some(99));
    }
}
