//! Per-well simulation results
//!
//! `SimWellData` owns one well's result frames (one per well report step),
//! the mapping from the case's global timesteps to those frames, and a lazily
//! computed static frame merging every timestep's path.
//!
//! Well report steps can be sparser than the case's timesteps, so every
//! per-timestep query goes through the mapping and answers "no result"
//! (`false` / `None`) for out-of-range or unmapped indices instead of failing.

mod static_path;
mod store;

pub use store::CaseWellResults;

use chrono::{DateTime, Utc};
use std::sync::OnceLock;

use crate::types::{WellProductionType, WellResultFrame};

/// One well's result frames over time
#[derive(Debug, Clone, Default)]
pub struct SimWellData {
    pub well_name: String,
    pub is_multi_segment_well: bool,
    time_step_frames: Vec<WellResultFrame>,
    result_time_step_to_well_time_step: Vec<Option<usize>>,
    static_well_cells: OnceLock<WellResultFrame>,
}

impl SimWellData {
    #[must_use]
    pub fn new(well_name: impl Into<String>) -> Self {
        Self {
            well_name: well_name.into(),
            ..Self::default()
        }
    }

    /// Replace all frames. Frames must be sorted by timestamp. Clears the
    /// static frame and the timestep mapping.
    pub fn set_time_step_frames(&mut self, frames: Vec<WellResultFrame>) {
        self.time_step_frames = frames;
        self.result_time_step_to_well_time_step.clear();
        self.static_well_cells = OnceLock::new();
    }

    #[must_use]
    pub fn time_step_frames(&self) -> &[WellResultFrame] {
        &self.time_step_frames
    }

    #[must_use]
    pub fn well_time_step_count(&self) -> usize {
        self.time_step_frames.len()
    }

    /// Map every global timestep to the well frame with exactly the same
    /// timestamp.
    ///
    /// Both sequences are ascending, so this is a single merge pass: the well
    /// cursor only moves forward, past frames strictly earlier than the current
    /// global time. Duplicate global timestamps map to the same frame.
    pub fn compute_mapping_from_result_time_indices_to_well_time_indices(
        &mut self,
        simulation_time_steps: &[DateTime<Utc>],
    ) {
        self.result_time_step_to_well_time_step.clear();
        if self.time_step_frames.is_empty() {
            return;
        }

        self.result_time_step_to_well_time_step
            .resize(simulation_time_steps.len(), None);

        let mut well_idx = 0;
        for (result_idx, &time) in simulation_time_steps.iter().enumerate() {
            while well_idx < self.time_step_frames.len()
                && self.time_step_frames[well_idx].timestamp < Some(time)
            {
                well_idx += 1;
            }
            if well_idx < self.time_step_frames.len()
                && self.time_step_frames[well_idx].timestamp == Some(time)
            {
                self.result_time_step_to_well_time_step[result_idx] = Some(well_idx);
            }
        }
    }

    #[must_use]
    pub fn result_time_step_mapping(&self) -> &[Option<usize>] {
        &self.result_time_step_to_well_time_step
    }

    /// Well frame index for a global timestep, if the well reported at that time
    #[must_use]
    pub fn well_time_step_index(&self, result_time_step: usize) -> Option<usize> {
        self.result_time_step_to_well_time_step
            .get(result_time_step)
            .copied()
            .flatten()
    }

    #[must_use]
    pub fn has_well_result(&self, result_time_step: usize) -> bool {
        self.well_time_step_index(result_time_step).is_some()
    }

    /// True if the frame at this timestep has at least one cell connection,
    /// well head included. Cheap check before running the centerline
    /// calculation.
    #[must_use]
    pub fn has_any_valid_cells(&self, result_time_step: usize) -> bool {
        self.well_result_frame(result_time_step)
            .is_some_and(WellResultFrame::has_any_cell)
    }

    #[must_use]
    pub fn well_result_frame(&self, result_time_step: usize) -> Option<&WellResultFrame> {
        let idx = self.well_time_step_index(result_time_step)?;
        self.time_step_frames.get(idx)
    }

    #[must_use]
    pub fn is_open(&self, result_time_step: usize) -> bool {
        self.well_result_frame(result_time_step)
            .is_some_and(|f| f.is_open)
    }

    #[must_use]
    pub fn production_type(&self, result_time_step: usize) -> WellProductionType {
        self.well_result_frame(result_time_step)
            .map_or(WellProductionType::Undefined, |f| f.production_type)
    }

    #[must_use]
    pub fn is_injector(&self, result_time_step: usize) -> bool {
        self.production_type(result_time_step).is_injector()
    }

    /// The union of all timesteps' paths, computed on first use.
    pub fn static_well_result_frame(&self) -> &WellResultFrame {
        self.static_well_cells
            .get_or_init(|| static_path::compute_static_frame(&self.time_step_frames))
    }

    /// Force computation of the static frame. Calling it more than once
    /// returns the same frame.
    pub fn compute_static_well_cell_path(&self) -> &WellResultFrame {
        self.static_well_result_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{WellResultBranch, WellResultPoint};
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, d, 0, 0, 0).unwrap()
    }

    fn frame_at(d: u32, cell: Option<usize>) -> WellResultFrame {
        let mut branch = WellResultBranch::new(0);
        if let Some(c) = cell {
            branch.points.push(WellResultPoint::cell(0, c));
        }
        WellResultFrame {
            timestamp: Some(day(d)),
            branches: vec![branch],
            ..WellResultFrame::default()
        }
    }

    fn well_with_days(days: &[u32]) -> SimWellData {
        let mut well = SimWellData::new("P1");
        well.set_time_step_frames(days.iter().map(|&d| frame_at(d, Some(d as usize))).collect());
        well
    }

    #[test]
    fn test_mapping_sparse_well() {
        let mut well = well_with_days(&[2, 4]);
        let sim: Vec<_> = [1, 2, 3, 4, 5].iter().map(|&d| day(d)).collect();
        well.compute_mapping_from_result_time_indices_to_well_time_indices(&sim);
        assert_eq!(
            well.result_time_step_mapping(),
            &[None, Some(0), None, Some(1), None]
        );
        assert!(!well.has_well_result(0));
        assert!(well.has_well_result(1));
        assert!(well.has_well_result(3));
        assert!(!well.has_well_result(17));
    }

    #[test]
    fn test_mapping_requires_exact_match() {
        let mut well = well_with_days(&[3]);
        let sim = vec![day(2), day(4)];
        well.compute_mapping_from_result_time_indices_to_well_time_indices(&sim);
        assert_eq!(well.result_time_step_mapping(), &[None, None]);
    }

    #[test]
    fn test_mapping_duplicate_global_times() {
        let mut well = well_with_days(&[2]);
        let sim = vec![day(2), day(2), day(3)];
        well.compute_mapping_from_result_time_indices_to_well_time_indices(&sim);
        assert_eq!(well.result_time_step_mapping(), &[Some(0), Some(0), None]);
    }

    #[test]
    fn test_mapping_empty_well_is_cleared() {
        let mut well = SimWellData::new("EMPTY");
        let sim = vec![day(1), day(2)];
        well.compute_mapping_from_result_time_indices_to_well_time_indices(&sim);
        assert!(well.result_time_step_mapping().is_empty());
        assert!(!well.has_well_result(0));
        assert!(!well.has_any_valid_cells(0));
        assert!(well.well_result_frame(0).is_none());
    }

    #[test]
    fn test_has_any_valid_cells() {
        let mut well = SimWellData::new("P2");
        well.set_time_step_frames(vec![frame_at(1, None), frame_at(2, Some(5))]);
        well.compute_mapping_from_result_time_indices_to_well_time_indices(&[day(1), day(2)]);
        assert!(well.has_well_result(0));
        assert!(!well.has_any_valid_cells(0));
        assert!(well.has_any_valid_cells(1));
    }

    #[test]
    fn test_production_type_defaults_without_result() {
        let mut well = well_with_days(&[1]);
        well.compute_mapping_from_result_time_indices_to_well_time_indices(&[day(1), day(2)]);
        assert_eq!(well.production_type(1), WellProductionType::Undefined);
        assert!(!well.is_injector(1));
        assert!(!well.is_open(0));
    }

    #[test]
    fn test_static_frame_is_memoized() {
        let well = well_with_days(&[1, 2, 3]);
        let first = well.static_well_result_frame() as *const WellResultFrame;
        let second = well.compute_static_well_cell_path() as *const WellResultFrame;
        assert_eq!(first, second);
        let cells: Vec<_> = well.static_well_result_frame().branches[0]
            .points
            .iter()
            .filter_map(|p| p.cell_index)
            .collect();
        assert_eq!(cells, vec![1, 2, 3]);
    }
}
