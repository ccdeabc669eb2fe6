//! Case-level store of all simulation wells

use chrono::{DateTime, Utc};

use super::SimWellData;

/// All wells of one simulation case together with the case's global timesteps
#[derive(Debug, Clone, Default)]
pub struct CaseWellResults {
    time_steps: Vec<DateTime<Utc>>,
    wells: Vec<SimWellData>,
}

impl CaseWellResults {
    #[must_use]
    pub const fn new(time_steps: Vec<DateTime<Utc>>) -> Self {
        Self {
            time_steps,
            wells: Vec::new(),
        }
    }

    /// Add a well, computing its timestep mapping against the case timesteps.
    pub fn add_well(&mut self, mut well: SimWellData) {
        well.compute_mapping_from_result_time_indices_to_well_time_indices(&self.time_steps);
        self.wells.push(well);
    }

    /// Compute every well's static frame now, so later readers never race on
    /// the first static read.
    pub fn compute_static_well_paths(&self) {
        for well in &self.wells {
            well.compute_static_well_cell_path();
        }
    }

    #[must_use]
    pub fn time_steps(&self) -> &[DateTime<Utc>] {
        &self.time_steps
    }

    #[must_use]
    pub fn wells(&self) -> &[SimWellData] {
        &self.wells
    }

    #[must_use]
    pub fn find_well(&self, name: &str) -> Option<&SimWellData> {
        self.wells.iter().find(|w| w.well_name == name)
    }

    /// Wells with at least one cell connection at this timestep
    pub fn wells_with_cells_at(&self, result_time_step: usize) -> impl Iterator<Item = &SimWellData> {
        self.wells
            .iter()
            .filter(move |w| w.has_any_valid_cells(result_time_step))
    }
}
