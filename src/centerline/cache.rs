//! Memoized centerlines per well, frame and settings

use std::collections::HashMap;

use super::{calculate_centerlines, CenterlineSettings, PipeBranch, TimeStepSelection};
use crate::grid::GridCase;
use crate::sim_well::SimWellData;

type CacheKey = (String, TimeStepSelection, CenterlineSettings);

/// Computed pipes keyed by well name, frame selection and settings.
///
/// Entries are never refreshed on their own: call [`Self::invalidate_well`]
/// after re-importing a well and [`Self::invalidate`] when the grid changes.
#[derive(Debug, Default)]
pub struct CenterlineCache {
    entries: HashMap<CacheKey, Vec<PipeBranch>>,
}

impl CenterlineCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        grid: &GridCase,
        well: &SimWellData,
        selection: TimeStepSelection,
        settings: CenterlineSettings,
    ) -> &[PipeBranch] {
        self.entries
            .entry((well.well_name.clone(), selection, settings))
            .or_insert_with(|| calculate_centerlines(grid, well, selection, settings))
    }

    #[must_use]
    pub fn get(
        &self,
        well_name: &str,
        selection: TimeStepSelection,
        settings: CenterlineSettings,
    ) -> Option<&[PipeBranch]> {
        self.entries
            .get(&(well_name.to_string(), selection, settings))
            .map(Vec::as_slice)
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn invalidate_well(&mut self, well_name: &str) {
        self.entries.retain(|(name, _, _), _| name != well_name);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
