//! Sub-cell (LGR parent) connection suppression
//!
//! A connection inside a refinement is also visible through every coarser
//! cell that hosts it. Those host cells are collected once per frame and any
//! point landing on one of them is dropped.

use std::collections::HashSet;

use crate::grid::GridCase;
use crate::types::WellResultPoint;

#[derive(Debug, Default)]
pub(super) struct SubCellSuppression {
    /// Reservoir cell indices hosting a connected LGR cell
    host_cells: HashSet<usize>,
}

impl SubCellSuppression {
    /// Mark every ancestor of every cell point in `points`.
    pub(super) fn new<'a>(
        grid: &GridCase,
        points: impl IntoIterator<Item = &'a WellResultPoint>,
    ) -> Self {
        let mut host_cells = HashSet::new();
        for point in points {
            let mut current = point.cell_key();
            while let Some((grid_index, cell_index)) = current {
                current = grid.parent_cell(grid_index, cell_index);
                if let Some(host) = current.and_then(|(g, c)| grid.reservoir_cell_index(g, c)) {
                    host_cells.insert(host);
                }
            }
        }
        Self { host_cells }
    }

    pub(super) fn is_suppressed(&self, grid: &GridCase, point: &WellResultPoint) -> bool {
        point
            .cell_key()
            .and_then(|(g, c)| grid.reservoir_cell_index(g, c))
            .is_some_and(|r| self.host_cells.contains(&r))
    }

    pub(super) fn host_cell_count(&self) -> usize {
        self.host_cells.len()
    }
}
