//! Grid Geometry Store
//!
//! Arena-style storage for a simulation case's grids: the main grid at index 0
//! followed by local grid refinements (LGRs). Cells are held in indexed vectors
//! and referenced everywhere else by plain `(grid_index, cell_index)` pairs;
//! nothing in the well data model holds a reference into this store.
//!
//! ## Provided queries
//!
//! - Cell lookup by `(grid_index, cell_index)` or by a `WellResultPoint`
//! - IJK <-> cell index conversion and neighbor lookup across a face
//! - Shared-face detection between two well cells
//! - LGR hierarchy: parent cell of a refined cell, global reservoir cell index

mod builder;
mod cell;

pub use builder::{RefinementSpec, RegularGridSpec};
pub use cell::{Cell, CellFace, RayHit};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::WellResultPoint;

/// Errors raised while building a grid case
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Grid '{name}' has dimensions {dims:?} but {cells} cells were supplied")]
    CellCountMismatch {
        name: String,
        dims: [usize; 3],
        cells: usize,
    },

    #[error("Grid '{0}' has a zero dimension")]
    EmptyDimension(String),

    #[error("Unknown parent grid index {0}")]
    UnknownParentGrid(usize),

    #[error("Refinement '{name}' box {min:?}..{max:?} is outside the parent grid {parent_dims:?}")]
    RefinementOutOfBounds {
        name: String,
        min: [usize; 3],
        max: [usize; 3],
        parent_dims: [usize; 3],
    },

    #[error("Refinement '{0}' has a zero refinement factor")]
    ZeroRefinement(String),

    #[error("Refinement '{name}' overlaps already refined cell {cell} in grid {grid}")]
    OverlappingRefinement {
        name: String,
        grid: usize,
        cell: usize,
    },
}

/// One structured grid (main grid or LGR)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub name: String,
    pub grid_index: usize,
    /// Cell counts along I, J, K
    pub dimensions: [usize; 3],
    /// Host grid of an LGR; `None` for the main grid
    pub parent_grid_index: Option<usize>,
    /// Offset of this grid's first cell in the case-wide reservoir cell numbering
    pub reservoir_cell_offset: usize,
    pub cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from explicit cells, ordered with I fastest and K slowest.
    pub fn from_cells(
        name: impl Into<String>,
        dimensions: [usize; 3],
        cells: Vec<Cell>,
    ) -> Result<Self, GridError> {
        let name = name.into();
        if dimensions.contains(&0) {
            return Err(GridError::EmptyDimension(name));
        }
        let expected = dimensions[0] * dimensions[1] * dimensions[2];
        if cells.len() != expected {
            return Err(GridError::CellCountMismatch {
                name,
                dims: dimensions,
                cells: cells.len(),
            });
        }
        Ok(Self {
            name,
            grid_index: 0,
            dimensions,
            parent_grid_index: None,
            reservoir_cell_offset: 0,
            cells,
        })
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Zero-based IJK to local cell index
    #[must_use]
    pub fn cell_index_from_ijk(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        let [ni, nj, nk] = self.dimensions;
        (i < ni && j < nj && k < nk).then(|| i + j * ni + k * ni * nj)
    }

    /// Local cell index to zero-based IJK
    #[must_use]
    pub fn ijk_from_cell_index(&self, cell_index: usize) -> Option<[usize; 3]> {
        if cell_index >= self.cell_count() {
            return None;
        }
        let [ni, nj, _] = self.dimensions;
        Some([cell_index % ni, (cell_index / ni) % nj, cell_index / (ni * nj)])
    }

    /// Cell across `face`, if it exists
    #[must_use]
    pub fn neighbor_cell_index(&self, cell_index: usize, face: CellFace) -> Option<usize> {
        let ijk = self.ijk_from_cell_index(cell_index)?;
        let offset = face.ijk_offset();
        let i = ijk[0].checked_add_signed(offset[0])?;
        let j = ijk[1].checked_add_signed(offset[1])?;
        let k = ijk[2].checked_add_signed(offset[2])?;
        self.cell_index_from_ijk(i, j, k)
    }

    #[must_use]
    pub fn cell(&self, cell_index: usize) -> Option<&Cell> {
        self.cells.get(cell_index)
    }

    #[must_use]
    pub const fn reservoir_cell_index(&self, cell_index: usize) -> usize {
        self.reservoir_cell_offset + cell_index
    }
}

/// All grids of one simulation case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCase {
    grids: Vec<Grid>,
}

impl GridCase {
    /// Start a case from its main grid.
    #[must_use]
    pub fn new(mut main_grid: Grid) -> Self {
        main_grid.grid_index = 0;
        main_grid.parent_grid_index = None;
        main_grid.reservoir_cell_offset = 0;
        Self {
            grids: vec![main_grid],
        }
    }

    #[must_use]
    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    #[must_use]
    pub fn grid_count(&self) -> usize {
        self.grids.len()
    }

    #[must_use]
    pub fn main_grid(&self) -> &Grid {
        &self.grids[0]
    }

    #[must_use]
    pub fn grid(&self, grid_index: usize) -> Option<&Grid> {
        self.grids.get(grid_index)
    }

    #[must_use]
    pub fn reservoir_cell_count(&self) -> usize {
        self.grids.iter().map(Grid::cell_count).sum()
    }

    #[must_use]
    pub fn cell(&self, grid_index: usize, cell_index: usize) -> Option<&Cell> {
        self.grid(grid_index)?.cell(cell_index)
    }

    /// The cell a well result point is connected to. `None` for placeholders.
    #[must_use]
    pub fn cell_from_well_result_point(&self, point: &WellResultPoint) -> Option<&Cell> {
        let (grid_index, cell_index) = point.cell_key()?;
        self.cell(grid_index, cell_index)
    }

    /// Case-wide reservoir cell index of a local cell
    #[must_use]
    pub fn reservoir_cell_index(&self, grid_index: usize, cell_index: usize) -> Option<usize> {
        let grid = self.grid(grid_index)?;
        (cell_index < grid.cell_count()).then(|| grid.reservoir_cell_index(cell_index))
    }

    /// Host cell `(grid_index, cell_index)` of an LGR cell
    #[must_use]
    pub fn parent_cell(&self, grid_index: usize, cell_index: usize) -> Option<(usize, usize)> {
        let grid = self.grid(grid_index)?;
        let parent_grid = grid.parent_grid_index?;
        let parent_cell = grid.cell(cell_index)?.parent_cell_index?;
        Some((parent_grid, parent_cell))
    }

    /// Face of `source`'s cell shared with `other`'s cell.
    ///
    /// Only cells in the same grid that are IJK neighbors share a face.
    #[must_use]
    pub fn find_shared_source_face(
        &self,
        source: &WellResultPoint,
        other: &WellResultPoint,
    ) -> Option<CellFace> {
        let (grid_index, cell_index) = source.cell_key()?;
        let (other_grid, other_cell) = other.cell_key()?;
        if grid_index != other_grid {
            return None;
        }
        let grid = self.grid(grid_index)?;
        CellFace::ALL
            .into_iter()
            .find(|&face| grid.neighbor_cell_index(cell_index, face) == Some(other_cell))
    }

    pub(crate) fn push_grid(&mut self, mut grid: Grid) -> usize {
        let index = self.grids.len();
        grid.grid_index = index;
        grid.reservoir_cell_offset = self.reservoir_cell_count();
        self.grids.push(grid);
        index
    }

    pub(crate) fn grid_mut(&mut self, grid_index: usize) -> Option<&mut Grid> {
        self.grids.get_mut(grid_index)
    }
}
