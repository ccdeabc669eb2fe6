//! Grid construction: regular box grids and local grid refinements

use serde::{Deserialize, Serialize};

use super::{Cell, Grid, GridCase, GridError};
use crate::types::Vec3;

/// IJK offset bits of the eight cell corners
const CORNER_BITS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Axis-aligned grid with constant cell size. K grows downward, so the
/// `origin` is the top corner of cell (1,1,1) and cells stack toward `-z`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularGridSpec {
    pub dimensions: [usize; 3],
    #[serde(default)]
    pub origin: Vec3,
    pub cell_size: Vec3,
}

impl RegularGridSpec {
    pub fn build(&self, name: &str) -> Result<Grid, GridError> {
        let [ni, nj, nk] = self.dimensions;
        let mut cells = Vec::with_capacity(ni * nj * nk);
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let corners = CORNER_BITS.map(|[bi, bj, bk]| {
                        Vec3::new(
                            self.origin.x + (i + bi) as f64 * self.cell_size.x,
                            self.origin.y + (j + bj) as f64 * self.cell_size.y,
                            self.origin.z - (k + bk) as f64 * self.cell_size.z,
                        )
                    });
                    cells.push(Cell::new(corners));
                }
            }
        }
        Grid::from_cells(name, self.dimensions, cells)
    }
}

/// A local grid refinement of a box of host cells.
///
/// `min_ijk`/`max_ijk` are 1-based and inclusive, like a CARFIN box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementSpec {
    pub name: String,
    #[serde(default)]
    pub parent_grid_index: usize,
    pub min_ijk: [usize; 3],
    pub max_ijk: [usize; 3],
    pub refinement: [usize; 3],
}

impl GridCase {
    /// Add an LGR refining a box of cells in an existing grid. Returns the new
    /// grid index.
    pub fn add_refinement(&mut self, spec: &RefinementSpec) -> Result<usize, GridError> {
        let parent = self
            .grid(spec.parent_grid_index)
            .ok_or(GridError::UnknownParentGrid(spec.parent_grid_index))?;

        if spec.refinement.contains(&0) {
            return Err(GridError::ZeroRefinement(spec.name.clone()));
        }
        let in_bounds = (0..3).all(|a| {
            spec.min_ijk[a] >= 1
                && spec.min_ijk[a] <= spec.max_ijk[a]
                && spec.max_ijk[a] <= parent.dimensions[a]
        });
        if !in_bounds {
            return Err(GridError::RefinementOutOfBounds {
                name: spec.name.clone(),
                min: spec.min_ijk,
                max: spec.max_ijk,
                parent_dims: parent.dimensions,
            });
        }

        let dims: [usize; 3] =
            std::array::from_fn(|a| (spec.max_ijk[a] - spec.min_ijk[a] + 1) * spec.refinement[a]);

        let mut cells = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
        let mut host_cells = Vec::new();
        for lk in 0..dims[2] {
            for lj in 0..dims[1] {
                for li in 0..dims[0] {
                    let local = [li, lj, lk];
                    let host_ijk: [usize; 3] =
                        std::array::from_fn(|a| spec.min_ijk[a] - 1 + local[a] / spec.refinement[a]);
                    let host_index = parent
                        .cell_index_from_ijk(host_ijk[0], host_ijk[1], host_ijk[2])
                        .ok_or(GridError::UnknownParentGrid(spec.parent_grid_index))?;
                    let host = &parent.cells[host_index];
                    if host.sub_grid_index.is_some() {
                        return Err(GridError::OverlappingRefinement {
                            name: spec.name.clone(),
                            grid: spec.parent_grid_index,
                            cell: host_index,
                        });
                    }

                    let corners = CORNER_BITS.map(|bits| {
                        let uvw: [f64; 3] = std::array::from_fn(|a| {
                            let sub = local[a] % spec.refinement[a] + bits[a];
                            sub as f64 / spec.refinement[a] as f64
                        });
                        trilinear(&host.corners, uvw)
                    });
                    let mut cell = Cell::new(corners);
                    cell.parent_cell_index = Some(host_index);
                    cells.push(cell);
                    host_cells.push(host_index);
                }
            }
        }

        let mut grid = Grid::from_cells(spec.name.clone(), dims, cells)?;
        grid.parent_grid_index = Some(spec.parent_grid_index);
        let lgr_index = self.push_grid(grid);

        if let Some(parent) = self.grid_mut(spec.parent_grid_index) {
            for host_index in host_cells {
                parent.cells[host_index].sub_grid_index = Some(lgr_index);
            }
        }
        Ok(lgr_index)
    }
}

fn trilinear(corners: &[Vec3; 8], [u, v, w]: [f64; 3]) -> Vec3 {
    CORNER_BITS
        .iter()
        .zip(corners)
        .fold(Vec3::ZERO, |acc, (bits, &corner)| {
            let weight = [u, v, w]
                .iter()
                .zip(bits)
                .map(|(&t, &b)| if b == 1 { t } else { 1.0 - t })
                .product::<f64>();
            acc + corner * weight
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_grid() -> GridCase {
        let spec = RegularGridSpec {
            dimensions: [4, 4, 3],
            origin: Vec3::new(100.0, 200.0, -1000.0),
            cell_size: Vec3::new(20.0, 20.0, 10.0),
        };
        GridCase::new(spec.build("MAIN").unwrap())
    }

    #[test]
    fn test_regular_grid_k_grows_downward() {
        let case = main_grid();
        let grid = case.main_grid();
        let top = grid.cell(grid.cell_index_from_ijk(0, 0, 0).unwrap()).unwrap();
        let below = grid.cell(grid.cell_index_from_ijk(0, 0, 1).unwrap()).unwrap();
        assert!(below.center().z < top.center().z);
        assert_eq!(top.center(), Vec3::new(110.0, 210.0, -1005.0));
    }

    #[test]
    fn test_refinement_links_parent_and_child() {
        let mut case = main_grid();
        let lgr = case
            .add_refinement(&RefinementSpec {
                name: "LGR1".to_string(),
                parent_grid_index: 0,
                min_ijk: [2, 2, 1],
                max_ijk: [2, 3, 1],
                refinement: [2, 2, 2],
            })
            .unwrap();
        assert_eq!(lgr, 1);

        let grid = case.grid(lgr).unwrap();
        assert_eq!(grid.dimensions, [2, 4, 2]);
        assert_eq!(grid.reservoir_cell_offset, 48);
        assert_eq!(case.reservoir_cell_count(), 48 + 16);

        // LGR cell (0,0,0) sits in host (1,1,0)
        let host = case.main_grid().cell_index_from_ijk(1, 1, 0).unwrap();
        assert_eq!(case.parent_cell(1, 0), Some((0, host)));
        assert_eq!(case.main_grid().cells[host].sub_grid_index, Some(1));

        // The refined cells tile the host cell
        let child = case.cell(1, 0).unwrap();
        let host_cell = case.cell(0, host).unwrap();
        assert_eq!(child.corners[0], host_cell.corners[0]);
        let far = grid.cell_index_from_ijk(1, 1, 1).unwrap();
        assert_eq!(case.cell(1, far).unwrap().corners[6], host_cell.corners[6]);
    }

    #[test]
    fn test_refinement_rejects_out_of_bounds_box() {
        let mut case = main_grid();
        let err = case
            .add_refinement(&RefinementSpec {
                name: "BAD".to_string(),
                parent_grid_index: 0,
                min_ijk: [3, 3, 3],
                max_ijk: [5, 3, 3],
                refinement: [1, 1, 1],
            })
            .unwrap_err();
        assert!(matches!(err, GridError::RefinementOutOfBounds { .. }));
    }

    #[test]
    fn test_refinement_rejects_overlap() {
        let mut case = main_grid();
        let spec = RefinementSpec {
            name: "A".to_string(),
            parent_grid_index: 0,
            min_ijk: [1, 1, 1],
            max_ijk: [1, 1, 1],
            refinement: [3, 3, 1],
        };
        case.add_refinement(&spec).unwrap();
        let err = case.add_refinement(&spec).unwrap_err();
        assert!(matches!(err, GridError::OverlappingRefinement { .. }));
    }

    #[test]
    fn test_nested_refinement() {
        let mut case = main_grid();
        case.add_refinement(&RefinementSpec {
            name: "OUTER".to_string(),
            parent_grid_index: 0,
            min_ijk: [1, 1, 1],
            max_ijk: [1, 1, 1],
            refinement: [2, 2, 2],
        })
        .unwrap();
        let inner = case
            .add_refinement(&RefinementSpec {
                name: "INNER".to_string(),
                parent_grid_index: 1,
                min_ijk: [1, 1, 1],
                max_ijk: [1, 1, 1],
                refinement: [2, 2, 2],
            })
            .unwrap();
        assert_eq!(case.grid(inner).unwrap().parent_grid_index, Some(1));
        assert_eq!(case.parent_cell(inner, 0), Some((1, 0)));
        assert_eq!(case.parent_cell(1, 0), Some((0, 0)));
        assert_eq!(case.parent_cell(0, 0), None);
    }
}
