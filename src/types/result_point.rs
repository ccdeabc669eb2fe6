//! Well result point - one grid cell connection or one unpositioned segment

use serde::{Deserialize, Serialize};

use super::Vec3;

/// A single well connection to a grid cell, or a placeholder for a
/// multi-segment well segment that has no grid connection.
///
/// Placeholders carry only branch/segment ids until the importer's
/// interpolation pass fills in `bottom_position`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellResultPoint {
    /// Index of the grid (0 = main grid, > 0 = LGR). `None` for placeholders.
    pub grid_index: Option<usize>,
    /// Cell index local to `grid_index`. `None` for placeholders.
    pub cell_index: Option<usize>,
    /// 1-based IJK as reported by the simulator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ijk: Option<[usize; 3]>,

    /// ERT branch id
    pub branch_id: Option<i32>,
    /// ERT segment id
    pub segment_id: Option<i32>,
    /// Branch id of the segment this one flows into
    pub outlet_branch_id: Option<i32>,
    /// Segment id this one flows into
    pub outlet_segment_id: Option<i32>,
    #[serde(default)]
    pub is_connected_to_valve: bool,

    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    connection_factor: f64,
    #[serde(default)]
    flow_rate: f64,
    #[serde(default)]
    oil_rate: f64,
    #[serde(default)]
    gas_rate: f64,
    #[serde(default)]
    water_rate: f64,

    /// Interpolated position of a placeholder segment's bottom end
    pub bottom_position: Option<Vec3>,
}

impl WellResultPoint {
    /// A connection to `cell_index` in grid `grid_index`.
    #[must_use]
    pub fn cell(grid_index: usize, cell_index: usize) -> Self {
        Self {
            grid_index: Some(grid_index),
            cell_index: Some(cell_index),
            ..Self::default()
        }
    }

    /// A segment placeholder with no grid connection.
    #[must_use]
    pub fn placeholder(branch_id: i32, segment_id: i32) -> Self {
        Self {
            branch_id: Some(branch_id),
            segment_id: Some(segment_id),
            ..Self::default()
        }
    }

    /// A purely geometric placeholder located at `position`.
    #[must_use]
    pub fn positioned(position: Vec3) -> Self {
        Self {
            bottom_position: Some(position),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rates(mut self, flow: f64, oil: f64, gas: f64, water: f64) -> Self {
        self.flow_rate = flow;
        self.oil_rate = oil;
        self.gas_rate = gas;
        self.water_rate = water;
        self
    }

    #[must_use]
    pub const fn with_connection_factor(mut self, factor: f64) -> Self {
        self.connection_factor = factor;
        self
    }

    #[must_use]
    pub fn with_segment(mut self, branch_id: Option<i32>, segment_id: Option<i32>) -> Self {
        self.branch_id = branch_id;
        self.segment_id = segment_id;
        self
    }

    #[must_use]
    pub const fn is_cell(&self) -> bool {
        self.cell_index.is_some()
    }

    /// A placeholder that has received a position.
    #[must_use]
    pub const fn is_point_valid(&self) -> bool {
        self.cell_index.is_none() && self.bottom_position.is_some()
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_cell() || self.bottom_position.is_some()
    }

    /// Identity used when merging paths over time: same grid cell and same segment.
    #[must_use]
    pub fn is_equal(&self, other: &Self) -> bool {
        self.grid_index == other.grid_index
            && self.cell_index == other.cell_index
            && self.branch_id == other.branch_id
            && self.segment_id == other.segment_id
    }

    /// `(grid_index, cell_index)` when this point is a cell.
    #[must_use]
    pub fn cell_key(&self) -> Option<(usize, usize)> {
        Some((self.grid_index?, self.cell_index?))
    }

    fn reported(&self, value: f64) -> f64 {
        if self.is_cell() && self.is_open {
            value
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn flow_rate(&self) -> f64 {
        self.reported(self.flow_rate)
    }

    #[must_use]
    pub fn oil_rate(&self) -> f64 {
        self.reported(self.oil_rate)
    }

    #[must_use]
    pub fn gas_rate(&self) -> f64 {
        self.reported(self.gas_rate)
    }

    #[must_use]
    pub fn water_rate(&self) -> f64 {
        self.reported(self.water_rate)
    }

    #[must_use]
    pub fn connection_factor(&self) -> f64 {
        self.reported(self.connection_factor)
    }
}
