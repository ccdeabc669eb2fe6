//! Multi-segment well branch reconstruction
//!
//! Each branch is walked from its tip segment along the outlet chain. Segments
//! with grid connections emit their cells; segments without emit placeholders
//! whose positions are interpolated afterwards from the nearest positioned
//! connections above and below them along the segment tree. A lateral ends
//! at the first segment it reaches on its outlet branch.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, error, warn};

use super::ImportError;
use crate::config::defaults::{INSULATING_OFFSET_FACTOR, INTERPOLATION_EXACT_DISTANCE};
use crate::grid::GridCase;
use crate::source::RawSegment;
use crate::types::{Vec3, WellResultBranch, WellResultPoint};

/// One candidate position for an unpositioned segment's bottom end
#[derive(Debug, Clone, PartialEq)]
pub(super) struct PositionContribution {
    /// Segment of the contributing connection. `None` for the well head.
    pub connection_segment_id: Option<i32>,
    pub position: Vec3,
    /// Accumulated segment length between the connection and this segment
    pub length: f64,
    pub is_insulating: bool,
    pub is_from_above: bool,
}

/// Interpolated position from the closest contribution above and the
/// closest below, weighted by inverse length.
pub(super) fn interpolate_position(contributions: &[PositionContribution]) -> Option<Vec3> {
    let closest = |from_above: bool| {
        contributions
            .iter()
            .filter(|c| c.is_from_above == from_above)
            .min_by(|a, b| a.length.total_cmp(&b.length))
    };
    let chosen: Vec<&PositionContribution> =
        closest(true).into_iter().chain(closest(false)).collect();

    if let Some(exact) = chosen
        .iter()
        .find(|c| c.length < INTERPOLATION_EXACT_DISTANCE)
    {
        return Some(exact.position);
    }

    let total_weight: f64 = chosen.iter().map(|c| 1.0 / c.length).sum();
    if chosen.is_empty() || total_weight <= 0.0 {
        return None;
    }
    Some(
        chosen
            .iter()
            .fold(Vec3::ZERO, |acc, c| acc + c.position * (1.0 / c.length / total_weight)),
    )
}

/// Shallowest positioned connection seen so far while walking up a branch
#[derive(Debug, Clone, Copy)]
struct ConnectionAnchor {
    segment_id: i32,
    center: Vec3,
    corner: Vec3,
    size: f64,
}

#[derive(Debug, Default)]
struct UnpositionedSegment {
    contributions: Vec<PositionContribution>,
    segments_below: Vec<i32>,
}

/// A walked branch before positions are filled in
struct WalkedBranch {
    ert_branch_id: i32,
    points: Vec<WellResultPoint>,
    reaches_well_head: bool,
}

/// Builds the branches of one multi-segment well frame
pub(super) struct MswFrameBuilder<'a> {
    well_name: &'a str,
    grid: &'a GridCase,
    segments: BTreeMap<i32, &'a RawSegment>,
    segment_cells: HashMap<i32, Vec<WellResultPoint>>,
    unpositioned: BTreeMap<i32, UnpositionedSegment>,
}

impl<'a> MswFrameBuilder<'a> {
    /// `connections` are resolved, unsuppressed cell points tagged with their
    /// segment id.
    pub(super) fn new(
        well_name: &'a str,
        grid: &'a GridCase,
        segments: &'a [RawSegment],
        connections: &[WellResultPoint],
    ) -> Self {
        let segments: BTreeMap<i32, &RawSegment> = segments.iter().map(|s| (s.id, s)).collect();

        let mut segment_cells: HashMap<i32, Vec<WellResultPoint>> = HashMap::new();
        for point in connections {
            let Some(segment) = point.segment_id.and_then(|id| segments.get(&id)) else {
                warn!(
                    well = %well_name,
                    segment = ?point.segment_id,
                    ijk = ?point.ijk,
                    "Connection has no segment in the segment tree, dropped"
                );
                continue;
            };
            let outlet = segment.outlet_segment_id.and_then(|id| segments.get(&id));
            let mut point = point.clone();
            point.branch_id = Some(segment.branch_id);
            point.outlet_segment_id = outlet.map(|o| o.id);
            point.outlet_branch_id = outlet.map(|o| o.branch_id);
            point.is_connected_to_valve = segment.is_connected_to_valve;
            segment_cells.entry(segment.id).or_default().push(point);
        }

        // Keep only the innermost grid reporting a connection for each segment
        for cells in segment_cells.values_mut() {
            if let Some(innermost) = cells.iter().filter_map(|p| p.grid_index).max() {
                cells.retain(|p| p.grid_index == Some(innermost));
            }
        }

        Self {
            well_name,
            grid,
            segments,
            segment_cells,
            unpositioned: BTreeMap::new(),
        }
    }

    /// Walk every branch, propagate contributions and position all
    /// placeholders. Branches come out ordered by ERT branch id, points
    /// running from the outlet end to the tip.
    pub(super) fn build(
        mut self,
        well_head: &WellResultPoint,
    ) -> Result<Vec<WellResultBranch>, ImportError> {
        let branch_ids: BTreeSet<i32> = self.segments.values().map(|s| s.branch_id).collect();

        let mut walked = Vec::with_capacity(branch_ids.len());
        for branch_id in branch_ids {
            match self.tip_segment(branch_id) {
                Some(tip) => walked.push(self.walk_branch(branch_id, tip)),
                None => warn!(
                    well = %self.well_name,
                    branch = branch_id,
                    "Branch has no tip segment, skipping"
                ),
            }
        }

        for branch in &walked {
            self.propagate_from_cells_above(branch, well_head);
        }

        walked
            .into_iter()
            .map(|branch| self.position_placeholders(branch))
            .collect()
    }

    /// The branch segment no other segment of the same branch flows into.
    /// Several candidates pick the highest id.
    fn tip_segment(&self, branch_id: i32) -> Option<i32> {
        let outlets: BTreeSet<i32> = self
            .segments
            .values()
            .filter(|s| s.branch_id == branch_id)
            .filter_map(|s| s.outlet_segment_id)
            .collect();
        self.segments
            .values()
            .filter(|s| s.branch_id == branch_id && !outlets.contains(&s.id))
            .map(|s| s.id)
            .max()
    }

    fn outlet_of(&self, segment: &RawSegment) -> Option<&'a RawSegment> {
        segment
            .outlet_segment_id
            .and_then(|id| self.segments.get(&id))
            .copied()
    }

    fn walk_branch(&mut self, branch_id: i32, tip: i32) -> WalkedBranch {
        let mut points = Vec::new();
        let mut visited = BTreeSet::new();
        let mut anchor: Option<ConnectionAnchor> = None;
        let mut accumulated = 0.0;
        let mut segment_below: Option<i32> = None;
        let mut left_branch = false;
        let mut cursor = self.segments.get(&tip).copied();

        let reaches_well_head = loop {
            let Some(segment) = cursor else {
                break true;
            };
            if !visited.insert(segment.id) {
                warn!(
                    well = %self.well_name,
                    segment = segment.id,
                    "Outlet chain loops back on itself"
                );
                break false;
            }
            left_branch |= segment.branch_id != branch_id;

            let cells = self.segment_cells.get(&segment.id).cloned().unwrap_or_default();
            if let Some(shallowest) = cells.first() {
                if left_branch {
                    // The outlet branch's connection closest to this branch
                    points.extend(cells.last().cloned());
                    break false;
                }
                points.extend(cells.iter().rev().cloned());
                anchor = self.anchor_for(segment.id, shallowest).or(anchor);
                accumulated = segment.length / (cells.len() + 1) as f64;
            } else {
                points.push(self.placeholder_for(segment));
                let from_below = anchor.map(|a| a.contribution(accumulated));
                let entry = self.unpositioned.entry(segment.id).or_default();
                entry.contributions.extend(from_below);
                entry.segments_below.extend(segment_below);
                if left_branch {
                    break false;
                }
                accumulated += segment.length;
            }

            segment_below = Some(segment.id);
            cursor = self.outlet_of(segment);
        };

        points.reverse();
        debug!(
            well = %self.well_name,
            branch = branch_id,
            points = points.len(),
            reaches_well_head,
            "Walked branch"
        );
        WalkedBranch {
            ert_branch_id: branch_id,
            points,
            reaches_well_head,
        }
    }

    fn anchor_for(&self, segment_id: i32, point: &WellResultPoint) -> Option<ConnectionAnchor> {
        let cell = self.grid.cell_from_well_result_point(point)?;
        let center = cell.center();
        Some(ConnectionAnchor {
            segment_id,
            center,
            corner: cell.corners[0],
            size: cell.characteristic_size(),
        })
    }

    fn placeholder_for(&self, segment: &RawSegment) -> WellResultPoint {
        let outlet = self.outlet_of(segment);
        let mut point = WellResultPoint::placeholder(segment.branch_id, segment.id);
        point.outlet_segment_id = outlet.map(|o| o.id);
        point.outlet_branch_id = outlet.map(|o| o.branch_id);
        point.is_connected_to_valve = segment.is_connected_to_valve;
        point
    }

    /// The first placeholder after a cell receives that cell's center as a
    /// contribution from above, which then flows down every unpositioned
    /// segment below it.
    fn propagate_from_cells_above(&mut self, branch: &WalkedBranch, well_head: &WellResultPoint) {
        let mut above = (branch.reaches_well_head && well_head.is_cell()).then_some(well_head);

        for point in &branch.points {
            if point.is_cell() {
                above = Some(point);
                continue;
            }
            let Some(cell_point) = above.take() else {
                continue;
            };
            let (Some(segment_id), Some(cell)) = (
                point.segment_id,
                self.grid.cell_from_well_result_point(cell_point),
            ) else {
                continue;
            };
            let contribution = PositionContribution {
                connection_segment_id: cell_point.segment_id,
                position: cell.center(),
                length: 0.0,
                is_insulating: false,
                is_from_above: true,
            };
            self.propagate_downwards(segment_id, contribution);
        }
    }

    fn propagate_downwards(&mut self, segment_id: i32, mut contribution: PositionContribution) {
        let Some(length) = self.segments.get(&segment_id).map(|s| s.length) else {
            return;
        };
        let Some(entry) = self.unpositioned.get_mut(&segment_id) else {
            return;
        };
        if entry.contributions.iter().any(|c| {
            c.is_from_above && c.connection_segment_id == contribution.connection_segment_id
        }) {
            return;
        }

        contribution.length += length;
        entry.contributions.push(contribution.clone());
        let below = entry.segments_below.clone();
        for segment in below {
            self.propagate_downwards(segment, contribution.clone());
        }
    }

    fn position_placeholders(&self, branch: WalkedBranch) -> Result<WellResultBranch, ImportError> {
        let mut points = branch.points;
        for point in points.iter_mut().filter(|p| !p.is_cell()) {
            let Some(segment_id) = point.segment_id else {
                continue;
            };
            let position = self
                .unpositioned
                .get(&segment_id)
                .and_then(|u| interpolate_position(&u.contributions));
            let Some(position) = position else {
                error!(
                    well = %self.well_name,
                    segment = segment_id,
                    "Segment has no position contributions"
                );
                return Err(ImportError::UnpositionedSegment {
                    well: self.well_name.to_string(),
                    segment_id,
                });
            };
            point.bottom_position = Some(position);
        }
        Ok(WellResultBranch {
            ert_branch_id: branch.ert_branch_id,
            points,
        })
    }
}

impl ConnectionAnchor {
    fn contribution(self, length: f64) -> PositionContribution {
        let is_insulating = length < self.size;
        let position = if is_insulating {
            self.center + (self.corner - self.center) * INSULATING_OFFSET_FACTOR
        } else {
            self.center
        };
        PositionContribution {
            connection_segment_id: Some(self.segment_id),
            position,
            length,
            is_insulating,
            is_from_above: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn contribution(position: Vec3, length: f64, from_above: bool) -> PositionContribution {
        PositionContribution {
            connection_segment_id: Some(1),
            position,
            length,
            is_insulating: false,
            is_from_above: from_above,
        }
    }

    #[test]
    fn test_single_contribution_is_exact() {
        let p = Vec3::new(5.0, 6.0, -7.0);
        let result = interpolate_position(&[contribution(p, 10.0, false)]).unwrap();
        assert_relative_eq!(result.x, 5.0);
        assert_relative_eq!(result.y, 6.0);
        assert_relative_eq!(result.z, -7.0);
    }

    #[test]
    fn test_inverse_length_weighting() {
        let near = contribution(Vec3::new(0.0, 0.0, 0.0), 2.0, true);
        let far = contribution(Vec3::new(10.0, 0.0, 0.0), 8.0, false);
        let result = interpolate_position(&[near, far]).unwrap();
        assert_relative_eq!(result.x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_only_closest_per_side_is_used() {
        let above_near = contribution(Vec3::new(0.0, 0.0, 0.0), 1.0, true);
        let above_far = contribution(Vec3::new(100.0, 0.0, 0.0), 3.0, true);
        let below = contribution(Vec3::new(10.0, 0.0, 0.0), 1.0, false);
        let result = interpolate_position(&[above_far, above_near, below]).unwrap();
        assert_relative_eq!(result.x, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_length_short_circuits() {
        let exact = contribution(Vec3::new(1.0, 2.0, 3.0), 0.0, true);
        let other = contribution(Vec3::new(9.0, 9.0, 9.0), 4.0, false);
        let result = interpolate_position(&[other, exact]).unwrap();
        assert_relative_eq!(result.z, 3.0);
    }

    #[test]
    fn test_no_contributions() {
        assert!(interpolate_position(&[]).is_none());
    }

    #[test]
    fn test_insulating_offset_toward_corner() {
        let anchor = ConnectionAnchor {
            segment_id: 4,
            center: Vec3::new(5.0, 5.0, -5.0),
            corner: Vec3::new(0.0, 0.0, 0.0),
            size: 8.66,
        };
        let close = anchor.contribution(2.0);
        assert!(close.is_insulating);
        assert_relative_eq!(close.position.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(close.position.z, -3.0, epsilon = 1e-12);

        let distant = anchor.contribution(20.0);
        assert!(!distant.is_insulating);
        assert_eq!(distant.position, anchor.center);
    }
}
