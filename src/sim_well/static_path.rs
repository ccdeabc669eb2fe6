//! Time-merged ("static") well path
//!
//! Every timestep's branches are merged into one path per ERT branch id so
//! the static pipe shows every cell the well was ever connected to, in flow
//! order. The merge is a positional alignment and only ever grows the path;
//! when several insertion points are plausible the first one wins.

use std::collections::BTreeMap;

use crate::types::{WellResultBranch, WellResultFrame, WellResultPoint};

/// Build the static frame from all timestep frames.
pub(super) fn compute_static_frame(frames: &[WellResultFrame]) -> WellResultFrame {
    let Some(first) = frames.first() else {
        return WellResultFrame::default();
    };

    let mut paths: BTreeMap<i32, Vec<WellResultPoint>> = BTreeMap::new();
    for branch in &first.branches {
        paths
            .entry(branch.ert_branch_id)
            .or_default()
            .extend(branch.points.iter().cloned());
    }

    for frame in &frames[1..] {
        for branch in &frame.branches {
            merge_branch_path(paths.entry(branch.ert_branch_id).or_default(), &branch.points);
        }
    }

    let well_head = if first.well_head.is_cell() {
        first.well_head.clone()
    } else {
        frames
            .iter()
            .map(|f| &f.well_head)
            .find(|wh| wh.is_cell())
            .unwrap_or(&first.well_head)
            .clone()
    };

    WellResultFrame {
        timestamp: None,
        is_open: first.is_open,
        production_type: first.production_type,
        well_head,
        branches: paths
            .into_iter()
            .map(|(ert_branch_id, points)| WellResultBranch {
                ert_branch_id,
                points,
            })
            .collect(),
    }
}

/// Merge `incoming` into `path`, keeping every point of both.
///
/// 1. The first path element that matches any incoming point anchors the
///    merge; incoming points before the match are inserted ahead of it.
/// 2. Each later path element is searched for in the rest of `incoming`
///    (never backward); incoming points skipped over by a match are inserted
///    in front of the matched element. Path elements with no match stay.
/// 3. Incoming points after the last match go right after the last matched
///    path element.
pub(super) fn merge_branch_path(path: &mut Vec<WellResultPoint>, incoming: &[WellResultPoint]) {
    if incoming.is_empty() {
        return;
    }

    let anchor = path.iter().enumerate().find_map(|(s, static_point)| {
        incoming
            .iter()
            .position(|p| p.is_equal(static_point))
            .map(|r| (s, r))
    });

    let Some((mut anchor_s, anchor_r)) = anchor else {
        path.extend_from_slice(incoming);
        return;
    };

    if anchor_r > 0 {
        path.splice(anchor_s..anchor_s, incoming[..anchor_r].iter().cloned());
        anchor_s += anchor_r;
    }

    let mut last_r = anchor_r;
    let mut last_s = anchor_s;
    let mut s = anchor_s + 1;
    while s < path.len() {
        let found = incoming[last_r + 1..]
            .iter()
            .position(|p| p.is_equal(&path[s]))
            .map(|offset| last_r + 1 + offset);

        if let Some(r) = found {
            let skipped = r - last_r - 1;
            if skipped > 0 {
                path.splice(s..s, incoming[last_r + 1..r].iter().cloned());
                s += skipped;
            }
            last_r = r;
            last_s = s;
        }
        s += 1;
    }

    if last_r + 1 < incoming.len() {
        path.splice(last_s + 1..last_s + 1, incoming[last_r + 1..].iter().cloned());
    }
}
