//! Centerline Regression Tests
//!
//! End-to-end: raw records → importer → centerline calculator. Pins point
//! counts, attributions and the per-branch edge invariant.

use approx::assert_relative_eq;
use chrono::{DateTime, TimeZone, Utc};

use simwell::config::ImportConfig;
use simwell::grid::RegularGridSpec;
use simwell::{
    calculate_centerlines, calculate_static_centerlines, import_case, import_well,
    CenterlineSettings, GridCase, PipeBranch, RawConnection, RawSegment, RawWell,
    RawWellTimeStep, TimeStepSelection, Vec3, WellProductionType,
};

// ============================================================================
// Helpers
// ============================================================================

fn t(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, day, 0, 0, 0).unwrap()
}

fn box_grid(dimensions: [usize; 3]) -> GridCase {
    GridCase::new(
        RegularGridSpec {
            dimensions,
            origin: Vec3::ZERO,
            cell_size: Vec3::new(10.0, 10.0, 10.0),
        }
        .build("MAIN")
        .unwrap(),
    )
}

fn conn(i: i64, j: i64, k: i64) -> RawConnection {
    RawConnection {
        grid_index: 0,
        i,
        j,
        k,
        is_open: true,
        connection_factor: 1.0,
        volume_rate: 100.0,
        oil_rate: 80.0,
        gas_rate: 15.0,
        water_rate: 5.0,
        segment_id: None,
    }
}

fn normal_step(day: u32, well_head: RawConnection, connections: Vec<RawConnection>) -> RawWellTimeStep {
    RawWellTimeStep {
        timestamp: t(day),
        is_open: true,
        production_type: WellProductionType::Producer,
        well_heads: vec![well_head],
        connections,
        segments: Vec::new(),
    }
}

fn no_branch_detection() -> CenterlineSettings {
    CenterlineSettings {
        auto_detect_branches: false,
        use_all_cell_centers: false,
    }
}

fn assert_pipe_invariants(pipe: &PipeBranch) {
    assert_eq!(
        pipe.attributions.len(),
        pipe.points.len() - 1,
        "one attribution per edge"
    );
    for (k, attribution) in pipe.attributions.iter().enumerate() {
        assert!(attribution.is_valid(), "edge {k} attributed to an invalid point");
        if !attribution.is_cell() {
            assert_eq!(
                attribution.bottom_position,
                Some(pipe.points[k + 1]),
                "placeholder edge {k} is not positioned at its end point"
            );
        }
    }
}

// ============================================================================
// Normal Wells
// ============================================================================

/// Well head above three diagonal cells with no shared faces: two well head
/// points, an exit and entry per hop, and the closing tip.
#[test]
fn diagonal_well_has_nine_points() {
    let grid = box_grid([3, 4, 4]);
    let raw = RawWell {
        name: "DIAG".into(),
        time_steps: vec![normal_step(
            1,
            conn(2, 1, 1),
            vec![conn(2, 2, 2), conn(2, 3, 3), conn(2, 4, 4)],
        )],
    };
    let mut well = import_well(&grid, &raw).unwrap();
    well.compute_mapping_from_result_time_indices_to_well_time_indices(&[t(1)]);

    let pipes = calculate_centerlines(
        &grid,
        &well,
        TimeStepSelection::Index(0),
        no_branch_detection(),
    );
    assert_eq!(pipes.len(), 1);
    let pipe = &pipes[0];
    assert_eq!(pipe.points.len(), 9);
    assert_eq!(pipe.attributions.len(), 8);
    assert_pipe_invariants(pipe);

    let frame = well.well_result_frame(0).unwrap();
    let cells = &frame.branches[0].points;
    assert_eq!(pipe.attributions[0], frame.well_head);
    assert_eq!(pipe.attributions[1], frame.well_head);
    assert_eq!(pipe.attributions[3], cells[0]);
    assert_eq!(pipe.attributions[5], cells[1]);
    assert_eq!(pipe.attributions[7], cells[2]);
    let transit = [2, 4, 6].map(|k| pipe.attributions[k].is_cell());
    assert_eq!(transit, [false, false, false]);

    // Starts at the top face center of the well head cell
    assert_relative_eq!(pipe.points[0].x, 15.0);
    assert_relative_eq!(pipe.points[0].y, 5.0);
    assert_relative_eq!(pipe.points[0].z, 0.0);
    assert_relative_eq!(pipe.points[1].z, -2.5);
    // Tip: 1.5 x past the last cell center, from its entry edge at (y=30, z=-30)
    let tip = pipe.points[8];
    assert_relative_eq!(tip.y, 30.0 + 1.5 * 5.0, epsilon = 1e-9);
    assert_relative_eq!(tip.z, -30.0 - 1.5 * 5.0, epsilon = 1e-9);
}

#[test]
fn auto_detection_splits_laterals_at_the_well_head() {
    let grid = box_grid([5, 1, 3]);
    let raw = RawWell {
        name: "FORK".into(),
        time_steps: vec![normal_step(
            1,
            conn(3, 1, 1),
            vec![conn(4, 1, 2), conn(5, 1, 3), conn(2, 1, 2), conn(1, 1, 3)],
        )],
    };
    let well = import_well(&grid, &raw).unwrap();

    let split = calculate_static_centerlines(&grid, &well, CenterlineSettings::default());
    assert_eq!(split.len(), 2);
    for pipe in &split {
        assert_pipe_invariants(pipe);
        assert_eq!(pipe.points[0], split[0].points[0]);
    }

    let single = calculate_static_centerlines(&grid, &well, no_branch_detection());
    assert_eq!(single.len(), 1);
    assert_pipe_invariants(&single[0]);
}

#[test]
fn cell_center_mode_adds_one_point_per_cell() {
    let grid = box_grid([1, 1, 4]);
    let raw = RawWell {
        name: "VERT".into(),
        time_steps: vec![normal_step(
            1,
            conn(1, 1, 1),
            vec![conn(1, 1, 2), conn(1, 1, 3), conn(1, 1, 4)],
        )],
    };
    let well = import_well(&grid, &raw).unwrap();

    let plain = calculate_static_centerlines(&grid, &well, CenterlineSettings::default());
    let centers = calculate_static_centerlines(
        &grid,
        &well,
        CenterlineSettings {
            use_all_cell_centers: true,
            ..CenterlineSettings::default()
        },
    );
    // well head plus three connections
    assert_eq!(centers[0].points.len(), plain[0].points.len() + 4);
    assert_pipe_invariants(&centers[0]);
    assert!(centers[0]
        .points
        .iter()
        .any(|p| (p.z - -25.0).abs() < 1e-9));
    assert_relative_eq!(plain[0].length(), centers[0].length(), epsilon = 1e-9);
}

#[test]
fn static_pipe_covers_every_timestep() {
    let grid = box_grid([1, 1, 4]);
    let raw = RawWell {
        name: "GROW".into(),
        time_steps: vec![
            normal_step(1, conn(1, 1, 1), vec![conn(1, 1, 2)]),
            normal_step(2, conn(1, 1, 1), vec![conn(1, 1, 2), conn(1, 1, 3), conn(1, 1, 4)]),
        ],
    };
    let results = import_case(&grid, vec![t(1), t(2), t(3)], &[raw], &ImportConfig::default())
        .unwrap();
    let well = results.find_well("GROW").unwrap();
    let settings = CenterlineSettings::default();

    let first = calculate_centerlines(&grid, well, TimeStepSelection::Index(0), settings);
    let merged = calculate_static_centerlines(&grid, well, settings);
    assert!(merged[0].length() > first[0].length());
    assert_eq!(merged[0].points.len(), 6);

    // No report at t(3), and an index beyond the case
    assert!(calculate_centerlines(&grid, well, TimeStepSelection::Index(2), settings).is_empty());
    assert!(calculate_centerlines(&grid, well, TimeStepSelection::Index(40), settings).is_empty());
}

#[test]
fn well_without_cells_has_no_centerline() {
    let grid = box_grid([2, 2, 2]);
    let raw = RawWell {
        name: "GHOST".into(),
        time_steps: vec![RawWellTimeStep {
            timestamp: t(1),
            is_open: false,
            production_type: WellProductionType::Undefined,
            well_heads: vec![conn(9, 9, 9)],
            connections: vec![conn(7, 1, 1)],
            segments: Vec::new(),
        }],
    };
    let well = import_well(&grid, &raw).unwrap();
    assert!(calculate_static_centerlines(&grid, &well, CenterlineSettings::default()).is_empty());
}

// ============================================================================
// Multi-Segment Wells
// ============================================================================

fn segment(id: i32, branch_id: i32, outlet: Option<i32>, length: f64) -> RawSegment {
    RawSegment {
        id,
        branch_id,
        outlet_segment_id: outlet,
        length,
        is_connected_to_valve: false,
    }
}

fn seg_conn(k: i64, segment_id: i32) -> RawConnection {
    RawConnection {
        segment_id: Some(segment_id),
        ..conn(1, 1, k)
    }
}

#[test]
fn msw_lateral_starts_at_outlet_and_keeps_invariants() {
    let grid = box_grid([1, 1, 4]);
    let raw = RawWell {
        name: "MSW".into(),
        time_steps: vec![RawWellTimeStep {
            timestamp: t(1),
            is_open: true,
            production_type: WellProductionType::WaterInjector,
            well_heads: vec![conn(1, 1, 1)],
            connections: vec![seg_conn(2, 1), seg_conn(3, 2), seg_conn(4, 11)],
            segments: vec![
                segment(1, 1, None, 10.0),
                segment(2, 1, Some(1), 10.0),
                segment(10, 2, Some(2), 10.0),
                segment(11, 2, Some(10), 20.0),
            ],
        }],
    };
    let well = import_well(&grid, &raw).unwrap();
    let pipes = calculate_static_centerlines(&grid, &well, CenterlineSettings::default());
    assert_eq!(pipes.len(), 2);
    for pipe in &pipes {
        assert_pipe_invariants(pipe);
    }

    // Main branch comes from the well head
    assert_relative_eq!(pipes[0].points[0].z, 0.0);
    // The lateral starts at its outlet cell's center (k = 3)
    assert_relative_eq!(pipes[1].points[0].z, -25.0, epsilon = 1e-9);
    assert!(pipes[1]
        .attributions
        .iter()
        .any(|a| a.segment_id == Some(10) && !a.is_cell()));
}

#[test]
fn lateral_from_unconnected_outlet_does_not_redraw_the_stem() {
    let grid = box_grid([1, 1, 6]);
    let raw = RawWell {
        name: "MSW-STEM".into(),
        time_steps: vec![RawWellTimeStep {
            timestamp: t(1),
            is_open: true,
            production_type: WellProductionType::Producer,
            well_heads: vec![conn(1, 1, 1)],
            connections: vec![seg_conn(2, 1), seg_conn(5, 4), seg_conn(6, 10)],
            segments: vec![
                segment(1, 1, None, 10.0),
                segment(2, 1, Some(1), 10.0),
                segment(3, 1, Some(2), 10.0),
                segment(4, 1, Some(3), 20.0),
                segment(10, 2, Some(3), 40.0),
            ],
        }],
    };
    let well = import_well(&grid, &raw).unwrap();
    let pipes = calculate_static_centerlines(&grid, &well, CenterlineSettings::default());
    assert_eq!(pipes.len(), 2);
    for pipe in &pipes {
        assert_pipe_invariants(pipe);
    }

    // Starts at seg 3's interpolated bottom, enters k=6 through its top face
    let lateral = &pipes[1];
    let zs = [-35.0, -50.0, -57.5];
    assert_eq!(lateral.points.len(), zs.len());
    for (point, z) in lateral.points.iter().zip(zs) {
        assert_relative_eq!(point.z, z, epsilon = 1e-9);
    }
    assert!(lateral
        .attributions
        .iter()
        .all(|a| !matches!(a.segment_id, Some(1 | 2 | 3))));
}
