//! System-wide default constants.
//!
//! Fixed conventions of the importer and centerline calculator, grouped by
//! subsystem.

// ============================================================================
// Configuration
// ============================================================================

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV_VAR: &str = "SIMWELL_CONFIG";

/// Config file looked up in the current working directory.
pub const DEFAULT_CONFIG_FILE: &str = "simwell.toml";

// ============================================================================
// Connection Importer
// ============================================================================

/// ERT branch id given to the single branch of a normal (non-MSW) well.
pub const NORMAL_WELL_BRANCH_ID: i32 = 0;

/// Fraction of the center→corner-0 vector a position estimate is moved when
/// the contributing connection is closer than its cell's size.
pub const INSULATING_OFFSET_FACTOR: f64 = 0.4;

/// Contributions closer than this (m) are used as the exact position.
pub const INTERPOLATION_EXACT_DISTANCE: f64 = 1e-6;

// ============================================================================
// Centerline Calculator
// ============================================================================

/// The last pipe point is placed this far along entry→center of the last cell.
///
/// 1.0 would end the pipe at the cell center; 1.5 lets the tip protrude.
pub const TIP_EXTENSION_FACTOR: f64 = 1.5;

/// Squared distance below which two pipe points are considered identical.
/// A cell exit point this close to the previous pipe point is skipped.
pub const DEGENERATE_POINT_DISTANCE_SQUARED: f64 = 1e-3;
