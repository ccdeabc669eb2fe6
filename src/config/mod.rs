//! Configuration Module
//!
//! Tunable defaults for the connection importer and the centerline
//! calculator, loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `SIMWELL_CONFIG` environment variable (path to TOML file)
//! 2. `simwell.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The loaded config is passed explicitly to the code that needs it:
//!
//! ```ignore
//! let config = SimWellConfig::load();
//! let wells = import::import_case(&grid, time_steps, &raw_wells, &config.import)?;
//! ```

mod settings;
pub mod defaults;
pub mod validation;

pub use settings::*;
