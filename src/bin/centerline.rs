//! Pipe centerline export for a simulation case.
//!
//! Loads a JSON case file (grid, timesteps and raw well records), imports the
//! well connections and writes each well's pipe polylines as JSON.
//!
//! Usage:
//!   cargo run --bin simwell-centerline -- --case data/case.json
//!   cargo run --bin simwell-centerline -- --case data/case.json --well OP-1 --time-step 3 --output op1.json
//!   cargo run --bin simwell-centerline -- --case data/case.json --list

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use simwell::config::SimWellConfig;
use simwell::{
    calculate_centerlines, import_case, CaseFile, CenterlineSettings, PipeBranch,
    TimeStepSelection,
};

/// Simulation well pipe centerline exporter.
#[derive(Parser, Debug)]
#[command(name = "simwell-centerline", version)]
struct Args {
    /// JSON case file with grid, timesteps and wells.
    #[arg(long, env = "SIMWELL_CASE")]
    case: PathBuf,

    /// TOML config file. Defaults to $SIMWELL_CONFIG, then ./simwell.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only export this well.
    #[arg(long)]
    well: Option<String>,

    /// Global timestep index. The time-merged static frame when omitted.
    #[arg(long)]
    time_step: Option<usize>,

    /// Route pipes through every cell center.
    #[arg(long)]
    cell_centers: bool,

    /// Keep normal wells in a single branch.
    #[arg(long)]
    no_branch_detection: bool,

    /// Output JSON path. Defaults to stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// List wells in the case and exit.
    #[arg(long)]
    list: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[derive(Serialize)]
struct WellCenterlines<'a> {
    well: &'a str,
    selection: TimeStepSelection,
    settings: CenterlineSettings,
    branches: Vec<PipeBranch>,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    let config = match &args.config {
        Some(path) => SimWellConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SimWellConfig::load(),
    };

    let case_file = CaseFile::load(&args.case)
        .with_context(|| format!("Failed to load case {}", args.case.display()))?;

    if args.list {
        for well in &case_file.wells {
            let kind = if well.is_multi_segment() { "msw" } else { "normal" };
            println!("{}\t{}\t{} report steps", well.name, kind, well.time_steps.len());
        }
        return Ok(());
    }

    let grid = case_file.build_grid().context("Failed to build grid")?;
    let results = import_case(
        &grid,
        case_file.time_steps.clone(),
        &case_file.wells,
        &config.import,
    )
    .context("Failed to import well connections")?;

    let selection = args
        .time_step
        .map_or(TimeStepSelection::Static, TimeStepSelection::Index);
    if let TimeStepSelection::Index(i) = selection {
        if i >= results.time_steps().len() {
            bail!(
                "Time step {} out of range (case has {})",
                i,
                results.time_steps().len()
            );
        }
    }

    let mut settings = config.centerline;
    if args.cell_centers {
        settings.use_all_cell_centers = true;
    }
    if args.no_branch_detection {
        settings.auto_detect_branches = false;
    }

    let wells: Vec<_> = match &args.well {
        Some(name) => vec![results
            .find_well(name)
            .with_context(|| format!("Well '{name}' not found in case"))?],
        None => results.wells().iter().collect(),
    };

    let export: Vec<WellCenterlines<'_>> = wells
        .into_iter()
        .map(|well| WellCenterlines {
            well: &well.well_name,
            selection,
            settings,
            branches: calculate_centerlines(&grid, well, selection, settings),
        })
        .collect();

    let branch_count: usize = export.iter().map(|w| w.branches.len()).sum();
    info!(
        case = %config.case.name,
        wells = export.len(),
        branches = branch_count,
        ?selection,
        "Centerlines computed"
    );

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &export).context("Failed to write JSON")?;
    writeln!(writer)?;
    writer.flush()?;

    if let Some(path) = &args.output {
        info!(path = %path.display(), "Wrote centerlines");
    }
    Ok(())
}
