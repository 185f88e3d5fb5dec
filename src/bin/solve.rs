//! CLI driver: load an instance, run the solver, write the solution, and
//! optionally dump per-iteration metrics to Parquet.

use clap::Parser;
use pdptw_solver::config::{Deadline, SolverConfig};
use pdptw_solver::instance::parser;
use pdptw_solver::output::{write_solution, SolutionMeta};
use pdptw_solver::progress::SolveEvent;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(about = "Solves a Pickup and Delivery Problem with Time Windows instance")]
struct Args {
    /// Path to the instance file (Format-A or Format-B, auto-detected)
    instance: PathBuf,

    /// Where to write the solution text file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Load solver settings from a JSON file (§2); individual `--time-limit-s`
    /// and friends below still override whatever the file sets.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the resolved solver settings to this JSON file before solving
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Wall-clock deadline, seconds
    #[arg(long)]
    time_limit_s: Option<f64>,

    /// Cap on outer ILS iterations
    #[arg(long)]
    max_ils_iterations: Option<usize>,

    /// Cap on inner LNS iterations per ILS step
    #[arg(long)]
    lns_iterations: Option<usize>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Free-text authors field for the solution header
    #[arg(long, default_value = "")]
    authors: String,

    /// Free-text reference field for the solution header
    #[arg(long, default_value = "")]
    reference: String,

    /// If set, write per-ILS-iteration metrics to this Parquet file
    #[arg(long)]
    metrics_out: Option<PathBuf>,
}

/// One row per `SolveEvent::IterationDone`, for the optional
/// `--metrics-out` Parquet dump; mirrors the teacher's
/// `metrics::IterationRecord` shape, scoped down to the fields this solver
/// actually tracks.
struct IterationRow {
    iteration: usize,
    vehicles: i64,
    distance: i64,
}

fn serialize_metrics_to_parquet(rows: &[IterationRow], path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    use arrow::array::{Int64Array, UInt64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::arrow_writer::ArrowWriter;
    use std::sync::Arc;

    let iterations: UInt64Array = rows.iter().map(|r| r.iteration as u64).collect();
    let vehicles: Int64Array = rows.iter().map(|r| r.vehicles).collect();
    let distances: Int64Array = rows.iter().map(|r| r.distance).collect();

    let schema = Schema::new(vec![
        Field::new("iteration", DataType::UInt64, false),
        Field::new("vehicles", DataType::Int64, false),
        Field::new("distance", DataType::Int64, false),
    ]);

    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![Arc::new(iterations), Arc::new(vehicles), Arc::new(distances)],
    )?;

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let instance = match parser::parse(&args.instance) {
        Ok(instance) => instance,
        Err(err) => {
            eprintln!("failed to load {}: {err}", args.instance.display());
            std::process::exit(1);
        }
    };

    let mut config = match &args.config {
        Some(path) => match SolverConfig::load_json(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("failed to load config {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => SolverConfig::default(),
    };
    if let Some(v) = args.time_limit_s {
        config.time_limit_s = v;
    }
    if let Some(v) = args.max_ils_iterations {
        config.max_ils_iterations = v;
    }
    if let Some(v) = args.lns_iterations {
        config.lns_iterations = v;
    }
    if let Some(v) = args.seed {
        config.seed = v;
    }

    if let Some(path) = &args.save_config {
        if let Err(err) = config.save_json(path) {
            eprintln!("failed to save config to {}: {err}", path.display());
            std::process::exit(1);
        }
    }

    info!(instance = %args.instance.display(), "starting solve");

    let deadline = Deadline::new(Duration::from_secs_f64(config.time_limit_s.max(0.0)));
    let mut rows: Vec<IterationRow> = Vec::new();
    let want_metrics = args.metrics_out.is_some();

    let result = pdptw_solver::solve(&instance, &config, deadline, |event: SolveEvent| {
        if !want_metrics {
            return;
        }
        if let SolveEvent::IterationDone { iteration, incumbent } = event {
            rows.push(IterationRow {
                iteration,
                vehicles: incumbent.vehicles as i64,
                distance: incumbent.distance,
            });
        }
    });

    let result = match result {
        Ok(result) => result,
        Err(err) => {
            eprintln!("solve failed: {err}");
            std::process::exit(1);
        }
    };

    info!(
        vehicles = result.metrics.vehicles,
        distance = result.metrics.distance,
        runtime_s = result.metrics.runtime_s,
        status = ?result.status,
        "solve finished"
    );

    let meta = SolutionMeta {
        instance_name: instance.name().to_string(),
        authors: args.authors,
        date: String::new(),
        reference: args.reference,
    };

    match args.output {
        Some(path) => {
            let file = File::create(&path)?;
            write_solution(BufWriter::new(file), &meta, &result.solution)?;
        }
        None => {
            let stdout = io::stdout();
            write_solution(stdout.lock(), &meta, &result.solution)?;
        }
    }

    if let Some(path) = args.metrics_out {
        if let Err(err) = serialize_metrics_to_parquet(&rows, &path) {
            eprintln!("failed to write metrics to {}: {err}", path.display());
        }
    }

    Ok(())
}
