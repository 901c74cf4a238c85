//! Ridgeline CLI - watershed divides from contour lines

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geo::{Coord, Geometry, LineString, Point};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ridgeline_algorithms::contour::{is_real_peak, load_contours, Topography};
use ridgeline_algorithms::divide::{DivideParams, DivideSession, TracedLine, WatershedRecord};
use ridgeline_core::io::{read_geojson, write_geojson};
use ridgeline_core::{Feature, FeatureCollection};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "ridgeline")]
#[command(author, version, about = "Watershed divides traced along contour lines", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a contour layer
    Info {
        /// Input GeoJSON with contour lines
        input: PathBuf,
        /// Attribute holding the contour elevation
        #[arg(short, long, default_value = "elevation")]
        field: String,
    },
    /// Trace the two divide lines of a watershed and close its polygon
    Trace {
        /// Input GeoJSON with contour lines
        input: PathBuf,
        /// Attribute holding the contour elevation
        #[arg(short, long, default_value = "elevation")]
        field: String,
        /// Start point as x,y (give exactly two)
        #[arg(short, long = "start", required = true, num_args = 1)]
        starts: Vec<String>,
        /// Auxiliary point as x,y, applied in order
        #[arg(short, long = "aux")]
        auxiliaries: Vec<String>,
        /// Direct connection click as x,y, applied after the auxiliaries
        #[arg(short, long = "connect")]
        connections: Vec<String>,
        /// JSON file with parameter overrides
        #[arg(short, long)]
        params: Option<PathBuf>,
        /// Output GeoJSON with the lines and the polygon
        #[arg(short, long)]
        output: PathBuf,
        /// Also write the replayable watershed record as JSON
        #[arg(short, long)]
        record: Option<PathBuf>,
    },
    /// Rebuild a watershed from a saved record
    Replay {
        /// Input GeoJSON with contour lines
        input: PathBuf,
        /// Watershed record written by `trace --record`
        record: PathBuf,
        /// Attribute holding the contour elevation
        #[arg(short, long, default_value = "elevation")]
        field: String,
        /// JSON file with parameter overrides
        #[arg(short, long)]
        params: Option<PathBuf>,
        /// Output GeoJSON with the lines and the polygon
        #[arg(short, long)]
        output: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_topography(path: &Path, field: &str) -> Result<Topography> {
    let pb = spinner("Reading contours...");
    let features = read_geojson(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let store = load_contours(&features, field);
    pb.set_message("Building spatial index...");
    let topo = Topography::new(store);
    pb.finish_and_clear();
    info!("Contours: {} of {} features", topo.len(), features.len());
    Ok(topo)
}

fn read_params(path: Option<&Path>) -> Result<DivideParams> {
    let Some(path) = path else {
        return Ok(DivideParams::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameters from {}", path.display()))?;
    serde_json::from_str(&text).context("Invalid parameter file")
}

fn parse_point(s: &str) -> Result<Coord<f64>> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        anyhow::bail!("Point must be 'x,y', got: {}", s);
    }
    let x: f64 = parts[0].trim().parse().context("Invalid x")?;
    let y: f64 = parts[1].trim().parse().context("Invalid y")?;
    Ok(Coord { x, y })
}

fn parse_points(values: &[String]) -> Result<Vec<Coord<f64>>> {
    values.iter().map(|s| parse_point(s)).collect()
}

fn line_feature(line: &TracedLine) -> Feature {
    Feature::new(Geometry::LineString(LineString::from(line.points.clone())))
        .with_property("kind", "divide")
        .with_property("line", line.number as i64)
        .with_property("elevation_start", line.elevation_start)
        .with_property("elevation_end", line.elevation_end)
        .with_property("elevation_gain", line.elevation_gain())
        .with_property("length", line.length())
        .with_property("points", line.point_count())
        .with_property("contours", line.contour_count())
        .with_property("peaks", line.peaks)
        .with_property("iterations", line.iterations)
        .with_property("termination", line.termination.tag())
        .with_property("crossing_stop", line.termination.is_crossing())
        .with_property("auxiliary_jump", line.auxiliary_jump)
        .with_property("direct_connection", line.direct_connection)
}

fn write_session(session: &DivideSession, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    let mut out = FeatureCollection::new();
    for line in session.lines() {
        out.push(line_feature(line));
    }
    if let Some(crossing) = session.crossing() {
        out.push(Feature::new(Geometry::Point(Point::from(crossing))).with_property("kind", "crossing"));
    }
    match session.polygon() {
        Some(polygon) => {
            let area = polygon.area();
            let repaired = polygon.repaired();
            out.push(
                Feature::new(Geometry::MultiPolygon(polygon.into_geometry()))
                    .with_property("kind", "watershed")
                    .with_property("area_m2", area.trunc() as i64)
                    .with_property("repaired", repaired),
            );
        }
        None => warn!("No polygon could be closed from the two lines"),
    }
    write_geojson(path, &out).with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn write_record(record: &WatershedRecord, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(record).context("Failed to encode record")?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn summary(session: &DivideSession) {
    for line in session.lines() {
        println!(
            "  Line {}: {} -> {} ({:+}) | {:.1} units | {} pts | {}",
            line.number,
            line.elevation_start,
            line.elevation_end,
            line.elevation_gain(),
            line.length(),
            line.point_count(),
            line.termination
        );
    }
    if let Some(polygon) = session.polygon() {
        println!("  Area: {:.0}", polygon.area());
    }
}

fn done(path: &Path, elapsed: std::time::Duration) {
    println!("Watershed saved to: {}", path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Info { input, field } => {
            let topo = read_topography(&input, &field)?;
            let params = DivideParams::default();
            let walk = params.fresh();

            let peaks = topo
                .contours()
                .iter()
                .filter(|c| is_real_peak(c, &topo, walk.peak_search_radius, walk.closed_tolerance))
                .count();
            let (min, max) = topo
                .contours()
                .iter()
                .map(|c| c.elevation())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| (lo.min(e), hi.max(e)));

            println!("File: {}", input.display());
            println!("Contours: {}", topo.len());
            println!("Peaks: {}", peaks);
            if !topo.is_empty() {
                println!("Elevation: {} - {}", min, max);
            }
        }

        Commands::Trace {
            input,
            field,
            starts,
            auxiliaries,
            connections,
            params,
            output,
            record,
        } => {
            let starts = parse_points(&starts)?;
            if starts.len() != 2 {
                anyhow::bail!("Exactly two --start points are needed, got {}", starts.len());
            }
            let auxiliaries = parse_points(&auxiliaries)?;
            let connections = parse_points(&connections)?;
            let params = read_params(params.as_deref())?;
            let topo = read_topography(&input, &field)?;

            let start = Instant::now();
            let mut session =
                DivideSession::trace(&topo, &starts, &auxiliaries, params).context("Failed to trace divides")?;
            for click in connections {
                if session.add_direct_connection(click).is_none() {
                    warn!("Skipped connection at {}, {}: no line to join", click.x, click.y);
                }
            }
            let elapsed = start.elapsed();

            summary(&session);
            write_session(&session, &output)?;
            if let Some(path) = record {
                write_record(&session.record(), &path)?;
            }
            done(&output, elapsed);
        }

        Commands::Replay {
            input,
            record,
            field,
            params,
            output,
        } => {
            let text = std::fs::read_to_string(&record)
                .with_context(|| format!("Failed to read {}", record.display()))?;
            let saved: WatershedRecord = serde_json::from_str(&text).context("Invalid watershed record")?;
            let params = read_params(params.as_deref())?;
            let topo = read_topography(&input, &field)?;

            let start = Instant::now();
            let session = DivideSession::replay(&topo, &saved, params).context("Failed to replay watershed")?;
            let elapsed = start.elapsed();

            summary(&session);
            write_session(&session, &output)?;
            done(&output, elapsed);
        }
    }

    Ok(())
}
