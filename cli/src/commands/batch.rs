use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Args;
use geo::Coord;
use humantime::format_duration;
use muniloc_core::{
    batch::{default_workers, locate_all},
    Locator,
};
use tracing::{info, warn};

use super::{coordinates::parse_coordinates, load_locator, LoadArgs};

/// Look up `lat,lng` lines and write `lat,lng,result` lines to stdout
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// A file with one `lat,lng' pair per line (default: stdin)
    pub file: Option<PathBuf>,

    /// Number of worker threads (default: one per CPU)
    #[arg(long)]
    pub workers: Option<usize>,
}

/// Run the `batch` command
pub fn run_batch(load: &LoadArgs, args: BatchArgs) -> Result<()> {
    let session = load_locator(load)?;

    let points = match &args.file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Unable to open `{}'", path.display()))?;
            read_points(BufReader::new(file))?
        }
        None => read_points(io::stdin().lock())?,
    };

    let start = Instant::now();
    let stdout = io::stdout().lock();
    let mut writer = BufWriter::new(stdout);
    let workers = args.workers.unwrap_or_else(default_workers);
    write_results(&session.locator, &points, workers, &mut writer)?;
    writer.flush()?;

    info!(
        "Located {} points in {}",
        points.len(),
        format_duration(Duration::from_millis(start.elapsed().as_millis() as u64))
    );

    Ok(())
}

/// Parses one point per line. Blank lines are ignored. Invalid lines are
/// reported and skipped.
fn read_points<R: BufRead>(reader: R) -> Result<Vec<Coord>> {
    let mut points = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_coordinates(&line) {
            Ok(point) => points.push(point),
            Err(err) => warn!(line = i + 1, "Skipping `{}': {err}", line.trim()),
        }
    }
    Ok(points)
}

fn write_results<W: Write>(
    locator: &Locator,
    points: &[Coord],
    workers: usize,
    writer: &mut W,
) -> Result<()> {
    let results = locate_all(locator, points, workers);
    for (point, id) in points.iter().zip(results) {
        let name = id
            .and_then(|id| locator.attribute_of(id))
            .map(|a| csv_field(&a.to_string()))
            .unwrap_or_default();
        writeln!(writer, "{},{},{}", point.y, point.x, name)?;
    }
    Ok(())
}

/// Quotes a CSV field if necessary
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
