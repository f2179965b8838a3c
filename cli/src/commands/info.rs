use std::time::Duration;

use anyhow::Result;
use humantime::format_duration;

use super::{load_locator, LoadArgs};

/// Run the `info` command
pub fn run_info(args: &LoadArgs) -> Result<()> {
    let session = load_locator(args)?;
    let store = session.locator.store();
    let stats = session.locator.index_stats();

    println!("Source:        {}", args.source.display());
    println!("Regions:       {}", store.len());
    println!("Malformed:     {}", session.report.malformed);
    if let Some(err) = &session.report.interrupted {
        println!("Partial load:  {err:#}");
    }
    match store.extent() {
        Some(extent) => println!(
            "Extent:        lon {} to {}, lat {} to {}",
            extent.min().x,
            extent.max().x,
            extent.min().y,
            extent.max().y
        ),
        None => println!("Extent:        none"),
    }
    println!("Name fields:   {}", session.locator.name_fields().join(", "));
    println!("Index:         {}", stats.kind);
    println!("Index entries: {}", stats.entries);
    if stats.cells > 0 {
        println!(
            "Grid cells:    {} ({} occupied, at most {} regions per cell)",
            stats.cells, stats.occupied_cells, stats.max_per_cell
        );
    }
    println!(
        "Load time:     {}",
        format_duration(Duration::from_millis(session.elapsed.as_millis() as u64))
    );

    Ok(())
}
