use anyhow::Result;
use clap::Args;

use super::{coordinates::validate, load_locator, LoadArgs};

/// Look up a single coordinate
#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Latitude in degrees
    #[arg(allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(allow_negative_numbers = true)]
    pub lon: f64,
}

/// Run the `locate` command
pub fn run_locate(load: &LoadArgs, args: LocateArgs) -> Result<()> {
    let point = validate(args.lat, args.lon)?;
    let session = load_locator(load)?;
    match session.locator.locate_attribute(point) {
        Some(attribute) => println!("{attribute}"),
        None => println!("No municipality found"),
    }
    Ok(())
}
