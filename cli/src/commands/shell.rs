use std::io::{self, BufRead, Write};

use anyhow::Result;
use muniloc_core::Locator;
use yansi::Condition;

use super::{
    coordinates::{parse_coordinates, stdout_color},
    load_locator, LoadArgs,
};

const PROMPT: &str = "Enter coordinates > ";

/// Run the `shell` command
pub fn run_shell(args: &LoadArgs) -> Result<()> {
    let session = load_locator(args)?;
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    run_session(&session.locator, stdin, stdout, stdout_color())
}

/// Reads `lat,lng` lines from `input` and writes results to `output` until
/// `exit`, `quit`, or the end of the input
fn run_session<R: BufRead, W: Write>(
    locator: &Locator,
    mut input: R,
    mut output: W,
    color: Condition,
) -> Result<()> {
    writeln!(output, "=== Municipality Finder ===")?;
    writeln!(
        output,
        "{} regions loaded. Enter coordinates as `lat,lng' or type `exit' to quit.",
        locator.store().len()
    )?;

    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        let command = line.trim();
        if command.eq_ignore_ascii_case("exit") || command.eq_ignore_ascii_case("quit") {
            break;
        }
        if command.is_empty() {
            continue;
        }

        match parse_coordinates(&line) {
            Ok(point) => match locator.locate_attribute(point) {
                Some(attribute) => writeln!(output, "Result: {attribute}")?,
                None => writeln!(output, "Result: No municipality found")?,
            },
            Err(err) => writeln!(output, "{}\n", err.render(line.trim_end(), color))?,
        }
    }

    writeln!(output, "Goodbye!")?;
    output.flush()?;
    Ok(())
}
