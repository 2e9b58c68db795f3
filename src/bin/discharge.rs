//! Discharging verifier
//!
//! Part II of the computer-checked portion of the Four-Colour Theorem proof:
//! replays a presentation of the discharging case analysis, certifying that
//! every internally 6-connected triangulation contains a member of the
//! unavoidable set.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use four_colour_verify::discharge::{verify_presentation, PRTALL, PRTBAS, PRTLIN, PRTPAI};
use four_colour_verify::discharge::question::Catalog;
use four_colour_verify::VerifyError;

#[derive(Parser)]
#[command(
    name = "discharge",
    about = "Verify a presentation of the discharging case analysis",
    version,
    long_about = r#"Replay the case-analysis transcript for one hub degree.

Every line of the presentation is an instruction: C splits a case on a
degree condition, S discharges a case by symmetry with an earlier one, R
demands that the current axle force a reducible configuration, and H
verifies a hubcap charge bound. A positive LINENO restricts detailed output
to that line (0 prints details for every line)."#
)]
struct Cli {
    /// Presentation file to verify
    #[arg(value_name = "FILE", default_value = "present7")]
    presentation: PathBuf,

    /// Line to print details about; 0 means all lines
    #[arg(value_name = "LINENO", default_value_t = 0)]
    lineno: i32,

    /// Print mode: 1 input lines, 2 basics, 3 hubcaps, 4 everything
    #[arg(value_name = "PRINTMODE", default_value_t = 0)]
    printmode: i32,

    /// Rule file defining the discharging rules
    #[arg(long, value_name = "FILE", default_value = "rules")]
    rules: PathBuf,

    /// Configuration file holding the unavoidable set
    #[arg(long, value_name = "FILE", default_value = "unavoidable.conf")]
    configs: PathBuf,

    /// Where to dump the instantiated outlets for inspection
    #[arg(long, value_name = "FILE", default_value = "outlet.et")]
    outlet_dump: PathBuf,
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if ![0, PRTLIN, PRTBAS, PRTPAI, PRTALL].contains(&cli.printmode) {
        anyhow::bail!("print mode must be 0..={PRTALL}");
    }
    let presentation = File::open(&cli.presentation).map_err(|_| {
        VerifyError::io(
            format!(
                "Unable to open file {} for reading",
                cli.presentation.display()
            ),
            3,
        )
    })?;
    let rules = File::open(&cli.rules).map_err(|_| {
        VerifyError::io(
            format!("Unable to open file {} for reading", cli.rules.display()),
            405,
        )
    })?;
    let catalog = Catalog::load(&cli.configs)?;
    let fname = cli.presentation.display().to_string();
    verify_presentation(
        BufReader::new(presentation),
        &fname,
        BufReader::new(rules),
        &catalog,
        Some(&cli.outlet_dump),
        cli.lineno,
        cli.printmode,
    )
    .with_context(|| format!("verification of {fname} failed"))?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        io::stdout().flush().ok();
        match e.downcast::<VerifyError>() {
            Ok(ve) => {
                eprintln!("{ve}");
                process::exit(ve.status());
            }
            Err(other) => {
                eprintln!("{other:#}");
                process::exit(1);
            }
        }
    }
}
