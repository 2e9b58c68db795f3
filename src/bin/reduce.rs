//! Reducibility verifier
//!
//! Part I of the computer-checked portion of the Four-Colour Theorem proof:
//! certifies that every configuration of the supplied unavoidable set is
//! D-reducible, or reducible under its declared contract.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use four_colour_verify::reducibility::verify_file;

#[derive(Parser)]
#[command(
    name = "reduce",
    about = "Verify reducibility of an unavoidable set of configurations",
    version,
    long_about = r#"Check every configuration in the given file for reducibility.

Each record is enumerated for its extendable ring colourings, closed under
balanced signed matchings until the live set stabilises, and, where the live
set does not empty, checked against its declared contract. Any discrepancy
with the counts claimed in the file aborts the run: a single inconsistency
invalidates the whole proof."#
)]
struct Cli {
    /// Configuration file holding the unavoidable set
    #[arg(value_name = "FILE", default_value = "unavoidable.conf")]
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    match verify_file(&cli.config) {
        Ok(count) => {
            println!("Reducibility of {count} configurations verified");
        }
        Err(e) => {
            io::stdout().flush().ok();
            eprintln!("{e}");
            process::exit(e.status());
        }
    }
}
