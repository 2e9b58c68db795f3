// Per-configuration reducibility driver: enumeration, closure to a fixed
// point, then the contract check. The stdout transcript is part of the
// programme's interface and keeps the historical layout.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::configuration::{ConfReader, Configuration};
use crate::constants::{ncodes, MAXRING, SIMATCHNUMBER};
use crate::error::{Result, VerifyError};
use crate::reducibility::angles::build_angles;
use crate::reducibility::coloring::initial_live;
use crate::reducibility::contract::{verify_contract, ContractOutcome};
use crate::reducibility::matching::{matching_pass, prune_live};

/// Reducibility engine owning the per-ring working buffers; the buffers are
/// sized once for the largest ring and reused across configurations.
pub struct Reducer {
    live: Vec<u8>,
    real: Vec<u8>,
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer {
    pub fn new() -> Self {
        Reducer {
            live: vec![0; ncodes(MAXRING)],
            real: vec![0; (SIMATCHNUMBER[MAXRING] / 8 + 2) as usize],
        }
    }

    /// Verifies one configuration: D-reducible, or reducible under its
    /// declared contract.
    pub fn verify(&mut self, conf: &Configuration) -> Result<()> {
        let angles = build_angles(conf)?;
        let ring = conf.ring() as usize;
        if ring > MAXRING {
            return Err(VerifyError::resource(
                format!("Ring-size bigger than {MAXRING}"),
                43,
            ));
        }
        let n = ncodes(ring);

        self.live[..n].fill(1);
        let extent = initial_live(&angles, &mut self.live[..n]);
        let mut nlive = n as i64 - extent;
        print_status(ring, n, extent, conf.extendable_claim())?;

        let nchar = (SIMATCHNUMBER[ring] / 8 + 1) as usize;
        loop {
            self.real[..=nchar].fill(255);
            let nreal = matching_pass(ring, &mut self.real, &mut self.live[..n], nchar)?;
            println!("               {nreal}");
            let more = prune_live(&mut self.live[..n], n, &mut nlive);
            print!("            {nlive:9}");
            io::stdout().flush().ok();
            if !more {
                break;
            }
        }
        if nlive == 0 {
            print!("\n\n\n                  ***  D-reducible  ***\n\n");
        } else {
            print!("\n\n\n                ***  Not D-reducible  ***\n");
        }

        match verify_contract(&self.live[..n], nlive, &angles)? {
            ContractOutcome::NotNeeded => println!(),
            ContractOutcome::Confirmed => {
                print!("               ***  Contract confirmed  ***\n\n");
            }
        }
        io::stdout().flush().ok();
        Ok(())
    }
}

/// Headline block after the enumeration; fails if the computed number of
/// extending colourings disagrees with the configuration's claim.
fn print_status(ring: usize, total: usize, extent: i64, claim: i64) -> Result<()> {
    print!("\n\n   This has ring-size {ring}, so there are {total} colourings total,\n");
    print!("   and {} balanced signed matchings.\n", SIMATCHNUMBER[ring]);
    print!("\n   There are {extent} colourings that extend to the configuration.");
    if extent != claim {
        return Err(VerifyError::claim(
            "discrepancy in number of extending colourings",
            31,
        ));
    }
    print!("\n\n            remaining               remaining balanced\n");
    print!("           colourings               signed matchings\n");
    print!("\n              {:7}", total as i64 - extent);
    io::stdout().flush().ok();
    Ok(())
}

/// Verifies every configuration of an already-open stream; returns how many
/// records were processed.
pub fn verify_stream<R: BufRead>(input: R) -> Result<i64> {
    let mut reader = ConfReader::new(input);
    let mut reducer = Reducer::new();
    let mut count = 0;
    while let Some(conf) = reader.next_record()? {
        reducer.verify(&conf)?;
        count += 1;
    }
    Ok(count)
}

/// Opens `path` and verifies every configuration in it.
pub fn verify_file(path: &Path) -> Result<i64> {
    let file = File::open(path)
        .map_err(|_| VerifyError::io(format!("Can't open {}", path.display()), 1))?;
    verify_stream(BufReader::new(file))
}
