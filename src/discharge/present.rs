// Presentation replay: walks the transcript of the case analysis, one
// indentation-labelled line at a time, maintaining the axle stack and the
// table of condition-derived symmetries.

use std::io::{self, BufRead, Write};

use crate::constants::{INFTY, MAXLEV, MAXSYM, MAXVAL};
use crate::discharge::axle::Axle;
use crate::discharge::hubcap::verify_hubcap;
use crate::discharge::outlet::{outlet_forced, refl_forced, Outlet};
use crate::discharge::question::Catalog;
use crate::discharge::subconf::axle_reducible;
use crate::error::{line_error, Result, VerifyError};

/// Print modes of the replay.
pub const PRTLIN: i32 = 1;
pub const PRTBAS: i32 = 2;
pub const PRTPAI: i32 = 3;
pub const PRTALL: i32 = 4;

/// Numbered line reader over the presentation; running out of lines is a
/// verification failure, not an end state.
pub struct LineReader<R: BufRead> {
    input: R,
    lineno: i32,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(input: R) -> Self {
        LineReader { input, lineno: 0 }
    }

    pub fn next_line(&mut self) -> Result<(i32, String)> {
        self.lineno += 1;
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => Err(line_error("Unexpected end of input file", self.lineno - 1)),
            Ok(_) => Ok((self.lineno, line)),
        }
    }
}

/// One case split `(n, m)` in force at some level.
#[derive(Clone, Copy, Default)]
struct Condition {
    n: i32,
    m: i32,
}

/// Replays a whole presentation against the catalog and outlet table.
/// `prtline` selects one line for detailed output (0 for all lines) at the
/// given `printmode`.
pub fn verify_presentation<R: BufRead, S: BufRead>(
    presentation: R,
    fname: &str,
    rules: S,
    catalog: &Catalog,
    outlet_dump: Option<&std::path::Path>,
    prtline: i32,
    printmode: i32,
) -> Result<()> {
    let mut reader = LineReader::new(presentation);
    println!("Verifying {fname}");
    io::stdout().flush().ok();

    let mut print = if prtline == 0 { printmode } else { 0 };
    let (lineno, header) = reader.next_line()?;
    if print >= PRTLIN {
        print!("{lineno:4}:{header}");
    }
    let deg: i32 = header
        .trim()
        .strip_prefix("Degree")
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    if !(5..=MAXVAL as i32).contains(&deg) {
        return Err(line_error("Invalid degree", lineno));
    }

    let trivial = Axle::trivial(deg);
    let outlets = crate::discharge::outlet::read_rules(rules, &trivial)?;
    if let Some(path) = outlet_dump {
        // Purely informational; matching the historical behaviour, failure
        // to write the dump is not an error.
        if let Ok(file) = std::fs::File::create(path) {
            if crate::discharge::outlet::dump_outlets(io::BufWriter::new(file), &outlets).is_ok() {
                println!("Outlets written into file `{}'.", path.display());
                io::stdout().flush().ok();
            }
        }
    }

    let mut axles: Vec<Axle> = vec![trivial; MAXLEV + 1];
    let mut sym: Vec<Outlet> = Vec::new();
    let mut cond = [Condition::default(); MAXLEV + 2];
    let mut lev: i32 = 0;

    while lev >= 0 {
        if lev >= MAXLEV as i32 {
            return Err(line_error(format!("More than {MAXLEV} levels"), reader.lineno));
        }
        if reader.lineno == prtline {
            print = 0;
        }
        let (lineno, line) = reader.next_line()?;
        if lineno == prtline {
            print = printmode;
        }
        if print >= PRTLIN {
            print!("{lineno:4}:{line}");
            io::stdout().flush().ok();
        }

        let rest = line.trim_start();
        let label: i32 = rest
            .strip_prefix('L')
            .and_then(|s| s.split_whitespace().next())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                VerifyError::format(format!("Level {lev} expected on line {lineno}"), 6)
            })?;
        if label != lev {
            return Err(VerifyError::format(
                format!("Level {lev} expected on line {lineno}"),
                6,
            ));
        }
        let instr = rest
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| line_error("Invalid instruction", lineno))?;

        match instr.chars().next() {
            Some('S') => {
                apply_symmetry(rest, &axles[lev as usize], &sym, lineno)?;
            }
            Some('R') => {
                if !axle_reducible(catalog, &axles[lev as usize], lineno, print >= PRTBAS)? {
                    return Err(line_error("Reducibility failed", lineno));
                }
            }
            Some('H') => {
                verify_hubcap(catalog, &outlets, &axles[lev as usize], rest, lineno, print)?;
            }
            Some('C') => {
                apply_condition(
                    rest,
                    &mut axles,
                    &mut sym,
                    &mut cond,
                    lev,
                    lineno,
                    print,
                )?;
                lev += 1;
                continue;
            }
            _ => return Err(line_error("Invalid instruction", lineno)),
        }

        // The symmetries registered under the case that just closed die
        // with it.
        if print >= PRTBAS && sym.last().is_some_and(|t| t.nolines as i32 - 1 >= lev) {
            print!("Deleting symetries:");
            for t in sym.iter().rev().take_while(|t| t.nolines as i32 - 1 >= lev) {
                print!(" {}", t.number);
            }
            println!();
            io::stdout().flush().ok();
        }
        while sym.last().is_some_and(|t| t.nolines as i32 - 1 >= lev) {
            sym.pop();
        }
        lev -= 1;
    }

    let (lineno, trailer) = reader.next_line()?;
    if !trailer.starts_with("Q.E") {
        return Err(line_error("`Q.E.D.' expected", lineno));
    }
    println!("{fname} verified.");
    io::stdout().flush().ok();
    Ok(())
}

/// Splits the current case on a degree condition: level `lev+1` receives
/// the asserted bound, the current level keeps the complement. Condition
/// sets built purely from ring-level vertices are remembered as symmetries.
#[allow(clippy::too_many_arguments)]
fn apply_condition(
    line: &str,
    axles: &mut [Axle],
    sym: &mut Vec<Outlet>,
    cond: &mut [Condition],
    lev: i32,
    lineno: i32,
    print: i32,
) -> Result<()> {
    let deg = axles[lev as usize].low[0];
    let mut tok = line.split_whitespace().skip(2);
    let n: i32 = tok
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| line_error("Syntax error", lineno))?;
    let m: i32 = tok
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| line_error("Syntax error", lineno))?;

    if n < 1 || n > 5 * deg {
        return Err(line_error("Invalid vertex in condition", lineno));
    }
    if !(-8..=9).contains(&m) || (-4..=5).contains(&m) {
        return Err(line_error("Invalid condition", lineno));
    }
    // A fan vertex may only be conditioned once its owner has a definite
    // degree large enough to carry it.
    let j = (n - 1) / deg;
    let i = ((n - 1) % deg + 1) as usize;
    let lev = lev as usize;
    if n > 2 * deg && (axles[lev].low[i] != axles[lev].upp[i] || axles[lev].low[i] < j + 4) {
        return Err(line_error("Condition not compatible with A", lineno));
    }

    let (current, next) = axles.split_at_mut(lev + 1);
    let a = &mut current[lev];
    next[0] = a.clone();
    let n_us = n as usize;
    if m > 0 {
        // New lower bound.
        if a.low[n_us] >= m || m > a.upp[n_us] {
            return Err(line_error("Invalid lower bound in condition", lineno));
        }
        a.upp[n_us] = m - 1;
        next[0].low[n_us] = m;
    } else {
        // New upper bound.
        if a.low[n_us] > -m || -m >= a.upp[n_us] {
            return Err(line_error("Invalid upper bound in condition", lineno));
        }
        a.low[n_us] = 1 - m;
        next[0].upp[n_us] = -m;
    }

    // Remember as a symmetry unless any recorded condition touches a fan
    // vertex. The slot for the current level still holds the sibling case
    // closed just before this line (or nothing on first entry), and that is
    // exactly the case a later symmetry appeal refers back to.
    let good = (0..=lev).all(|k| cond[k].n >= 1 && cond[k].n <= 2 * deg);
    if good {
        if sym.len() >= MAXSYM {
            return Err(line_error("Too many symmetries", lineno));
        }
        if print >= PRTBAS {
            print!("Adding symmetry:");
        }
        let mut t = Outlet {
            number: lineno,
            nolines: lev + 1,
            value: 1,
            pos: [0; 17],
            low: [0; 17],
            upp: [0; 17],
        };
        for (k, c) in cond.iter().enumerate().take(lev + 1) {
            t.pos[k] = c.n;
            if c.m > 0 {
                t.low[k] = c.m;
                t.upp[k] = INFTY;
            } else {
                t.low[k] = 5;
                t.upp[k] = -c.m;
            }
            if print >= PRTBAS {
                print!(" ({},{},{})", t.pos[k], t.low[k], t.upp[k]);
            }
        }
        if print >= PRTBAS {
            println!();
            io::stdout().flush().ok();
        }
        sym.push(t);
    } else if print >= PRTBAS {
        println!("Symmetry not added");
        io::stdout().flush().ok();
    }
    cond[lev] = Condition { n, m };
    cond[lev + 1] = Condition::default();
    Ok(())
}

/// Discharges the current case as symmetric to an earlier one: the
/// symmetry's conditions, re-anchored at `k+1` (reflected when `epsilon`
/// is 1), must be forced by the current axle.
fn apply_symmetry(line: &str, ax: &Axle, sym: &[Outlet], lineno: i32) -> Result<()> {
    let mut tok = line.split_whitespace().skip(2).map(|s| s.parse::<i32>());
    let (Some(Ok(k)), Some(Ok(epsilon)), Some(Ok(level)), Some(Ok(line_ref))) =
        (tok.next(), tok.next(), tok.next(), tok.next())
    else {
        return Err(line_error("Syntax error", lineno));
    };
    if k < 0 || k > ax.low[0] || !(0..=1).contains(&epsilon) {
        return Err(line_error("Illegal symmetry", lineno));
    }
    let t = sym
        .iter()
        .find(|t| t.number == line_ref)
        .ok_or_else(|| line_error("No symmetry as requested", lineno))?;
    if t.nolines as i32 != level + 1 {
        return Err(line_error("Level mismatch", lineno));
    }
    if epsilon == 0 {
        if outlet_forced(ax, t, k + 1) != 1 {
            return Err(line_error("Invalid symmetry", lineno));
        }
    } else if refl_forced(ax, t, k + 1) != 1 {
        return Err(line_error("Invalid reflected symmetry", lineno));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discharge::question::{Catalog, DIAMOND};
    use std::io::Cursor;

    fn run(pres: &str, rules: &str, catalog: &Catalog) -> Result<()> {
        verify_presentation(
            Cursor::new(pres),
            "test-presentation",
            Cursor::new(rules),
            catalog,
            None,
            0,
            0,
        )
    }

    fn empty_catalog() -> Catalog {
        Catalog::from_stream(Cursor::new("")).unwrap()
    }

    #[test]
    fn missing_qed_is_rejected() {
        let err = run("Degree 7\n", "", &empty_catalog()).unwrap_err();
        assert!(err.to_string().contains("Unexpected end of input file"));
    }

    #[test]
    fn bad_degree_is_rejected() {
        let err = run("Degree 13\n", "", &empty_catalog()).unwrap_err();
        assert!(err.to_string().contains("Invalid degree"));
    }

    #[test]
    fn level_labels_are_enforced() {
        let err = run("Degree 7\nL1 R\n", "", &empty_catalog()).unwrap_err();
        assert_eq!(err.status(), 6);
    }

    #[test]
    fn hubcap_line_closes_the_trivial_case() {
        // With no outlets every nonnegative bound holds, so a presentation
        // consisting of one covering hubcap verifies.
        let pres = "Degree 7\nL0 H (1,1,1) (2,2,1) (3,3,1) (4,4,1) (5,5,1) (6,6,1) (7,7,1)\nQ.E.D.\n";
        run(pres, "", &empty_catalog()).unwrap();
    }

    #[test]
    fn reducibility_line_fails_without_a_matching_configuration() {
        let cat = Catalog::from_stream(Cursor::new(DIAMOND)).unwrap();
        let err = run("Degree 7\nL0 R\nQ.E.D.\n", "", &cat).unwrap_err();
        assert!(err.to_string().contains("Reducibility failed"));
        // The failing line number is the exit status.
        assert_eq!(err.status(), 2);
    }

    #[test]
    fn ring_condition_registers_a_usable_symmetry() {
        // The first split (degree of vertex 1 at least 6) is closed by a
        // hubcap. Entering the sibling split on vertex 2 registers the
        // closed case as a symmetry; the new case is its rotation by one,
        // so it discharges by appeal to that registration, anchored at 2.
        let cover = "(1,1,1) (2,2,1) (3,3,1) (4,4,1) (5,5,1) (6,6,1) (7,7,1)";
        let pres = format!(
            "Degree 7\n\
             L0 C 1 6\n\
             L1 H {cover}\n\
             L0 C 2 6\n\
             L1 S 1 0 0 4\n\
             L0 H {cover}\n\
             Q.E.D.\n"
        );
        run(&pres, "", &empty_catalog()).unwrap();
    }

    #[test]
    fn fan_condition_blocks_symmetry_registration() {
        // A condition on a fan-band vertex (n > 2*deg) poisons the gate:
        // the sibling split after it registers nothing, and the symmetry
        // appeal naming that line finds no entry.
        let cover = "(1,1,1) (2,2,1) (3,3,1) (4,4,1) (5,5,1) (6,6,1) (7,7,1)";
        let pres = format!(
            "Degree 7\n\
             L0 C 1 6\n\
             L1 C 1 -6\n\
             L2 C 15 6\n\
             L3 H {cover}\n\
             L2 C 8 6\n\
             L3 S 0 0 2 6\n\
             L2 H {cover}\n\
             L1 H {cover}\n\
             L0 H {cover}\n\
             Q.E.D.\n"
        );
        let err = run(&pres, "", &empty_catalog()).unwrap_err();
        assert!(err.to_string().contains("No symmetry as requested"));
        assert_eq!(err.status(), 7);
    }
}
