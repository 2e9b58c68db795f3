// Outlets: discharging rules instantiated at a hub degree, with the
// forced/permitted predicates used by the case analysis.

use std::io::{BufRead, Write};

use crate::constants::{INFTY, MAXOUTLETS};
use crate::discharge::axle::{adjacency, install_fan, Axle};
use crate::error::{line_error, Result};

/// Neighbour-lookup permutation tables of the rule encoding: entry `z` names
/// the two previously placed vertices whose common clockwise triangle vertex
/// is rule vertex `z`. A rule's sense swaps the two tables.
const U: [usize; 17] = [0, 0, 0, 1, 0, 3, 2, 1, 4, 3, 8, 3, 0, 0, 5, 6, 15];
const V: [usize; 17] = [0, 0, 1, 0, 2, 0, 1, 3, 2, 5, 2, 9, 4, 12, 0, 1, 1];

/// A rule instantiated at a hub degree: a signed charge `value` and the
/// degree constraints of its constraint lines, positioned relative to an
/// anchor on the first ring.
#[derive(Clone)]
pub struct Outlet {
    /// Signed rule identifier; the sign encodes source versus sink.
    pub number: i32,
    pub nolines: usize,
    pub value: i32,
    pub pos: [i32; 17],
    pub low: [i32; 17],
    pub upp: [i32; 17],
}

/// Rotates cartwheel position `p` by `x0` steps around its band.
pub(crate) fn rotate(p: i32, x0: i32, deg: i32) -> i32 {
    if x0 + (p - 1) % deg < deg {
        p + x0
    } else {
        p + x0 - deg
    }
}

/// If `(t, x)` is forced by `ax` (every constraint interval contains the
/// axle's interval), returns the value of `t`, otherwise 0.
pub fn outlet_forced(ax: &Axle, t: &Outlet, x: i32) -> i32 {
    let deg = ax.low[0];
    let x0 = x - 1;
    for i in 0..t.nolines {
        let p = rotate(t.pos[i], x0, deg) as usize;
        if t.low[i] > ax.low[p] || t.upp[i] < ax.upp[p] {
            return 0;
        }
    }
    t.value
}

/// If `(t, x)` is permitted by `ax` (every constraint interval meets the
/// axle's interval), returns the value of `t`, otherwise 0.
pub fn outlet_permitted(ax: &Axle, t: &Outlet, x: i32) -> i32 {
    let deg = ax.low[0];
    let x0 = x - 1;
    for i in 0..t.nolines {
        let p = rotate(t.pos[i], x0, deg) as usize;
        if t.low[i] > ax.upp[p] || t.upp[i] < ax.low[p] {
            return 0;
        }
    }
    t.value
}

/// As `outlet_forced` for the reflection of `t` at `x`; fan positions never
/// reflect, so any constraint off the two rings rejects.
pub fn refl_forced(ax: &Axle, t: &Outlet, x: i32) -> i32 {
    let deg = ax.low[0];
    let x0 = x - 1;
    for i in 0..t.nolines {
        let p = rotate(t.pos[i], x0, deg);
        if p < 1 || p > 2 * deg {
            return 0;
        }
        let q = if p <= deg {
            deg - p + 1
        } else if p < 2 * deg {
            3 * deg - p
        } else {
            2 * deg
        };
        if t.low[i] > ax.low[q as usize] || t.upp[i] < ax.upp[q as usize] {
            return 0;
        }
    }
    t.value
}

/// Builds the outlet for one sense of a rule on the trivial axle, or `None`
/// when the hub constraint excludes this degree.
///
/// `z`/`b` carry the rule data: `z[0]` the entry count, `b[j]` the packed
/// bounds `low*10 + upp` (`upp == 9` meaning unbounded, `low == 0` meaning
/// `low = upp`), and `z[j]` (from 2 on) the rule-vertex names resolved
/// through the permutation tables.
fn instantiate(
    ax: &Axle,
    number: i32,
    xp: &[usize; 17],
    yp: &[usize; 17],
    z: &[i32; 17],
    b: &[i32; 17],
    lineno: i32,
) -> Result<Option<Outlet>> {
    let mut adjmat = adjacency(ax);
    let deg = ax.low[0];
    let mut t = Outlet {
        number,
        nolines: (z[0] - 1) as usize,
        value: if number > 0 { 1 } else { -1 },
        pos: [0; 17],
        low: [0; 17],
        upp: [0; 17],
    };
    let mut phi = [-1i32; 17];
    let k;
    if number > 0 {
        phi[0] = 1;
        phi[1] = 0;
        k = 1;
    } else {
        phi[0] = 0;
        phi[1] = 1;
        k = 0;
    }
    t.pos[0] = 1;

    let mut i = 0usize;
    for j in 0..z[0] as usize {
        t.low[i] = b[j] / 10;
        t.upp[i] = b[j] % 10;
        if t.upp[i] == 9 {
            t.upp[i] = INFTY;
        }
        if t.low[i] == 0 {
            t.low[i] = t.upp[i];
        }
        if t.low[i] > t.upp[i] {
            return Err(line_error("Condition (T2) from def of outlet violated", lineno));
        }
        if t.low[i] < 5 || t.low[i] > 9 || t.upp[i] > INFTY || t.upp[i] == 9 {
            return Err(line_error("Condition (T3) from def of outlet violated", lineno));
        }
        if j == k {
            if t.low[k] > deg || t.upp[k] < deg {
                // The rule cannot apply at this hub degree.
                return Ok(None);
            }
            continue;
        }
        if j >= 2 {
            let zu = phi[xp[z[j] as usize]];
            let zv = phi[yp[z[j] as usize]];
            if zu < 0 || zu > 5 * deg || zv < 0 || zv > 5 * deg {
                return Err(line_error("Rule references illegal vertex", lineno));
            }
            let w = adjmat[zu as usize][zv as usize];
            t.pos[i] = w;
            phi[z[j] as usize] = w;
        }
        let u = t.pos[i];
        if u <= 0 || u > 5 * deg {
            return Err(line_error("Rule uses illegal vertex", lineno));
        }
        if u <= deg && t.low[i] == t.upp[i] {
            install_fan(deg, u, t.low[i], &mut adjmat);
        }
        i += 1;
    }
    Ok(Some(t))
}

/// Reads the rule file and instantiates both senses of every rule (and of
/// every inversion directive) on the trivial axle `ax`. Returns the outlet
/// table for this hub degree.
pub fn read_rules<R: BufRead>(input: R, ax: &Axle) -> Result<Vec<Outlet>> {
    let mut outlets: Vec<Outlet> = Vec::new();
    let mut z = [0i32; 17];
    let mut b = [0i32; 17];
    let mut have_rule = false;
    let mut norules = 0;

    let mut lines = input.lines();
    let mut lineno = 0i32;
    loop {
        lineno += 1;
        let Some(line) = lines.next() else { break };
        let line = line.map_err(|_| line_error("Unexpected end of rule file", lineno))?;
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('\\') {
            continue;
        }
        norules += 1;
        let mut tok = trimmed.split_whitespace();
        let number: i32 = tok
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| line_error("Unable to read first line of rule", lineno))?;
        if number == 0 {
            return Err(line_error("Rule has number zero", lineno));
        }
        let tag = tok
            .next()
            .ok_or_else(|| line_error("Unable to read first line of rule", lineno))?;

        let (xp, yp) = if tag.starts_with('i') {
            // Invert the previous rule: reuse its data with swapped tables.
            if !have_rule {
                return Err(line_error("Illegal rule reference", lineno));
            }
            (&V, &U)
        } else {
            // Source and sink bounds, then the vertex data line.
            b[0] = tag
                .parse()
                .map_err(|_| line_error("Unable to read source or sink", lineno))?;
            b[1] = tok
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| line_error("Unable to read source or sink", lineno))?;
            let data = lines
                .next()
                .ok_or_else(|| line_error("Unexpected end of rule file", lineno))?
                .map_err(|_| line_error("Unexpected end of rule file", lineno))?;
            lineno += 1;
            let mut vals = data.split_whitespace().map(|s| s.parse::<i32>());
            let mut n = 2usize;
            loop {
                let Some(zv) = vals.next() else { break };
                if n > 16 {
                    return Err(line_error("Too many vertices in a rule", lineno));
                }
                let zv = zv.map_err(|_| line_error("Syntax error in rule file", lineno))?;
                let bv = vals
                    .next()
                    .and_then(|v| v.ok())
                    .ok_or_else(|| line_error("Syntax error in rule file", lineno))?;
                if !(0..=16).contains(&zv) {
                    return Err(line_error("Illegal entry in rule file", lineno));
                }
                z[n] = zv;
                b[n] = bv;
                n += 1;
            }
            z[0] = n as i32;
            have_rule = true;
            (&U, &V)
        };

        if outlets.len() >= MAXOUTLETS - 2 {
            return Err(line_error("Too many outlets", lineno));
        }
        if let Some(t) = instantiate(ax, number, xp, yp, &z, &b, lineno)? {
            outlets.push(t);
        }
        if let Some(t) = instantiate(ax, -number, xp, yp, &z, &b, lineno)? {
            outlets.push(t);
        }
    }
    println!(
        "Total of {} rules resulted in {} outlets of degree {}.",
        norules,
        outlets.len(),
        ax.low[0]
    );
    Ok(outlets)
}

/// Writes the outlet table in the historical dump layout; the file exists
/// only for human inspection.
pub fn dump_outlets<W: Write>(mut out: W, outlets: &[Outlet]) -> std::io::Result<()> {
    for (n, t) in outlets.iter().enumerate() {
        writeln!(out, "{}  {}              {}", n, t.value, t.number)?;
        for i in 0..t.nolines {
            writeln!(out, "{:2}  {:2}  {:2}", t.pos[i], t.low[i], t.upp[i])?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// One positive rule: a degree-5 hub with a degree-5 first-ring
    /// neighbour sends charge across the shared edge.
    const SIMPLE_RULE: &str = "1 59 59\n2 55\n";

    #[test]
    fn empty_rule_file_gives_no_outlets() {
        let ax = Axle::trivial(7);
        let outlets = read_rules(Cursor::new("# only a comment\n\n"), &ax).unwrap();
        assert!(outlets.is_empty());
    }

    #[test]
    fn one_rule_gives_both_senses() {
        let ax = Axle::trivial(7);
        let outlets = read_rules(Cursor::new(SIMPLE_RULE), &ax).unwrap();
        assert_eq!(outlets.len(), 2);
        assert_eq!(outlets[0].number, 1);
        assert_eq!(outlets[0].value, 1);
        assert_eq!(outlets[1].number, -1);
        assert_eq!(outlets[1].value, -1);
        // Line 0 anchors at position 1 with the source bounds.
        assert_eq!(outlets[0].pos[0], 1);
        assert_eq!(outlets[0].low[0], 5);
        assert_eq!(outlets[0].upp[0], INFTY);
        assert_eq!(outlets[0].nolines, 2);
        // Rule vertex 2 resolves to the first-ring predecessor of the
        // anchor, with its exact degree-5 bound.
        assert_eq!(outlets[0].pos[1], 7);
        assert_eq!(outlets[0].low[1], 5);
        assert_eq!(outlets[0].upp[1], 5);
    }

    #[test]
    fn hub_degree_filter_discards_outlets() {
        // A rule whose hub entry demands degree exactly 5 produces nothing
        // at degree 7.
        let ax = Axle::trivial(7);
        let outlets = read_rules(Cursor::new("3 59 55\n2 59\n"), &ax).unwrap();
        // The positive sense places the 55 bound on the hub; only the
        // negative sense (hub bound 59) survives.
        assert_eq!(outlets.len(), 1);
        assert_eq!(outlets[0].number, -3);
    }

    #[test]
    fn forced_and_permitted_respond_to_tightening() {
        let ax = Axle::trivial(7);
        let outlets = read_rules(Cursor::new(SIMPLE_RULE), &ax).unwrap();
        let t = &outlets[0];
        // On the trivial axle nothing is forced but everything is permitted.
        for x in 1..=7 {
            assert_eq!(outlet_forced(&ax, t, x), 0);
            assert_eq!(outlet_permitted(&ax, t, x), t.value);
        }
        // Pinning the constrained vertex to degree 5 forces the outlet at
        // the anchor that rotates the constraint onto it.
        let mut tight = ax.clone();
        let p = rotate(t.pos[1], 0, 7) as usize;
        tight.low[p] = 5;
        tight.upp[p] = 5;
        assert_eq!(outlet_forced(&tight, t, 1), t.value);
        // Tightening elsewhere never unforces it.
        let mut tighter = tight.clone();
        tighter.low[3] = 6;
        assert_eq!(outlet_forced(&tighter, t, 1), t.value);
        // Excluding degree 5 there rejects the outlet instead.
        let mut off = ax.clone();
        off.low[p] = 6;
        assert_eq!(outlet_permitted(&off, t, 1), 0);
    }

    #[test]
    fn rotation_wraps_within_the_band() {
        // First-ring positions rotate inside 1..=deg.
        assert_eq!(rotate(1, 0, 7), 1);
        assert_eq!(rotate(1, 3, 7), 4);
        assert_eq!(rotate(5, 4, 7), 2);
        // Second-ring positions stay on the second ring.
        assert_eq!(rotate(8, 0, 7), 8);
        assert_eq!(rotate(8, 6, 7), 14);
        assert_eq!(rotate(9, 6, 7), 8);
    }
}
