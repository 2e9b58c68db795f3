// Balanced signed matchings on the ring and the closure passes of the
// reducibility argument.
//
// Every matching pass walks the same sequence of balanced signed matchings,
// so each matching owns a fixed bit of the persistent `real` bitset; a
// matching found non-real in one pass is skipped in all later passes. A
// signed matching is real when every ring colouring that theta-fits it is
// still live, and in that case each such colouring is stamped with the flag
// of the matching's colour-class family.

use itertools::Itertools;

use crate::constants::POWER;
use crate::error::{Result, VerifyError};

/// Signed-matching weights per matched pair `(a, b)`:
/// `[plus, minus, code-plus, code-minus]`.
type Weights = [i64; 4];

struct Pass<'a> {
    live: &'a mut [u8],
    real: &'a mut [u8],
    /// Highest usable byte index of `real` for this ring-size.
    nchar: usize,
    ring: usize,
    /// Cursor over the bits of `real`; advances identically every pass.
    bit: u8,
    realterm: usize,
    /// Real signed matchings seen this pass.
    nreal: i64,
    matchweight: [[Weights; 16]; 16],
    weight: [Weights; 8],
}

/// Runs one full matching pass for the given ring-size. Returns the number
/// of signed matchings all of whose associated colourings are still live.
pub fn matching_pass(ring: usize, real: &mut [u8], live: &mut [u8], nchar: usize) -> Result<i64> {
    let mut pass = Pass {
        live,
        real,
        nchar,
        ring,
        bit: 1,
        realterm: 0,
        nreal: 0,
        matchweight: [[[0; 4]; 16]; 16],
        weight: [[0; 4]; 8],
    };

    // Matchings avoiding the last ring edge.
    for (b, a) in (1..=ring).tuple_combinations() {
        pass.matchweight[a][b] = [
            2 * (POWER[a] + POWER[b]),
            2 * (POWER[a] - POWER[b]),
            POWER[a] + POWER[b],
            POWER[a] - POWER[b],
        ];
    }
    for a in 2..ring {
        for b in 1..a {
            pass.weight[1] = pass.matchweight[a][b];
            let (n, interval) = intervals(a, b);
            pass.extend_matching(n, &interval, 1, 0, false)?;
        }
    }

    // Matchings using an edge incident with the last ring edge; the weights
    // shift to encode the twisting of the ring signing.
    for (b, a) in (1..=ring).tuple_combinations() {
        pass.matchweight[a][b] = [
            POWER[a] + POWER[b],
            POWER[a] - POWER[b],
            -POWER[a] - POWER[b],
            -POWER[a] - 2 * POWER[b],
        ];
    }
    let basecol = (POWER[ring + 1] - 1) / 2;
    for b in 1..ring {
        pass.weight[1] = pass.matchweight[ring][b];
        let (n, interval) = intervals(ring, b);
        pass.extend_matching(n, &interval, 1, basecol, true)?;
    }

    Ok(pass.nreal)
}

/// The at most two intervals of ring positions still free once `(a, b)` is
/// matched: `1..b` and `b..a`, kept only when they can hold a match.
fn intervals(a: usize, b: usize) -> (usize, [usize; 10]) {
    let mut n = 0;
    let mut interval = [0usize; 10];
    if b >= 3 {
        n = 1;
        interval[1] = 1;
        interval[2] = b - 1;
    }
    if a >= b + 3 {
        n += 1;
        interval[2 * n - 1] = b + 1;
        interval[2 * n] = a - 1;
    }
    (n, interval)
}

impl Pass<'_> {
    /// Recursively completes the current matching with matches drawn from
    /// the given disjoint intervals, testing every completion.
    fn extend_matching(
        &mut self,
        n: usize,
        interval: &[usize; 10],
        depth: usize,
        basecol: i64,
        on: bool,
    ) -> Result<()> {
        self.sweep_signings(depth, basecol, on)?;
        let depth = depth + 1;
        for r in 1..=n {
            let lower = interval[2 * r - 1];
            let upper = interval[2 * r];
            for i in lower + 1..=upper {
                for j in lower..i {
                    self.weight[depth] = self.matchweight[i][j];
                    let mut newinterval = [0usize; 10];
                    let mut h = 1;
                    while h < 2 * r - 1 {
                        newinterval[h] = interval[h];
                        h += 1;
                    }
                    let mut newn = r - 1;
                    if j > lower + 1 {
                        newn += 1;
                        newinterval[h] = lower;
                        newinterval[h + 1] = j - 1;
                        h += 2;
                    }
                    if i > j + 1 {
                        newn += 1;
                        newinterval[h] = j + 1;
                        newinterval[h + 1] = i - 1;
                    }
                    self.extend_matching(newn, &newinterval, depth, basecol, on)?;
                }
            }
        }
        Ok(())
    }

    /// Sweeps the `2^(depth-1)` signings of the current matching, testing
    /// each against the live set and recording the verdict in `real`.
    fn sweep_signings(&mut self, depth: usize, basecol: i64, on: bool) -> Result<()> {
        let nbits = 1usize << (depth - 1);
        for k in 0..nbits {
            if self.bit == 0 {
                self.bit = 1;
                self.realterm += 1;
                if self.realterm > self.nchar {
                    return Err(VerifyError::resource(
                        format!("More than {} entries in real are needed", self.nchar + 1),
                        32,
                    ));
                }
            }
            if self.bit & self.real[self.realterm] != 0 {
                let mut col = basecol;
                let mut parity = (self.ring & 1) as u64;
                let mut choice = [0i64; 8];
                let mut left = k as u64;
                for i in 1..depth {
                    if left & 1 != 0 {
                        parity ^= 1;
                        choice[i] = self.weight[i][1];
                        col += self.weight[i][3];
                    } else {
                        choice[i] = self.weight[i][0];
                        col += self.weight[i][2];
                    }
                    left >>= 1;
                }
                // The sign of the first match is chosen to balance parity.
                if parity != 0 {
                    choice[depth] = self.weight[depth][1];
                    col += self.weight[depth][3];
                } else {
                    choice[depth] = self.weight[depth][0];
                    col += self.weight[depth][2];
                }
                if self.still_real(col, &choice, depth, on) {
                    self.nreal += 1;
                } else {
                    self.real[self.realterm] ^= self.bit;
                }
            }
            self.bit = self.bit.wrapping_shl(1);
        }
        Ok(())
    }

    /// Tests whether every colouring associated with the signed matching is
    /// live; if so, stamps them all with the family flag. A negative partial
    /// code denotes the twisted colouring of its absolute value.
    fn still_real(&mut self, col: i64, choice: &[i64; 8], depth: usize, on: bool) -> bool {
        let mut sum = [0i64; 64];
        let mut twisted = [0usize; 64];
        let mut untwisted = [0usize; 64];
        let mut ntwisted = 0;
        let mut nuntwisted = 0;

        if col < 0 {
            if self.live[(-col) as usize] == 0 {
                return false;
            }
            twisted[ntwisted] = (-col) as usize;
            ntwisted += 1;
        } else {
            if self.live[col as usize] == 0 {
                return false;
            }
            untwisted[nuntwisted] = col as usize;
            nuntwisted += 1;
        }
        sum[0] = col;

        let mut mark = 1;
        let mut twopower = 1;
        for i in 2..=depth {
            let c = choice[i];
            for j in 0..twopower {
                let b = sum[j] - c;
                if b < 0 {
                    if self.live[(-b) as usize] == 0 {
                        return false;
                    }
                    twisted[ntwisted] = (-b) as usize;
                    ntwisted += 1;
                } else {
                    if self.live[b as usize] == 0 {
                        return false;
                    }
                    untwisted[nuntwisted] = b as usize;
                    nuntwisted += 1;
                }
                sum[mark] = b;
                mark += 1;
            }
            twopower <<= 1;
        }

        if on {
            for &t in &twisted[..ntwisted] {
                self.live[t] |= 8;
            }
            for &t in &untwisted[..nuntwisted] {
                self.live[t] |= 4;
            }
        } else {
            for &t in &twisted[..ntwisted] {
                self.live[t] |= 2;
            }
            for &t in &untwisted[..nuntwisted] {
                self.live[t] |= 2;
            }
        }
        true
    }
}

/// Closure step over the live set: a code survives only if all three flag
/// families stamped it this pass. Returns true while the live set keeps
/// strictly shrinking without emptying.
pub fn prune_live(live: &mut [u8], ncodes: usize, nlive: &mut i64) -> bool {
    let old = *nlive;
    let mut new = 0i64;
    // The monochromatic colouring needs no matchings of its own.
    if live[0] > 1 {
        live[0] = 15;
    }
    for entry in live.iter_mut().take(ncodes) {
        if *entry != 15 {
            *entry = 0;
        } else {
            new += 1;
            *entry = 1;
        }
    }
    *nlive = new;
    new < old && new > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ncodes, SIMATCHNUMBER};

    /// Runs passes to the fixed point the way the driver does.
    fn close(ring: usize, live: &mut [u8]) -> i64 {
        let n = ncodes(ring);
        let nchar = (SIMATCHNUMBER[ring] / 8 + 1) as usize;
        let mut real = vec![0u8; nchar + 1];
        let mut nlive: i64 = live.iter().take(n).filter(|&&b| b != 0).count() as i64;
        loop {
            for b in real.iter_mut() {
                *b = 255;
            }
            matching_pass(ring, &mut real, live, nchar).unwrap();
            if !prune_live(live, n, &mut nlive) {
                return nlive;
            }
        }
    }

    #[test]
    fn cursor_spans_exactly_the_matching_count() {
        // With everything live, the number of real signed matchings equals
        // the size of the enumeration.
        for ring in 2..=7usize {
            let n = ncodes(ring);
            let mut live = vec![1u8; n];
            let nchar = (SIMATCHNUMBER[ring] / 8 + 1) as usize;
            let mut real = vec![255u8; nchar + 1];
            let nreal = matching_pass(ring, &mut real, &mut live, nchar).unwrap();
            assert_eq!(nreal, SIMATCHNUMBER[ring], "ring {ring}");
        }
    }

    #[test]
    fn full_live_set_is_a_fixed_point_shape() {
        // When every code is live, every matching is real, every code gets
        // all flags, and pruning removes only the codes no matching touches.
        let ring = 4;
        let n = ncodes(ring);
        let mut live = vec![1u8; n];
        let final_nlive = close(ring, &mut live);
        // The closure must terminate with a stable (possibly empty) set.
        assert!(final_nlive >= 0);
        let stable: Vec<u8> = live.clone();
        let again = close(ring, &mut live);
        assert_eq!(again, final_nlive);
        assert_eq!(stable, live);
    }

    #[test]
    fn empty_live_set_stays_empty() {
        let ring = 5;
        let n = ncodes(ring);
        let mut live = vec![0u8; n];
        let nchar = (SIMATCHNUMBER[ring] / 8 + 1) as usize;
        let mut real = vec![255u8; nchar + 1];
        let nreal = matching_pass(ring, &mut real, &mut live, nchar).unwrap();
        assert_eq!(nreal, 0);
        let mut nlive = 0i64;
        assert!(!prune_live(&mut live, n, &mut nlive));
        assert_eq!(nlive, 0);
    }
}
