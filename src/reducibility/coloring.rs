// Enumeration of the proper 3-edge-colourings of a free completion, and the
// canonical ring-colouring codes.
//
// Edge colours are the values 1, 2 and 4, so that "all three distinct" can
// be tested with bit masks. A ring colouring is identified by the code
// `bigno - 2*min - max` over the three colour-class weights, which collapses
// the six colour permutations onto a single representative.

use crate::constants::{bigno, EDGES, POWER};
use crate::reducibility::angles::Angles;

/// Canonical code of a ring colouring given its three colour-class weights.
fn canonical_code(weight: &[i64; 5], big: i64) -> usize {
    let mut min = weight[4];
    let mut max = weight[4];
    for &w in &[weight[1], weight[2]] {
        if w < min {
            min = w;
        } else if w > max {
            max = w;
        }
    }
    (big - 2 * min - max) as usize
}

/// Code of a colouring given directly by the ring-edge colours `c[1..=ring]`.
pub fn ring_code(c: &[i64], ring: usize, big: i64) -> usize {
    let mut weight = [0i64; 5];
    for (i, &col) in c.iter().enumerate().take(ring + 1).skip(1) {
        weight[col as usize] += POWER[i];
    }
    canonical_code(&weight, big)
}

/// Whether the ring colouring `c[1..=ring]` is still in the live set.
pub(crate) fn in_live(c: &[i64; EDGES], ring: usize, live: &[u8], big: i64) -> bool {
    live[ring_code(c, ring, big)] != 0
}

/// Records one enumerated colouring: the ring-edge colours are recovered
/// from the interior triangle over each ring edge, and the code is knocked
/// out of the live set if present.
fn record(c: &[i64; EDGES], angles: &Angles, live: &mut [u8], extent: &mut i64, big: i64) {
    let mut weight = [0i64; 5];
    for i in 1..=angles.ring {
        let sum = 7 - c[angles.angle[i][1] as usize] - c[angles.angle[i][2] as usize];
        weight[sum as usize] += POWER[i];
    }
    let colno = canonical_code(&weight, big);
    if live[colno] != 0 {
        *extent += 1;
        live[colno] = 0;
    }
}

/// Enumerates all colourings of the interior edges, descending from edge `E`
/// to edge `ring+1`, and clears the live entry of every ring restriction
/// reached. Returns the number of distinct codes cleared, i.e. the number of
/// ring colourings that extend to the free completion.
///
/// The last two edges are pinned to colours 1 and 2, which quotients out the
/// colour permutations without losing any code.
pub fn initial_live(angles: &Angles, live: &mut [u8]) -> i64 {
    let edges = angles.edges;
    let ring = angles.ring;
    let big = bigno(ring);

    let mut c = [0i64; EDGES];
    let mut forbidden = [0i64; EDGES];
    let mut extent = 0i64;

    c[edges] = 1;
    let mut j = edges - 1;
    c[j] = 2;
    forbidden[j] = 5;

    loop {
        while forbidden[j] & c[j] != 0 {
            c[j] <<= 1;
            while c[j] & 8 != 0 {
                if j >= edges - 1 {
                    return extent;
                }
                j += 1;
                c[j] <<= 1;
            }
        }
        if j == ring + 1 {
            record(&c, angles, live, &mut extent, big);
            c[j] <<= 1;
            while c[j] & 8 != 0 {
                if j >= edges - 1 {
                    return extent;
                }
                j += 1;
                c[j] <<= 1;
            }
        } else {
            j -= 1;
            c[j] = 1;
            let am = &angles.angle[j];
            let mut u = 0;
            for i in 1..=am[0] as usize {
                u |= c[am[i] as usize];
            }
            forbidden[j] = u;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::ConfReader;
    use crate::constants::ncodes;
    use crate::reducibility::angles::build_angles;
    use std::io::Cursor;

    const WHEEL5: &str = "\
wheel5
6 5 5 0
0
1 3 2 6 5
2 3 3 6 1
3 3 4 6 2
4 3 5 6 3
5 3 1 6 4
6 5 1 2 3 4 5
1 1 1 1 1 1

";

    #[test]
    fn codes_are_colour_permutation_invariant() {
        let big = bigno(6);
        // Two colourings of a 6-ring related by swapping colours 1 and 4.
        let a = [0i64, 1, 2, 4, 1, 2, 4];
        let b = [0i64, 4, 2, 1, 4, 2, 1];
        assert_eq!(ring_code(&a, 6, big), ring_code(&b, 6, big));
        // And by a 3-cycle of the palette.
        let c = [0i64, 2, 4, 1, 2, 4, 1];
        assert_eq!(ring_code(&a, 6, big), ring_code(&c, 6, big));
    }

    #[test]
    fn wheel_has_five_extendable_codes() {
        let conf = ConfReader::new(Cursor::new(WHEEL5)).next_record().unwrap().unwrap();
        let angles = build_angles(&conf).unwrap();
        let n = ncodes(5);
        let mut live = vec![1u8; n];
        let extent = initial_live(&angles, &mut live);
        assert_eq!(extent, 5);
        // The five spoke colourings of the pentagon wheel reach exactly
        // these canonical codes.
        for code in [2usize, 6, 14, 18, 38] {
            assert_eq!(live[code], 0, "code {code} should extend");
        }
        assert_eq!(live.iter().filter(|&&b| b == 0).count(), 5);
    }
}
