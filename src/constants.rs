// Capacity constants and integer tables shared by both verification engines.
// All values are fixed by the published unavoidable set and rule system; none
// of them is tunable without re-deriving the proof.

/// Max number of vertices in a free completion, plus one (vertex 0 is unused).
pub const VERTS: usize = 27;

/// Max degree of a vertex in a free completion, plus one.
/// Must be at least 13 because row 0 of a configuration matrix carries the
/// header fields (vertex count, ring-size, counts, contract).
pub const DEG: usize = 13;

/// Max number of edges in a free completion, plus one.
pub const EDGES: usize = 62;

/// Max ring-size of a configuration.
pub const MAXRING: usize = 14;

/// Max number of configurations in the unavoidable set.
pub const CONFS: usize = 640;

/// Max degree of the hub of an axle.
pub const MAXVAL: usize = 12;

/// Domain of the lower/upper bound vectors of an axle.
pub const CARTVERT: usize = 5 * MAXVAL + 2;

/// The "12" in the definition of a limited part: an unbounded degree.
pub const INFTY: i32 = 12;

/// Max number of outlets derivable from the rule file.
pub const MAXOUTLETS: usize = 110;

/// Max number of remembered symmetries during a presentation replay.
pub const MAXSYM: usize = 50;

/// Capacity of one degree-pair bucket of the skeleton edge index.
pub const MAXELIST: usize = 134;

/// Max height of the axle stack used by the reducibility leaf test.
pub const MAXASTACK: usize = 5;

/// Max case-nesting level of a presentation, plus one.
pub const MAXLEV: usize = 12;

/// `POWER[i] = 3^(i-1)` for `i >= 1`; entry 0 is unused.
///
/// Ring-colouring codes are base-3 numbers over these weights, so the table
/// must cover `MAXRING + 2` positions.
pub const POWER: [i64; 17] = [
    0, 1, 3, 9, 27, 81, 243, 729, 2187, 6561, 19683, 59049, 177147, 531441, 1594323, 4782969,
    14348907,
];

/// `SIMATCHNUMBER[r]` is the number of balanced signed matchings on a ring of
/// size `r`. Sizes the persistent matching bitset.
pub const SIMATCHNUMBER: [i64; 15] = [
    0, 0, 1, 3, 10, 30, 95, 301, 980, 3228, 10797, 36487, 124542, 428506, 1485003,
];

/// Number of colouring codes for a ring of size `ring`.
pub fn ncodes(ring: usize) -> usize {
    ((POWER[ring] + 1) / 2) as usize
}

/// Offset used to canonicalise colouring codes for a ring of size `ring`.
pub fn bigno(ring: usize) -> i64 {
    (POWER[ring + 1] - 1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_is_powers_of_three() {
        for i in 2..POWER.len() {
            assert_eq!(POWER[i], 3 * POWER[i - 1]);
        }
        assert_eq!(POWER[1], 1);
    }

    #[test]
    fn code_space_sizes() {
        // A ring of size 5 admits (3^4 + 1)/2 = 41 codes.
        assert_eq!(ncodes(5), 41);
        assert_eq!(bigno(5), (243 - 1) / 2);
        // The largest supported ring.
        assert_eq!(ncodes(MAXRING), (1594323 + 1) / 2);
    }

    #[test]
    fn matching_bitset_fits() {
        // The bitset cursor never runs past SIMATCHNUMBER[ring] bits.
        assert_eq!(SIMATCHNUMBER[MAXRING], 1485003);
        assert!(SIMATCHNUMBER[MAXRING] / 8 + 2 < 200_000);
    }
}
