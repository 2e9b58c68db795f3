// Canonical edge numbering of a free completion and the triangle ("angle")
// tables driving the colouring enumeration.
//
// Edges are numbered 1..E so that the ring edges come first and every later
// edge lies in as many triangles with earlier-numbered edges as possible;
// that ordering is what makes the forbidden-mask pruning in the enumerator
// effective.

use crate::configuration::Configuration;
use crate::constants::{EDGES, VERTS};
use crate::error::{Result, VerifyError};

/// Per-edge triangle tables. Row `c` of each table stores its length in
/// column 0 and the edge numbers in columns 1..=len; only edges numbered
/// above `c` appear.
pub type AngleTable = [[i64; 5]; EDGES];

/// Edge-number lookup by endpoint pair.
pub type EdgeNumbers = [[i64; VERTS]; VERTS];

/// Angle tables of a configuration, together with its contract.
#[derive(Debug)]
pub struct Angles {
    /// Edges sharing a triangle with each edge.
    pub angle: AngleTable,
    /// As `angle`, restricted to triangles disjoint from the contract.
    pub diffangle: AngleTable,
    /// Edges whose opposite triangle edge lies in the contract.
    pub sameangle: AngleTable,
    /// `contract[e] = 1` iff edge `e` is a contract edge; `contract[0]` is
    /// the contract size and the last slot carries the declared post-closure
    /// live count.
    pub contract: [i64; EDGES + 1],
    pub ring: usize,
    pub edges: usize,
}

/// Length of the interval of already-numbered vertices in the cyclic
/// neighbour list of `v`, or 0 if the numbered neighbours do not form a
/// single interval.
fn done_interval(conf: &Configuration, v: usize, done: &[bool; VERTS]) -> i64 {
    let d = conf.degree(v) as usize;

    let mut first = 1;
    while first < d && !done[conf.neighbour(v, first) as usize] {
        first += 1;
    }
    if first == d {
        return done[conf.neighbour(v, d) as usize] as i64;
    }
    let mut last = first;
    while last < d && done[conf.neighbour(v, last + 1) as usize] {
        last += 1;
    }
    let mut length = (last - first + 1) as i64;
    if last == d {
        return length;
    }
    if first > 1 {
        for j in last + 2..=d {
            if done[conf.neighbour(v, j) as usize] {
                return 0;
            }
        }
        return length;
    }
    // The interval may wrap past position d back to position 1.
    let mut worried = false;
    for j in last + 2..=d {
        if done[conf.neighbour(v, j) as usize] {
            length += 1;
            worried = true;
        } else if worried {
            return 0;
        }
    }
    length
}

/// Numbers the edges of the free completion: ring edges are `1..=r`, then
/// interior edges from `E` downwards, greedily from the vertex sharing the
/// largest interval of numbered neighbours (ties to higher degree), and
/// finally the ring-to-interior edges.
pub fn number_edges(conf: &Configuration) -> EdgeNumbers {
    let verts = conf.nverts() as usize;
    let ring = conf.ring() as usize;
    let mut edgeno: EdgeNumbers = [[0; VERTS]; VERTS];

    for v in 1..=ring {
        let u = if v > 1 { v - 1 } else { ring };
        edgeno[u][v] = v as i64;
        edgeno[v][u] = v as i64;
    }

    let mut done = [false; VERTS];
    let mut term = 3 * (verts as i64 - 1) - ring as i64;

    for _ in ring + 1..=verts {
        // All interior vertices meeting the numbered ones in a maximal
        // interval; among those, the one of maximum degree.
        let mut maxint = 0;
        let mut candidates: Vec<usize> = Vec::new();
        for v in ring + 1..=verts {
            if done[v] {
                continue;
            }
            let inter = done_interval(conf, v, &done);
            if inter > maxint {
                maxint = inter;
                candidates.clear();
                candidates.push(v);
            } else if inter == maxint {
                candidates.push(v);
            }
        }
        let mut maxdeg = 0;
        let mut best = 0;
        for &v in &candidates {
            if conf.degree(v) > maxdeg {
                maxdeg = conf.degree(v);
                best = v;
            }
        }

        let d = conf.degree(best) as usize;
        // Start of the numbered arc: a position whose cyclic predecessor is
        // not yet numbered.
        let mut first = 1;
        let mut previous = done[conf.neighbour(best, d) as usize];
        loop {
            if !previous && done[conf.neighbour(best, first) as usize] {
                break;
            }
            previous = done[conf.neighbour(best, first) as usize];
            first += 1;
            if first > d {
                first = 1;
                break;
            }
        }
        let mut h = first;
        while done[conf.neighbour(best, h) as usize] {
            let w = conf.neighbour(best, h) as usize;
            edgeno[best][w] = term;
            edgeno[w][best] = term;
            term -= 1;
            if h == d {
                if first == 1 {
                    break;
                }
                h = 0;
            }
            h += 1;
        }
        done[best] = true;
    }

    // Ring-to-interior edges: prefer high-degree ring vertices flanked by
    // numbered neighbours.
    for _ in 1..=ring {
        let mut maxint = 0;
        let mut best = 0;
        for v in 1..=ring {
            if done[v] {
                continue;
            }
            let u = if v > 1 { v - 1 } else { ring };
            let w = if v < ring { v + 1 } else { 1 };
            let inter = 3 * conf.degree(v) + 4 * (done[u] as i64 + done[w] as i64);
            if inter > maxint {
                maxint = inter;
                best = v;
            }
        }
        let d = conf.degree(best) as usize;
        let u = if best > 1 { best - 1 } else { ring };
        if done[u] {
            for h in (2..d).rev() {
                let w = conf.neighbour(best, h) as usize;
                edgeno[best][w] = term;
                edgeno[w][best] = term;
                term -= 1;
            }
        } else {
            for h in 2..d {
                let w = conf.neighbour(best, h) as usize;
                edgeno[best][w] = term;
                edgeno[w][best] = term;
                term -= 1;
            }
        }
        done[best] = true;
    }

    edgeno
}

/// Builds the three angle tables and the contract vector, checking the
/// structural conditions on the contract as it goes: members must be
/// non-ring edges, no two may share a triangle, and a contract of four
/// edges must admit a triad.
pub fn build_angles(conf: &Configuration) -> Result<Angles> {
    let verts = conf.nverts() as usize;
    let ring = conf.ring() as usize;
    let edges = 3 * verts - 3 - ring;
    if edges >= EDGES {
        return Err(VerifyError::resource(
            format!("Configuration has more than {} edges", EDGES - 1),
            20,
        ));
    }
    let edgeno = number_edges(conf);

    let mut contract = [0i64; EDGES + 1];
    contract[0] = conf.contract_size();
    if !(0..=4).contains(&contract[0]) {
        return Err(VerifyError::structural("invalid contract", 27));
    }
    for i in 0..2 * contract[0] as usize {
        let w = conf.contract_endpoints()[i];
        if w < 1 || w > verts as i64 {
            return Err(VerifyError::structural("illegal contract", 29));
        }
    }
    contract[EDGES] = conf.live_claim();
    for i in 1..=contract[0] as usize {
        let (u, v) = conf.contract_edge(i);
        let e = edgeno[u as usize][v as usize];
        if e < 1 {
            return Err(VerifyError::structural("contract contains a non-edge", 29));
        }
        contract[e as usize] = 1;
    }
    for e in 1..=ring {
        if contract[e] != 0 {
            return Err(VerifyError::structural("contract is not sparse", 21));
        }
    }

    let mut angle: AngleTable = [[0; 5]; EDGES];
    let mut diffangle: AngleTable = [[0; 5]; EDGES];
    let mut sameangle: AngleTable = [[0; 5]; EDGES];

    for v in 1..=verts {
        let dv = conf.degree(v) as usize;
        for h in 1..=dv {
            if v <= ring && h == dv {
                continue;
            }
            let i = if h < dv { h + 1 } else { 1 };
            let u = conf.neighbour(v, h) as usize;
            let w = conf.neighbour(v, i) as usize;
            let a = edgeno[v][w] as usize;
            let b = edgeno[u][w] as usize;
            let c = edgeno[u][v] as usize;
            if contract[a] != 0 && contract[b] != 0 {
                return Err(VerifyError::structural("contract is not sparse", 22));
            }
            if a > c {
                let len = angle[c][0] as usize + 1;
                angle[c][0] = len as i64;
                angle[c][len] = a as i64;
                if contract[a] == 0 && contract[b] == 0 && contract[c] == 0 {
                    let len = diffangle[c][0] as usize + 1;
                    diffangle[c][0] = len as i64;
                    diffangle[c][len] = a as i64;
                }
                if contract[b] != 0 {
                    let len = sameangle[c][0] as usize + 1;
                    sameangle[c][0] = len as i64;
                    sameangle[c][len] = a as i64;
                }
            }
            if b > c {
                let len = angle[c][0] as usize + 1;
                angle[c][0] = len as i64;
                angle[c][len] = b as i64;
                if contract[a] == 0 && contract[b] == 0 && contract[c] == 0 {
                    let len = diffangle[c][0] as usize + 1;
                    diffangle[c][0] = len as i64;
                    diffangle[c][len] = b as i64;
                }
                if contract[a] != 0 {
                    let len = sameangle[c][0] as usize + 1;
                    sameangle[c][0] = len as i64;
                    sameangle[c][len] = b as i64;
                }
            }
        }
    }

    let result = Angles { angle, diffangle, sameangle, contract, ring, edges };

    // A contract of four edges needs a triad: an interior vertex seeing at
    // least three contract endpoints, of degree >= 6 or missing at least one
    // endpoint among its neighbours.
    if result.contract[0] < 4 {
        return Ok(result);
    }
    let endpoints = conf.contract_endpoints();
    for v in ring + 1..=verts {
        let mut hits = 0;
        for i in 1..=conf.degree(v) as usize {
            let u = conf.neighbour(v, i);
            if endpoints.contains(&u) {
                hits += 1;
            }
        }
        if hits < 3 {
            continue;
        }
        if conf.degree(v) >= 6 {
            return Ok(result);
        }
        let mut neighbour = [false; VERTS];
        for i in 1..=conf.degree(v) as usize {
            neighbour[conf.neighbour(v, i) as usize] = true;
        }
        if endpoints.iter().any(|&e| !neighbour[e as usize]) {
            return Ok(result);
        }
    }
    Err(VerifyError::structural("contract has no triad", 28))
}
