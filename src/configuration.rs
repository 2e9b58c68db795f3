// Configuration records of the unavoidable set.
//
// A record describes a near-triangulation K together with its free completion
// G: a name line, a header `n r extendable maxcons`, a contract line, one
// adjacency line per vertex of G (clockwise neighbour order), coordinate
// lines for drawing, and a blank separator. Vertices 1..=r are the ring,
// r+1..=n the interior.

use std::io::BufRead;

use crate::constants::{DEG, VERTS};
use crate::error::{Result, VerifyError};

/// One configuration, stored in the compact matrix layout both engines index:
/// row 0 holds the header fields, row v holds `[d(v), w1, ..., wd]`.
#[derive(Clone, Debug)]
pub struct Configuration {
    name: String,
    mat: [[i64; DEG]; VERTS],
}

impl Configuration {
    /// Name line of the record, as read (trimmed of the trailing newline).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of vertices of the free completion.
    pub fn nverts(&self) -> i64 {
        self.mat[0][0]
    }

    /// Ring-size of the configuration.
    pub fn ring(&self) -> i64 {
        self.mat[0][1]
    }

    /// Claimed number of ring colourings that extend to the free completion.
    pub fn extendable_claim(&self) -> i64 {
        self.mat[0][2]
    }

    /// Claimed size of the live set after closure (only meaningful with a
    /// contract).
    pub fn live_claim(&self) -> i64 {
        self.mat[0][3]
    }

    /// Number of edges in the declared contract (0..=4).
    pub fn contract_size(&self) -> i64 {
        self.mat[0][4]
    }

    /// Endpoints of the i-th contract edge, `i` in `1..=contract_size()`.
    pub fn contract_edge(&self, i: usize) -> (i64, i64) {
        (self.mat[0][2 * i + 3], self.mat[0][2 * i + 4])
    }

    /// The raw endpoint slots of the contract line (positions 5..=12 of the
    /// header row); meaningful entries are the first `2 * contract_size()`.
    pub fn contract_endpoints(&self) -> &[i64] {
        &self.mat[0][5..13]
    }

    /// Degree of vertex `v` in the free completion.
    pub fn degree(&self, v: usize) -> i64 {
        self.mat[v][0]
    }

    /// `h`-th clockwise neighbour of `v`, `h` in `1..=degree(v)`.
    pub fn neighbour(&self, v: usize, h: usize) -> i64 {
        self.mat[v][h]
    }

    fn invariant_failure(&self, k: i32) -> VerifyError {
        VerifyError::structural(
            format!("Error {} while reading configuration {}", k, self.name),
            57,
        )
    }

    /// Planarity and encoding invariants (1)-(7) of a configuration record.
    fn validate(&self) -> Result<()> {
        let n = self.nverts() as usize;
        let r = self.ring() as usize;

        // (1) ring is a proper cycle strictly inside the completion
        if r < 2 || n <= r {
            return Err(self.invariant_failure(1));
        }
        // (2) degree bounds: ring vertices >=3, interior >=5, all < n
        for v in 1..=r {
            if self.degree(v) < 3 || self.degree(v) >= n as i64 {
                return Err(self.invariant_failure(2));
            }
        }
        for v in r + 1..=n {
            if self.degree(v) < 5 || self.degree(v) >= n as i64 {
                return Err(self.invariant_failure(2));
            }
        }
        // (3) neighbour indices in range
        for v in 1..=n {
            for h in 1..=self.degree(v) as usize {
                let w = self.neighbour(v, h);
                if w < 1 || w > n as i64 {
                    return Err(self.invariant_failure(3));
                }
            }
        }
        // (4) ring vertices list their ring successor first, predecessor
        // last, and only interior vertices in between
        for v in 1..=r {
            let d = self.degree(v) as usize;
            let succ = if v == r { 1 } else { v + 1 } as i64;
            let pred = if v == 1 { r } else { v - 1 } as i64;
            if self.neighbour(v, 1) != succ || self.neighbour(v, d) != pred {
                return Err(self.invariant_failure(4));
            }
            for h in 2..d {
                let w = self.neighbour(v, h);
                if w <= r as i64 || w > n as i64 {
                    return Err(self.invariant_failure(4));
                }
            }
        }
        // (5) Euler-derived degree sum
        let sum: i64 = (1..=n).map(|v| self.degree(v)).sum();
        if sum != 6 * (n as i64 - 1) - 2 * r as i64 {
            return Err(self.invariant_failure(5));
        }
        // (6) each interior vertex meets the ring in at most two arcs
        for v in r + 1..=n {
            let d = self.degree(v) as usize;
            let mut arcs = 0;
            for h in 1..=d {
                let next = if h < d { h + 1 } else { 1 };
                if self.neighbour(v, h) > r as i64 && self.neighbour(v, next) <= r as i64 {
                    arcs += 1;
                    let next2 = if h < d - 1 { h + 2 } else { h + 2 - d };
                    if self.neighbour(v, next2) <= r as i64 {
                        arcs += 1;
                    }
                }
            }
            if arcs > 2 {
                return Err(self.invariant_failure(6));
            }
        }
        // (7) every directed edge has its reverse in the cyclically adjacent
        // slot of the other endpoint's neighbour list
        for v in 1..=n {
            let d = self.degree(v) as usize;
            for h in 1..=d {
                let a = if h == d {
                    if v <= r {
                        continue;
                    }
                    self.neighbour(v, 1)
                } else {
                    self.neighbour(v, h + 1)
                };
                let k = self.neighbour(v, h) as usize;
                let dk = self.degree(k) as usize;
                let mut p = 1;
                while p < dk {
                    if self.neighbour(k, p) == a && self.neighbour(k, p + 1) == v as i64 {
                        break;
                    }
                    p += 1;
                }
                if p == dk && (self.neighbour(k, p) != a || self.neighbour(k, 1) != v as i64) {
                    return Err(self.invariant_failure(7));
                }
            }
        }
        Ok(())
    }
}

/// Leading integer tokens of a line, in order, stopping at the first token
/// that is not an integer.
fn numbers(line: &str) -> Vec<i64> {
    line.split_whitespace()
        .map_while(|t| t.parse::<i64>().ok())
        .collect()
}

/// Streaming reader over a configuration file.
pub struct ConfReader<R: BufRead> {
    input: R,
}

impl<R: BufRead> ConfReader<R> {
    pub fn new(input: R) -> Self {
        ConfReader { input }
    }

    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(_) => None,
        }
    }

    /// Reads one record. Returns `Ok(None)` on clean end of file; any
    /// malformed record is a terminal error.
    pub fn next_record(&mut self) -> Result<Option<Configuration>> {
        // Skip blank lines until the name line or EOF.
        let name = loop {
            match self.next_line() {
                None => return Ok(None),
                Some(l) if l.trim().is_empty() => continue,
                Some(l) => break l.trim_end_matches(['\n', '\r']).to_string(),
            }
        };

        let header = self.next_line().unwrap_or_default();
        let head = numbers(&header);
        if head.len() < 4 {
            return Err(VerifyError::format(
                format!("Error on line 2 while reading {name}"),
                11,
            ));
        }
        let mut mat = [[0i64; DEG]; VERTS];
        mat[0][..4].copy_from_slice(&head[..4]);
        let n = mat[0][0];
        if n >= VERTS as i64 {
            return Err(VerifyError::format(
                format!("{} has more than {} vertices", name, VERTS - 1),
                17,
            ));
        }
        let n = n as usize;

        // Contract line: |X| followed by 2|X| vertex indices.
        let contract = self.next_line().unwrap_or_default();
        let cvals: Vec<i64> = numbers(&contract).into_iter().take(9).collect();
        if cvals.is_empty() || 2 * cvals[0] + 1 != cvals.len() as i64 {
            return Err(VerifyError::format(
                format!("Error on line 3 while reading {name}"),
                13,
            ));
        }
        mat[0][4..4 + cvals.len()].copy_from_slice(&cvals);

        // Adjacency lines.
        for i in 1..=n {
            let line = self.next_line().unwrap_or_default();
            let vals = numbers(&line);
            if vals.len() < 2 || vals[0] != i as i64 {
                return Err(VerifyError::format(
                    format!("Error while reading vertex {i} of {name}"),
                    14,
                ));
            }
            let d = vals[1];
            if d >= DEG as i64 {
                return Err(VerifyError::format(
                    format!("Vertex degree larger than {} in {}", DEG - 1, name),
                    14,
                ));
            }
            if vals.len() < 2 + d as usize {
                return Err(VerifyError::format(
                    format!("Error while reading neighbour {} of {} of {}", vals.len() - 1, i, name),
                    15,
                ));
            }
            mat[i][0] = d;
            mat[i][1..=d as usize].copy_from_slice(&vals[2..2 + d as usize]);
        }

        // Coordinate lines: n integers in total, any split across lines.
        let mut seen = 0usize;
        while seen < n {
            let line = self.next_line().unwrap_or_default();
            let k = numbers(&line).len();
            if k == 0 {
                return Err(VerifyError::format(
                    format!("Error while reading coordinates of {name}"),
                    17,
                ));
            }
            seen += k;
        }

        // Blank separator.
        let sep = self.next_line().unwrap_or_default();
        if !sep.trim().is_empty() {
            return Err(VerifyError::format(
                format!("No blank line following configuration {name}"),
                18,
            ));
        }

        let conf = Configuration { name, mat };
        conf.validate()?;
        Ok(Some(conf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// The smallest configuration: one interior vertex of degree 5 inside a
    /// 5-ring.
    const WHEEL5: &str = "\
test-wheel5
6 5 2 0
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
    fn parses_the_five_wheel() {
        let mut rd = ConfReader::new(Cursor::new(WHEEL5));
        let conf = rd.next_record().unwrap().expect("one record");
        assert_eq!(conf.name(), "test-wheel5");
        assert_eq!(conf.nverts(), 6);
        assert_eq!(conf.ring(), 5);
        assert_eq!(conf.extendable_claim(), 2);
        assert_eq!(conf.contract_size(), 0);
        assert_eq!(conf.degree(6), 5);
        assert_eq!(conf.neighbour(6, 3), 3);
        assert!(rd.next_record().unwrap().is_none());
    }

    #[test]
    fn rejects_bad_euler_sum() {
        // Ring vertex 1 grows a duplicate spoke: the lists still satisfy
        // the local ordering conditions, but the degree sum is off by one.
        let text = WHEEL5.replace("1 3 2 6 5", "1 4 2 6 6 5");
        let mut rd = ConfReader::new(Cursor::new(text));
        let err = rd.next_record().unwrap_err();
        assert_eq!(err.status(), 57);
        assert!(err.to_string().contains("Error 5"));
    }

    #[test]
    fn rejects_broken_ring_order() {
        // Ring vertex 2 lists its predecessor first.
        let text = WHEEL5.replace("2 3 3 6 1", "2 3 1 6 3");
        let mut rd = ConfReader::new(Cursor::new(text));
        let err = rd.next_record().unwrap_err();
        assert_eq!(err.status(), 57);
    }

    #[test]
    fn contract_line_must_match_its_count() {
        let text = WHEEL5.replace("\n0\n", "\n1 6\n");
        let mut rd = ConfReader::new(Cursor::new(text));
        let err = rd.next_record().unwrap_err();
        assert_eq!(err.status(), 13);
    }

    #[test]
    fn clean_eof_is_not_an_error() {
        let mut rd = ConfReader::new(Cursor::new("\n\n"));
        assert!(rd.next_record().unwrap().is_none());
    }
}
