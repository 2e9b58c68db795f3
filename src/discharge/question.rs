// Per-configuration matcher questions and the reducible-configuration
// catalog.
//
// A question is a BFS-order witness: after two anchor vertices, every entry
// pins a new vertex as the third corner of a triangle over two vertices
// placed earlier, so the matcher can grow an embedding one lookup at a time.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::configuration::{ConfReader, Configuration};
use crate::constants::{CONFS, VERTS};
use crate::error::{Result, VerifyError};

/// One step of a question. `z` is the configuration vertex being placed,
/// `xi` its required degree (0 for "don't care"), and `u`, `v` the earlier
/// vertices whose common triangle corner it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Query {
    pub u: i32,
    pub v: i32,
    pub z: i32,
    pub xi: i32,
}

/// Matching witness for one configuration. Entries 0 and 1 are the anchors
/// (only `z` and `xi` are meaningful); placement steps start at entry 2.
#[derive(Clone)]
pub struct Question {
    /// Vertex count of the free completion.
    pub verts: i32,
    /// Ring-size of the configuration.
    pub ring: i32,
    pub q: Vec<Query>,
}

/// Computes the question for a configuration, anchored at the interior
/// vertex of maximum degree and its interior neighbour of maximum degree.
pub fn question_for(l: &Configuration) -> Result<Question> {
    let nverts = l.nverts();
    let ring = l.ring();
    let mut found = [false; VERTS];
    let mut q: Vec<Query> = Vec::new();

    let mut max = 0;
    let mut best = 0usize;
    for v in ring as usize + 1..=nverts as usize {
        if l.degree(v) > max {
            max = l.degree(v);
            best = v;
        }
    }
    q.push(Query { u: 0, v: 0, z: best as i32, xi: l.degree(best) as i32 });
    found[best] = true;

    let mut max = 0;
    let mut secondbest = 0usize;
    for i in 1..=l.degree(best) as usize {
        let v = l.neighbour(best, i);
        if v <= ring {
            continue;
        }
        if l.degree(v as usize) > max {
            max = l.degree(v as usize);
            secondbest = v as usize;
        }
    }
    q.push(Query { u: 0, v: 0, z: secondbest as i32, xi: l.degree(secondbest) as i32 });
    found[secondbest] = true;

    let mut search = 0;
    while search < q.len() {
        let v = q[search].z as i64;
        search += 1;
        if v <= ring {
            continue;
        }
        let v = v as usize;
        let d = l.degree(v) as usize;

        let mut i = 1;
        while !found[l.neighbour(v, i) as usize] {
            i += 1;
        }

        // Sweep counter-clockwise from the first placed neighbour, adding
        // interior vertices until the ring interrupts.
        let mut h = if i == 1 { d } else { i - 1 };
        let mut u = 0i64;
        while h != i {
            u = l.neighbour(v, h);
            if u <= ring {
                break;
            }
            if !found[u as usize] {
                q.push(Query {
                    u: l.neighbour(v, if h == d { 1 } else { h + 1 }) as i32,
                    v: v as i32,
                    z: u as i32,
                    xi: if u > ring { l.degree(u as usize) as i32 } else { 0 },
                });
                found[u as usize] = true;
            }
            h = if h == 1 { d } else { h - 1 };
        }
        if h == i {
            continue;
        }

        // Then clockwise.
        let mut j = if i == d { 1 } else { i + 1 };
        loop {
            let w = l.neighbour(v, j);
            if w <= ring {
                break;
            }
            if !found[w as usize] {
                q.push(Query {
                    u: v as i32,
                    v: l.neighbour(v, if j == 1 { d } else { j - 1 }) as i32,
                    z: w as i32,
                    xi: if w > ring { l.degree(w as usize) as i32 } else { 0 },
                });
                found[w as usize] = true;
            }
            j = if j == d { 1 } else { j + 1 };
        }

        // If the two sweeps leave a gap, it must consist of interior
        // vertices reached across a ring vertex; pin that ring vertex and
        // walk the gap.
        let r = if h >= j { h - j } else { h + d - j };
        if r <= 2 {
            continue;
        }
        q.push(Query {
            u: l.neighbour(v, if h == d { 1 } else { h + 1 }) as i32,
            v: v as i32,
            z: u as i32,
            xi: if u > ring { l.degree(u as usize) as i32 } else { 0 },
        });
        let mut prev = u as i32;
        let mut g = if h == 1 { d } else { h - 1 };
        while g != j {
            let t = l.neighbour(v, g);
            if t <= ring || found[t as usize] {
                return Err(VerifyError::structural("Error in getquestions", 1));
            }
            q.push(Query {
                u: prev,
                v: v as i32,
                z: t as i32,
                xi: if t > ring { l.degree(t as usize) as i32 } else { 0 },
            });
            prev = t as i32;
            found[t as usize] = true;
            g = if g == 1 { d } else { g - 1 };
        }
    }

    Ok(Question { verts: nverts as i32, ring: ring as i32, q })
}

/// Exits unless the configuration has radius at most two measured from some
/// interior vertex.
pub fn check_radius(l: &Configuration) -> Result<()> {
    let verts = l.nverts() as usize;
    let ring = l.ring() as usize;
    for u in ring + 1..=verts {
        let mut reached = [false; VERTS];
        reached[u] = true;
        for i in 1..=l.degree(u) as usize {
            let v = l.neighbour(u, i) as usize;
            reached[v] = true;
            if v > ring {
                for j in 1..=l.degree(v) as usize {
                    reached[l.neighbour(v, j) as usize] = true;
                }
            }
        }
        if (ring + 1..=verts).all(|v| reached[v]) {
            return Ok(());
        }
    }
    Err(VerifyError::structural(
        "A configuration does not have radius at most two",
        38,
    ))
}

/// The reducible-configuration catalog: every configuration of the
/// unavoidable set with its precomputed question.
pub struct Catalog {
    pub confs: Vec<Configuration>,
    pub questions: Vec<Question>,
}

impl Catalog {
    /// Reads a catalog from an open stream, checking the radius invariant
    /// and precomputing the question of every member.
    pub fn from_stream<R: BufRead>(input: R) -> Result<Catalog> {
        let mut reader = ConfReader::new(input);
        let mut confs = Vec::new();
        let mut questions = Vec::new();
        while let Some(conf) = reader.next_record()? {
            if confs.len() >= CONFS {
                return Err(VerifyError::resource(
                    format!("More than {CONFS} configurations"),
                    24,
                ));
            }
            questions.push(question_for(&conf)?);
            check_radius(&conf)?;
            confs.push(conf);
        }
        Ok(Catalog { confs, questions })
    }

    /// Opens and reads the unavoidable set, with the historical transcript
    /// lines.
    pub fn load(path: &Path) -> Result<Catalog> {
        let file = File::open(path).map_err(|_| {
            VerifyError::io(
                format!("Unable to open file {} for reading", path.display()),
                23,
            )
        })?;
        println!("Reading unavoidable set from file `{}'.", path.display());
        let catalog = Self::from_stream(BufReader::new(file))?;
        println!("Total of {} configurations.", catalog.confs.len());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.confs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.confs.is_empty()
    }
}

/// The free completion of the Birkhoff diamond: four interior vertices of
/// degree five around a six-ring. Shared by several test modules.
#[cfg(test)]
pub(crate) const DIAMOND: &str = "\
birkhoff-diamond
10 6 0 0
0
1 3 2 7 6
2 4 3 8 7 1
3 4 4 9 8 2
4 3 5 9 3
5 4 6 10 9 4
6 4 1 7 10 5
7 5 1 2 8 10 6
8 5 2 3 9 10 7
9 5 3 4 5 10 8
10 5 5 6 7 8 9
1 1 1 1 1 1 1 1 1 1

";

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn diamond() -> Configuration {
        ConfReader::new(Cursor::new(DIAMOND)).next_record().unwrap().unwrap()
    }

    #[test]
    fn diamond_parses_and_has_radius_two() {
        let conf = diamond();
        assert_eq!(conf.nverts(), 10);
        assert_eq!(conf.ring(), 6);
        check_radius(&conf).unwrap();
    }

    #[test]
    fn diamond_question_pins_all_interior_vertices() {
        let conf = diamond();
        let q = question_for(&conf).unwrap();
        assert_eq!(q.verts, 10);
        assert_eq!(q.ring, 6);
        // Anchors: the first interior vertex of maximal degree and its first
        // interior neighbour of maximal degree.
        assert_eq!((q.q[0].z, q.q[0].xi), (7, 5));
        assert_eq!((q.q[1].z, q.q[1].xi), (8, 5));
        // The sweeps around vertex 7 place 10, then around 8 place 9.
        assert_eq!(q.q[2], Query { u: 7, v: 8, z: 10, xi: 5 });
        assert_eq!(q.q[3], Query { u: 10, v: 8, z: 9, xi: 5 });
        assert_eq!(q.q.len(), 4);
    }

    #[test]
    fn catalog_reads_multiple_records() {
        let two = format!("{DIAMOND}{DIAMOND}");
        let cat = Catalog::from_stream(Cursor::new(two)).unwrap();
        assert_eq!(cat.len(), 2);
        assert_eq!(cat.questions.len(), 2);
    }
}
