// Axles: partial cartwheel descriptions as degree intervals, and the
// adjacency matrix of the skeleton they determine.
//
// Positions: 0 is the hub, 1..=deg the first ring, deg+1..=2*deg the short
// second ring, and 2*deg+1..=5*deg the fan vertices that exist once a
// first-ring neighbour has a definite degree of 6, 7 or 8.

use std::fmt;

use crate::constants::{CARTVERT, INFTY};

/// Degree intervals over the cartwheel positions; `low[0] == upp[0]` is the
/// hub degree.
#[derive(Clone)]
pub struct Axle {
    pub low: [i32; CARTVERT],
    pub upp: [i32; CARTVERT],
}

impl Axle {
    /// The trivial axle of the given hub degree: every other position is
    /// unconstrained.
    pub fn trivial(deg: i32) -> Self {
        let mut low = [0; CARTVERT];
        let mut upp = [0; CARTVERT];
        low[0] = deg;
        upp[0] = deg;
        for i in 1..=(5 * deg) as usize {
            low[i] = 5;
            upp[i] = INFTY;
        }
        Axle { low, upp }
    }

    pub fn deg(&self) -> i32 {
        self.low[0]
    }
}

impl fmt::Display for Axle {
    /// One-line rendering listing only the constrained positions, `p:l` for
    /// a lower bound with `+` for an open top and the upper bound appended
    /// when finite.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deg = self.upp[0];
        for i in 1..=(5 * deg) as usize {
            if self.low[i] == 5 && self.upp[i] == INFTY {
                continue;
            }
            write!(f, " {}:{}", i, self.low[i])?;
            if self.low[i] != self.upp[i] {
                if self.upp[i] == INFTY {
                    write!(f, "+")?;
                } else {
                    write!(f, "{}", self.upp[i])?;
                }
            }
            write!(f, " ")?;
        }
        Ok(())
    }
}

/// Clockwise-triangle adjacency matrix of a skeleton: `adjmat[u][v] == w`
/// when `u, v, w` form a clockwise triangle, `-1` when no such `w` exists.
pub type AdjMat = [[i32; CARTVERT]; CARTVERT];

/// Adjacency matrix of the skeleton of an axle. Only the hub triangles and
/// the fans of first-ring vertices with definite degree below 9 appear.
pub fn adjacency(ax: &Axle) -> AdjMat {
    let deg = ax.low[0];
    let mut adjmat: AdjMat = [[-1; CARTVERT]; CARTVERT];
    for i in 1..=deg {
        let h = if i == 1 { deg } else { i - 1 };
        set(&mut adjmat, 0, h, i);
        set(&mut adjmat, i, 0, h);
        set(&mut adjmat, h, i, 0);
        let a = deg + h;
        set(&mut adjmat, i, h, a);
        set(&mut adjmat, a, i, h);
        set(&mut adjmat, h, a, i);
        if ax.upp[i as usize] < 9 {
            install_fan(deg, i, ax.upp[i as usize], &mut adjmat);
        }
    }
    adjmat
}

fn set(adjmat: &mut AdjMat, u: i32, v: i32, w: i32) {
    adjmat[u as usize][v as usize] = w;
}

/// Installs the fan of a first-ring vertex `i` of definite degree `k` in
/// `5..=8`, extending the second ring with the fan vertices of `i`.
pub fn install_fan(deg: i32, i: i32, k: i32, adjmat: &mut AdjMat) {
    let a = if i == 1 { 2 * deg } else { deg + i - 1 };
    let b = deg + i;
    if k == 5 {
        set(adjmat, i, a, b);
        set(adjmat, a, b, i);
        set(adjmat, b, i, a);
        return;
    }
    let c = 2 * deg + i;
    set(adjmat, i, a, c);
    set(adjmat, a, c, i);
    set(adjmat, c, i, a);
    if k == 6 {
        set(adjmat, i, c, b);
        set(adjmat, c, b, i);
        set(adjmat, b, i, c);
        return;
    }
    let d = 3 * deg + i;
    set(adjmat, i, c, d);
    set(adjmat, c, d, i);
    set(adjmat, d, i, c);
    if k == 7 {
        set(adjmat, i, d, b);
        set(adjmat, d, b, i);
        set(adjmat, b, i, d);
        return;
    }
    let e = 4 * deg + i;
    set(adjmat, i, d, e);
    set(adjmat, d, e, i);
    set(adjmat, e, i, d);
    set(adjmat, i, e, b);
    set(adjmat, e, b, i);
    set(adjmat, b, i, e);
}
