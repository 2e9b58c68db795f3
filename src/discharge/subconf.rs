// Subconfiguration matching: does a reducible configuration appear as a
// well-positioned induced subconfiguration of an axle's skeleton?
//
// The search is driven by the precomputed questions; every hit is then
// re-verified from the configuration's own adjacency by an independent
// isomorphism check, so a bug in the question path cannot silently accept.

use itertools::Itertools;

use crate::configuration::Configuration;
use crate::constants::{CARTVERT, MAXASTACK, MAXELIST};
use crate::discharge::axle::{adjacency, AdjMat, Axle};
use crate::discharge::question::{Catalog, Question};
use crate::error::{Result, VerifyError};

/// Buckets of adjacent skeleton vertex pairs by degree pair. Pairs with both
/// degrees at most 8 are listed in both orientations; a vertex of degree
/// 9..=11 may only appear first, and only when it is the hub.
pub struct EdgeList {
    e: Box<[[[i32; MAXELIST]; 9]; 12]>,
}

impl EdgeList {
    /// Index over the skeleton of `ax`, using upper degree bounds.
    pub fn build(ax: &Axle) -> Result<EdgeList> {
        let deg = ax.upp[0];
        let mut list = EdgeList { e: Box::new([[[0; MAXELIST]; 9]; 12]) };
        for i in 1..=deg {
            list.add(0, i, &ax.upp)?;
            let h = if i == 1 { deg } else { i - 1 };
            list.add(i, h, &ax.upp)?;
            let a = deg + h;
            let b = deg + i;
            list.add(i, a, &ax.upp)?;
            list.add(i, b, &ax.upp)?;
            if ax.low[i as usize] != ax.upp[i as usize] {
                continue;
            }
            // Definite degree: the fan edges join the index too.
            match ax.upp[i as usize] {
                5 => {
                    list.add(a, b, &ax.upp)?;
                }
                6 => {
                    let c = 2 * deg + i;
                    list.add(a, c, &ax.upp)?;
                    list.add(i, c, &ax.upp)?;
                    list.add(b, c, &ax.upp)?;
                }
                7 => {
                    let c = 2 * deg + i;
                    let d = 3 * deg + i;
                    list.add(a, c, &ax.upp)?;
                    list.add(i, c, &ax.upp)?;
                    list.add(c, d, &ax.upp)?;
                    list.add(i, d, &ax.upp)?;
                    list.add(b, d, &ax.upp)?;
                }
                8 => {
                    let c = 2 * deg + i;
                    let d = 3 * deg + i;
                    let e = 4 * deg + i;
                    list.add(a, c, &ax.upp)?;
                    list.add(i, c, &ax.upp)?;
                    list.add(c, d, &ax.upp)?;
                    list.add(i, d, &ax.upp)?;
                    list.add(d, e, &ax.upp)?;
                    list.add(i, e, &ax.upp)?;
                    list.add(b, e, &ax.upp)?;
                }
                _ => {
                    return Err(VerifyError::matcher(
                        "Unexpected error in building the edge index",
                        36,
                    ));
                }
            }
        }
        Ok(list)
    }

    fn add(&mut self, u: i32, v: i32, degree: &[i32; CARTVERT]) -> Result<()> {
        let a = degree[u as usize];
        let b = degree[v as usize];
        if a >= b && b <= 8 && a <= 11 && (a <= 8 || u == 0) {
            let e = &mut self.e[a as usize][b as usize];
            if e[0] as usize + 2 >= MAXELIST {
                return Err(VerifyError::resource(
                    format!("More than {MAXELIST} entries in edgelist needed"),
                    39,
                ));
            }
            e[0] += 1;
            e[e[0] as usize] = u;
            e[0] += 1;
            e[e[0] as usize] = v;
        }
        if b >= a && a <= 8 && b <= 11 && (b <= 8 || v == 0) {
            let e = &mut self.e[b as usize][a as usize];
            if e[0] as usize + 2 >= MAXELIST {
                return Err(VerifyError::resource(
                    format!("More than {MAXELIST} entries in edgelist needed"),
                    41,
                ));
            }
            e[0] += 1;
            e[e[0] as usize] = v;
            e[0] += 1;
            e[e[0] as usize] = u;
        }
        Ok(())
    }

    fn bucket(&self, a: i32, b: i32) -> &[i32] {
        &self.e[a as usize][b as usize]
    }
}

/// Grows an embedding of the question from the seed pair `(x, y)`, in the
/// given orientation. On success the image is left in `image`, with
/// `image[0]` recording the orientation.
pub fn rooted_embedding(
    degree: &[i32; CARTVERT],
    adjmat: &AdjMat,
    question: &Question,
    image: &mut [i32; CARTVERT],
    x: i32,
    y: i32,
    clockwise: bool,
) -> bool {
    let deg = degree[0];
    let mut used = [false; CARTVERT];
    for slot in image.iter_mut() {
        *slot = -1;
    }
    image[0] = clockwise as i32;
    image[question.q[0].z as usize] = x;
    image[question.q[1].z as usize] = y;
    used[x as usize] = true;
    used[y as usize] = true;

    for step in &question.q[2..] {
        let w = if clockwise {
            adjmat[image[step.u as usize] as usize][image[step.v as usize] as usize]
        } else {
            adjmat[image[step.v as usize] as usize][image[step.u as usize] as usize]
        };
        if w == -1 {
            return false;
        }
        if step.xi != 0 && step.xi != degree[w as usize] {
            return false;
        }
        if used[w as usize] {
            return false;
        }
        image[step.z as usize] = w;
        used[w as usize] = true;
    }

    // Well-positioned: a second-ring vertex may only be used when its
    // clockwise first-ring predecessor is used too.
    for j in 1..=deg {
        let pred = if j == 1 { 2 * deg } else { deg + j - 1 };
        if !used[j as usize] && used[(deg + j) as usize] && used[pred as usize] {
            return false;
        }
    }
    true
}

/// Searches the whole skeleton for an embedding of the question, trying
/// both orientations of every seed pair of the right degrees.
pub fn find_embedding(
    adjmat: &AdjMat,
    degree: &[i32; CARTVERT],
    question: &Question,
    edgelist: &EdgeList,
    image: &mut [i32; CARTVERT],
) -> bool {
    let bucket = edgelist.bucket(question.q[0].xi, question.q[1].xi);
    let count = bucket[0] as usize;
    for (&x, &y) in bucket[1..=count].iter().tuples() {
        if rooted_embedding(degree, adjmat, question, image, x, y, true)
            || rooted_embedding(degree, adjmat, question, image, x, y, false)
        {
            return true;
        }
    }
    false
}

fn iso_error(k: i32, lineno: i32) -> VerifyError {
    VerifyError::Matcher {
        message: format!("Isomorphism error {k} on line {lineno}"),
        status: lineno,
    }
}

/// Independently verifies that `image` embeds `l` as a well-positioned
/// induced subconfiguration of the skeleton of `ax`, from the
/// configuration's own adjacency matrix.
pub fn verify_embedding(
    l: &Configuration,
    ax: &Axle,
    image: &[i32; CARTVERT],
    lineno: i32,
) -> Result<()> {
    let deg = ax.low[0];
    let verts = l.nverts() as usize;
    let ring = l.ring() as i64;
    let adjmat = adjacency(ax);
    let mut x_adj = vec![[0u8; CARTVERT]; CARTVERT];
    let mut used = [false; CARTVERT];

    // A valid injective map matching the degree bounds exactly.
    for u in ring as usize + 1..=verts {
        let fu = image[u];
        if fu < 0 || fu > 5 * deg || used[fu as usize] {
            return Err(iso_error(1, lineno));
        }
        used[fu as usize] = true;
        if l.degree(u) != ax.upp[fu as usize] as i64 {
            return Err(iso_error(2, lineno));
        }
        if fu > 2 * deg {
            // Fan vertices exist only under a definite-degree neighbour.
            let i = ((fu - 1) % deg + 1) as usize;
            if ax.low[i] != ax.upp[i] || ax.low[i] < (fu - 1) / deg + 4 {
                return Err(iso_error(3, lineno));
            }
        }
    }

    for i in 1..=deg {
        let pred = if i == 1 { 2 * deg } else { deg + i - 1 };
        if !used[i as usize] && used[(deg + i) as usize] && used[pred as usize] {
            return Err(iso_error(4, lineno));
        }
    }

    // The image respects triangles: every interior edge of the free
    // completion lies in a triangle whose third corner maps consistently.
    let orientation = image[0];
    for u in ring as usize + 1..=verts {
        let d = l.degree(u) as usize;
        let mut worried = l.neighbour(u, d) <= ring;
        for i in 1..=d {
            let v = l.neighbour(u, i);
            if v <= ring {
                worried = true;
                continue;
            }
            let (x, y) = if orientation != 0 {
                (image[u], image[v as usize])
            } else {
                (image[v as usize], image[u])
            };
            x_adj[x as usize][y as usize] = 1;
            let w = l.neighbour(u, if i < d { i + 1 } else { 1 });
            if w <= ring {
                if worried {
                    return Err(iso_error(5, lineno));
                }
                continue;
            }
            worried = false;
            if adjmat[x as usize][y as usize] != image[w as usize] {
                return Err(iso_error(6, lineno));
            }
        }
    }

    // The image is induced: every skeleton edge between used vertices must
    // be an image edge.
    let induced = |a: bool, b: bool, c: u8| -> bool { !(a && b && c != 1) };
    let check = |a: i32, b: i32| -> bool {
        induced(used[a as usize], used[b as usize], x_adj[a as usize][b as usize])
    };
    for i in 1..=deg {
        let h = if i == 1 { deg } else { i - 1 };
        let a = h + deg;
        let b = deg + i;
        if !check(0, i) || !check(h, i) || !check(h, a) || !check(i, a) {
            return Err(VerifyError::Matcher {
                message: format!("Isomorphism not induced on line {lineno}"),
                status: lineno,
            });
        }
        if ax.low[i as usize] != ax.upp[i as usize] {
            continue;
        }
        let ok = match ax.low[i as usize] {
            5 => check(a, b),
            6 => {
                let c = 2 * deg + i;
                check(a, c) && check(c, i) && check(c, b)
            }
            7 => {
                let c = 2 * deg + i;
                let d = 3 * deg + i;
                check(a, c) && check(c, i) && check(c, d) && check(d, i) && check(d, b)
            }
            8 => {
                let c = 2 * deg + i;
                let d = 3 * deg + i;
                let e = 4 * deg + i;
                check(a, c)
                    && check(c, i)
                    && check(c, d)
                    && check(d, i)
                    && check(e, d)
                    && check(e, i)
                    && check(e, b)
            }
            _ => {
                return Err(VerifyError::matcher(
                    format!("Unexpected error in the isomorphism check on line {lineno}"),
                    lineno,
                ));
            }
        };
        if !ok {
            return Err(VerifyError::Matcher {
                message: format!("Isomorphism not induced on line {lineno}"),
                status: lineno,
            });
        }
    }
    Ok(())
}

/// Tests whether every cartwheel compatible with `ax` contains a member of
/// the catalog: a matched configuration pins the degrees of its image, and
/// every way of lowering an indefinite image vertex goes back on the stack
/// for its own match.
pub fn axle_reducible(cat: &Catalog, ax: &Axle, lineno: i32, print: bool) -> Result<bool> {
    if print {
        println!("Testing reducibility. Putting input axle on stack.");
    }
    let mut stack: Vec<Axle> = Vec::with_capacity(MAXASTACK);
    stack.push(ax.clone());
    let mut image = [0i32; CARTVERT];
    while let Some(b) = stack.pop() {
        if print {
            println!("Axle from stack:{b}");
        }
        let adjmat = adjacency(&b);
        let edgelist = EdgeList::build(&b)?;
        let mut hit = None;
        for (h, q) in cat.questions.iter().enumerate() {
            if find_embedding(&adjmat, &b.upp, q, &edgelist, &mut image) {
                hit = Some(h);
                break;
            }
        }
        let Some(h) = hit else {
            if print {
                println!("Not reducible");
            }
            return Ok(false);
        };
        let redverts = cat.questions[h].verts;
        let redring = cat.questions[h].ring;
        if print {
            print!("Conf({},{},{}): ", h / 70 + 1, (h % 70) / 7 + 1, h % 7 + 1);
            for j in 1..=redverts {
                if image[j as usize] != -1 {
                    print!(" {}({})", image[j as usize], j);
                }
            }
            println!();
        }
        verify_embedding(&cat.confs[h], &b, &image, lineno)?;

        for i in redring + 1..=redverts {
            let v = image[i as usize] as usize;
            if b.low[v] == b.upp[v] {
                continue;
            }
            if print {
                println!(
                    "Lowering upper bound of vertex {} to {} and adding to stack",
                    v,
                    b.upp[v] - 1
                );
            }
            if stack.len() >= MAXASTACK {
                return Err(VerifyError::resource(
                    format!("More than {MAXASTACK} elements in axle stack needed"),
                    42,
                ));
            }
            let mut sub = b.clone();
            sub.upp[v] -= 1;
            stack.push(sub);
        }
    }
    if print {
        println!("All possibilities for lower degrees tested");
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::ConfReader;
    use crate::discharge::question::{Catalog, DIAMOND};
    use std::io::Cursor;

    fn diamond_catalog() -> Catalog {
        Catalog::from_stream(Cursor::new(DIAMOND)).unwrap()
    }

    /// Degree-5 hub with every first- and second-ring vertex pinned to
    /// degree 5: the icosahedral cartwheel, which contains the diamond.
    fn pinned_axle() -> Axle {
        let mut ax = Axle::trivial(5);
        for i in 1..=25 {
            ax.low[i] = 5;
            ax.upp[i] = 5;
        }
        ax
    }

    #[test]
    fn diamond_embeds_into_the_pinned_cartwheel() {
        let cat = diamond_catalog();
        let ax = pinned_axle();
        let adjmat = adjacency(&ax);
        let edgelist = EdgeList::build(&ax).unwrap();
        let mut image = [0i32; CARTVERT];
        assert!(find_embedding(&adjmat, &ax.upp, &cat.questions[0], &edgelist, &mut image));
        // Whatever the matcher found, the independent check must agree.
        verify_embedding(&cat.confs[0], &ax, &image, 1).unwrap();
    }

    #[test]
    fn trivial_axle_contains_nothing() {
        let cat = diamond_catalog();
        let ax = Axle::trivial(5);
        assert!(!axle_reducible(&cat, &ax, 1, false).unwrap());
    }

    #[test]
    fn pinned_cartwheel_is_reducible_against_the_diamond() {
        let cat = diamond_catalog();
        let ax = pinned_axle();
        assert!(axle_reducible(&cat, &ax, 1, false).unwrap());
    }

    #[test]
    fn edgelist_buckets_follow_the_degree_bounds() {
        let ax = pinned_axle();
        let list = EdgeList::build(&ax).unwrap();
        // All skeleton vertices have degree 5, so only that bucket fills.
        assert!(list.bucket(5, 5)[0] > 0);
        assert_eq!(list.bucket(6, 5)[0], 0);
        // On the trivial axle no vertex has degree below 12, and 12 is out
        // of the index's range entirely.
        let trivial = EdgeList::build(&Axle::trivial(5)).unwrap();
        assert_eq!(trivial.bucket(5, 5)[0], 0);
    }
}
