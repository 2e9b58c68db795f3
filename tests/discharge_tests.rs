// Discharging engine tests
// Presentation replays over a one-configuration catalog built by hand

use std::io::Cursor;

use four_colour_verify::discharge::question::Catalog;
use four_colour_verify::discharge::{adjacency, axle_reducible, find_embedding, Axle, EdgeList};
use four_colour_verify::constants::CARTVERT;

/// The free completion of the Birkhoff diamond: four interior vertices of
/// degree five in a six-ring.
const DIAMOND: &str = "\
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

const COVER7: &str = "(1,1,1) (2,2,1) (3,3,1) (4,4,1) (5,5,1) (6,6,1) (7,7,1)";

fn diamond_catalog() -> Catalog {
    Catalog::from_stream(Cursor::new(DIAMOND)).unwrap()
}

fn replay(pres: &str, catalog: &Catalog) -> four_colour_verify::Result<()> {
    four_colour_verify::discharge::verify_presentation(
        Cursor::new(pres),
        "test",
        Cursor::new(""),
        catalog,
        None,
        0,
        0,
    )
}

#[test]
fn diamond_found_in_a_skeleton_with_four_pinned_fives() {
    // Pinning first-ring vertices 1 and 2 of a degree-7 hub to degree 5
    // grows their fans; the vertices 1, 2, 8 and 14 of the resulting
    // skeleton then induce exactly a diamond of degree-5 vertices.
    let cat = diamond_catalog();
    let mut ax = Axle::trivial(7);
    for p in [1usize, 2, 8, 14] {
        ax.low[p] = 5;
        ax.upp[p] = 5;
    }
    let adjmat = adjacency(&ax);
    let edgelist = EdgeList::build(&ax).unwrap();
    let mut image = [0i32; CARTVERT];
    assert!(find_embedding(&adjmat, &ax.upp, &cat.questions[0], &edgelist, &mut image));
    assert!(axle_reducible(&cat, &ax, 1, false).unwrap());
}

#[test]
fn unpinned_skeleton_contains_no_diamond() {
    let cat = diamond_catalog();
    assert!(!axle_reducible(&cat, &Axle::trivial(7), 1, false).unwrap());
}

#[test]
fn presentation_with_conditions_and_reducibility_verifies() {
    // Four case splits pin the diamond's image; each complementary branch
    // (the pinned vertex having degree at least 6) is closed by a trivial
    // hubcap, and the fully pinned trunk case closes by reducibility.
    let cat = diamond_catalog();
    let pres = format!(
        "Degree 7\n\
         L0 C 1 6\n\
         L1 H {COVER7}\n\
         L0 C 2 6\n\
         L1 H {COVER7}\n\
         L0 C 8 6\n\
         L1 H {COVER7}\n\
         L0 C 14 6\n\
         L1 H {COVER7}\n\
         L0 R\n\
         Q.E.D.\n"
    );
    replay(&pres, &cat).unwrap();
}

#[test]
fn reducibility_fails_when_the_trunk_is_not_pinned_enough() {
    // Dropping the last condition leaves vertex 14 free, so the diamond no
    // longer appears and the R line must abort with its line number.
    let cat = diamond_catalog();
    let pres = format!(
        "Degree 7\n\
         L0 C 1 6\n\
         L1 H {COVER7}\n\
         L0 C 2 6\n\
         L1 H {COVER7}\n\
         L0 C 8 6\n\
         L1 H {COVER7}\n\
         L0 R\n\
         Q.E.D.\n"
    );
    let err = replay(&pres, &cat).unwrap_err();
    assert!(err.to_string().contains("Reducibility failed"));
    assert_eq!(err.status(), 8);
}

#[test]
fn garbled_presentations_report_the_offending_line() {
    let cat = diamond_catalog();
    let err = replay("Degree 7\nL0 X\nQ.E.D.\n", &cat).unwrap_err();
    assert!(err.to_string().contains("Invalid instruction"));
    let err = replay("Degree 4\n", &cat).unwrap_err();
    assert!(err.to_string().contains("Invalid degree"));
}
