// Discharging engine: replays the presentation of the case analysis over
// degree-constrained axles, certifying conditions, symmetries, reducibility
// leaves and hubcap bounds.

pub mod axle;
pub mod outlet;
pub mod question;
pub mod subconf;
pub mod hubcap;
pub mod present;

// Re-export main types
pub use axle::{adjacency, install_fan, AdjMat, Axle};
pub use outlet::{outlet_forced, outlet_permitted, read_rules, refl_forced, Outlet};
pub use question::{check_radius, question_for, Catalog, Query, Question};
pub use subconf::{axle_reducible, find_embedding, verify_embedding, EdgeList};
pub use hubcap::verify_hubcap;
pub use present::{verify_presentation, LineReader, PRTALL, PRTBAS, PRTLIN, PRTPAI};
