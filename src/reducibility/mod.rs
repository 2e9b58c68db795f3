// Reducibility engine: certifies that each configuration of the unavoidable
// set is D-reducible, or reducible via its declared contract.

pub mod angles;
pub mod coloring;
pub mod matching;
pub mod contract;
pub mod driver;

// Re-export main types
pub use angles::{build_angles, Angles};
pub use coloring::initial_live;
pub use contract::{verify_contract, ContractOutcome};
pub use driver::{verify_file, verify_stream, Reducer};
pub use matching::{matching_pass, prune_live};
