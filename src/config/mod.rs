//! Crawler configuration
//!
//! Options arrive from the command line; the optional operator policy file
//! (deny patterns and deny hosts) is TOML. Parsing and validation are kept
//! separate so the CLI can report precise failures before anything spawns.

mod parser;
mod types;
mod validation;

pub use parser::{compute_policy_hash, load_policy, load_policy_with_hash};
pub use types::{CrawlerOptions, DenyHostEntry, DenyPatternEntry, DenyPolicy, PolicyFile};
pub use validation::{validate_options, validate_policy};
