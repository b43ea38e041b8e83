pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, Command};
pub use config::PlacerConfig;

pub use adapters::storage::{DirectoryStore, StoreLayout};
pub use crate::core::{
    allocation::{allocate, ReusePolicy},
    engine::PlacerEngine,
    ledger::{compute_ledger, Ledger},
    report::{render_ledger, render_round, ReportFormat},
    round::next_round_number,
};
pub use utils::error::{PlacerError, Result};
