pub mod allocation;
pub mod engine;
pub mod ledger;
pub mod report;
pub mod round;

pub use crate::domain::model::{Block, Candidate, Place, Placement, Roster, Round, ScoreAdjustment};
pub use crate::domain::ports::{ConfigProvider, RecordStore};
pub use crate::utils::error::Result;
