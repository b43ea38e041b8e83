use crate::core::allocation::ReusePolicy;
use crate::core::report::ReportFormat;
use crate::core::round::next_round_number;
use crate::domain::model::{Block, Candidate, Place, Placement, Roster, ScoreAdjustment};
use crate::utils::error::{PlacerError, Result};

/// Durable home of the roster and of the append-only round log.
pub trait RecordStore {
    fn load_candidates(&self) -> Result<Vec<Candidate>>;
    fn load_blocks(&self) -> Result<Vec<Block>>;
    fn load_places(&self) -> Result<Vec<Place>>;
    fn load_adjustments(&self) -> Result<Vec<ScoreAdjustment>>;

    /// Every placement of every persisted round, resolved against `roster`.
    fn load_historical_placements(&self, roster: &Roster) -> Result<Vec<Placement>>;

    fn load_round(&self, round: u64, roster: &Roster) -> Result<Vec<Placement>>;

    fn round_numbers(&self) -> Result<Vec<u64>>;

    /// Must be atomic-or-fail and must never replace an existing round.
    /// Returns where the round ended up.
    fn persist_round(&self, round: u64, placements: &[Placement]) -> Result<String>;

    fn next_round_number(&self) -> Result<u64> {
        next_round_number(self.round_numbers()?).ok_or_else(|| {
            PlacerError::malformed(
                "round log",
                0,
                format!("round {} is the last possible round", u64::MAX),
            )
        })
    }

    fn load_roster(&self) -> Result<Roster> {
        Roster::new(
            self.load_candidates()?,
            self.load_blocks()?,
            self.load_places()?,
        )
    }
}

pub trait ConfigProvider {
    fn data_dir(&self) -> &str;
    fn candidates_file(&self) -> &str;
    fn blocks_file(&self) -> &str;
    fn places_file(&self) -> &str;
    fn placement_extension(&self) -> &str;
    fn adjustment_extension(&self) -> &str;
    fn reuse_policy(&self) -> ReusePolicy;
    fn report_format(&self) -> ReportFormat;
}
