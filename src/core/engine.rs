use crate::core::allocation::{allocate, ReusePolicy};
use crate::core::ledger::{compute_ledger, Ledger};
use crate::domain::model::{Placement, Roster, Round};
use crate::domain::ports::RecordStore;
use crate::utils::error::{PlacerError, Result};

/// Everything one run needs: the roster and the ledger rebuilt from history.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub roster: Roster,
    pub ledger: Ledger,
}

#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub round: Round,
    pub location: String,
}

/// Drives one read, fold, allocate, write cycle over a record store.
pub struct PlacerEngine<S: RecordStore> {
    store: S,
    policy: ReusePolicy,
}

impl<S: RecordStore> PlacerEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, ReusePolicy::default())
    }

    pub fn with_policy(store: S, policy: ReusePolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> ReusePolicy {
        self.policy
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        let roster = self.store.load_roster()?;
        tracing::debug!(
            "Roster: {} candidates, {} blocks, {} places",
            roster.candidates().len(),
            roster.blocks().len(),
            roster.places().len()
        );

        let adjustments = self.store.load_adjustments()?;
        let history = self.store.load_historical_placements(&roster)?;
        let ledger = compute_ledger(roster.candidates(), &adjustments, &history)?;

        Ok(Snapshot { roster, ledger })
    }

    pub fn summary(&self) -> Result<Ledger> {
        Ok(self.snapshot()?.ledger)
    }

    /// The next round as it would be written, without writing it.
    pub fn plan_next(&self) -> Result<Round> {
        let Snapshot { roster, ledger } = self.snapshot()?;

        let placements = allocate(
            roster.places(),
            roster.blocks(),
            &ledger.ranked(),
            self.policy,
        )?;
        let number = self.store.next_round_number()?;

        tracing::info!(
            "📋 Round {} planned: {} placements ({} policy)",
            number,
            placements.len(),
            self.policy
        );

        Ok(Round { number, placements })
    }

    pub fn run_next(&self) -> Result<RoundOutcome> {
        let round = self.plan_next()?;
        let location = self.store.persist_round(round.number, &round.placements)?;
        Ok(RoundOutcome { round, location })
    }

    /// A persisted round; the latest one when `round` is `None`.
    pub fn show_round(&self, round: Option<u64>) -> Result<Round> {
        let number = match round {
            Some(number) => number,
            None => self
                .store
                .round_numbers()?
                .into_iter()
                .max()
                .ok_or(PlacerError::RoundNotFound { round: 0 })?,
        };

        let roster = self.store.load_roster()?;
        let placements: Vec<Placement> = self.store.load_round(number, &roster)?;

        Ok(Round { number, placements })
    }
}
