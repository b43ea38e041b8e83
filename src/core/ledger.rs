//! Score ledger: each candidate's cumulative fairness score, rebuilt from
//! the full history on every run.
//!
//! A candidate's score is the sum of the manual adjustments targeting it
//! plus the hardness of every place it has been given. Lower means more
//! credit is owed.

use crate::domain::model::{Candidate, Placement, ScoreAdjustment};
use crate::utils::error::{PlacerError, Result};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    order: Vec<Candidate>,
    scores: HashMap<Candidate, i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub candidate: i64,
    pub score: i64,
}

impl Ledger {
    /// Every candidate starts at zero.
    pub fn new(candidates: &[Candidate]) -> Self {
        Self {
            order: candidates.to_vec(),
            scores: candidates.iter().map(|c| (*c, 0)).collect(),
        }
    }

    pub fn credit(&mut self, candidate: Candidate, amount: i64) -> Result<()> {
        let score = self
            .scores
            .get_mut(&candidate)
            .ok_or(PlacerError::UnknownCandidate { id: candidate.id })?;
        *score = score
            .checked_add(amount)
            .ok_or(PlacerError::ScoreOverflow {
                candidate: candidate.id,
            })?;
        Ok(())
    }

    pub fn score(&self, candidate: Candidate) -> Option<i64> {
        self.scores.get(&candidate).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in roster order.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.order
            .iter()
            .map(|c| LedgerEntry {
                candidate: c.id,
                score: self.scores[c],
            })
            .collect()
    }

    /// Lowest score first; ties keep roster order.
    pub fn ranked(&self) -> Vec<(Candidate, i64)> {
        let mut ranked: Vec<(Candidate, i64)> =
            self.order.iter().map(|c| (*c, self.scores[c])).collect();
        ranked.sort_by_key(|&(_, score)| score);
        ranked
    }
}

pub fn compute_ledger(
    candidates: &[Candidate],
    adjustments: &[ScoreAdjustment],
    history: &[Placement],
) -> Result<Ledger> {
    let mut ledger = Ledger::new(candidates);

    for adjustment in adjustments {
        ledger.credit(adjustment.candidate, adjustment.delta)?;
    }

    for placement in history {
        ledger.credit(placement.candidate, placement.place.hardness)?;
    }

    tracing::debug!(
        candidates = ledger.len(),
        adjustments = adjustments.len(),
        placements = history.len(),
        "Ledger rebuilt"
    );

    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Block, Place};

    fn candidates(ids: &[i64]) -> Vec<Candidate> {
        ids.iter().map(|&id| Candidate::new(id)).collect()
    }

    fn placement(candidate: i64, hardness: i64) -> Placement {
        Placement::new(
            Candidate::new(candidate),
            Place::new(hardness, hardness, "p"),
            Block::new(1, 1, "b"),
        )
    }

    #[test]
    fn test_empty_history_scores_zero() {
        let ledger = compute_ledger(&candidates(&[1, 2, 3]), &[], &[]).unwrap();
        assert_eq!(ledger.len(), 3);
        for entry in ledger.entries() {
            assert_eq!(entry.score, 0);
        }
    }

    #[test]
    fn test_adjustments_and_placements_are_summed() {
        let adjustments = vec![
            ScoreAdjustment::new(Candidate::new(1), 4),
            ScoreAdjustment::new(Candidate::new(2), -3),
            ScoreAdjustment::new(Candidate::new(1), 1),
        ];
        let history = vec![placement(1, 10), placement(2, 7), placement(2, -2)];

        let ledger = compute_ledger(&candidates(&[1, 2, 3]), &adjustments, &history).unwrap();

        assert_eq!(ledger.score(Candidate::new(1)), Some(15));
        assert_eq!(ledger.score(Candidate::new(2)), Some(2));
        assert_eq!(ledger.score(Candidate::new(3)), Some(0));
        assert_eq!(ledger.score(Candidate::new(4)), None);
    }

    #[test]
    fn test_fold_is_order_independent() {
        let roster = candidates(&[1, 2, 3, 4]);
        let adjustments = vec![
            ScoreAdjustment::new(Candidate::new(1), 4),
            ScoreAdjustment::new(Candidate::new(3), -6),
            ScoreAdjustment::new(Candidate::new(1), 2),
            ScoreAdjustment::new(Candidate::new(2), 9),
        ];
        let history = vec![
            placement(1, 10),
            placement(2, 3),
            placement(3, -1),
            placement(1, 5),
            placement(2, 8),
        ];
        let expected = compute_ledger(&roster, &adjustments, &history).unwrap();

        // every rotation and the reversal of both sequences
        for shift in 0..history.len() {
            let mut h = history.clone();
            h.rotate_left(shift);
            let mut a = adjustments.clone();
            a.rotate_left(shift % adjustments.len());
            assert_eq!(compute_ledger(&roster, &a, &h).unwrap(), expected);

            h.reverse();
            a.reverse();
            assert_eq!(compute_ledger(&roster, &a, &h).unwrap(), expected);
        }
    }

    #[test]
    fn test_untouched_candidate_stays_zero() {
        let history = vec![placement(1, 10), placement(2, 3)];
        let adjustments = vec![ScoreAdjustment::new(Candidate::new(2), 5)];
        let ledger = compute_ledger(&candidates(&[1, 2, 9]), &adjustments, &history).unwrap();
        assert_eq!(ledger.score(Candidate::new(9)), Some(0));
    }

    #[test]
    fn test_unknown_candidate_in_adjustment() {
        let adjustments = vec![ScoreAdjustment::new(Candidate::new(5), 1)];
        let err = compute_ledger(&candidates(&[1]), &adjustments, &[]).unwrap_err();
        assert!(matches!(err, PlacerError::UnknownCandidate { id: 5 }));
    }

    #[test]
    fn test_unknown_candidate_in_history() {
        let err = compute_ledger(&candidates(&[1]), &[], &[placement(8, 2)]).unwrap_err();
        assert!(matches!(err, PlacerError::UnknownCandidate { id: 8 }));
    }

    #[test]
    fn test_score_out_of_range_is_an_error() {
        let adjustments = vec![
            ScoreAdjustment::new(Candidate::new(1), i64::MAX),
            ScoreAdjustment::new(Candidate::new(1), 1),
        ];
        let err = compute_ledger(&candidates(&[1, 2]), &adjustments, &[]).unwrap_err();
        assert!(matches!(err, PlacerError::ScoreOverflow { candidate: 1 }));

        let adjustments = vec![ScoreAdjustment::new(Candidate::new(2), i64::MIN)];
        let err = compute_ledger(&candidates(&[1, 2]), &adjustments, &[placement(2, -1)])
            .unwrap_err();
        assert!(matches!(err, PlacerError::ScoreOverflow { candidate: 2 }));
    }

    #[test]
    fn test_ranked_is_ascending_and_stable() {
        let adjustments = vec![
            ScoreAdjustment::new(Candidate::new(1), 5),
            ScoreAdjustment::new(Candidate::new(3), 2),
        ];
        let ledger = compute_ledger(&candidates(&[1, 2, 3, 4]), &adjustments, &[]).unwrap();
        let order: Vec<i64> = ledger.ranked().iter().map(|(c, _)| c.id).collect();
        assert_eq!(order, vec![2, 4, 3, 1]);
    }
}
