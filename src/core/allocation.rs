//! Greedy single-pass allocation of a round.
//!
//! Places are visited hardest first, and inside each place every block
//! offers its slots in input order. Each slot goes to the front of a queue
//! of candidates ordered by ascending ledger score, so the candidates owed
//! the most credit get the hardest places.

use crate::domain::model::{hardest_first, Block, Candidate, Place, Placement};
use crate::utils::error::{PlacerError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// What happens to a candidate once it has taken a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ReusePolicy {
    /// Taken out of the queue for the rest of the round.
    #[default]
    Exclusive,
    /// Sent to the back of the queue; candidates cycle when slots outnumber them.
    RoundRobin,
}

impl ReusePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReusePolicy::Exclusive => "exclusive",
            ReusePolicy::RoundRobin => "round-robin",
        }
    }
}

impl fmt::Display for ReusePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReusePolicy {
    type Err = PlacerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exclusive" => Ok(ReusePolicy::Exclusive),
            "round-robin" => Ok(ReusePolicy::RoundRobin),
            other => Err(PlacerError::InvalidConfigValueError {
                field: "allocation.policy".to_string(),
                value: other.to_string(),
                reason: "Valid values: exclusive, round-robin".to_string(),
            }),
        }
    }
}

/// Slots a round will fill: every block's capacity, once per place.
///
/// A block whose share of the total does not fit in `usize` is reported as
/// `InvalidCapacity`.
pub fn required_slots(places: &[Place], blocks: &[Block]) -> Result<usize> {
    let mut total = 0usize;
    for block in blocks {
        block.validate()?;

        let too_large = || PlacerError::InvalidCapacity {
            block: block.id,
            slots: block.slots,
        };
        let share = usize::try_from(block.slots)
            .ok()
            .and_then(|slots| slots.checked_mul(places.len()))
            .ok_or_else(too_large)?;
        total = total.checked_add(share).ok_or_else(too_large)?;
    }
    Ok(total)
}

pub fn allocate(
    places: &[Place],
    blocks: &[Block],
    candidates: &[(Candidate, i64)],
    policy: ReusePolicy,
) -> Result<Vec<Placement>> {
    let required = required_slots(places, blocks)?;
    let available = candidates.len();

    let short = match policy {
        ReusePolicy::Exclusive => required > available,
        ReusePolicy::RoundRobin => required > 0 && available == 0,
    };
    if short {
        return Err(PlacerError::InsufficientCandidates {
            required,
            available,
        });
    }

    let mut places = places.to_vec();
    places.sort_by(hardest_first);

    let mut ranked = candidates.to_vec();
    ranked.sort_by_key(|&(_, score)| score);
    let mut queue: VecDeque<Candidate> = ranked.into_iter().map(|(c, _)| c).collect();

    tracing::debug!(
        places = places.len(),
        blocks = blocks.len(),
        candidates = available,
        required,
        %policy,
        "Allocating round"
    );

    // round-robin may need far more slots than there are candidates
    let mut placements = Vec::with_capacity(required.min(available));
    for place in &places {
        for block in blocks {
            for _ in 0..block.slots {
                let candidate = queue.pop_front().ok_or(PlacerError::InsufficientCandidates {
                    required,
                    available,
                })?;
                placements.push(Placement::new(candidate, place.clone(), block.clone()));

                if policy == ReusePolicy::RoundRobin {
                    queue.push_back(candidate);
                }
            }
        }
    }

    Ok(placements)
}
