use crate::utils::error::{PlacerError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Someone eligible to receive a placement. Identity only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
}

impl Candidate {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

/// A capacity-bounded grouping (a shift, a session) that placements land in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: i64,
    pub slots: i64,
    pub description: String,
}

impl Block {
    pub fn new(id: i64, slots: i64, description: impl Into<String>) -> Self {
        Self {
            id,
            slots,
            description: description.into(),
        }
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Block {}

/// A weighted slot category. Whoever takes it is credited its hardness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: i64,
    pub hardness: i64,
    pub description: String,
}

impl Place {
    pub fn new(id: i64, hardness: i64, description: impl Into<String>) -> Self {
        Self {
            id,
            hardness,
            description: description.into(),
        }
    }
}

impl PartialEq for Place {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Place {}

/// Hardest first. Kept as a named comparator so identity (`==`) and
/// weight ordering never get mixed up.
pub fn hardest_first(a: &Place, b: &Place) -> Ordering {
    b.hardness.cmp(&a.hardness)
}

/// A manual one-off correction to a candidate's cumulative score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAdjustment {
    pub candidate: Candidate,
    pub delta: i64,
}

impl ScoreAdjustment {
    pub fn new(candidate: Candidate, delta: i64) -> Self {
        Self { candidate, delta }
    }
}

/// "This candidate took this place within this block" in some round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub candidate: Candidate,
    pub place: Place,
    pub block: Block,
}

impl Placement {
    pub fn new(candidate: Candidate, place: Place, block: Block) -> Self {
        Self {
            candidate,
            place,
            block,
        }
    }
}

/// A placement as read from a round file, before it is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRef {
    pub candidate: i64,
    pub place: i64,
    pub block: i64,
}

/// One batch of placements with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Round {
    pub number: u64,
    pub placements: Vec<Placement>,
}

/// The current candidates, blocks and places. Read fresh on every run.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    candidates: Vec<Candidate>,
    blocks: Vec<Block>,
    places: Vec<Place>,
}

impl Roster {
    pub fn new(candidates: Vec<Candidate>, blocks: Vec<Block>, places: Vec<Place>) -> Result<Self> {
        ensure_unique("candidates", candidates.iter().map(|c| c.id))?;
        ensure_unique("blocks", blocks.iter().map(|b| b.id))?;
        ensure_unique("places", places.iter().map(|p| p.id))?;

        Ok(Self {
            candidates,
            blocks,
            places,
        })
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn candidate(&self, id: i64) -> Result<Candidate> {
        self.candidates
            .iter()
            .copied()
            .find(|c| c.id == id)
            .ok_or(PlacerError::UnknownCandidate { id })
    }

    pub fn place(&self, id: i64) -> Result<&Place> {
        self.places
            .iter()
            .find(|p| p.id == id)
            .ok_or(PlacerError::UnknownPlace { id })
    }

    pub fn block(&self, id: i64) -> Result<&Block> {
        self.blocks
            .iter()
            .find(|b| b.id == id)
            .ok_or(PlacerError::UnknownBlock { id })
    }

    pub fn resolve(&self, raw: PlacementRef) -> Result<Placement> {
        Ok(Placement::new(
            self.candidate(raw.candidate)?,
            self.place(raw.place)?.clone(),
            self.block(raw.block)?.clone(),
        ))
    }
}

/// Reports the 1-based record position of the first repeated id.
fn ensure_unique(what: &str, ids: impl Iterator<Item = i64>) -> Result<()> {
    let mut seen = HashSet::new();
    for (position, id) in ids.enumerate() {
        if !seen.insert(id) {
            return Err(PlacerError::malformed(
                what,
                position + 1,
                format!("duplicate id {}", id),
            ));
        }
    }
    Ok(())
}
