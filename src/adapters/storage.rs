//! Record store backed by a directory of whitespace-separated flat files.
//!
//! Every file starts with a header line that is skipped. Blank lines are
//! ignored. Round files are named by their zero-padded round number and are
//! only ever created, never rewritten.

use crate::core::round::{next_round_number, parse_round_file_name, round_file_name};
use crate::domain::model::{
    Block, Candidate, Place, Placement, PlacementRef, Roster, ScoreAdjustment,
};
use crate::domain::ports::{ConfigProvider, RecordStore};
use crate::utils::error::{PlacerError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const ROUND_FILE_HEADER: &str = "whom  place  block";

/// File names inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreLayout {
    pub candidates_file: String,
    pub blocks_file: String,
    pub places_file: String,
    pub placement_extension: String,
    pub adjustment_extension: String,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            candidates_file: "candidates".to_string(),
            blocks_file: "blocks".to_string(),
            places_file: "places".to_string(),
            placement_extension: "placement".to_string(),
            adjustment_extension: "extra".to_string(),
        }
    }
}

impl StoreLayout {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            candidates_file: config.candidates_file().to_string(),
            blocks_file: config.blocks_file().to_string(),
            places_file: config.places_file().to_string(),
            placement_extension: config.placement_extension().to_string(),
            adjustment_extension: config.adjustment_extension().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    layout: StoreLayout,
}

struct Line {
    number: usize,
    text: String,
}

impl Line {
    fn fields(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>, layout: StoreLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.data_dir(), StoreLayout::from_config(config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_directory(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(PlacerError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", self.root.display()),
            )));
        }
        Ok(())
    }

    /// Record lines of `path`: header dropped, blank lines skipped,
    /// 1-based line numbers kept for error messages.
    fn read_records(&self, path: &Path) -> Result<Vec<Line>> {
        let content = fs::read_to_string(path).map_err(|e| {
            PlacerError::IoError(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;

        let lines = content
            .lines()
            .enumerate()
            .skip(1)
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(index, text)| Line {
                number: index + 1,
                text: text.to_string(),
            })
            .collect::<Vec<_>>();

        tracing::debug!("Read {} records from {}", lines.len(), path.display());
        Ok(lines)
    }

    /// Regular files (no directories, no symlinks) with the given extension,
    /// sorted by name.
    fn list_files(&self, extension: &str) -> Result<Vec<PathBuf>> {
        self.ensure_directory()?;

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if file_type.is_dir() || file_type.is_symlink() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(extension) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Round files ordered by round number.
    fn round_files(&self) -> Result<Vec<(u64, PathBuf)>> {
        let extension = &self.layout.placement_extension;
        let mut rounds = Vec::new();

        for path in self.list_files(extension)? {
            let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
                PlacerError::malformed(
                    path.display().to_string(),
                    0,
                    "round file name is not valid UTF-8",
                )
            })?;

            match parse_round_file_name(name, extension) {
                Some(Ok(round)) => rounds.push((round, path)),
                Some(Err(stem)) => {
                    return Err(PlacerError::malformed(
                        path.display().to_string(),
                        0,
                        format!("round file name '{}' is not a round number", stem),
                    ))
                }
                None => {}
            }
        }

        rounds.sort_by_key(|(round, _)| *round);
        Ok(rounds)
    }

    fn read_round_file(&self, path: &Path, roster: &Roster) -> Result<Vec<Placement>> {
        let shown = path.display().to_string();

        let lines = self.read_records(path)?;
        lines
            .iter()
            .map(|line| {
                let fields = line.fields();
                expect_fields(&shown, line, &fields, 3, "candidate place block")?;

                let raw = PlacementRef {
                    candidate: parse_int(&shown, line, "candidate", fields[0])?,
                    place: parse_int(&shown, line, "place", fields[1])?,
                    block: parse_int(&shown, line, "block", fields[2])?,
                };
                roster.resolve(raw)
            })
            .collect()
    }
}

fn expect_fields(path: &str, line: &Line, fields: &[&str], count: usize, shape: &str) -> Result<()> {
    if fields.len() != count {
        return Err(PlacerError::malformed(
            path,
            line.number,
            format!("expected '{}', found {} fields", shape, fields.len()),
        ));
    }
    Ok(())
}

fn parse_int(path: &str, line: &Line, field: &str, token: &str) -> Result<i64> {
    token.parse::<i64>().map_err(|_| {
        PlacerError::malformed(
            path,
            line.number,
            format!("{} '{}' is not an integer", field, token),
        )
    })
}

/// Splits the first whitespace-separated token off `text`.
fn next_token(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], &text[end..]),
        None => (text, ""),
    }
}

/// `id value description…`; the description is the rest of the line.
fn parse_described(path: &str, line: &Line, value_name: &str) -> Result<(i64, i64, String)> {
    let (id, rest) = next_token(&line.text);
    let (value, rest) = next_token(rest);

    if value.is_empty() {
        return Err(PlacerError::malformed(
            path,
            line.number,
            format!("expected 'id {} description'", value_name),
        ));
    }

    Ok((
        parse_int(path, line, "id", id)?,
        parse_int(path, line, value_name, value)?,
        rest.trim().to_string(),
    ))
}

impl RecordStore for DirectoryStore {
    fn load_candidates(&self) -> Result<Vec<Candidate>> {
        let path = self.root.join(&self.layout.candidates_file);
        let shown = path.display().to_string();

        let lines = self.read_records(&path)?;
        lines
            .iter()
            .map(|line| {
                let fields = line.fields();
                expect_fields(&shown, line, &fields, 1, "id")?;
                Ok(Candidate::new(parse_int(&shown, line, "id", fields[0])?))
            })
            .collect()
    }

    fn load_blocks(&self) -> Result<Vec<Block>> {
        let path = self.root.join(&self.layout.blocks_file);
        let shown = path.display().to_string();

        let lines = self.read_records(&path)?;
        lines
            .iter()
            .map(|line| {
                let (id, slots, description) = parse_described(&shown, line, "slots")?;
                let block = Block::new(id, slots, description);
                block.validate()?;
                Ok(block)
            })
            .collect()
    }

    fn load_places(&self) -> Result<Vec<Place>> {
        let path = self.root.join(&self.layout.places_file);
        let shown = path.display().to_string();

        let lines = self.read_records(&path)?;
        lines
            .iter()
            .map(|line| {
                let (id, hardness, description) = parse_described(&shown, line, "hardness")?;
                Ok(Place::new(id, hardness, description))
            })
            .collect()
    }

    fn load_adjustments(&self) -> Result<Vec<ScoreAdjustment>> {
        let mut adjustments = Vec::new();

        for path in self.list_files(&self.layout.adjustment_extension)? {
            let shown = path.display().to_string();
            for line in self.read_records(&path)? {
                let fields = line.fields();
                expect_fields(&shown, &line, &fields, 2, "candidate delta")?;
                adjustments.push(ScoreAdjustment::new(
                    Candidate::new(parse_int(&shown, &line, "candidate", fields[0])?),
                    parse_int(&shown, &line, "delta", fields[1])?,
                ));
            }
        }

        tracing::debug!("Loaded {} score adjustments", adjustments.len());
        Ok(adjustments)
    }

    fn load_historical_placements(&self, roster: &Roster) -> Result<Vec<Placement>> {
        let mut placements = Vec::new();
        let rounds = self.round_files()?;

        for (_, path) in &rounds {
            placements.extend(self.read_round_file(path, roster)?);
        }

        tracing::debug!(
            "Loaded {} historical placements from {} rounds",
            placements.len(),
            rounds.len()
        );
        Ok(placements)
    }

    fn load_round(&self, round: u64, roster: &Roster) -> Result<Vec<Placement>> {
        let (_, path) = self
            .round_files()?
            .into_iter()
            .find(|(number, _)| *number == round)
            .ok_or(PlacerError::RoundNotFound { round })?;

        self.read_round_file(&path, roster)
    }

    fn round_numbers(&self) -> Result<Vec<u64>> {
        Ok(self
            .round_files()?
            .into_iter()
            .map(|(round, _)| round)
            .collect())
    }

    fn next_round_number(&self) -> Result<u64> {
        let rounds = self.round_files()?;
        next_round_number(rounds.iter().map(|(round, _)| *round)).ok_or_else(|| {
            let last = rounds
                .last()
                .map(|(_, path)| path.display().to_string())
                .unwrap_or_default();
            PlacerError::malformed(last, 0, "round number has no successor")
        })
    }

    fn persist_round(&self, round: u64, placements: &[Placement]) -> Result<String> {
        self.ensure_directory()?;

        let target = self
            .root
            .join(round_file_name(round, &self.layout.placement_extension));
        let shown = target.display().to_string();

        if target.exists() {
            return Err(PlacerError::RoundConflict { round, path: shown });
        }

        let mut content = format!("{}\n", ROUND_FILE_HEADER);
        for p in placements {
            content.push_str(&format!(
                "{:<7}{:<7}{:<7}\n",
                p.candidate.id, p.place.id, p.block.id
            ));
        }

        // 先寫入暫存檔，完成後才改名，失敗時不會留下半個輪次
        let mut staged = tempfile::Builder::new()
            .prefix(".round-")
            .suffix(".partial")
            .tempfile_in(&self.root)?;
        staged.write_all(content.as_bytes())?;
        staged.as_file().sync_all()?;

        staged.persist_noclobber(&target).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                PlacerError::RoundConflict {
                    round,
                    path: shown.clone(),
                }
            } else {
                PlacerError::IoError(e.error)
            }
        })?;

        tracing::info!("💾 Round {} written to {}", round, shown);
        Ok(shown)
    }
}
