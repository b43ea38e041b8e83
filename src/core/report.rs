use crate::core::ledger::{Ledger, LedgerEntry};
use crate::domain::model::Round;
use crate::utils::error::{PlacerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = PlacerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(PlacerError::InvalidConfigValueError {
                field: "report.format".to_string(),
                value: other.to_string(),
                reason: "Valid values: text, json, csv".to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct LedgerReport {
    generated_at: String,
    entries: Vec<LedgerEntry>,
}

#[derive(Debug, Serialize)]
struct RoundRow<'a> {
    candidate: i64,
    place: i64,
    place_description: &'a str,
    block: i64,
    block_description: &'a str,
    score: i64,
}

#[derive(Debug, Serialize)]
struct RoundReport<'a> {
    round: u64,
    generated_at: String,
    placements: Vec<RoundRow<'a>>,
}

fn generated_at() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub fn render_ledger(ledger: &Ledger, format: ReportFormat) -> Result<String> {
    let entries = ledger.entries();

    match format {
        ReportFormat::Text => {
            let mut out = format!("{:>6}{:>6}\n", "whom", "score");
            for entry in &entries {
                out.push_str(&format!("{:>6}{:>6}\n", entry.candidate, entry.score));
            }
            Ok(out)
        }
        ReportFormat::Json => {
            let report = LedgerReport {
                generated_at: generated_at(),
                entries,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        ReportFormat::Csv => to_csv(&entries),
    }
}

pub fn render_round(round: &Round, format: ReportFormat) -> Result<String> {
    let rows: Vec<RoundRow<'_>> = round
        .placements
        .iter()
        .map(|p| RoundRow {
            candidate: p.candidate.id,
            place: p.place.id,
            place_description: &p.place.description,
            block: p.block.id,
            block_description: &p.block.description,
            score: p.place.hardness,
        })
        .collect();

    match format {
        ReportFormat::Text => Ok(round_table(&rows)),
        ReportFormat::Json => {
            let report = RoundReport {
                round: round.number,
                generated_at: generated_at(),
                placements: rows,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        ReportFormat::Csv => to_csv(&rows),
    }
}

fn column_width(values: impl Iterator<Item = usize>, minimum: usize) -> usize {
    values.max().map_or(minimum, |longest| (longest + 2).max(minimum))
}

fn round_table(rows: &[RoundRow<'_>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let candidate_w = column_width(rows.iter().map(|r| r.candidate.to_string().len()), 10);
    let place_w = column_width(rows.iter().map(|r| r.place_description.len()), 10);
    let block_w = column_width(rows.iter().map(|r| r.block_description.len()), 10);
    let score_w = column_width(rows.iter().map(|r| r.score.to_string().len()), 7);

    let mut out = format!(
        "{:>cw$}{:>pw$}{:>bw$}{:>sw$}\n",
        "candidate",
        "place",
        "block",
        "score",
        cw = candidate_w,
        pw = place_w,
        bw = block_w,
        sw = score_w
    );

    for row in rows {
        out.push_str(&format!(
            "{:>cw$}{:>pw$}{:>bw$}{:>sw$}\n",
            row.candidate,
            row.place_description,
            row.block_description,
            row.score,
            cw = candidate_w,
            pw = place_w,
            bw = block_w,
            sw = score_w
        ));
    }

    out
}

fn to_csv<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| {
        PlacerError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            e.to_string(),
        ))
    })?;

    String::from_utf8(bytes)
        .map_err(|e| PlacerError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
