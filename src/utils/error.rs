use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlacerError {
    #[error("Unknown candidate: {id}")]
    UnknownCandidate { id: i64 },

    #[error("Unknown place: {id}")]
    UnknownPlace { id: i64 },

    #[error("Unknown block: {id}")]
    UnknownBlock { id: i64 },

    #[error("Invalid capacity for block {block}: {slots} slots")]
    InvalidCapacity { block: i64, slots: i64 },

    #[error("Insufficient candidates: {required} slots to fill, {available} candidates available")]
    InsufficientCandidates { required: usize, available: usize },

    #[error("Score of candidate {candidate} is out of range")]
    ScoreOverflow { candidate: i64 },

    #[error("Malformed record in {path} line {line}: {reason}")]
    MalformedRecord {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Round {round} already exists at {path}")]
    RoundConflict { round: u64, path: String },

    #[error("Round not found: {round}")]
    RoundNotFound { round: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A record references something the current roster does not contain.
    Consistency,
    /// Inputs are well formed but cannot be allocated.
    Allocation,
    /// A flat file could not be parsed.
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PlacerError {
    pub fn malformed(path: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        PlacerError::MalformedRecord {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PlacerError::UnknownCandidate { .. }
            | PlacerError::UnknownPlace { .. }
            | PlacerError::UnknownBlock { .. } => ErrorCategory::Consistency,
            PlacerError::InvalidCapacity { .. } | PlacerError::InsufficientCandidates { .. } => {
                ErrorCategory::Allocation
            }
            PlacerError::MalformedRecord { .. }
            | PlacerError::ScoreOverflow { .. }
            | PlacerError::CsvError(_)
            | PlacerError::SerializationError(_) => ErrorCategory::Data,
            PlacerError::RoundConflict { .. }
            | PlacerError::RoundNotFound { .. }
            | PlacerError::IoError(_) => ErrorCategory::Storage,
            PlacerError::ConfigError { .. } | PlacerError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 另一個執行剛寫入同一輪，重跑即可
            PlacerError::RoundConflict { .. } => ErrorSeverity::Medium,
            PlacerError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PlacerError::UnknownCandidate { id } => format!(
                "Add candidate {} back to the candidates file or remove the records that reference it",
                id
            ),
            PlacerError::UnknownPlace { id } => format!(
                "Add place {} back to the places file or remove the placements that reference it",
                id
            ),
            PlacerError::UnknownBlock { id } => format!(
                "Add block {} back to the blocks file or remove the placements that reference it",
                id
            ),
            PlacerError::InvalidCapacity { block, .. } => {
                format!("Set a slot count of zero or more that fits this round for block {}", block)
            }
            PlacerError::InsufficientCandidates { .. } => {
                "Add candidates, reduce block slots, or use the round-robin policy".to_string()
            }
            PlacerError::ScoreOverflow { candidate } => format!(
                "Check the adjustment files and place hardness values that apply to candidate {}",
                candidate
            ),
            PlacerError::MalformedRecord { path, .. } => {
                format!("Fix the offending line in {}", path)
            }
            PlacerError::RoundConflict { .. } => {
                "Another run wrote this round concurrently; run again to compute the next one"
                    .to_string()
            }
            PlacerError::RoundNotFound { .. } => {
                "List the data directory to see which rounds exist".to_string()
            }
            PlacerError::IoError(_) => {
                "Check that the data directory exists and is readable and writable".to_string()
            }
            PlacerError::CsvError(_) | PlacerError::SerializationError(_) => {
                "Try the text report format".to_string()
            }
            PlacerError::ConfigError { .. } | PlacerError::InvalidConfigValueError { .. } => {
                "Check placer.toml and the command line flags".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Consistency => format!("History does not match the roster: {}", self),
            ErrorCategory::Allocation => format!("Cannot allocate this round: {}", self),
            ErrorCategory::Data => format!("Could not read records: {}", self),
            ErrorCategory::Storage => format!("Storage problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlacerError>;
