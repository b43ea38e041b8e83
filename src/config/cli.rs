use crate::config::toml_config::PlacerConfig;
use crate::core::allocation::ReusePolicy;
use crate::core::report::ReportFormat;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "placer")]
#[command(about = "Fair, score-ordered assignment of candidates to weighted places")]
pub struct CliConfig {
    /// Directory holding candidates, blocks, places, *.extra and round files
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Config file (defaults to placer.toml inside the data directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// What happens to a candidate once it has taken a slot
    #[arg(long, value_enum)]
    pub policy: Option<ReusePolicy>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Allocate the next round and append it to the log
    Next {
        /// Show what would be allocated without writing the round
        #[arg(long)]
        dry_run: bool,
    },
    /// Print every candidate's cumulative score
    Summary,
    /// Print a persisted round (the latest when no number is given)
    Show { round: Option<u64> },
}

impl CliConfig {
    /// File settings with the command line layered on top.
    pub fn resolve(&self) -> Result<PlacerConfig> {
        let mut config = match &self.config {
            Some(path) => PlacerConfig::from_file(path)?,
            None => PlacerConfig::discover(&self.dir)?,
        };

        // 命令列參數優先
        if config.data_dir.is_none() || self.dir != PathBuf::from(".") {
            config.data_dir = Some(self.dir.display().to_string());
        }
        if let Some(policy) = self.policy {
            config.allocation.policy = policy;
        }
        if let Some(format) = self.format {
            config.report.format = format;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
        if self.log_json {
            config.logging.json = true;
        }

        Ok(config)
    }
}
