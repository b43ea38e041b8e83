use crate::adapters::storage::StoreLayout;
use crate::core::allocation::ReusePolicy;
use crate::core::report::ReportFormat;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{PlacerError, Result};
use crate::utils::validation::{
    validate_extension, validate_file_name, validate_one_of, validate_path, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the optional config file looked up inside the data directory.
pub const CONFIG_FILE_NAME: &str = "placer.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacerConfig {
    /// Data directory. Filled from the command line when absent.
    pub data_dir: Option<String>,
    pub store: StoreLayout,
    pub allocation: AllocationConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    pub policy: ReusePolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl PlacerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PlacerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| PlacerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// `placer.toml` inside `data_dir` when it exists, defaults otherwise.
    pub fn discover<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let candidate = data_dir.as_ref().join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!("Using config file {}", candidate.display());
            Self::from_file(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// 替換環境變數 (例如 ${PLACER_DATA})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static VAR: OnceLock<Regex> = OnceLock::new();
        let re = VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        match &self.data_dir {
            Some(dir) => validate_path("data_dir", dir)?,
            None => {
                return Err(PlacerError::ConfigError {
                    message: "no data directory given".to_string(),
                })
            }
        }

        validate_file_name("store.candidates_file", &self.store.candidates_file)?;
        validate_file_name("store.blocks_file", &self.store.blocks_file)?;
        validate_file_name("store.places_file", &self.store.places_file)?;
        validate_extension("store.placement_extension", &self.store.placement_extension)?;
        validate_extension("store.adjustment_extension", &self.store.adjustment_extension)?;

        if self.store.placement_extension == self.store.adjustment_extension {
            return Err(PlacerError::InvalidConfigValueError {
                field: "store.adjustment_extension".to_string(),
                value: self.store.adjustment_extension.clone(),
                reason: "Must differ from store.placement_extension".to_string(),
            });
        }

        validate_one_of(
            "logging.level",
            &self.logging.level,
            &["error", "warn", "info", "debug", "trace"],
        )?;

        Ok(())
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }
}

impl ConfigProvider for PlacerConfig {
    fn data_dir(&self) -> &str {
        self.data_dir.as_deref().unwrap_or(".")
    }

    fn candidates_file(&self) -> &str {
        &self.store.candidates_file
    }

    fn blocks_file(&self) -> &str {
        &self.store.blocks_file
    }

    fn places_file(&self) -> &str {
        &self.store.places_file
    }

    fn placement_extension(&self) -> &str {
        &self.store.placement_extension
    }

    fn adjustment_extension(&self) -> &str {
        &self.store.adjustment_extension
    }

    fn reuse_policy(&self) -> ReusePolicy {
        self.allocation.policy
    }

    fn report_format(&self) -> ReportFormat {
        self.report.format
    }
}

impl Validate for PlacerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
