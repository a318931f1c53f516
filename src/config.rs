use crate::twitter::PageLimits;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub twitter: TwitterConfig,
    pub sheets: SheetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub api_base: String,
    /// Name of the environment variable holding the bearer token.
    pub bearer_token_env: String,
    pub page_min: usize,
    pub page_max: usize,
    /// Deepest a user timeline can be paged.
    pub max_total: usize,
    /// Unset means requests may block forever.
    pub request_timeout_secs: Option<u64>,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        let limits = PageLimits::default();
        Self {
            api_base: "https://api.twitter.com/2".to_string(),
            bearer_token_env: "BEARER_TOKEN".to_string(),
            page_min: limits.min,
            page_max: limits.max,
            max_total: 3200,
            request_timeout_secs: None,
        }
    }
}

impl TwitterConfig {
    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            min: self.page_min,
            max: self.page_max,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub api_base: String,
    pub spreadsheet_id: String,
    pub worksheet: String,
    /// Service-account JSON key downloaded from the Google Cloud console.
    pub key_file: PathBuf,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_base: "https://sheets.googleapis.com/v4".to_string(),
            spreadsheet_id: "spreadsheet_id".to_string(),
            worksheet: "Sheet1".to_string(),
            key_file: PathBuf::from("/path/to/your/file.json"),
        }
    }
}

impl SheetsConfig {
    pub fn document_url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}",
            self.spreadsheet_id
        )
    }
}

impl Config {
    /// `<config_dir>/tweetsheet/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tweetsheet").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let twitter = &self.twitter;
        if twitter.page_min == 0 {
            bail!("twitter.page_min must be at least 1");
        }
        if twitter.page_min > twitter.page_max {
            bail!(
                "twitter.page_min ({}) exceeds twitter.page_max ({})",
                twitter.page_min,
                twitter.page_max
            );
        }
        if self.sheets.worksheet.is_empty() {
            bail!("sheets.worksheet must not be empty");
        }
        Ok(())
    }
}
