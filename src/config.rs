use crate::error::{Error, Result};
use crate::types::Chamber;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_OPENLEG_URL: &str = "https://legislation.nysenate.gov/api/3";
pub const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com/v4";

/// Legislative data API settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenLegConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for OpenLegConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_OPENLEG_URL.to_string(),
        }
    }
}

/// Spreadsheet API settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub access_token: String,
    pub base_url: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            access_token: String::new(),
            base_url: DEFAULT_SHEETS_URL.to_string(),
        }
    }
}

/// Timeout and retry policy shared by every upstream request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before retry number `attempt` (0-based): `backoff_ms * 2^attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            backoff_ms: 500,
        }
    }
}

/// Configuration for a report run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session_year: u16,
    pub openleg: OpenLegConfig,
    pub sheets: SheetsConfig,
    pub http: HttpConfig,
    /// Bill lineages resolved at once
    pub concurrency: usize,
    /// Lineages longer than this are reported as likely upstream anomalies
    pub max_lineage_len: usize,
    pub chambers: Vec<Chamber>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_year: 2025,
            openleg: OpenLegConfig::default(),
            sheets: SheetsConfig::default(),
            http: HttpConfig::default(),
            concurrency: 4,
            max_lineage_len: 5,
            chambers: Chamber::all().to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Override secrets and ids from the environment
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(key) = std::env::var("OPENLEG_API_KEY") {
            self.openleg.api_key = key;
        }
        if let Ok(id) = std::env::var("SHEETS_SPREADSHEET_ID") {
            self.sheets.spreadsheet_id = id;
        }
        if let Ok(token) = std::env::var("SHEETS_ACCESS_TOKEN") {
            self.sheets.access_token = token;
        }
        if let Ok(year) = std::env::var("BILLROLL_SESSION_YEAR") {
            self.session_year = year
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid BILLROLL_SESSION_YEAR '{}'", year)))?;
        }
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.openleg.api_key.trim().is_empty() {
            return Err(Error::Config(
                "Missing legislative API key (openleg.api_key or OPENLEG_API_KEY)".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::Config("http.timeout_secs must be at least 1".to_string()));
        }
        if self.max_lineage_len == 0 {
            return Err(Error::Config("max_lineage_len must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Check the settings needed only by commands that touch the spreadsheet
    pub fn require_sheets(&self) -> Result<()> {
        if self.sheets.spreadsheet_id.trim().is_empty() {
            return Err(Error::Config(
                "Missing spreadsheet id (sheets.spreadsheet_id or SHEETS_SPREADSHEET_ID)"
                    .to_string(),
            ));
        }
        if self.sheets.access_token.trim().is_empty() {
            return Err(Error::Config(
                "Missing spreadsheet access token (sheets.access_token or SHEETS_ACCESS_TOKEN)"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for creating configurations
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        let mut config = Config::default();
        config.openleg.api_key = api_key.into();
        Self { config }
    }

    /// Start from an already loaded configuration
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub fn session_year(mut self, year: u16) -> Self {
        self.config.session_year = year;
        self
    }

    pub fn openleg_url(mut self, url: impl Into<String>) -> Self {
        self.config.openleg.base_url = url.into();
        self
    }

    pub fn spreadsheet(mut self, id: impl Into<String>, access_token: impl Into<String>) -> Self {
        self.config.sheets.spreadsheet_id = id.into();
        self.config.sheets.access_token = access_token.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn max_lineage_len(mut self, n: usize) -> Self {
        self.config.max_lineage_len = n;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.http.timeout_secs = secs;
        self
    }

    pub fn retries(mut self, max_retries: u32, backoff_ms: u64) -> Self {
        self.config.http.max_retries = max_retries;
        self.config.http.backoff_ms = backoff_ms;
        self
    }

    /// Set chambers from comma-separated string ("all" selects both)
    pub fn chambers_str(mut self, chambers: &str) -> Result<Self> {
        let mut selected = Vec::new();
        for part in chambers.split(',').map(str::trim) {
            if part.is_empty() {
                return Err(Error::Config("Empty chamber value".to_string()));
            }
            if part.eq_ignore_ascii_case("all") {
                selected = Chamber::all().to_vec();
                break;
            }
            let chamber: Chamber = part.parse()?;
            if !selected.contains(&chamber) {
                selected.push(chamber);
            }
        }
        self.config.chambers = selected;
        Ok(self)
    }

    /// Build the final configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_defaults_fill_missing_fields() {
        let config = Config::from_yaml(
            "session_year: 2023\nopenleg:\n  api_key: abc\nconcurrency: 2\n",
        )
        .unwrap();
        assert_eq!(config.session_year, 2023);
        assert_eq!(config.openleg.api_key, "abc");
        assert_eq!(config.openleg.base_url, DEFAULT_OPENLEG_URL);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.max_lineage_len, 5);
        assert_eq!(config.chambers, vec![Chamber::Senate, Chamber::Assembly]);
        config.validate().unwrap();
    }

    #[test]
    fn test_example_file_parses() {
        let config = Config::from_yaml(include_str!("../billroll.example.yml")).unwrap();
        assert_eq!(config.http.backoff_ms, 500);
        assert_eq!(config.chambers, Chamber::all().to_vec());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let result = ConfigBuilder::new("").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let result = ConfigBuilder::new("key").concurrency(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_chambers_str() {
        let config = ConfigBuilder::new("key")
            .chambers_str("assembly")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.chambers, vec![Chamber::Assembly]);

        let config = ConfigBuilder::new("key").chambers_str("all").unwrap().build().unwrap();
        assert_eq!(config.chambers.len(), 2);

        assert!(ConfigBuilder::new("key").chambers_str("senate,,").is_err());
    }

    #[test]
    fn test_backoff_doubles() {
        let http = HttpConfig {
            timeout_secs: 1,
            max_retries: 3,
            backoff_ms: 100,
        };
        assert_eq!(http.backoff(0), Duration::from_millis(100));
        assert_eq!(http.backoff(2), Duration::from_millis(400));
    }

    #[test]
    fn test_require_sheets() {
        let config = ConfigBuilder::new("key").build().unwrap();
        assert!(config.require_sheets().is_err());
        let config = ConfigBuilder::new("key").spreadsheet("sheet", "token").build().unwrap();
        config.require_sheets().unwrap();
    }
}
