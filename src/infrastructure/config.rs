//! Configuration infrastructure
//!
//! One JSON file under the user config directory, created with defaults on
//! first run. Values are read through the `config` crate so that
//! `CARSCRAPE__SECTION__KEY` environment variables override the file, e.g.
//! `CARSCRAPE__CRAWL__MAX_RESULTS=200`.

use anyhow::{Context, Result};
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::info;

use crate::application::CrawlOptions;
use crate::domain::constants::{brands::BRAND_TABLE, keywords::CAR_KEYWORDS};
use crate::domain::BrandMatcher;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub crawl: CrawlConfig,
    pub filters: FilterConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
    pub vocabulary: VocabularyConfig,
}

/// Crawl limits and pacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Site profile name ("leboncoin", "topannonces", "paruvendu")
    pub site: String,

    /// Maximum number of listings collected per run
    pub max_results: usize,

    /// Optional bound on visited pages
    pub max_pages: Option<u32>,

    /// Per-navigation timeout in seconds
    pub navigation_timeout_seconds: u64,

    /// Delay between page advances in milliseconds
    pub request_delay_ms: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Stop when the card count stops changing between pages
    pub stuck_detection: bool,

    /// Equal consecutive counts tolerated before stopping
    pub stuck_repeat_threshold: u32,
}

/// Candidate filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Only keep titles mentioning one of these brands (empty = all)
    pub brand_allow_list: Vec<String>,

    /// Upper price bound pushed into the search URL where the site supports it
    pub max_price: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub formats: Vec<ExportFormat>,

    /// Presentation sort: highest price first, unknown prices last
    pub sort_by_price_desc: bool,

    pub file_stem: String,

    /// Append `_YYYYMMDD_HHMMSS` to the file stem
    pub timestamped: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log directory; defaults to `logs/` under the app data directory
    pub log_dir: Option<PathBuf>,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

/// One brand table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandEntry {
    pub pattern: String,
    pub canonical: String,
}

/// Ordered vocabularies used by the normalizer. Order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub brands: Vec<BrandEntry>,
    pub car_keywords: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            site: defaults::SITE.to_string(),
            max_results: defaults::MAX_RESULTS,
            max_pages: None,
            navigation_timeout_seconds: defaults::NAVIGATION_TIMEOUT_SECONDS,
            request_delay_ms: defaults::REQUEST_DELAY_MS,
            user_agent: defaults::USER_AGENT.to_string(),
            stuck_detection: true,
            stuck_repeat_threshold: defaults::STUCK_REPEAT_THRESHOLD,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
            formats: vec![ExportFormat::Csv, ExportFormat::Json],
            sort_by_price_desc: true,
            file_stem: defaults::FILE_STEM.to_string(),
            timestamped: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
            max_files: defaults::LOG_MAX_FILES,
            module_filters: HashMap::new(),
        }
    }
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            brands: BRAND_TABLE
                .iter()
                .map(|(pattern, canonical)| BrandEntry {
                    pattern: pattern.to_string(),
                    canonical: canonical.to_string(),
                })
                .collect(),
            car_keywords: CAR_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl CrawlConfig {
    pub fn to_options(&self) -> CrawlOptions {
        CrawlOptions {
            max_results: self.max_results,
            max_pages: self.max_pages,
            navigation_timeout: Duration::from_secs(self.navigation_timeout_seconds),
            request_delay: Duration::from_millis(self.request_delay_ms),
            stuck_detection: self.stuck_detection,
            stuck_threshold: self.stuck_repeat_threshold,
        }
    }
}

impl VocabularyConfig {
    pub fn brand_matcher(&self) -> Result<BrandMatcher> {
        BrandMatcher::new(
            self.brands
                .iter()
                .map(|b| (b.pattern.as_str(), b.canonical.as_str())),
        )
        .context("Invalid brand table in vocabulary configuration")
    }
}

/// Loads and saves [`AppConfig`]
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Get application data directory
    pub fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(data_dir)
    }

    pub fn new() -> Result<Self> {
        Ok(Self::with_path(Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME)))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration, writing the defaults first when no file exists
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            info!("🎉 First run detected - creating default configuration: {:?}", self.config_path);
            self.save_config(&AppConfig::default()).await?;
        }

        let config = config::Config::builder()
            .add_source(File::from(self.config_path.as_path()).format(FileFormat::Json))
            .add_source(
                Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("filters.brand_allow_list")
                    .with_list_parse_key("export.formats"),
            )
            .build()
            .with_context(|| format!("Failed to read configuration file {:?}", self.config_path))?
            .try_deserialize::<AppConfig>()
            .context("Configuration file has an invalid structure")?;

        info!("Loaded configuration from: {:?}", self.config_path);
        Ok(config)
    }

    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    pub async fn reset_to_defaults(&self) -> Result<AppConfig> {
        let config = AppConfig::default();
        self.save_config(&config).await?;
        Ok(config)
    }
}

/// Default configuration values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "car-listings-scraper";
    pub const CONFIG_FILE_NAME: &str = "config.json";
    pub const ENV_PREFIX: &str = "CARSCRAPE";

    pub const SITE: &str = "leboncoin";
    pub const MAX_RESULTS: usize = crate::domain::constants::crawling::DEFAULT_MAX_RESULTS;
    pub const NAVIGATION_TIMEOUT_SECONDS: u64 =
        crate::domain::constants::crawling::DEFAULT_NAVIGATION_TIMEOUT_SECS;
    pub const REQUEST_DELAY_MS: u64 = crate::domain::constants::crawling::DEFAULT_REQUEST_DELAY_MS;
    pub const STUCK_REPEAT_THRESHOLD: u32 =
        crate::domain::constants::crawling::DEFAULT_STUCK_REPEAT_THRESHOLD;
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    pub const OUTPUT_DIR: &str = "output";
    pub const FILE_STEM: &str = "car_listings";

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_MAX_FILES: u32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn first_load_writes_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));

        let config = manager.load_config().await.unwrap();
        assert_eq!(config.crawl.max_results, 50);
        assert_eq!(config.crawl.site, "leboncoin");
        assert!(manager.config_path().exists());
    }

    #[tokio::test]
    async fn saved_values_are_loaded_back() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json"));

        let mut config = AppConfig::default();
        config.crawl.max_results = 120;
        config.crawl.max_pages = Some(4);
        config.filters.brand_allow_list = vec!["Peugeot".into(), "Renault".into()];
        config.export.formats = vec![ExportFormat::Json];
        manager.save_config(&config).await.unwrap();

        assert_eq!(manager.load_config().await.unwrap(), config);
    }

    #[tokio::test]
    async fn missing_sections_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "crawl": { "max_results": 10 } }"#).unwrap();

        let config = ConfigManager::with_path(&path).load_config().await.unwrap();
        assert_eq!(config.crawl.max_results, 10);
        assert_eq!(config.crawl.navigation_timeout_seconds, 30);
        assert_eq!(config.vocabulary, VocabularyConfig::default());
    }

    #[test]
    fn crawl_options_follow_config() {
        let options = CrawlConfig::default().to_options();
        assert_eq!(options.navigation_timeout, Duration::from_secs(30));
        assert_eq!(options.request_delay, Duration::from_millis(2000));
        assert!(options.stuck_detection);
    }

    #[test]
    fn default_vocabulary_builds_matcher() {
        let matcher = VocabularyConfig::default().brand_matcher().unwrap();
        assert_eq!(matcher.brand("vends Land Rover Defender"), Some("Land Rover"));
    }
}
