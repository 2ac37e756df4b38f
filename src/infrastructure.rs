//! Infrastructure layer
//!
//! Page sources, HTML parsing, exporters, configuration, logging and the
//! scraping error taxonomy.

pub mod config;
pub mod export;
pub mod http_source;
pub mod logging;
pub mod parsing;
pub mod scrape_error;
pub mod sites;
pub mod snapshot_source;

pub use config::{AppConfig, ConfigManager, ExportFormat};
pub use export::{CsvExporter, JsonExporter, export_all};
pub use http_source::HttpListingSource;
pub use logging::{init_logging, init_logging_with_config};
pub use parsing::{CardListParser, CardSelectors};
pub use scrape_error::{FaultLevel, ScrapeError, ScrapeResult};
pub use sites::SiteProfile;
pub use snapshot_source::SnapshotListingSource;
