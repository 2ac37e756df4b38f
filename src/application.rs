//! Application layer
//!
//! The crawl loop and the normalizer it feeds, plus the traits through
//! which they reach page sources and exporters.

pub mod crawl_loop;
pub mod normalizer;
pub mod ports;

pub use crawl_loop::{CrawlCounters, CrawlLoop, CrawlOptions, CrawlOutcome};
pub use normalizer::{ListingNormalizer, Rejection};
pub use ports::{CardField, CardHandle, Exporter, PageSource, Paginator};
