//! Scraping error types
//!
//! Faults are graded by how far they propagate: a field fault only nulls
//! one field, a card fault skips one card, a page fault ends the crawl with
//! partial results and a fatal fault ends it with none.

use thiserror::Error;

/// How much of a crawl a fault invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FaultLevel {
    Field,
    Card,
    Page,
    Fatal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("Field '{field}' could not be extracted from '{input}'")]
    Extraction { field: String, input: String },

    #[error("Card {index} could not be read: {reason}")]
    Card { index: usize, reason: String },

    #[error("Navigation failed on page {page}: {reason}")]
    Navigation { page: u32, reason: String },

    #[error("Navigation timed out on page {page} after {seconds}s")]
    Timeout { page: u32, seconds: u64 },

    #[error("Page source unusable: {reason}")]
    Fatal { reason: String },

    #[error("Blocked by anti-bot protection at {url} (marker '{marker}')")]
    Blocked { url: String, marker: String },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("HTTP request failed: {status} - {url}")]
    HttpRequestFailed { status: u16, url: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ScrapeError {
    pub fn extraction(field: &str, input: &str) -> Self {
        Self::Extraction {
            field: field.to_string(),
            input: input.to_string(),
        }
    }

    pub fn card(index: usize, reason: impl Into<String>) -> Self {
        Self::Card {
            index,
            reason: reason.into(),
        }
    }

    pub fn navigation(page: u32, reason: impl Into<String>) -> Self {
        Self::Navigation {
            page,
            reason: reason.into(),
        }
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::Fatal {
            reason: reason.into(),
        }
    }

    pub fn blocked(url: &str, marker: &str) -> Self {
        Self::Blocked {
            url: url.to_string(),
            marker: marker.to_string(),
        }
    }

    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn fault_level(&self) -> FaultLevel {
        match self {
            Self::Extraction { .. } => FaultLevel::Field,
            Self::Card { .. } => FaultLevel::Card,
            Self::Navigation { .. } | Self::Timeout { .. } => FaultLevel::Page,
            Self::HttpRequestFailed { status, .. } if *status >= 500 || *status == 429 => {
                FaultLevel::Page
            }
            Self::HttpRequestFailed { .. }
            | Self::Fatal { .. }
            | Self::Blocked { .. }
            | Self::InvalidSelector { .. }
            | Self::Configuration { .. } => FaultLevel::Fatal,
        }
    }

    /// Check if the crawl can go on (possibly with less data) after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self.fault_level(), FaultLevel::Field | FaultLevel::Card)
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
