//! Pagination state machine vocabulary.
//!
//! Responsibility:
//! - crawl states and the reasons a crawl ends
//! - stuck detection for "load more" pages that stop growing

use serde::Serialize;
use std::fmt;

/// States of the crawl loop. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Fetching(u32),
    Extracting(u32),
    Paginating(u32),
    Done,
}

impl CrawlState {
    pub fn initial() -> Self {
        Self::Fetching(1)
    }
}

/// Why a crawl ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum StopReason {
    /// The page returned no cards.
    NoCards,
    /// The requested number of listings was collected.
    MaxResults,
    /// The card count stopped changing between pages.
    Stuck,
    /// The configured page bound was reached.
    MaxPages,
    /// No actionable "next page" control.
    NoNextPage,
    /// Advancing or reading a page failed after at least one page was read.
    NavigationFault(String),
    /// The source was unusable from the first page on.
    Fatal(String),
}

impl StopReason {
    /// `true` for endings caused by a fault rather than by running out of content.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::NavigationFault(_) | Self::Fatal(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCards => f.write_str("no cards on page"),
            Self::MaxResults => f.write_str("maximum results reached"),
            Self::Stuck => f.write_str("card count stopped changing"),
            Self::MaxPages => f.write_str("page limit reached"),
            Self::NoNextPage => f.write_str("no next page"),
            Self::NavigationFault(reason) => write!(f, "navigation fault: {reason}"),
            Self::Fatal(reason) => write!(f, "fatal fault: {reason}"),
        }
    }
}

/// Detects a page source that keeps returning the same number of cards.
///
/// `threshold` is the number of consecutive repeats tolerated: with the
/// default of 1, two consecutive fetches with the same non-empty count stop
/// the crawl.
#[derive(Debug, Clone)]
pub struct StuckDetector {
    previous: Option<usize>,
    repeats: u32,
    threshold: u32,
}

impl StuckDetector {
    pub fn new(threshold: u32) -> Self {
        Self {
            previous: None,
            repeats: 0,
            threshold: threshold.max(1),
        }
    }

    /// Records the card count of the page just fetched and reports whether
    /// the crawl is stuck.
    pub fn observe(&mut self, card_count: usize) -> bool {
        if card_count > 0 && self.previous == Some(card_count) {
            self.repeats += 1;
        } else {
            self.repeats = 0;
        }
        self.previous = Some(card_count);
        self.repeats >= self.threshold
    }
}

impl Default for StuckDetector {
    fn default() -> Self {
        Self::new(crate::domain::constants::crawling::DEFAULT_STUCK_REPEAT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_equal_counts_are_stuck_with_default_threshold() {
        let mut detector = StuckDetector::default();
        assert!(!detector.observe(35));
        assert!(detector.observe(35));
    }

    #[test]
    fn growing_counts_are_not_stuck() {
        let mut detector = StuckDetector::default();
        assert!(!detector.observe(20));
        assert!(!detector.observe(40));
        assert!(!detector.observe(60));
    }

    #[test]
    fn higher_threshold_needs_more_repeats() {
        let mut detector = StuckDetector::new(2);
        assert!(!detector.observe(10));
        assert!(!detector.observe(10));
        assert!(detector.observe(10));
    }

    #[test]
    fn a_change_resets_the_repeat_count() {
        let mut detector = StuckDetector::new(2);
        detector.observe(10);
        detector.observe(10);
        assert!(!detector.observe(12));
        assert!(!detector.observe(12));
    }

    #[test]
    fn fault_reasons_are_flagged() {
        assert!(StopReason::Fatal("x".into()).is_fault());
        assert!(StopReason::NavigationFault("x".into()).is_fault());
        assert!(!StopReason::NoNextPage.is_fault());
        assert_eq!(CrawlState::initial(), CrawlState::Fetching(1));
    }
}
