//! Crawl loop - the pagination state machine
//!
//! `Fetching(n) -> Extracting(n) -> Paginating(n) -> Fetching(n+1) | Done`.
//! One page in flight, one card at a time. Every run owns a fresh ledger and
//! result set, and never returns an error: faults end up in the outcome.

use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::normalizer::{ListingNormalizer, Rejection};
use super::ports::{CardField, CardHandle, PageSource, Paginator};
use crate::domain::constants::crawling::{
    DEFAULT_MAX_RESULTS, DEFAULT_NAVIGATION_TIMEOUT_SECS, DEFAULT_REQUEST_DELAY_MS,
    DEFAULT_STUCK_REPEAT_THRESHOLD,
};
use crate::domain::{CrawlState, DeduplicationLedger, RawCard, ResultSet, StopReason, StuckDetector};
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};

/// Per-run limits and pacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    pub max_results: usize,
    pub max_pages: Option<u32>,
    pub navigation_timeout: Duration,
    /// Politeness delay before each page advance.
    pub request_delay: Duration,
    pub stuck_detection: bool,
    pub stuck_threshold: u32,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            max_pages: None,
            navigation_timeout: Duration::from_secs(DEFAULT_NAVIGATION_TIMEOUT_SECS),
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            stuck_detection: true,
            stuck_threshold: DEFAULT_STUCK_REPEAT_THRESHOLD,
        }
    }
}

/// Counters of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlCounters {
    pub cards_seen: usize,
    pub rejected_empty_title: usize,
    pub rejected_brand: usize,
    pub rejected_not_car: usize,
    pub duplicates: usize,
    pub card_faults: usize,
}

impl CrawlCounters {
    fn record_rejection(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::EmptyTitle => self.rejected_empty_title += 1,
            Rejection::BrandFiltered => self.rejected_brand += 1,
            Rejection::NotACarListing => self.rejected_not_car += 1,
        }
    }

    pub fn rejected(&self) -> usize {
        self.rejected_empty_title + self.rejected_brand + self.rejected_not_car
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlOutcome {
    pub run_id: Uuid,
    pub results: ResultSet,
    pub stop_reason: StopReason,
    pub pages_visited: u32,
    pub counters: CrawlCounters,
    /// The fault that ended the run, if any.
    #[serde(skip)]
    pub fault: Option<ScrapeError>,
}

impl CrawlOutcome {
    pub fn is_partial(&self) -> bool {
        matches!(self.stop_reason, StopReason::NavigationFault(_))
    }
}

pub struct CrawlLoop {
    normalizer: ListingNormalizer,
    options: CrawlOptions,
    site_name: String,
}

impl CrawlLoop {
    pub fn new(normalizer: ListingNormalizer, options: CrawlOptions) -> Self {
        Self {
            normalizer,
            options,
            site_name: "unnamed".to_string(),
        }
    }

    pub fn with_site_name(mut self, name: impl Into<String>) -> Self {
        self.site_name = name.into();
        self
    }

    pub async fn run<S>(&self, site: &mut S) -> CrawlOutcome
    where
        S: PageSource + Paginator + ?Sized,
    {
        let run_id = Uuid::new_v4();
        let span = info_span!("crawl", run_id = %run_id, site = %self.site_name);
        self.drive(run_id, site).instrument(span).await
    }

    async fn drive<S>(&self, run_id: Uuid, site: &mut S) -> CrawlOutcome
    where
        S: PageSource + Paginator + ?Sized,
    {
        let mut run = Run::new(run_id, &self.options);
        info!("🚗 Starting crawl (max {} results)", self.options.max_results);

        let mut state = CrawlState::initial();
        let mut handles: Vec<CardHandle> = Vec::new();

        loop {
            state = match state {
                CrawlState::Fetching(page) => match self.navigate(page, site.current_cards()).await {
                    Ok(cards) => {
                        run.pages_visited = page;
                        info!("📄 Page {}: {} cards", page, cards.len());
                        handles = cards;
                        if handles.is_empty() {
                            run.finish(StopReason::NoCards)
                        } else {
                            CrawlState::Extracting(page)
                        }
                    }
                    Err(err) => run.fault(page, err),
                },
                CrawlState::Extracting(page) => {
                    self.extract_page(&mut run, &*site, &handles);
                    CrawlState::Paginating(page)
                }
                CrawlState::Paginating(page) => {
                    self.paginate(&mut run, site, page, handles.len()).await
                }
                CrawlState::Done => break,
            };
        }

        let outcome = run.into_outcome();
        info!(
            "🏁 Crawl finished: {} listings, {} pages, stop reason: {}",
            outcome.results.len(),
            outcome.pages_visited,
            outcome.stop_reason
        );
        outcome
    }

    fn extract_page<S>(&self, run: &mut Run, site: &S, handles: &[CardHandle])
    where
        S: PageSource + ?Sized,
    {
        for (index, &handle) in handles.iter().enumerate() {
            if run.results.len() >= self.options.max_results {
                debug!("Maximum reached, skipping remaining cards of the page");
                break;
            }
            run.counters.cards_seen += 1;

            let card = match read_card(site, handle) {
                Ok(card) => card,
                Err(err) => {
                    warn!("⚠️ Skipping card {}: {}", index, err);
                    run.counters.card_faults += 1;
                    continue;
                }
            };

            let candidate = match self.normalizer.normalize(card) {
                Ok(candidate) => candidate,
                Err(rejection) => {
                    debug!("Card {} rejected: {}", index, rejection);
                    run.counters.record_rejection(rejection);
                    continue;
                }
            };

            if !run.ledger.accept(&candidate) {
                debug!("Card {} is a duplicate", index);
                run.counters.duplicates += 1;
                continue;
            }
            run.results.push(candidate.into_listing(Utc::now()));
        }
    }

    async fn paginate<S>(&self, run: &mut Run, site: &mut S, page: u32, card_count: usize) -> CrawlState
    where
        S: PageSource + Paginator + ?Sized,
    {
        if run.results.len() >= self.options.max_results {
            return run.finish(StopReason::MaxResults);
        }
        if self.options.stuck_detection && run.stuck.observe(card_count) {
            info!("Card count stuck at {}, stopping", card_count);
            return run.finish(StopReason::Stuck);
        }
        if self.options.max_pages.is_some_and(|max| page >= max) {
            return run.finish(StopReason::MaxPages);
        }
        if !site.has_next() {
            return run.finish(StopReason::NoNextPage);
        }

        if !self.options.request_delay.is_zero() {
            tokio::time::sleep(self.options.request_delay).await;
        }

        match self.navigate(page + 1, site.advance()).await {
            Ok(()) => CrawlState::Fetching(page + 1),
            Err(err) => run.fault(page + 1, err),
        }
    }

    /// Bounds one page operation by the navigation timeout.
    async fn navigate<T, F>(&self, page: u32, operation: F) -> ScrapeResult<T>
    where
        F: Future<Output = ScrapeResult<T>>,
    {
        let timeout = self.options.navigation_timeout;
        tokio::time::timeout(timeout, operation)
            .await
            .unwrap_or_else(|_| {
                Err(ScrapeError::Timeout {
                    page,
                    seconds: timeout.as_secs(),
                })
            })
    }
}

fn read_card<S>(site: &S, handle: CardHandle) -> ScrapeResult<RawCard>
where
    S: PageSource + ?Sized,
{
    Ok(RawCard {
        title: site.card_text(handle, CardField::Title)?,
        subtitle: site.card_text(handle, CardField::Subtitle)?,
        body: site.card_text(handle, CardField::Body)?,
        price_text: site.card_text(handle, CardField::Price)?,
        href: site.card_href(handle)?,
    })
}

/// Mutable state of one run.
struct Run {
    run_id: Uuid,
    ledger: DeduplicationLedger,
    results: ResultSet,
    stuck: StuckDetector,
    counters: CrawlCounters,
    pages_visited: u32,
    stop_reason: Option<StopReason>,
    fault: Option<ScrapeError>,
}

impl Run {
    fn new(run_id: Uuid, options: &CrawlOptions) -> Self {
        Self {
            run_id,
            ledger: DeduplicationLedger::new(),
            results: ResultSet::new(),
            stuck: StuckDetector::new(options.stuck_threshold),
            counters: CrawlCounters::default(),
            pages_visited: 0,
            stop_reason: None,
            fault: None,
        }
    }

    fn finish(&mut self, reason: StopReason) -> CrawlState {
        self.stop_reason = Some(reason);
        CrawlState::Done
    }

    /// A fault before any page was read leaves the source unusable; later
    /// ones keep what was collected.
    fn fault(&mut self, page: u32, err: ScrapeError) -> CrawlState {
        let reason = if self.pages_visited == 0 {
            warn!("❌ Page source unusable: {}", err);
            self.results = ResultSet::new();
            StopReason::Fatal(err.to_string())
        } else {
            warn!("⚠️ Navigation to page {} failed, keeping partial results: {}", page, err);
            StopReason::NavigationFault(err.to_string())
        };
        self.fault = Some(err);
        self.finish(reason)
    }

    fn into_outcome(self) -> CrawlOutcome {
        CrawlOutcome {
            run_id: self.run_id,
            results: self.results,
            stop_reason: self.stop_reason.unwrap_or(StopReason::NoNextPage),
            pages_visited: self.pages_visited,
            counters: self.counters,
            fault: self.fault,
        }
    }
}
