//! HTTP page source for static results pages
//!
//! Each page is fetched with `reqwest`, parsed into owned card fragments and
//! kept until the next advance. Pagination follows the href of the page's
//! "next" control.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::application::{CardField, CardHandle, PageSource, Paginator};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::parsing::{CardListParser, ParsedPage};
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};
use crate::infrastructure::sites::SiteProfile;

pub struct HttpListingSource {
    client: Client,
    parser: CardListParser,
    current_url: Url,
    page_number: u32,
    page: Option<ParsedPage>,
    timeout: Duration,
}

impl HttpListingSource {
    pub fn new(
        start_url: Url,
        parser: CardListParser,
        user_agent: &str,
        timeout: Duration,
    ) -> ScrapeResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ScrapeError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            parser,
            current_url: start_url,
            page_number: 1,
            page: None,
            timeout,
        })
    }

    pub fn for_site(site: &SiteProfile, config: &AppConfig) -> anyhow::Result<Self> {
        let parser = CardListParser::new(&site.selectors)?;
        let start_url = site.start_url(config.filters.max_price)?;
        Ok(Self::new(
            start_url,
            parser,
            &config.crawl.user_agent,
            Duration::from_secs(config.crawl.navigation_timeout_seconds),
        )?)
    }

    pub fn current_url(&self) -> &Url {
        &self.current_url
    }

    async fn fetch(&self, url: &Url) -> ScrapeResult<String> {
        debug!("🔄 Fetching {}", url);
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT_LANGUAGE, "fr-FR,fr;q=0.9")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScrapeError::Timeout {
                        page: self.page_number,
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    ScrapeError::navigation(self.page_number, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("❌ HTTP error {}: {}", status, url);
            return Err(ScrapeError::HttpRequestFailed {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ScrapeError::navigation(self.page_number, e.to_string()))
    }

    /// Fetch and parse `url`; the current page is only replaced on success.
    async fn load(&mut self, url: Url) -> ScrapeResult<()> {
        let html = self.fetch(&url).await?;
        let parsed = self.parser.parse_page(&html);

        if let Some(marker) = &parsed.block_marker {
            return Err(ScrapeError::blocked(url.as_str(), marker));
        }

        info!("✅ Loaded page {} ({} cards): {}", self.page_number, parsed.cards.len(), url);
        self.current_url = url;
        self.page = Some(parsed);
        Ok(())
    }

    fn parsed(&self) -> ScrapeResult<&ParsedPage> {
        self.page
            .as_ref()
            .ok_or_else(|| ScrapeError::fatal("no page loaded"))
    }
}

#[async_trait]
impl PageSource for HttpListingSource {
    async fn current_cards(&mut self) -> ScrapeResult<Vec<CardHandle>> {
        if self.page.is_none() {
            let url = self.current_url.clone();
            self.load(url).await?;
        }
        Ok(self.parsed()?.handles())
    }

    fn card_text(&self, card: CardHandle, field: CardField) -> ScrapeResult<Option<String>> {
        self.parsed()?.card_text(card, field)
    }

    fn card_href(&self, card: CardHandle) -> ScrapeResult<Option<String>> {
        self.parsed()?.card_href(card)
    }
}

#[async_trait]
impl Paginator for HttpListingSource {
    fn has_next(&self) -> bool {
        self.page.as_ref().is_some_and(|p| p.next_href.is_some())
    }

    async fn advance(&mut self) -> ScrapeResult<()> {
        let next_page = self.page_number + 1;
        let href = self
            .page
            .as_ref()
            .and_then(|p| p.next_href.clone())
            .ok_or_else(|| ScrapeError::navigation(next_page, "no next page control"))?;
        let url = self
            .current_url
            .join(&href)
            .map_err(|e| ScrapeError::navigation(next_page, format!("bad next href '{href}': {e}")))?;

        if url == self.current_url {
            return Err(ScrapeError::navigation(next_page, "next page points to the current page"));
        }

        self.page_number = next_page;
        self.load(url).await
    }
}
