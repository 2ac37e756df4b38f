//! Deduplication ledger for one crawl run.

use std::collections::HashSet;

use super::listing::ListingCandidate;

/// Value used to detect a listing already accepted in this run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Url(String),
    /// Fallback when the card has no usable URL.
    Composite {
        title: String,
        price_eur: Option<u32>,
        location: String,
    },
}

impl IdentityKey {
    pub fn of(candidate: &ListingCandidate) -> Self {
        match candidate.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Self::Url(url.to_string()),
            _ => Self::Composite {
                title: candidate.title.trim().to_lowercase(),
                price_eur: candidate.price_eur,
                location: candidate.location.trim().to_lowercase(),
            },
        }
    }
}

/// Identity keys of accepted listings. Entries are never evicted; a ledger
/// lives exactly as long as the crawl that owns it.
#[derive(Debug, Default)]
pub struct DeduplicationLedger {
    seen: HashSet<IdentityKey>,
}

impl DeduplicationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the candidate's key and returns `true`, or returns `false`
    /// without touching the ledger when the key is already present.
    pub fn accept(&mut self, candidate: &ListingCandidate) -> bool {
        self.seen.insert(IdentityKey::of(candidate))
    }

    pub fn contains(&self, candidate: &ListingCandidate) -> bool {
        self.seen.contains(&IdentityKey::of(candidate))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, url: Option<&str>, price: Option<u32>) -> ListingCandidate {
        ListingCandidate {
            title: title.to_string(),
            brand: "Peugeot".into(),
            model: "208".into(),
            year: None,
            mileage_km: None,
            fuel_type: None,
            price_eur: price,
            location: "Lyon".into(),
            url: url.map(str::to_string),
        }
    }

    #[test]
    fn same_url_is_accepted_once() {
        let mut ledger = DeduplicationLedger::new();
        let first = candidate("Peugeot 208", Some("https://example.fr/ad/voitures/1"), Some(9000));
        let again = candidate("Peugeot 208 GT", Some("https://example.fr/ad/voitures/1"), Some(9500));

        assert!(ledger.accept(&first));
        assert!(!ledger.accept(&again));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn different_urls_are_both_accepted() {
        let mut ledger = DeduplicationLedger::new();
        assert!(ledger.accept(&candidate("A", Some("https://example.fr/1"), None)));
        assert!(ledger.accept(&candidate("A", Some("https://example.fr/2"), None)));
    }

    #[test]
    fn composite_key_used_without_url() {
        let mut ledger = DeduplicationLedger::new();
        let a = candidate("Renault Clio", None, Some(7000));
        let same = candidate("  renault clio ", Some("   "), Some(7000));
        let other_price = candidate("Renault Clio", None, Some(7100));

        assert!(ledger.accept(&a));
        assert!(!ledger.accept(&same));
        assert!(ledger.accept(&other_price));
    }

    #[test]
    fn rejected_duplicate_does_not_mutate() {
        let mut ledger = DeduplicationLedger::new();
        let a = candidate("A", Some("https://example.fr/1"), None);
        ledger.accept(&a);
        ledger.accept(&a);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains(&a));
    }
}
