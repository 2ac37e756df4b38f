//! Domain module - listing records and the rules that shape them
//!
//! Everything here is pure: no I/O, no clock reads except where a timestamp
//! is passed in. Each concern lives in its own file under `domain/`.

pub mod constants;
pub mod extractors;
pub mod ledger;
pub mod listing;
pub mod pagination;
pub mod result_set;

pub use extractors::{
    BrandMatcher, extract_brand_model, extract_fuel_type, extract_mileage, extract_number,
    extract_price, extract_year,
};
pub use ledger::{DeduplicationLedger, IdentityKey};
pub use listing::{CarListing, FuelType, ListingCandidate, PriceWindow, RawCard, UNKNOWN};
pub use pagination::{CrawlState, StopReason, StuckDetector};
pub use result_set::{PriceStats, ResultSet, ResultSummary};
