// Copyright 2026 RentScout Contributors
// SPDX-License-Identifier: MIT

//! RentScout: discover the best-known rent per unit size for a residential
//! society by probing a listings site, falling back to web search, and
//! mining the listing pages it finds.

pub mod aggregate;
pub mod candidates;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod http_client;
pub mod normalize;
pub mod search;
pub mod types;
pub mod validate;

pub use aggregate::AggregationTable;
pub use candidates::build_candidates;
pub use config::DiscoveryConfig;
pub use discovery::{classify_page, Discoverer};
pub use error::{ConfigError, DiscoveryError, SearchError, TransportError};
pub use extract::{bhk_from_text, listing_urls_from_page, rent_from_text, rent_from_url};
pub use fetch::{fetch_with_retry, FetchOutcome, FetchStatus};
pub use http_client::{HttpClient, HttpResponse, Transport};
pub use normalize::slugify;
pub use search::{DuckDuckGoSearch, SearchHit, SearchProvider};
pub use types::*;
pub use validate::{is_bad_listing, is_sane, matches_society};
