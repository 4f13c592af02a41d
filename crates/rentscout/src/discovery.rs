//! Discovery orchestrator: probe, fall back to search, mine, aggregate.
//!
//! ```text
//! Probing ──hit──▶ Mining ──▶ Done
//!    │                ▲
//!  miss               │ hit
//!    ▼                │
//! Searching ──miss──▶ Done (empty)
//! ```
//!
//! Probing is strictly sequential and stops at the first candidate whose page
//! yields listing links: probe order is priority order. Mining is the only
//! concurrent stage, bounded by `mining_concurrency`. Mining tasks never touch
//! the [`AggregationTable`]; their outcomes are folded in one at a time by the
//! orchestrator as they complete.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;

use crate::aggregate::AggregationTable;
use crate::candidates::build_candidates;
use crate::config::DiscoveryConfig;
use crate::error::Result;
use crate::extract::{
    bhk_from_title_or_url, listing_urls_from_page, parse_listing_page, rent_from_url_or_text,
};
use crate::fetch::{fetch_with_retry, FetchStatus};
use crate::http_client::{HttpClient, Transport};
use crate::search::{fallback_candidates, DuckDuckGoSearch, SearchProvider};
use crate::types::{
    CandidateOrigin, CandidateUrl, DiscoveryOrigin, DiscoveryReport, ListingSignal, MiningOutcome,
    MiningResult, RentTable, SkipReason, SocietyQuery,
};
use crate::validate::{is_sane, matches_society};

enum Stage {
    Probing,
    Searching,
    Mining {
        origin: DiscoveryOrigin,
        urls: Vec<String>,
    },
    Done {
        origin: DiscoveryOrigin,
        candidates: Vec<CandidateUrl>,
        outcomes: Vec<MiningOutcome>,
        table: AggregationTable,
    },
}

/// Runs discovery requests against one primary source.
///
/// Cheap to share behind an `Arc`; each request owns its own aggregation
/// state, nothing is kept between requests.
pub struct Discoverer {
    config: DiscoveryConfig,
    transport: Arc<dyn Transport>,
    search: Arc<dyn SearchProvider>,
}

impl Discoverer {
    /// Discoverer with the reqwest transport and DuckDuckGo fallback search.
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        let transport = Arc::new(HttpClient::new(&config)?);
        let search = Arc::new(DuckDuckGoSearch::new(&config)?);
        Self::with_collaborators(config, transport, search)
    }

    pub fn with_collaborators(
        config: DiscoveryConfig,
        transport: Arc<dyn Transport>,
        search: Arc<dyn SearchProvider>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            search,
        })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// BHK label → best observed rent. Empty when nothing qualified.
    ///
    /// Fails only on empty society or city.
    pub async fn discover(&self, society: &str, city: &str) -> Result<RentTable> {
        Ok(self.discover_report(society, city).await?.rents())
    }

    /// Like [`discover`](Self::discover), with the origin of the mined set and
    /// the per-candidate outcomes.
    pub async fn discover_report(&self, society: &str, city: &str) -> Result<DiscoveryReport> {
        let query = SocietyQuery::new(society, city)?;
        let mut stage = Stage::Probing;

        loop {
            stage = match stage {
                Stage::Probing => match self.probe(&query).await {
                    Some((probe_url, urls)) => {
                        tracing::info!("probe hit {probe_url}: {} listing link(s)", urls.len());
                        Stage::Mining {
                            origin: DiscoveryOrigin::DirectProbe { probe_url },
                            urls,
                        }
                    }
                    None => Stage::Searching,
                },
                Stage::Searching => {
                    tracing::info!(
                        "no probe candidate for {:?}/{:?} yielded listings, trying search",
                        query.society_name,
                        query.city
                    );
                    let urls = fallback_candidates(self.search.as_ref(), &query, &self.config).await;
                    if urls.is_empty() {
                        Stage::Done {
                            origin: DiscoveryOrigin::NotFound,
                            candidates: Vec::new(),
                            outcomes: Vec::new(),
                            table: AggregationTable::new(),
                        }
                    } else {
                        Stage::Mining {
                            origin: DiscoveryOrigin::SearchFallback,
                            urls,
                        }
                    }
                }
                Stage::Mining { origin, urls } => {
                    let kind = match origin {
                        DiscoveryOrigin::SearchFallback => CandidateOrigin::SearchFallback,
                        _ => CandidateOrigin::DirectProbe,
                    };
                    let candidates = dedup_candidates(urls, kind);
                    let (outcomes, table) = self.mine(&query, &candidates).await;
                    Stage::Done {
                        origin,
                        candidates,
                        outcomes,
                        table,
                    }
                }
                Stage::Done {
                    origin,
                    candidates,
                    outcomes,
                    table,
                } => {
                    return Ok(DiscoveryReport {
                        query,
                        origin,
                        candidates,
                        outcomes,
                        best: table.into_best(),
                    });
                }
            };
        }
    }

    /// First probe URL whose page carries listing links, with those links.
    async fn probe(&self, query: &SocietyQuery) -> Option<(String, Vec<String>)> {
        let probes = build_candidates(&self.config, &query.society_name, &query.city);
        for probe_url in probes {
            let outcome = fetch_with_retry(
                self.transport.as_ref(),
                &probe_url,
                self.config.max_attempts,
                self.config.base_backoff(),
            )
            .await;

            if let FetchStatus::Failed(reason) = &outcome.status {
                tracing::debug!("probe {probe_url} failed after {} attempt(s): {reason}", outcome.attempts);
                continue;
            }

            let urls = listing_urls_from_page(&outcome.body, &self.config);
            if urls.is_empty() {
                tracing::debug!("probe {probe_url} has no listing links");
                continue;
            }
            return Some((probe_url, urls));
        }
        None
    }

    async fn mine(
        &self,
        query: &SocietyQuery,
        candidates: &[CandidateUrl],
    ) -> (Vec<MiningOutcome>, AggregationTable) {
        let mut table = AggregationTable::new();
        let mut outcomes = Vec::with_capacity(candidates.len());

        let urls: Vec<String> = candidates.iter().map(|c| c.url.clone()).collect();
        let mut results = stream::iter(urls)
            .map(|url| async move {
                let result = self.mine_one(query, &url).await;
                MiningOutcome { url, result }
            })
            .buffer_unordered(self.config.mining_concurrency);

        while let Some(outcome) = results.next().await {
            match &outcome.result {
                MiningResult::Signal(signal) => {
                    table.merge_signal(signal);
                }
                MiningResult::Skip(reason) => {
                    tracing::debug!("skip {}: {reason}", outcome.url);
                }
            }
            outcomes.push(outcome);
        }

        tracing::info!(
            "mined {} candidate(s): {} label(s) aggregated",
            candidates.len(),
            table.len()
        );
        (outcomes, table)
    }

    async fn mine_one(&self, query: &SocietyQuery, url: &str) -> MiningResult {
        let outcome = fetch_with_retry(
            self.transport.as_ref(),
            url,
            self.config.max_attempts,
            self.config.base_backoff(),
        )
        .await;

        match outcome.status {
            FetchStatus::Ok => classify_page(query, url, &outcome.body),
            FetchStatus::Failed(reason) => MiningResult::Skip(SkipReason::FetchFailed { reason }),
        }
    }
}

/// Turn one fetched listing page into a signal or a skip.
///
/// Checks run in a fixed order: society match, rent (URL then text), BHK
/// (title then URL), plausibility.
pub fn classify_page(query: &SocietyQuery, url: &str, body: &str) -> MiningResult {
    let page = parse_listing_page(body);
    let title = page.title.as_deref();

    if !matches_society(title, url, &query.society_name) {
        return MiningResult::Skip(SkipReason::SocietyMismatch);
    }
    let Some(rent) = rent_from_url_or_text(url, &page.text) else {
        return MiningResult::Skip(SkipReason::MissingRent);
    };
    let Some(bhk) = bhk_from_title_or_url(title, url) else {
        return MiningResult::Skip(SkipReason::MissingBhk);
    };
    if !is_sane(&bhk, rent) {
        return MiningResult::Skip(SkipReason::Implausible { bhk, rent });
    }

    MiningResult::Signal(ListingSignal {
        source_url: url.to_string(),
        title: page.title,
        rent: Some(rent),
        bhk_label: Some(bhk),
    })
}

fn dedup_candidates(urls: Vec<String>, origin: CandidateOrigin) -> Vec<CandidateUrl> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|u| seen.insert(u.clone()))
        .map(|url| CandidateUrl { url, origin })
        .collect()
}
