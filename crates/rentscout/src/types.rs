//! Core data types flowing through the discovery pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DiscoveryError;

/// Label → best (maximum) monthly rent.
pub type RentTable = BTreeMap<String, u64>;

/// A validated discovery request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocietyQuery {
    pub society_name: String,
    pub city: String,
}

impl SocietyQuery {
    /// Trim both fields and reject empty ones.
    pub fn new(society_name: &str, city: &str) -> Result<Self, DiscoveryError> {
        let society_name = society_name.trim();
        let city = city.trim();
        if society_name.is_empty() {
            return Err(DiscoveryError::InvalidInput {
                field: "society",
                reason: "must not be empty",
            });
        }
        if city.is_empty() {
            return Err(DiscoveryError::InvalidInput {
                field: "city",
                reason: "must not be empty",
            });
        }
        Ok(Self {
            society_name: society_name.to_string(),
            city: city.to_string(),
        })
    }
}

/// Where a candidate listing URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrigin {
    DirectProbe,
    SearchFallback,
}

/// One page hypothesized to describe a rental in the society.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateUrl {
    pub url: String,
    pub origin: CandidateOrigin,
}

/// Normalized extraction result for one listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSignal {
    pub source_url: String,
    pub title: Option<String>,
    pub rent: Option<u64>,
    /// Always of the form `"<N> BHK"` with `N >= 1`.
    pub bhk_label: Option<String>,
}

/// Why a mined candidate produced no signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    FetchFailed { reason: String },
    SocietyMismatch,
    MissingRent,
    MissingBhk,
    Implausible { bhk: String, rent: u64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::FetchFailed { reason } => write!(f, "fetch failed: {reason}"),
            SkipReason::SocietyMismatch => write!(f, "society name not found in title or url"),
            SkipReason::MissingRent => write!(f, "no rent found"),
            SkipReason::MissingBhk => write!(f, "no BHK label found"),
            SkipReason::Implausible { bhk, rent } => {
                write!(f, "implausible rent {rent} for {bhk}")
            }
        }
    }
}

/// Per-candidate mining result: a usable signal or an inspectable skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum MiningResult {
    Signal(ListingSignal),
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningOutcome {
    pub url: String,
    pub result: MiningResult,
}

/// Winning listing for one BHK label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestRent {
    pub rent: u64,
    pub source_url: String,
}

/// Which phase produced the set of listing URLs that was mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DiscoveryOrigin {
    DirectProbe { probe_url: String },
    SearchFallback,
    NotFound,
}

/// Full result of one discovery request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub query: SocietyQuery,
    pub origin: DiscoveryOrigin,
    /// Deduplicated listing URLs that were mined, first-seen order.
    pub candidates: Vec<CandidateUrl>,
    /// One entry per mined candidate, in completion order.
    pub outcomes: Vec<MiningOutcome>,
    pub best: BTreeMap<String, BestRent>,
}

impl DiscoveryReport {
    pub fn rents(&self) -> RentTable {
        self.best
            .iter()
            .map(|(label, best)| (label.clone(), best.rent))
            .collect()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            MiningResult::Skip(reason) => Some((o.url.as_str(), reason)),
            MiningResult::Signal(_) => None,
        })
    }
}
