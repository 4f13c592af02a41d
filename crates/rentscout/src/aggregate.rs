//! Max-per-label rent aggregation.

use std::collections::BTreeMap;

use crate::types::{BestRent, ListingSignal, RentTable};

/// BHK label → best rent seen so far.
///
/// Owned by one discovery request and written only by its orchestrator, so
/// merges are serialized by construction. `merge` is a max-reduce: the final
/// rents do not depend on the order signals arrive in. On equal rents the
/// first merged source URL is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationTable {
    best: BTreeMap<String, BestRent>,
}

impl AggregationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation in. Returns true if it became the label's best.
    pub fn merge(&mut self, label: &str, rent: u64, source_url: &str) -> bool {
        match self.best.get_mut(label) {
            Some(current) if current.rent >= rent => false,
            Some(current) => {
                current.rent = rent;
                current.source_url = source_url.to_string();
                true
            }
            None => {
                self.best.insert(
                    label.to_string(),
                    BestRent {
                        rent,
                        source_url: source_url.to_string(),
                    },
                );
                true
            }
        }
    }

    /// Merge a signal carrying both a label and a rent; others are ignored.
    pub fn merge_signal(&mut self, signal: &ListingSignal) -> bool {
        match (&signal.bhk_label, signal.rent) {
            (Some(label), Some(rent)) => self.merge(label, rent, &signal.source_url),
            _ => false,
        }
    }

    pub fn get(&self, label: &str) -> Option<&BestRent> {
        self.best.get(label)
    }

    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    pub fn rents(&self) -> RentTable {
        self.best
            .iter()
            .map(|(label, best)| (label.clone(), best.rent))
            .collect()
    }

    pub fn into_best(self) -> BTreeMap<String, BestRent> {
        self.best
    }
}
