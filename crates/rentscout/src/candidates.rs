//! Ordered probe URL generation for a (society, city) pair.

use std::collections::HashSet;

use crate::config::DiscoveryConfig;
use crate::normalize::slugify;

/// Build probe URLs in priority order.
///
/// City-qualified shapes come first because they are less likely to land on
/// a different property with a similar name. Empty slug parts are dropped
/// before joining, so degenerate inputs collapse onto the same URL and are
/// deduplicated (first occurrence wins).
pub fn build_candidates(config: &DiscoveryConfig, society: &str, city: &str) -> Vec<String> {
    let society = slugify(society);
    let city = slugify(city);
    let base = listings_base(config);

    let shapes = [
        join_slugs(&[&city, &society], "-"),
        join_slugs(&[&city, &society], "_"),
        join_slugs(&[&society, &city], "_"),
        join_slugs(&[&society, &city], "-"),
        society.clone(),
    ];

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(shapes.len());
    for shape in shapes {
        if shape.is_empty() {
            continue;
        }
        let url = format!("{base}/{shape}");
        if seen.insert(url.clone()) {
            out.push(url);
        }
    }
    out
}

fn listings_base(config: &DiscoveryConfig) -> String {
    let root = config.site_root.trim_end_matches('/');
    let path = config.listings_path.trim_matches('/');
    if path.is_empty() {
        root.to_string()
    } else {
        format!("{root}/{path}")
    }
}

fn join_slugs(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(sep)
}
