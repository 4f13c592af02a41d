//! Listing category filters and rent plausibility bounds.

/// Tokens marking pages that are not whole-unit rentals: lease-only deals,
/// paying-guest and shared rooms, reviews and project/brochure pages.
const BLOCKED_TOKENS: &[&str] = &[
    "lease",
    "paying-guest",
    "paying guest",
    "/pg-",
    "-pg-",
    " pg ",
    "shared",
    "flatmate",
    "room-for-rent",
    "single-room",
    "room only",
    "review",
    "/projects/",
    "new-project",
];

/// Rents at or above this are treated as parse errors or sale prices.
pub const RENT_CEILING: u64 = 500_000;
/// Minimum plausible rent for 2 BHK and larger units.
pub const MULTI_BEDROOM_FLOOR: u64 = 20_000;
/// Minimum plausible rent for 1 BHK units.
pub const SINGLE_BEDROOM_FLOOR: u64 = 5_000;

/// True when the URL or title names a category we never aggregate.
pub fn is_bad_listing(url: &str, title: &str) -> bool {
    let haystack = format!("{url} {title}").to_lowercase();
    BLOCKED_TOKENS.iter().any(|t| haystack.contains(t))
}

/// Plausibility check on a (BHK label, rent) pair.
///
/// Heuristic, not a guarantee: larger units are assumed never to rent below
/// [`MULTI_BEDROOM_FLOOR`], 1 BHK units never below [`SINGLE_BEDROOM_FLOOR`].
/// Every label is capped by [`RENT_CEILING`].
pub fn is_sane(bhk_label: &str, rent: u64) -> bool {
    if rent >= RENT_CEILING {
        return false;
    }
    match bedrooms(bhk_label) {
        Some(n) if n >= 2 => rent >= MULTI_BEDROOM_FLOOR,
        Some(1) => rent >= SINGLE_BEDROOM_FLOOR,
        _ => true,
    }
}

/// True when the society name occurs (case-insensitively) in the title or URL.
pub fn matches_society(title: Option<&str>, url: &str, society_name: &str) -> bool {
    let needle = society_name.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    title.is_some_and(|t| t.to_lowercase().contains(&needle)) || url.to_lowercase().contains(&needle)
}

fn bedrooms(label: &str) -> Option<u32> {
    label.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_sane_bounds() {
        assert!(!is_sane("1 BHK", 4999));
        assert!(is_sane("1 BHK", 5000));
        assert!(!is_sane("2 BHK", 19999));
        assert!(is_sane("2 BHK", 20000));
        assert!(!is_sane("3 BHK", 600000));
        assert!(is_sane("4 BHK", 499_999));
        assert!(!is_sane("1 BHK", RENT_CEILING));
    }

    #[test]
    fn test_is_sane_unknown_label_only_capped() {
        assert!(is_sane("studio", 3000));
        assert!(!is_sane("studio", 700_000));
    }

    #[test]
    fn test_is_bad_listing() {
        assert!(is_bad_listing("https://site/property/lease-2-bhk", ""));
        assert!(is_bad_listing("https://site/property/x", "Shared room in Green Acres"));
        assert!(is_bad_listing("https://site/pg-in-green-acres", "PG for boys"));
        assert!(is_bad_listing("https://site/green-acres/reviews", "Green Acres"));
        assert!(is_bad_listing("https://site/projects/green-acres", ""));
        assert!(!is_bad_listing(
            "https://site/property/2-bhk-green-acres-for-rs-25,000",
            "2 BHK Flat for Rent in Green Acres"
        ));
    }

    #[test]
    fn test_matches_society() {
        let url = "https://site/property/2-bhk-for-rs-25,000";
        assert!(matches_society(Some("2 BHK in GREEN ACRES, Pune"), url, "Green Acres"));
        assert!(matches_society(None, "https://site/green acres", "green acres"));
        assert!(!matches_society(Some("2 BHK in Blue Ridge"), url, "Green Acres"));
        assert!(!matches_society(Some("anything"), url, "  "));
    }
}
