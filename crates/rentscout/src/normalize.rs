//! Slug generation for URL path segments.

/// Turn a free-text name into a URL path segment.
///
/// Lower-cases, drops everything except word characters, whitespace and
/// hyphens, collapses each run of whitespace/underscores into one hyphen and
/// trims hyphens from both ends. Uppercase letters with no lowercase form
/// (`ϒ`, `ℂ`) are dropped too. Total and idempotent.
///
/// ```
/// assert_eq!(rentscout::slugify("  Prestige Lake_Side (Phase 2) "), "prestige-lake-side-phase-2");
/// ```
pub fn slugify(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_sep = false;

    for c in lowered.chars() {
        if c.is_whitespace() || c == '_' {
            pending_sep = true;
        } else if c == '-' || (c.is_alphanumeric() && !c.is_uppercase()) {
            if pending_sep {
                out.push('-');
                pending_sep = false;
            }
            out.push(c);
        }
        // Anything else is dropped without breaking a separator run.
    }

    out.trim_matches('-').to_string()
}
