//! Terminal rendering for `rentscout discover`.

use rentscout::{DiscoveryOrigin, DiscoveryReport};

pub fn origin_label(origin: &DiscoveryOrigin) -> &'static str {
    match origin {
        DiscoveryOrigin::DirectProbe { .. } => "direct_probe",
        DiscoveryOrigin::SearchFallback => "search_fallback",
        DiscoveryOrigin::NotFound => "not_found",
    }
}

/// Label/rent table with the winning listing per row.
pub fn render_table(report: &DiscoveryReport) -> String {
    let q = &report.query;
    if report.best.is_empty() {
        return format!("No rental listings found for {} ({}).\n", q.society_name, q.city);
    }

    let label_w = report
        .best
        .keys()
        .map(|l| l.len())
        .max()
        .unwrap_or(0)
        .max("BHK".len());
    let rent_w = report
        .best
        .values()
        .map(|b| b.rent.to_string().len())
        .max()
        .unwrap_or(0)
        .max("RENT".len());

    let mut out = format!(
        "{} ({}) via {}\n\n",
        q.society_name,
        q.city,
        origin_label(&report.origin)
    );
    out.push_str(&format!("{:<label_w$}  {:>rent_w$}  LISTING\n", "BHK", "RENT"));
    for (label, best) in &report.best {
        out.push_str(&format!(
            "{label:<label_w$}  {:>rent_w$}  {}\n",
            best.rent, best.source_url
        ));
    }

    let skipped = report.skipped().count();
    if skipped > 0 {
        out.push_str(&format!(
            "\n{skipped} of {} candidate(s) skipped\n",
            report.outcomes.len()
        ));
    }
    out
}
