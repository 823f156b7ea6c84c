use crate::core::{Category, Issue, Location};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Merge issues sharing a location and category, then sort canonically.
///
/// Within a group the most severe issue survives (ties go to the earlier
/// [`FindingKind`](crate::core::FindingKind)); the evidence of the others
/// moves into its `related` list.
pub fn aggregate(issues: Vec<Issue>) -> Vec<Issue> {
    let mut groups: BTreeMap<(Location, Category), Vec<Issue>> = BTreeMap::new();
    for issue in issues {
        groups
            .entry((issue.location.clone(), issue.category))
            .or_default()
            .push(issue);
    }

    let mut merged: Vec<Issue> = groups.into_values().filter_map(merge_group).collect();
    merged.sort_by(canonical_order);
    merged
}

fn merge_group(mut group: Vec<Issue>) -> Option<Issue> {
    group.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.kind().cmp(&b.kind()))
            .then_with(|| a.description.cmp(&b.description))
    });
    let mut rest = group.into_iter();
    let mut keeper = rest.next()?;
    for duplicate in rest {
        keeper.related.push(duplicate.evidence);
        keeper.related.extend(duplicate.related);
    }
    Some(keeper)
}

/// Severity (critical first), file, line, category, finding kind, symbol
pub fn canonical_order(a: &Issue, b: &Issue) -> Ordering {
    a.severity
        .cmp(&b.severity)
        .then_with(|| a.location.file.cmp(&b.location.file))
        .then_with(|| {
            let line = |i: &Issue| i.location.lines.map(|l| l.start);
            line(a).cmp(&line(b))
        })
        .then_with(|| a.category.cmp(&b.category))
        .then_with(|| a.kind().cmp(&b.kind()))
        .then_with(|| a.location.symbol.cmp(&b.location.symbol))
        .then_with(|| a.location.lines.cmp(&b.location.lines))
}
