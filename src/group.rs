// File: src/group.rs
//! Per-list grouper: bucket enriched items by completion date.
use crate::model::{DATE_FMT, EnrichedTaskItem, TrackerEntry};
use std::collections::BTreeMap;

/// Group a list's enriched batch by completion date.
///
/// Items that are not complete, or whose classification failed, are filtered
/// out. Within a bucket, ordering is arrival order from the worker pool; the
/// store's dedup-on-merge makes that ordering non-semantic.
///
/// Pure function: no IO, no shared state.
pub fn group(items: &[EnrichedTaskItem]) -> BTreeMap<String, Vec<TrackerEntry>> {
    let mut grouped: BTreeMap<String, Vec<TrackerEntry>> = BTreeMap::new();

    for item in items {
        let (Some(day), Some(classification)) = (item.completed, &item.classification) else {
            continue;
        };
        grouped
            .entry(day.format(DATE_FMT).to_string())
            .or_default()
            .push(TrackerEntry {
                title: item.title.clone(),
                category: classification.category.clone(),
                difficulty: classification.difficulty.clone(),
            });
    }

    grouped
}
