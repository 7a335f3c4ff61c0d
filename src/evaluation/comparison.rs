use std::cmp::Ordering;

use super::cost::CostSummary;

/// Coverage descending, then total distance ascending.
pub fn compare_summaries(a: &CostSummary, b: &CostSummary) -> Ordering {
    b.coverage_percentage
        .total_cmp(&a.coverage_percentage)
        .then_with(|| a.total_distance.total_cmp(&b.total_distance))
}

/// Indices of `items` in ranking order, best first. Items for which
/// `summary` returns `None` (failed runs) are left out. Equal items keep
/// their input order.
pub fn rank<T>(items: &[T], summary: impl Fn(&T) -> Option<&CostSummary>) -> Vec<usize> {
    let mut ranked: Vec<(usize, &CostSummary)> = items
        .iter()
        .enumerate()
        .filter_map(|(ind, item)| summary(item).map(|s| (ind, s)))
        .collect();
    ranked.sort_by(|a, b| compare_summaries(a.1, b.1));
    ranked.into_iter().map(|(ind, _)| ind).collect()
}
