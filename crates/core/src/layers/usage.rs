//! Page-usage statistics per layer.

use std::collections::BTreeMap;

use super::types::{PageLayerUsage, UsageStatistics};

/// How many entries the most/least-used rankings keep.
pub const RANKING_SIZE: usize = 3;

/// Tally page usage per layer.
///
/// Rankings are taken from one sequence sorted by descending page count; the
/// sort is stable, so ties keep the order in which names were first seen.
pub fn aggregate_usage(pages: &[PageLayerUsage], total_pages: usize) -> UsageStatistics {
    let mut first_seen: Vec<(String, usize)> = Vec::new();

    for page in pages {
        for name in &page.layers {
            match first_seen.iter_mut().find(|(n, _)| n == name) {
                Some((_, count)) => *count += 1,
                None => first_seen.push((name.clone(), 1)),
            }
        }
    }

    let pages_with_layers = pages.iter().filter(|p| !p.layers.is_empty()).count();

    let layer_distribution: BTreeMap<String, usize> = first_seen.iter().cloned().collect();

    let mut ranked = first_seen;
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let most_used_layers = ranked.iter().take(RANKING_SIZE).cloned().collect();
    let tail_start = ranked.len().saturating_sub(RANKING_SIZE);
    let least_used_layers = ranked[tail_start..].to_vec();

    UsageStatistics {
        total_layers: layer_distribution.len(),
        pages_with_layers,
        pages_without_layers: total_pages.saturating_sub(pages_with_layers),
        layer_distribution,
        most_used_layers,
        least_used_layers,
    }
}
