//! Feed ranking
//!
//! Scores each status for a viewer from three signals and keeps the best ones:
//! - affinity: weight of the viewer → author edge in the affinity graph
//! - popularity: fixed weighted sum of the status counters
//! - recency: day-based decay of the publication date
//!
//! Search results additionally carry a per-status match count which is raised
//! to a high power, so statuses matching more query words dominate.

use crate::models::{FeedEntry, Status, StatusId};
use crate::services::affinity::AffinityGraph;
use crate::utils::recency_multiplier_at;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::debug;

/// Maximum number of entries in a ranked feed
pub const FEED_SIZE: usize = 10;

/// Exponent applied to a status's search match count
pub const MATCH_BOOST_EXPONENT: i32 = 10;

/// Popularity of a status from its comment, share and reaction counters.
pub fn popularity_score(status: &Status) -> f64 {
    let r = &status.reactions;

    (status.num_comments * 40
        + status.num_shares * 10
        + r.likes * 5
        + r.loves * 10
        + r.wows * 25
        + r.hahas * 10
        + r.sads * 5
        + r.angrys * 25
        + r.special * 30) as f64
}

/// Rank `statuses` for `viewer` and return at most [`FEED_SIZE`] entries,
/// highest relevance first.
///
/// The viewer, each author, and a zero-weight viewer → author edge are added
/// to `graph` when missing. Equal scores keep the order of `statuses`.
pub fn rank_feed<'a, I>(
    graph: &mut AffinityGraph,
    viewer: &str,
    statuses: I,
    match_counts: Option<&HashMap<StatusId, u32>>,
    now: NaiveDateTime,
) -> Vec<FeedEntry>
where
    I: IntoIterator<Item = &'a Status>,
{
    graph.add_node(viewer);
    let boost = match_counts.filter(|counts| !counts.is_empty());

    let mut ranked: Vec<FeedEntry> = statuses
        .into_iter()
        .map(|status| {
            let edge_weight = graph.edge_weight_or_insert(viewer, &status.author);
            let mut relevance = (edge_weight + popularity_score(status))
                * recency_multiplier_at(status.published, now);

            if let Some(counts) = boost {
                let matched = counts.get(&status.id).copied().unwrap_or(0);
                relevance *= f64::from(matched).powi(MATCH_BOOST_EXPONENT);
            }

            FeedEntry::from_status(status, relevance)
        })
        .collect();

    let candidates = ranked.len();

    // Stable sort: ties keep input order. NaN never occurs, weights are finite.
    ranked.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(FEED_SIZE);

    debug!(viewer, candidates, returned = ranked.len(), "Feed ranked");

    ranked
}
