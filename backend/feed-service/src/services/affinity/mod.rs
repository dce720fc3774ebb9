//! Affinity Graph Engine
//!
//! Directed, weighted user → user graph derived from the friends map and from
//! the comments, reactions and shares a user left on other users' statuses.
//!
//! Edge weights are additive: building over an existing graph folds the new
//! contributions into the stored weights, so re-applying a batch doubles it.

use crate::error::Result;
use crate::models::{EventLog, FriendMap, InteractionEvent, ReactionKind, StatusCorpus, UserId};
use crate::utils::recency_multiplier_at;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Weight of a friendship edge, applied independently of interactions.
pub const FRIEND_BONUS: f64 = 5000.0;
/// Weight of a single comment before recency scaling.
pub const COMMENT_WEIGHT: f64 = 40.0;
/// Weight of a single share before recency scaling.
pub const SHARE_WEIGHT: f64 = 60.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AffinityGraph {
    /// from_user → (to_user → weight)
    adjacency: HashMap<UserId, HashMap<UserId, f64>>,
}

impl AffinityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, user: &str) {
        if !self.adjacency.contains_key(user) {
            self.adjacency.insert(user.to_string(), HashMap::new());
        }
    }

    pub fn contains_node(&self, user: &str) -> bool {
        self.adjacency.contains_key(user)
    }

    /// Add `weight` to the edge `from → to`, creating both nodes and the edge
    /// when missing. Self-loops are ignored.
    pub fn add_edge_weight(&mut self, from: &str, to: &str, weight: f64) {
        if from == to {
            return;
        }

        self.add_node(to);
        let edges = self.adjacency.entry(from.to_string()).or_default();
        *edges.entry(to.to_string()).or_insert(0.0) += weight;
    }

    pub fn weight(&self, from: &str, to: &str) -> Option<f64> {
        self.adjacency
            .get(from)
            .and_then(|edges| edges.get(to))
            .copied()
    }

    /// Weight of `from → to`, lazily inserting missing nodes and a zero-weight
    /// edge so later lookups hit an existing entry.
    pub fn edge_weight_or_insert(&mut self, from: &str, to: &str) -> f64 {
        self.add_node(from);
        if from == to {
            return 0.0;
        }

        self.add_node(to);
        let edges = self.adjacency.entry(from.to_string()).or_default();
        *edges.entry(to.to_string()).or_insert(0.0)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|edges| edges.len()).sum()
    }
}

/// Counters collected while folding a batch into the graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphBuildReport {
    pub users: usize,
    pub edges_updated: usize,
    pub skipped_events: usize,
}

/// Affinity weight of one interaction before recency scaling.
///
/// Fails with a validation error for reaction kinds outside the weights table.
pub fn interaction_weight(event: &InteractionEvent) -> Result<f64> {
    match event {
        InteractionEvent::Comment { .. } => Ok(COMMENT_WEIGHT),
        InteractionEvent::Reaction { kind, .. } => Ok(kind.parse::<ReactionKind>()?.weight()),
        InteractionEvent::Share { .. } => Ok(SHARE_WEIGHT),
    }
}

/// Build a new graph, or fold the batch into `graph` when one is given.
pub fn build_or_update(
    graph: Option<AffinityGraph>,
    friends: &FriendMap,
    events: &EventLog,
    statuses: &StatusCorpus,
    now: NaiveDateTime,
) -> AffinityGraph {
    build_or_update_with_report(graph, friends, events, statuses, now).0
}

pub fn build_or_update_with_report(
    graph: Option<AffinityGraph>,
    friends: &FriendMap,
    events: &EventLog,
    statuses: &StatusCorpus,
    now: NaiveDateTime,
) -> (AffinityGraph, GraphBuildReport) {
    let mut graph = graph.unwrap_or_default();
    let mut report = GraphBuildReport::default();

    let authors: HashSet<&str> = statuses.values().map(|s| s.author.as_str()).collect();

    let mut users: Vec<&str> = friends.keys().map(String::as_str).collect();
    users.sort_unstable();
    report.users = users.len();

    for user in &users {
        graph.add_node(user);
    }

    for &user in &users {
        let totals = interaction_totals(user, events, statuses, now, &mut report);
        let user_friends = friends.get(user);

        for &other in &users {
            if user == other {
                continue;
            }

            let contribution = if user_friends.is_some_and(|f| f.contains(other)) {
                FRIEND_BONUS
            } else if !authors.contains(other) {
                continue;
            } else {
                totals.get(other).copied().unwrap_or(0.0)
            };

            if contribution > 0.0 {
                graph.add_edge_weight(user, other, contribution);
                report.edges_updated += 1;
            }
        }
    }

    info!(
        users = report.users,
        edges_updated = report.edges_updated,
        skipped_events = report.skipped_events,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Affinity graph updated"
    );

    (graph, report)
}

/// Recency-weighted interaction totals of `user`, grouped by the author of
/// the status each interaction targeted.
fn interaction_totals<'a>(
    user: &str,
    events: &EventLog,
    statuses: &'a StatusCorpus,
    now: NaiveDateTime,
    report: &mut GraphBuildReport,
) -> HashMap<&'a str, f64> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    let Some(user_events) = events.get(user) else {
        return totals;
    };

    for event in user_events {
        let Some(status) = statuses.get(event.target_status()) else {
            debug!(
                user,
                status_id = event.target_status(),
                "Interaction targets a status outside the corpus"
            );
            continue;
        };

        match interaction_weight(event) {
            Ok(weight) => {
                *totals.entry(status.author.as_str()).or_insert(0.0) +=
                    weight * recency_multiplier_at(event.timestamp(), now);
            }
            Err(e) => {
                warn!(user, status_id = event.target_status(), error = %e, "Skipping interaction");
                report.skipped_events += 1;
            }
        }
    }

    totals
}
