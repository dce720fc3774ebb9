//! Interaction dataset loader
//!
//! Reads one batch of social data from a directory of JSON files:
//!
//! ```text
//! friends.json    { "user": ["friend", ...], ... }
//! comments.json   [{ "status_id", "author", "comment_published" }, ...]
//! reactions.json  [{ "status_id", "author", "type_of_reaction", "reacted" }, ...]
//! shares.json     [{ "status_id", "author", "status_shared" }, ...]
//! statuses.json   [{ "status_id", "status_message", "status_link",
//!                    "status_published", "author", "num_comments", ... }, ...]
//! ```
//!
//! Timestamps use `%Y-%m-%d %H:%M:%S`. A missing file yields an empty
//! collection; a malformed file is an error.

use crate::error::Result;
use crate::models::{
    EventLog, FriendMap, InteractionEvent, ReactionCounts, Status, StatusCorpus, StatusId, UserId,
};
use crate::utils::date_format;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

pub const FRIENDS_FILE: &str = "friends.json";
pub const COMMENTS_FILE: &str = "comments.json";
pub const REACTIONS_FILE: &str = "reactions.json";
pub const SHARES_FILE: &str = "shares.json";
pub const STATUSES_FILE: &str = "statuses.json";

#[derive(Debug, Deserialize)]
struct CommentRecord {
    status_id: StatusId,
    author: UserId,
    #[serde(alias = "published", with = "date_format")]
    comment_published: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
struct ReactionRecord {
    status_id: StatusId,
    author: UserId,
    #[serde(alias = "kind")]
    type_of_reaction: String,
    #[serde(alias = "published", with = "date_format")]
    reacted: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
struct ShareRecord {
    status_id: StatusId,
    author: UserId,
    #[serde(alias = "published", with = "date_format")]
    status_shared: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
struct StatusRecord {
    status_id: StatusId,
    #[serde(default)]
    status_message: String,
    #[serde(default)]
    status_link: String,
    #[serde(with = "date_format")]
    status_published: NaiveDateTime,
    author: UserId,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    num_shares: u64,
    #[serde(default)]
    num_likes: u64,
    #[serde(default)]
    num_loves: u64,
    #[serde(default)]
    num_wows: u64,
    #[serde(default)]
    num_hahas: u64,
    #[serde(default)]
    num_sads: u64,
    #[serde(default)]
    num_angrys: u64,
    #[serde(default)]
    num_special: u64,
}

impl From<StatusRecord> for Status {
    fn from(record: StatusRecord) -> Self {
        Status {
            id: record.status_id,
            author: record.author,
            message: record.status_message,
            link: record.status_link,
            published: record.status_published,
            reactions: ReactionCounts {
                likes: record.num_likes,
                loves: record.num_loves,
                wows: record.num_wows,
                hahas: record.num_hahas,
                sads: record.num_sads,
                angrys: record.num_angrys,
                special: record.num_special,
            },
            num_comments: record.num_comments,
            num_shares: record.num_shares,
        }
    }
}

/// One batch of friends, interactions and statuses
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub friends: FriendMap,
    pub events: EventLog,
    pub statuses: StatusCorpus,
}

impl Dataset {
    /// Load every dataset file found in `dir`.
    pub fn load_from_directory(dir: &Path) -> Result<Self> {
        let friends: FriendMap = read_json(&dir.join(FRIENDS_FILE))?;
        let comments: Vec<CommentRecord> = read_json(&dir.join(COMMENTS_FILE))?;
        let reactions: Vec<ReactionRecord> = read_json(&dir.join(REACTIONS_FILE))?;
        let shares: Vec<ShareRecord> = read_json(&dir.join(SHARES_FILE))?;
        let statuses: Vec<StatusRecord> = read_json(&dir.join(STATUSES_FILE))?;

        let mut dataset = Dataset {
            friends,
            ..Dataset::default()
        };

        for record in comments {
            dataset.push_event(InteractionEvent::Comment {
                actor: record.author,
                target_status: record.status_id,
                timestamp: record.comment_published,
            });
        }
        for record in reactions {
            dataset.push_event(InteractionEvent::Reaction {
                actor: record.author,
                target_status: record.status_id,
                kind: record.type_of_reaction,
                timestamp: record.reacted,
            });
        }
        for record in shares {
            dataset.push_event(InteractionEvent::Share {
                actor: record.author,
                target_status: record.status_id,
                timestamp: record.status_shared,
            });
        }
        for record in statuses {
            let status = Status::from(record);
            dataset.statuses.insert(status.id.clone(), status);
        }

        info!(
            dir = %dir.display(),
            users = dataset.friends.len(),
            events = dataset.event_count(),
            statuses = dataset.statuses.len(),
            "Loaded dataset"
        );

        Ok(dataset)
    }

    /// Append an event to its actor's history.
    pub fn push_event(&mut self, event: InteractionEvent) {
        self.events
            .entry(event.actor().to_string())
            .or_default()
            .push(event);
    }

    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    /// Fold `other` into this batch: friend sets are unioned, events appended
    /// and statuses inserted (same id replaces the previous record).
    pub fn merge(&mut self, other: Dataset) {
        for (user, friends) in other.friends {
            self.friends.entry(user).or_default().extend(friends);
        }
        for (actor, events) in other.events {
            self.events.entry(actor).or_default().extend(events);
        }
        self.statuses.extend(other.statuses);
    }
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Dataset file not found, using empty collection");
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };

    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) {
        fs::write(dir.path().join(name), body).unwrap();
    }

    #[test]
    fn test_load_full_directory() {
        let dir = TempDir::new().unwrap();
        write(&dir, FRIENDS_FILE, r#"{"alice": ["bob"], "bob": ["alice"]}"#);
        write(
            &dir,
            COMMENTS_FILE,
            r#"[{"status_id": "s1", "author": "alice", "comment_published": "2024-01-02 10:00:00"}]"#,
        );
        write(
            &dir,
            REACTIONS_FILE,
            r#"[{"status_id": "s1", "author": "alice", "type_of_reaction": "wows", "reacted": "2024-01-02 11:00:00"},
                {"status_id": "s1", "author": "carol", "type_of_reaction": "likes", "reacted": "2024-01-03 11:00:00"}]"#,
        );
        write(
            &dir,
            SHARES_FILE,
            r#"[{"status_id": "s1", "author": "alice", "status_shared": "2024-01-04 09:30:00"}]"#,
        );
        write(
            &dir,
            STATUSES_FILE,
            r#"[{"status_id": "s1", "status_message": "Hello world", "status_link": "http://x/s1",
                 "status_published": "2024-01-01 08:00:00", "author": "bob",
                 "num_comments": 3, "num_likes": 7, "num_special": 1}]"#,
        );

        let dataset = Dataset::load_from_directory(dir.path()).unwrap();

        assert_eq!(dataset.friends["alice"].len(), 1);
        assert_eq!(dataset.events["alice"].len(), 3);
        assert_eq!(dataset.events["carol"].len(), 1);
        assert_eq!(dataset.event_count(), 4);

        let status = &dataset.statuses["s1"];
        assert_eq!(status.author, "bob");
        assert_eq!(status.message, "Hello world");
        assert_eq!(status.num_comments, 3);
        assert_eq!(status.num_shares, 0);
        assert_eq!(status.reactions.likes, 7);
        assert_eq!(status.reactions.special, 1);

        assert!(matches!(
            &dataset.events["carol"][0],
            InteractionEvent::Reaction { kind, .. } if kind == "likes"
        ));
    }

    #[test]
    fn test_missing_files_yield_empty_dataset() {
        let dir = TempDir::new().unwrap();

        let dataset = Dataset::load_from_directory(dir.path()).unwrap();

        assert!(dataset.friends.is_empty());
        assert_eq!(dataset.event_count(), 0);
        assert!(dataset.statuses.is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, STATUSES_FILE, r#"[{"status_id": "s1""#);

        let err = Dataset::load_from_directory(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[test]
    fn test_bad_timestamp_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            SHARES_FILE,
            r#"[{"status_id": "s1", "author": "a", "status_shared": "yesterday"}]"#,
        );

        assert!(Dataset::load_from_directory(dir.path()).is_err());
    }

    #[test]
    fn test_merge() {
        let mut first = Dataset::default();
        first
            .friends
            .insert("alice".to_string(), ["bob".to_string()].into_iter().collect());

        let mut second = Dataset::default();
        second
            .friends
            .insert("alice".to_string(), ["carol".to_string()].into_iter().collect());
        second.push_event(InteractionEvent::Share {
            actor: "alice".to_string(),
            target_status: "s9".to_string(),
            timestamp: NaiveDateTime::parse_from_str("2024-01-01 00:00:00", crate::utils::DATE_FORMAT)
                .unwrap(),
        });

        first.merge(second);

        assert_eq!(first.friends["alice"].len(), 2);
        assert_eq!(first.event_count(), 1);
    }
}
