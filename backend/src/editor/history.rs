//! In-memory version history of editor content.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of snapshots retained before the oldest is evicted.
pub const HISTORY_CAPACITY: usize = 10;

/// A timestamped copy of the editor content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded ring buffer of content snapshots, oldest first.
#[derive(Debug, Clone, Default)]
pub struct VersionHistory {
    snapshots: VecDeque<Snapshot>,
}

impl VersionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot stamped with the current time.
    pub fn record(&mut self, content: &str) {
        self.push(Snapshot {
            content: content.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > HISTORY_CAPACITY {
            self.snapshots.pop_front();
        }
    }

    /// Snapshots in chronological order.
    pub fn list(&self) -> Vec<Snapshot> {
        self.snapshots.iter().cloned().collect()
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_most_recent_ten() {
        let mut history = VersionHistory::new();
        for i in 0..15 {
            history.record(&format!("<p>{}</p>", i));
        }

        assert_eq!(history.len(), HISTORY_CAPACITY);
        let contents: Vec<String> = history.list().into_iter().map(|s| s.content).collect();
        let expected: Vec<String> = (5..15).map(|i| format!("<p>{}</p>", i)).collect();
        assert_eq!(contents, expected);
    }

    #[test]
    fn test_chronological_order() {
        let mut history = VersionHistory::new();
        history.record("first");
        history.record("second");

        let list = history.list();
        assert_eq!(list[0].content, "first");
        assert!(list[0].timestamp <= list[1].timestamp);
        assert_eq!(history.get(1).map(|s| s.content.as_str()), Some("second"));
        assert!(history.get(2).is_none());
    }

    #[test]
    fn test_identical_content_still_recorded() {
        let mut history = VersionHistory::new();
        history.record("same");
        history.record("same");
        assert_eq!(history.len(), 2);
    }
}
