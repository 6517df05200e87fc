//! Wire types shared between the doro client core and the remote services it talks to.
//!
//! This crate is shared by the core and any transport adapter to prevent schema drift.
//! The services remain the authority on validation, but clients reuse the same types
//! to construct valid payloads before a round-trip is spent on them.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

pub const MAX_TASK_CHARS: usize = 200;
pub const MAX_NOTES_CHARS: usize = 2000;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// The authenticated user on whose behalf the client acts.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_ref: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Leaderboards
// ─────────────────────────────────────────────────────────────────────────────

/// One row of a weekly leaderboard, identical for every scope.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Completed sessions within the current ISO week as of fetch time.
    pub completion_count: u32,
}

/// Row shape returned by the global weekly aggregation.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GlobalWeeklyRow {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub weekly_count: i64,
}

impl GlobalWeeklyRow {
    pub fn into_entry(self) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: self.user_id,
            display_name: non_blank(self.display_name).unwrap_or(self.username),
            avatar_url: non_blank(self.avatar_url),
            completion_count: clamp_count(self.weekly_count),
        }
    }
}

/// Profile embedded in a friends-scope row.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FriendProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_path: Option<String>,
}

/// Row shape returned by the friends weekly aggregation.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FriendWeeklyRow {
    pub friend: FriendProfile,
    pub doro_count: i64,
}

impl FriendWeeklyRow {
    pub fn into_entry(self) -> LeaderboardEntry {
        let FriendProfile {
            id,
            username,
            full_name,
            avatar_path,
        } = self.friend;
        LeaderboardEntry {
            user_id: id,
            display_name: non_blank(full_name).unwrap_or(username),
            avatar_url: non_blank(avatar_path),
            completion_count: clamp_count(self.doro_count),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn clamp_count(count: i64) -> u32 {
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

// ─────────────────────────────────────────────────────────────────────────────
// Social graph
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlockStatus {
    pub viewer_blocked_target: bool,
    pub target_blocked_viewer: bool,
}

impl BlockStatus {
    /// Collapses both directions into the single visibility gate.
    pub fn either(&self) -> bool {
        self.viewer_blocked_target || self.target_blocked_viewer
    }
}

/// A pending follow edge awaiting the target's approval.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub id: String,
    pub requester_id: String,
    pub target_id: String,
    pub created_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Session publishing
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PublishSessionRequest {
    pub task: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub launch_at: String,
    pub completed: bool,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl PublishSessionRequest {
    pub fn validate(&self) -> Result<(), ErrorInfo> {
        if self.task.trim().is_empty() {
            return Err(ErrorInfo::new("missing_field", "task is required"));
        }
        if self.task.chars().count() > MAX_TASK_CHARS {
            return Err(ErrorInfo::new(
                "invalid_task",
                format!("task must be {} characters or fewer", MAX_TASK_CHARS),
            ));
        }
        if let Some(notes) = &self.notes {
            if notes.chars().count() > MAX_NOTES_CHARS {
                return Err(ErrorInfo::new(
                    "invalid_notes",
                    format!("notes must be {} characters or fewer", MAX_NOTES_CHARS),
                ));
            }
        }
        if DateTime::parse_from_rfc3339(&self.launch_at).is_err() {
            return Err(ErrorInfo::new(
                "invalid_timestamp",
                "launch_at must be RFC3339",
            ));
        }
        if let Some(image_ref) = &self.image_ref {
            if image_ref.trim().is_empty() {
                return Err(ErrorInfo::new(
                    "invalid_image_ref",
                    "image_ref must not be blank when present",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_request() -> PublishSessionRequest {
        PublishSessionRequest {
            task: "Write report".to_string(),
            notes: Some("done".to_string()),
            launch_at: "2026-01-30T12:00:00Z".to_string(),
            completed: true,
            image_ref: None,
        }
    }

    #[test]
    fn validates_publish_request() {
        assert!(base_request().validate().is_ok());
    }

    #[test]
    fn rejects_blank_task() {
        let mut request = base_request();
        request.task = "   ".to_string();
        assert_eq!(request.validate().unwrap_err().code, "missing_field");
    }

    #[test]
    fn rejects_long_task() {
        let mut request = base_request();
        request.task = "a".repeat(MAX_TASK_CHARS + 1);
        assert!(request.validate().is_err());
    }

    #[test]
    fn rejects_long_notes() {
        let mut request = base_request();
        request.notes = Some("n".repeat(MAX_NOTES_CHARS + 1));
        assert!(request.validate().is_err());
    }

    #[test]
    fn rejects_bad_timestamp() {
        let mut request = base_request();
        request.launch_at = "yesterday".to_string();
        assert_eq!(request.validate().unwrap_err().code, "invalid_timestamp");
    }

    #[test]
    fn rejects_blank_image_ref() {
        let mut request = base_request();
        request.image_ref = Some(String::new());
        assert!(request.validate().is_err());
    }

    #[test]
    fn publish_request_uses_camel_case() {
        let request: PublishSessionRequest = serde_json::from_value(json!({
            "task": "Read",
            "launchAt": "2026-01-30T12:00:00Z",
            "completed": true,
            "imageRef": "doros/abc.jpg"
        }))
        .unwrap();
        assert_eq!(request.image_ref.as_deref(), Some("doros/abc.jpg"));
        assert_eq!(request.notes, None);
    }

    #[test]
    fn publish_request_rejects_unknown_fields() {
        let parsed = serde_json::from_value::<PublishSessionRequest>(json!({
            "task": "Read",
            "launchAt": "2026-01-30T12:00:00Z",
            "completed": true,
            "mood": "great"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn global_row_normalizes_to_entry() {
        let row = GlobalWeeklyRow {
            user_id: "u1".to_string(),
            username: "ada".to_string(),
            display_name: Some(" ".to_string()),
            avatar_url: Some("https://cdn/a.png".to_string()),
            weekly_count: 7,
        };
        let entry = row.into_entry();
        assert_eq!(entry.display_name, "ada");
        assert_eq!(entry.completion_count, 7);
        assert_eq!(entry.avatar_url.as_deref(), Some("https://cdn/a.png"));
    }

    #[test]
    fn friend_row_normalizes_to_same_shape() {
        let row: FriendWeeklyRow = serde_json::from_value(json!({
            "friend": { "id": "u2", "username": "grace", "full_name": "Grace H" },
            "doro_count": -3
        }))
        .unwrap();
        let entry = row.into_entry();
        assert_eq!(entry.user_id, "u2");
        assert_eq!(entry.display_name, "Grace H");
        assert_eq!(entry.avatar_url, None);
        assert_eq!(entry.completion_count, 0);
    }

    #[test]
    fn block_status_either_direction() {
        assert!(!BlockStatus::default().either());
        assert!(BlockStatus {
            viewer_blocked_target: true,
            target_blocked_viewer: false
        }
        .either());
        assert!(BlockStatus {
            viewer_blocked_target: false,
            target_blocked_viewer: true
        }
        .either());
    }
}
