//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::{Comment, CommentId};
use crate::domain::lifecycle::LifecyclePolicy;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Policy with the default thresholds: obfuscate at 2h, delete at 24h
pub fn test_policy() -> LifecyclePolicy {
    test_policy_with(120, 1440)
}

/// Policy with custom thresholds in minutes
pub fn test_policy_with(obfuscate_minutes: i64, delete_minutes: i64) -> LifecyclePolicy {
    LifecyclePolicy {
        obfuscate_after: Duration::minutes(obfuscate_minutes),
        delete_after: Duration::minutes(delete_minutes),
        watermark: "#rtbf".to_string(),
        ignore_flag: "/fn".to_string(),
    }
}

/// A comment created `minutes_old` minutes before `now`, with a unique id
pub fn comment_aged(body: &str, minutes_old: i64, now: DateTime<Utc>) -> Comment {
    let id = format!("c{}", NEXT_ID.fetch_add(1, Ordering::Relaxed));
    comment_with_id(&id, body, minutes_old, now)
}

/// A comment with a specific id created `minutes_old` minutes before `now`
pub fn comment_with_id(id: &str, body: &str, minutes_old: i64, now: DateTime<Utc>) -> Comment {
    Comment {
        id: CommentId::new(id),
        body: body.to_string(),
        created_at: now - Duration::minutes(minutes_old),
        permalink: Some(format!("/r/test/comments/post/{}/", id)),
    }
}
