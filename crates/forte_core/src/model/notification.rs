//! Reminder records derived from calendar events.

use super::RecordId;
use serde::{Deserialize, Serialize};

/// One reminder shown in the notification bell.
///
/// Lifecycle: created unread, flipped to read by mark-all-read (never back),
/// removed together with its source event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: RecordId,
    /// Source `CalendarEvent::id`.
    pub event_id: RecordId,
    pub message: String,
    pub read: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Counts reported to the bell after a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationSummary {
    pub total: usize,
    pub unread: usize,
}

impl NotificationSummary {
    pub fn of(notifications: &[Notification]) -> Self {
        Self {
            total: notifications.len(),
            unread: notifications.iter().filter(|item| !item.read).count(),
        }
    }
}
