//! Weekly task board records.
//!
//! # Invariants
//! - `text` is non-empty after trim and at most `TASK_TEXT_MAX_CHARS` chars.
//! - `day` is persisted as a plain string; only the six `DayOfWeek` keys are
//!   considered valid by views.

use super::{RecordId, ValidationError};
use serde::{Deserialize, Serialize};

/// Maximum task text length, in characters.
pub const TASK_TEXT_MAX_CHARS: usize = 100;

/// Board column. Sunday has no column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    /// All board columns in display order.
    pub const ALL: [DayOfWeek; 6] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Stable key used in persisted tasks.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
        }
    }

    /// Parses a persisted day key. Unknown keys (including `sunday`) yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.as_str() == value)
    }
}

/// One entry on the weekly board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub text: String,
    pub completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Raw day key; see `Task::day_of_week`.
    pub day: String,
}

impl Task {
    /// Returns the board column, or `None` when the stored key is unknown.
    pub fn day_of_week(&self) -> Option<DayOfWeek> {
        DayOfWeek::parse(&self.day)
    }
}

/// Partial update for a task. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub day: Option<DayOfWeek>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub(crate) fn apply(&self, task: &mut Task) {
        if let Some(text) = &self.text {
            task.text = text.trim().to_string();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(day) = self.day {
            task.day = day.as_str().to_string();
        }
    }
}

/// Checks task text against board limits.
pub fn validate_task_text(text: &str) -> Result<(), ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTaskText);
    }
    let actual_chars = trimmed.chars().count();
    if actual_chars > TASK_TEXT_MAX_CHARS {
        return Err(ValidationError::TaskTextTooLong {
            max_chars: TASK_TEXT_MAX_CHARS,
            actual_chars,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_task_text, DayOfWeek, TASK_TEXT_MAX_CHARS};
    use crate::model::ValidationError;

    #[test]
    fn day_keys_round_trip_and_reject_sunday() {
        for day in DayOfWeek::ALL {
            assert_eq!(DayOfWeek::parse(day.as_str()), Some(day));
        }
        assert_eq!(DayOfWeek::parse("sunday"), None);
        assert_eq!(DayOfWeek::parse("Monday"), None);
    }

    #[test]
    fn task_text_limit_counts_characters_not_bytes() {
        let accented = "é".repeat(TASK_TEXT_MAX_CHARS);
        assert!(validate_task_text(&accented).is_ok());

        let too_long = "a".repeat(TASK_TEXT_MAX_CHARS + 1);
        assert_eq!(
            validate_task_text(&too_long),
            Err(ValidationError::TaskTextTooLong {
                max_chars: TASK_TEXT_MAX_CHARS,
                actual_chars: TASK_TEXT_MAX_CHARS + 1,
            })
        );
        assert_eq!(validate_task_text("   "), Err(ValidationError::EmptyTaskText));
    }
}
