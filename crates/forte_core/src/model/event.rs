//! Calendar event records.
//!
//! # Invariants
//! - `date` is always a valid `YYYY-MM-DD` calendar date when written.
//! - `time`, when present, is a valid 24h `HH:mm`. Empty input means "no time".
//! - `title` is non-empty after trim.

use super::{RecordId, ValidationError};
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));
static TIME_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("valid time regex"));

/// One dated entry on a user's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: RecordId,
    /// Local calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl CalendarEvent {
    /// Parsed event date. `None` for legacy rows that fail to parse.
    pub fn local_date(&self) -> Option<NaiveDate> {
        parse_event_date(&self.date).ok()
    }
}

/// Input for creating an event; id and creation time are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub date: String,
    pub title: String,
    pub time: Option<String>,
    pub description: Option<String>,
}

impl NewEvent {
    pub fn new(date: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            title: title.into(),
            time: None,
            description: None,
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validates and normalizes into a stored record.
    pub(crate) fn into_event(
        self,
        id: RecordId,
        created_at: i64,
    ) -> Result<CalendarEvent, ValidationError> {
        let title = normalize_title(&self.title)?;
        parse_event_date(&self.date)?;
        let time = normalize_time(self.time.as_deref())?;
        Ok(CalendarEvent {
            id,
            date: self.date,
            title,
            time,
            description: self.description.filter(|text| !text.trim().is_empty()),
            created_at,
        })
    }
}

/// Partial update for an event. `time: Some(None)` clears the time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub time: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub date: Option<String>,
}

impl EventPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_time(mut self, time: Option<String>) -> Self {
        self.time = Some(time);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            normalize_title(title)?;
        }
        if let Some(time) = &self.time {
            normalize_time(time.as_deref())?;
        }
        if let Some(date) = &self.date {
            parse_event_date(date)?;
        }
        Ok(())
    }

    /// Merges into `event`. Callers must `validate` first.
    pub(crate) fn apply(&self, event: &mut CalendarEvent) {
        if let Some(title) = &self.title {
            event.title = title.trim().to_string();
        }
        if let Some(time) = &self.time {
            event.time = normalize_time(time.as_deref()).unwrap_or(None);
        }
        if let Some(description) = &self.description {
            event.description = description.clone().filter(|text| !text.trim().is_empty());
        }
        if let Some(date) = &self.date {
            event.date = date.clone();
        }
    }
}

/// Parses a strict `YYYY-MM-DD` local date.
pub fn parse_event_date(value: &str) -> Result<NaiveDate, ValidationError> {
    if !DATE_SHAPE_RE.is_match(value) {
        return Err(ValidationError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

fn normalize_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyEventTitle);
    }
    Ok(trimmed.to_string())
}

fn normalize_time(time: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(value) = time.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if !TIME_SHAPE_RE.is_match(value) || NaiveTime::parse_from_str(value, "%H:%M").is_err() {
        return Err(ValidationError::InvalidTime(value.to_string()));
    }
    Ok(Some(value.to_string()))
}
