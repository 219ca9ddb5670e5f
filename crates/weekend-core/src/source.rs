//! Boundary with the calendar API.
//!
//! Nothing here performs I/O. The fetch
//! layer hands decoded responses in and
//! gets query parameters and auth headers
//! out.

use std::collections::BTreeSet;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  SecondsFormat,
  Utc
};
use chrono_tz::Tz;
use serde::{
  Deserialize,
  Serialize
};

use crate::datetime::day_bounds;
use crate::event::CalendarEvent;
use crate::window::WeekendWindow;

pub const MAX_RESULTS: u32 = 250;
pub const DEFAULT_CALENDAR_COLOR: &str =
  "#4285f4";

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct CalendarInfo {
  pub id:               String,
  #[serde(default)]
  pub summary:          String,
  #[serde(default)]
  pub background_color: Option<String>,
  #[serde(default)]
  pub selected:         bool
}

impl CalendarInfo {
  #[must_use]
  pub fn color(&self) -> &str {
    self
      .background_color
      .as_deref()
      .unwrap_or(DEFAULT_CALENDAR_COLOR)
  }
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
  #[serde(default = "Vec::new")]
  items: Vec<T>
}

/// Decodes a calendar-list response and
/// keeps only the calendars the user has
/// selected for display.
#[tracing::instrument(skip_all)]
pub fn selected_calendars(
  body: &str
) -> anyhow::Result<Vec<CalendarInfo>> {
  let parsed: ListResponse<CalendarInfo> =
    serde_json::from_str(body).context(
      "failed to decode calendar list"
    )?;
  let total = parsed.items.len();
  let selected = parsed
    .items
    .into_iter()
    .filter(|cal| cal.selected)
    .collect::<Vec<_>>();
  tracing::debug!(
    total,
    selected = selected.len(),
    "decoded calendar list"
  );
  Ok(selected)
}

/// Decodes an events response or a bare
/// JSON array of events. Events with no
/// owning calendar are tagged with
/// `calendar_id`.
#[tracing::instrument(skip(body))]
pub fn decode_events(
  body: &str,
  calendar_id: &str
) -> anyhow::Result<Vec<CalendarEvent>> {
  let value: serde_json::Value =
    serde_json::from_str(body)
      .context("events body is not JSON")?;

  let items = match value {
    | serde_json::Value::Array(items) => {
      items
    }
    | serde_json::Value::Object(_) => {
      serde_json::from_value::<
        ListResponse<serde_json::Value>
      >(value)
      .context(
        "failed to decode events response"
      )?
      .items
    }
    | other => {
      return Err(anyhow!(
        "expected an events object or \
         array, found {}",
        json_kind(&other)
      ));
    }
  };

  let total = items.len();
  let mut events = items
    .into_iter()
    .filter_map(|item| {
      serde_json::from_value::<
        CalendarEvent
      >(item)
      .map_err(|err| {
        tracing::debug!(
          error = %err,
          "undecodable event record"
        );
      })
      .ok()
    })
    .collect::<Vec<_>>();

  let skipped = total - events.len();
  if skipped > 0 {
    tracing::warn!(
      skipped,
      total,
      "skipping malformed event records"
    );
  }

  for event in &mut events {
    if event.calendar_id.is_empty() {
      event.calendar_id =
        calendar_id.to_string();
    }
  }

  tracing::debug!(
    events = events.len(),
    "decoded events"
  );
  Ok(events)
}

fn json_kind(
  value: &serde_json::Value
) -> &'static str {
  match value {
    | serde_json::Value::Null => "null",
    | serde_json::Value::Bool(_) => {
      "a boolean"
    }
    | serde_json::Value::Number(_) => {
      "a number"
    }
    | serde_json::Value::String(_) => {
      "a string"
    }
    | serde_json::Value::Array(_) => {
      "an array"
    }
    | serde_json::Value::Object(_) => {
      "an object"
    }
  }
}

/// Drops events belonging to calendars
/// the user toggled off in the legend.
pub fn filter_hidden(
  events: Vec<CalendarEvent>,
  hidden: &BTreeSet<String>
) -> Vec<CalendarEvent> {
  if hidden.is_empty() {
    return events;
  }
  let before = events.len();
  let kept = events
    .into_iter()
    .filter(|event| {
      !hidden.contains(&event.calendar_id)
    })
    .collect::<Vec<_>>();
  tracing::debug!(
    hidden = before - kept.len(),
    "filtered hidden calendars"
  );
  kept
}

/// Time range and options for the
/// per-calendar events request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
  pub time_min: DateTime<Utc>,
  pub time_max: DateTime<Utc>
}

impl EventQuery {
  /// Covers the first Saturday through
  /// the end of the last Sunday, in the
  /// display timezone.
  #[must_use]
  pub fn for_windows(
    windows: &[WeekendWindow],
    tz: &Tz
  ) -> Option<Self> {
    let first = windows.first()?;
    let last = windows.last()?;
    let (time_min, _) =
      day_bounds(tz, first.saturday)?;
    let (_, time_max) =
      day_bounds(tz, last.sunday)?;
    Some(Self { time_min, time_max })
  }

  #[must_use]
  pub fn query_pairs(
    &self
  ) -> Vec<(&'static str, String)> {
    vec![
      (
        "timeMin",
        self.time_min.to_rfc3339_opts(
          SecondsFormat::Millis,
          true
        )
      ),
      (
        "timeMax",
        self.time_max.to_rfc3339_opts(
          SecondsFormat::Millis,
          true
        )
      ),
      ("singleEvents", "true".to_string()),
      ("orderBy", "startTime".to_string()),
      ("maxResults", MAX_RESULTS.to_string()),
    ]
  }
}

/// An access token handed to the fetch
/// layer explicitly, with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  access_token: String,
  expires_at:   DateTime<Utc>
}

impl Session {
  pub fn new(
    access_token: impl Into<String>,
    expires_at: DateTime<Utc>
  ) -> anyhow::Result<Self> {
    let access_token = access_token.into();
    if access_token.trim().is_empty() {
      return Err(anyhow!(
        "access token cannot be empty"
      ));
    }
    Ok(Self {
      access_token,
      expires_at
    })
  }

  #[must_use]
  pub fn is_expired(
    &self,
    now: DateTime<Utc>
  ) -> bool {
    now >= self.expires_at
  }

  #[must_use]
  pub fn expires_at(&self) -> DateTime<Utc> {
    self.expires_at
  }

  pub fn bearer_header(
    &self,
    now: DateTime<Utc>
  ) -> anyhow::Result<String> {
    if self.is_expired(now) {
      return Err(anyhow!(
        "session expired at {}",
        self.expires_at.to_rfc3339()
      ));
    }
    Ok(format!(
      "Bearer {}",
      self.access_token
    ))
  }
}
