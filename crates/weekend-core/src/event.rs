use chrono::NaiveDateTime;
use serde::{
  Deserialize,
  Serialize
};

use crate::datetime::parse_wall_clock;

pub const UNTITLED: &str = "(no title)";

/// Start or end of an event. All-day
/// events carry `date`, timed events
/// carry `dateTime`.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub date:      Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub date_time: Option<String>
}

impl EventTime {
  #[must_use]
  pub fn all_day(date: &str) -> Self {
    Self {
      date:      Some(date.to_string()),
      date_time: None
    }
  }

  #[must_use]
  pub fn at(date_time: &str) -> Self {
    Self {
      date:      None,
      date_time: Some(
        date_time.to_string()
      )
    }
  }

  #[must_use]
  pub fn wall_clock(
    &self
  ) -> Option<NaiveDateTime> {
    self
      .date_time
      .as_deref()
      .and_then(parse_wall_clock)
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
  pub id:          String,
  #[serde(default)]
  pub calendar_id: String,
  #[serde(default)]
  pub summary:     Option<String>,
  #[serde(default)]
  pub start:       EventTime,
  #[serde(default)]
  pub end:         EventTime
}

impl CalendarEvent {
  #[must_use]
  pub fn all_day(
    id: &str,
    calendar_id: &str,
    summary: &str,
    date: &str
  ) -> Self {
    Self {
      id:          id.to_string(),
      calendar_id: calendar_id
        .to_string(),
      summary:     Some(
        summary.to_string()
      ),
      start:       EventTime::all_day(
        date
      ),
      end:         EventTime::default()
    }
  }

  #[must_use]
  pub fn timed(
    id: &str,
    calendar_id: &str,
    summary: &str,
    start: &str,
    end: &str
  ) -> Self {
    Self {
      id:          id.to_string(),
      calendar_id: calendar_id
        .to_string(),
      summary:     Some(
        summary.to_string()
      ),
      start:       EventTime::at(start),
      end:         EventTime::at(end)
    }
  }

  #[must_use]
  pub fn is_all_day(&self) -> bool {
    self.start.date.is_some()
  }

  /// The calendar date this event is
  /// bucketed under, as written in the
  /// source record.
  #[must_use]
  pub fn effective_date(
    &self
  ) -> Option<&str> {
    if let Some(date) =
      self.start.date.as_deref()
    {
      return Some(date);
    }
    self
      .start
      .date_time
      .as_deref()
      .and_then(|raw| raw.get(..10))
  }

  #[must_use]
  pub fn sort_key(&self) -> &str {
    self
      .start
      .date_time
      .as_deref()
      .or(self.start.date.as_deref())
      .unwrap_or_default()
  }

  #[must_use]
  pub fn display_title(&self) -> &str {
    self
      .summary
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .unwrap_or(UNTITLED)
  }
}

#[cfg(test)]
mod tests {
  use super::{
    CalendarEvent,
    EventTime
  };

  #[test]
  fn effective_date_prefers_all_day() {
    let event = CalendarEvent::all_day(
      "a", "cal", "Trip", "2024-01-06"
    );
    assert!(event.is_all_day());
    assert_eq!(
      event.effective_date(),
      Some("2024-01-06")
    );
  }

  #[test]
  fn effective_date_truncates_instant() {
    let event = CalendarEvent::timed(
      "a",
      "cal",
      "Late dinner",
      "2024-01-06T23:30:00-08:00",
      "2024-01-07T00:30:00-08:00"
    );
    assert_eq!(
      event.effective_date(),
      Some("2024-01-06")
    );
    assert_eq!(
      event.sort_key(),
      "2024-01-06T23:30:00-08:00"
    );
  }

  #[test]
  fn missing_start_has_no_date() {
    let mut event = CalendarEvent::all_day(
      "a", "cal", "x", "2024-01-06"
    );
    event.start = EventTime::default();
    assert_eq!(
      event.effective_date(),
      None
    );
    assert_eq!(event.sort_key(), "");
  }

  #[test]
  fn decodes_api_shape() {
    let event: CalendarEvent =
      serde_json::from_str(
        r#"{
          "id": "evt1",
          "summary": "Brunch",
          "status": "confirmed",
          "start": {"dateTime": "2024-01-06T10:00:00Z"},
          "end": {"dateTime": "2024-01-06T11:00:00Z"}
        }"#
      )
      .expect("decode event");
    assert_eq!(event.calendar_id, "");
    assert_eq!(
      event.start.date_time.as_deref(),
      Some("2024-01-06T10:00:00Z")
    );
    assert!(!event.is_all_day());
  }

  #[test]
  fn blank_summary_is_untitled() {
    let mut event = CalendarEvent::all_day(
      "a", "cal", "  ", "2024-01-06"
    );
    assert_eq!(
      event.display_title(),
      "(no title)"
    );
    event.summary = None;
    assert_eq!(
      event.display_title(),
      "(no title)"
    );
  }
}
