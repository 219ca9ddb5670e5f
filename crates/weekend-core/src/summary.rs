use chrono::Datelike;
use serde::Serialize;

use crate::aggregate::WeekendEvents;
use crate::event::CalendarEvent;
use crate::window::WeekendWindow;

pub const DEFAULT_BUSY_THRESHOLD: usize = 3;
pub const ALL_DAY_LABEL: &str = "All day";

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
  Free,
  Normal,
  Busy
}

impl Availability {
  #[must_use]
  pub fn from_count(
    total: usize,
    busy_threshold: usize
  ) -> Self {
    if total == 0 {
      Self::Free
    } else if total >= busy_threshold {
      Self::Busy
    } else {
      Self::Normal
    }
  }

  #[must_use]
  pub fn badge(self) -> Option<&'static str> {
    match self {
      | Self::Free => Some("Free"),
      | Self::Busy => Some("Busy"),
      | Self::Normal => None
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekendSummary {
  pub key:          String,
  pub month_label:  String,
  pub day_range:    String,
  pub total_events: usize,
  pub availability: Availability
}

#[must_use]
pub fn summarize(
  window: &WeekendWindow,
  events: Option<&WeekendEvents>,
  busy_threshold: usize
) -> WeekendSummary {
  let total_events =
    events.map_or(0, WeekendEvents::total);
  WeekendSummary {
    key: window.key.clone(),
    month_label: month_label(window),
    day_range: format!(
      "{} \u{2013} {}",
      window.saturday.day(),
      window.sunday.day()
    ),
    total_events,
    availability: Availability::from_count(
      total_events,
      busy_threshold
    )
  }
}

/// `January 2025`, or `Jan / Feb 2025`
/// when the weekend spans two months.
#[must_use]
pub fn month_label(
  window: &WeekendWindow
) -> String {
  if window.saturday.month()
    == window.sunday.month()
  {
    window
      .saturday
      .format("%B %Y")
      .to_string()
  } else {
    format!(
      "{} / {}",
      window.saturday.format("%b"),
      window.sunday.format("%b %Y")
    )
  }
}

/// `All day`, or the start time such as
/// `9:30 AM`.
#[must_use]
pub fn time_label(
  event: &CalendarEvent
) -> String {
  if event.is_all_day() {
    return ALL_DAY_LABEL.to_string();
  }
  event
    .start
    .wall_clock()
    .map(|start| {
      start.format("%-I:%M %p").to_string()
    })
    .unwrap_or_default()
}

/// `9:30 – 11:00 AM` for timed events.
#[must_use]
pub fn time_range_label(
  event: &CalendarEvent
) -> String {
  if event.is_all_day() {
    return ALL_DAY_LABEL.to_string();
  }
  match (
    event.start.wall_clock(),
    event.end.wall_clock()
  ) {
    | (Some(start), Some(end)) => {
      format!(
        "{} \u{2013} {}",
        start.format("%-I:%M"),
        end.format("%-I:%M %p")
      )
    }
    | (Some(_), None) => time_label(event),
    | _ => String::new()
  }
}

/// Compact hour-axis label: `12a`, `7a`,
/// `12p`, `9p`.
#[must_use]
pub fn hour_label(hour: u32) -> String {
  match hour % 24 {
    | 0 => "12a".to_string(),
    | h @ 1..=11 => format!("{h}a"),
    | 12 => "12p".to_string(),
    | h => format!("{}p", h - 12)
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::window::generate;

  fn first_window(
    y: i32,
    m: u32,
    d: u32
  ) -> WeekendWindow {
    generate(
      NaiveDate::from_ymd_opt(y, m, d)
        .expect("date"),
      1
    )
    .remove(0)
  }

  #[test]
  fn availability_thresholds() {
    assert_eq!(
      Availability::from_count(0, 3),
      Availability::Free
    );
    assert_eq!(
      Availability::from_count(2, 3),
      Availability::Normal
    );
    assert_eq!(
      Availability::from_count(3, 3),
      Availability::Busy
    );
    assert_eq!(
      Availability::Normal.badge(),
      None
    );
  }

  #[test]
  fn month_label_same_month() {
    let window = first_window(2024, 1, 3);
    assert_eq!(
      month_label(&window),
      "January 2024"
    );
  }

  #[test]
  fn month_label_at_month_end() {
    let window = first_window(2024, 3, 28);
    assert_eq!(window.key, "2024-03-30");
    assert_eq!(
      month_label(&window),
      "March 2024"
    );
    let window = first_window(2024, 8, 29);
    assert_eq!(window.key, "2024-08-31");
    assert_eq!(
      month_label(&window),
      "Aug / Sep 2024"
    );
  }

  #[test]
  fn summary_of_empty_weekend_is_free() {
    let window = first_window(2024, 8, 29);
    let summary =
      summarize(&window, None, 3);
    assert_eq!(summary.total_events, 0);
    assert_eq!(
      summary.availability,
      Availability::Free
    );
    assert_eq!(
      summary.day_range,
      "31 \u{2013} 1"
    );
  }

  #[test]
  fn time_labels() {
    let event = CalendarEvent::timed(
      "a",
      "cal",
      "Lunch",
      "2024-01-06T12:15:00-05:00",
      "2024-01-06T13:45:00-05:00"
    );
    assert_eq!(time_label(&event), "12:15 PM");
    assert_eq!(
      time_range_label(&event),
      "12:15 \u{2013} 1:45 PM"
    );
    let all_day = CalendarEvent::all_day(
      "b", "cal", "Trip", "2024-01-06"
    );
    assert_eq!(time_label(&all_day), "All day");
  }

  #[test]
  fn hour_labels() {
    assert_eq!(hour_label(0), "12a");
    assert_eq!(hour_label(7), "7a");
    assert_eq!(hour_label(12), "12p");
    assert_eq!(hour_label(21), "9p");
  }
}
