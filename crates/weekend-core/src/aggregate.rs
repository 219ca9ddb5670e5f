use std::collections::BTreeMap;

use serde::Serialize;

use crate::event::CalendarEvent;
use crate::window::WeekendWindow;

/// Events of one day, split into the
/// all-day strip and the timed grid.
/// Both lists are sorted by start.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
)]
pub struct DayBucket {
  pub all_day: Vec<CalendarEvent>,
  pub timed:   Vec<CalendarEvent>
}

impl DayBucket {
  fn from_sorted(
    events: Vec<CalendarEvent>
  ) -> Self {
    let (all_day, timed) = events
      .into_iter()
      .partition(CalendarEvent::is_all_day);
    Self { all_day, timed }
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.all_day.len() + self.timed.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// All events of the day in start
  /// order, all-day and timed merged.
  pub fn iter(
    &self
  ) -> impl Iterator<Item = &CalendarEvent>
  {
    let mut merged = self
      .all_day
      .iter()
      .chain(self.timed.iter())
      .collect::<Vec<_>>();
    merged.sort_by(|a, b| {
      a.sort_key().cmp(b.sort_key())
    });
    merged.into_iter()
  }
}

#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
)]
pub struct WeekendEvents {
  pub saturday: DayBucket,
  pub sunday:   DayBucket
}

impl WeekendEvents {
  #[must_use]
  pub fn total(&self) -> usize {
    self.saturday.len()
      + self.sunday.len()
  }
}

/// Buckets events into the weekend and
/// day their effective date falls on.
///
/// Every window gets an entry, even when
/// empty. Events without a start date are
/// dropped; ties keep input order.
#[tracing::instrument(
  skip_all,
  fields(
    events = events.len(),
    windows = windows.len()
  )
)]
pub fn aggregate(
  events: &[CalendarEvent],
  windows: &[WeekendWindow]
) -> BTreeMap<String, WeekendEvents> {
  let mut grouped = BTreeMap::new();
  if windows.is_empty() {
    return grouped;
  }

  let dropped = events
    .iter()
    .filter(|event| {
      event.effective_date().is_none()
    })
    .count();
  if dropped > 0 {
    tracing::warn!(
      dropped,
      "skipping events without a start date"
    );
  }

  for window in windows {
    let saturday = window.saturday_key();
    let sunday = window.sunday_key();

    let mut sat_events = Vec::new();
    let mut sun_events = Vec::new();
    for event in events {
      match event.effective_date() {
        | Some(date) if date == saturday => {
          sat_events.push(event.clone());
        }
        | Some(date) if date == sunday => {
          sun_events.push(event.clone());
        }
        | _ => {}
      }
    }

    sat_events.sort_by(|a, b| {
      a.sort_key().cmp(b.sort_key())
    });
    sun_events.sort_by(|a, b| {
      a.sort_key().cmp(b.sort_key())
    });

    tracing::trace!(
      key = %window.key,
      saturday = sat_events.len(),
      sunday = sun_events.len(),
      "bucketed weekend"
    );

    grouped.insert(
      window.key.clone(),
      WeekendEvents {
        saturday: DayBucket::from_sorted(
          sat_events
        ),
        sunday:   DayBucket::from_sorted(
          sun_events
        )
      }
    );
  }

  grouped
}
