//! Side-by-side placement of one day's
//! timed events.
//!
//! Events are grouped into clusters of
//! transitively overlapping intervals.
//! Each cluster is packed greedily into
//! the fewest columns that avoid a
//! collision, and every member of the
//! cluster shares the cluster's column
//! count so that lanes render at equal
//! width.
//!
//! A bridging event can pull two
//! otherwise disjoint events into one
//! cluster; every member then takes the
//! wider column count.

use serde::Serialize;

use crate::datetime::{
  MINUTES_PER_DAY,
  minutes_since_midnight
};
use crate::event::CalendarEvent;

/// Length given to zero-length and
/// inverted events before packing.
pub const DEFAULT_MIN_DURATION_MINUTES:
  u32 = 30;

/// A timed event reduced to minutes
/// since midnight of its own day.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct TimedSpan<'a> {
  pub event:         &'a CalendarEvent,
  pub start_minutes: u32,
  pub end_minutes:   u32
}

impl<'a> TimedSpan<'a> {
  /// Reads the start and end instants.
  ///
  /// Ends on a later day are clipped to
  /// midnight. Ends at or before the
  /// start are pushed out to
  /// `min_duration` past the start, still
  /// stopping at midnight.
  pub fn from_event(
    event: &'a CalendarEvent,
    min_duration: u32
  ) -> Option<Self> {
    let start = event.start.wall_clock()?;
    let end = event.end.wall_clock()?;

    let start_minutes =
      minutes_since_midnight(start);
    let mut end_minutes =
      if end.date() > start.date() {
        MINUTES_PER_DAY
      } else {
        minutes_since_midnight(end)
      };

    if end < start
      || end_minutes <= start_minutes
    {
      tracing::debug!(
        id = %event.id,
        start_minutes,
        end_minutes,
        "degenerate interval; applying minimum duration"
      );
      end_minutes = start_minutes
        .saturating_add(min_duration.max(1))
        .min(MINUTES_PER_DAY);
    }

    Some(Self {
      event,
      start_minutes,
      end_minutes
    })
  }

  #[must_use]
  pub fn duration(&self) -> u32 {
    self
      .end_minutes
      .saturating_sub(self.start_minutes)
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct LaidOutEvent<'a> {
  pub event:         &'a CalendarEvent,
  pub start_minutes: u32,
  pub end_minutes:   u32,
  pub column:        usize,
  pub total_columns: usize
}

/// Lays out a day's timed events using
/// the default minimum duration for
/// degenerate intervals.
pub fn layout(
  events: &[CalendarEvent]
) -> Vec<LaidOutEvent<'_>> {
  layout_with_min_duration(
    events,
    DEFAULT_MIN_DURATION_MINUTES
  )
}

#[tracing::instrument(
  skip(events),
  fields(events = events.len())
)]
pub fn layout_with_min_duration(
  events: &[CalendarEvent],
  min_duration: u32
) -> Vec<LaidOutEvent<'_>> {
  let spans = events
    .iter()
    .filter_map(|event| {
      let span = TimedSpan::from_event(
        event,
        min_duration
      );
      if span.is_none() {
        tracing::warn!(
          id = %event.id,
          "skipping event with unreadable start or end"
        );
      }
      span
    })
    .collect::<Vec<_>>();
  layout_spans(spans)
}

/// Packs spans into columns. Output is in
/// processing order: by start, then
/// longest first, then input order.
#[must_use]
pub fn layout_spans(
  mut spans: Vec<TimedSpan<'_>>
) -> Vec<LaidOutEvent<'_>> {
  spans.sort_by(|a, b| {
    a.start_minutes
      .cmp(&b.start_minutes)
      .then_with(|| {
        b.duration().cmp(&a.duration())
      })
  });

  let mut laid_out =
    Vec::with_capacity(spans.len());
  let mut cluster_start = 0;
  let mut cluster_end = 0;
  let mut column_ends: Vec<u32> =
    Vec::new();

  for span in spans {
    if laid_out.len() > cluster_start
      && span.start_minutes >= cluster_end
    {
      close_cluster(
        &mut laid_out[cluster_start..],
        column_ends.len()
      );
      cluster_start = laid_out.len();
      column_ends.clear();
    }

    if laid_out.len() == cluster_start {
      cluster_end = span.end_minutes;
    } else {
      cluster_end =
        cluster_end.max(span.end_minutes);
    }

    let column = match column_ends
      .iter()
      .position(|&end| {
        end <= span.start_minutes
      }) {
      | Some(free) => {
        column_ends[free] =
          span.end_minutes;
        free
      }
      | None => {
        column_ends.push(span.end_minutes);
        column_ends.len() - 1
      }
    };

    laid_out.push(LaidOutEvent {
      event: span.event,
      start_minutes: span.start_minutes,
      end_minutes: span.end_minutes,
      column,
      total_columns: 0
    });
  }

  close_cluster(
    &mut laid_out[cluster_start..],
    column_ends.len()
  );

  tracing::trace!(
    events = laid_out.len(),
    max_columns = laid_out
      .iter()
      .map(|e| e.total_columns)
      .max()
      .unwrap_or(0),
    "laid out day"
  );
  laid_out
}

fn close_cluster(
  cluster: &mut [LaidOutEvent<'_>],
  columns: usize
) {
  for event in cluster {
    event.total_columns = columns;
  }
}

#[cfg(test)]
mod tests {
  use super::{
    LaidOutEvent,
    TimedSpan,
    layout
  };
  use crate::event::CalendarEvent;

  fn at(
    id: &str,
    start: &str,
    end: &str
  ) -> CalendarEvent {
    CalendarEvent::timed(
      id,
      "cal",
      id,
      &format!("2024-01-06T{start}:00Z"),
      &format!("2024-01-06T{end}:00Z")
    )
  }

  fn find<'a>(
    laid: &'a [LaidOutEvent<'a>],
    id: &str
  ) -> &'a LaidOutEvent<'a> {
    laid
      .iter()
      .find(|e| e.event.id == id)
      .expect("event present")
  }

  #[test]
  fn single_event_is_one_column() {
    let events =
      vec![at("a", "09:00", "10:00")];
    let laid = layout(&events);
    assert_eq!(laid.len(), 1);
    assert_eq!(laid[0].column, 0);
    assert_eq!(laid[0].total_columns, 1);
    assert_eq!(laid[0].start_minutes, 540);
    assert_eq!(laid[0].end_minutes, 600);
  }

  #[test]
  fn disjoint_events_share_column_zero() {
    let events = (0..8)
      .map(|h| {
        at(
          &format!("e{h}"),
          &format!("{:02}:00", 8 + h),
          &format!("{:02}:00", 9 + h)
        )
      })
      .collect::<Vec<_>>();
    let laid = layout(&events);
    assert_eq!(laid.len(), 8);
    assert!(laid.iter().all(|e| {
      e.column == 0 && e.total_columns == 1
    }));
  }

  #[test]
  fn identical_events_split() {
    let events = vec![
      at("a", "09:00", "10:00"),
      at("b", "09:00", "10:00"),
    ];
    let laid = layout(&events);
    assert_eq!(find(&laid, "a").column, 0);
    assert_eq!(find(&laid, "b").column, 1);
    assert!(
      laid.iter().all(|e| e.total_columns == 2)
    );
  }

  #[test]
  fn overlapping_pair_then_gap() {
    let events = vec![
      at("C", "11:00", "11:30"),
      at("B", "09:30", "10:30"),
      at("A", "09:00", "10:00"),
    ];
    let laid = layout(&events);
    let ids = laid
      .iter()
      .map(|e| e.event.id.as_str())
      .collect::<Vec<_>>();
    assert_eq!(ids, vec!["A", "B", "C"]);

    let a = find(&laid, "A");
    let b = find(&laid, "B");
    let c = find(&laid, "C");
    assert_eq!((a.column, a.total_columns), (0, 2));
    assert_eq!((b.column, b.total_columns), (1, 2));
    assert_eq!((c.column, c.total_columns), (0, 1));
  }

  #[test]
  fn touching_events_do_not_cluster() {
    let events = vec![
      at("a", "09:00", "10:00"),
      at("b", "10:00", "11:00"),
    ];
    let laid = layout(&events);
    assert!(laid.iter().all(|e| {
      e.column == 0 && e.total_columns == 1
    }));
  }

  #[test]
  fn longer_event_wins_tied_start() {
    let events = vec![
      at("short", "09:00", "09:30"),
      at("long", "09:00", "12:00"),
    ];
    let laid = layout(&events);
    assert_eq!(laid[0].event.id, "long");
    assert_eq!(find(&laid, "long").column, 0);
    assert_eq!(find(&laid, "short").column, 1);
  }

  #[test]
  fn bridge_event_widens_whole_cluster() {
    // "bridge" overlaps both "a" and "c",
    // which never overlap each other.
    let events = vec![
      at("a", "09:00", "10:00"),
      at("bridge", "09:30", "11:30"),
      at("c", "11:00", "12:00"),
    ];
    let laid = layout(&events);
    assert_eq!(find(&laid, "a").column, 0);
    assert_eq!(
      find(&laid, "bridge").column,
      1
    );
    assert_eq!(find(&laid, "c").column, 0);
    assert!(
      laid.iter().all(|e| e.total_columns == 2)
    );
  }

  #[test]
  fn freed_column_is_reused() {
    let events = vec![
      at("long", "09:00", "13:00"),
      at("first", "09:00", "10:00"),
      at("second", "10:00", "11:00"),
      at("third", "10:30", "11:30"),
    ];
    let laid = layout(&events);
    assert_eq!(find(&laid, "long").column, 0);
    assert_eq!(find(&laid, "first").column, 1);
    assert_eq!(
      find(&laid, "second").column,
      1
    );
    assert_eq!(find(&laid, "third").column, 2);
    assert!(
      laid.iter().all(|e| e.total_columns == 3)
    );
  }

  #[test]
  fn overlapping_events_never_share_column()
  {
    let events = vec![
      at("a", "08:00", "09:15"),
      at("b", "08:30", "08:45"),
      at("c", "08:40", "10:00"),
      at("d", "09:00", "09:30"),
      at("e", "09:20", "11:00"),
      at("f", "13:00", "14:00"),
      at("g", "13:30", "15:00"),
    ];
    let laid = layout(&events);
    for x in &laid {
      assert!(x.column < x.total_columns);
      for y in &laid {
        let overlap = x.start_minutes
          < y.end_minutes
          && y.start_minutes < x.end_minutes;
        if x.event.id != y.event.id && overlap {
          assert_ne!(
            x.column, y.column,
            "{} and {} collide",
            x.event.id, y.event.id
          );
        }
      }
    }
  }

  #[test]
  fn degenerate_interval_gets_minimum_length()
  {
    let inverted =
      at("inv", "10:00", "09:00");
    let span =
      TimedSpan::from_event(&inverted, 30)
        .expect("span");
    assert_eq!(span.start_minutes, 600);
    assert_eq!(span.end_minutes, 630);

    let events = vec![
      at("zero", "10:00", "10:00"),
      at("other", "10:15", "11:00"),
    ];
    let laid = layout(&events);
    assert_eq!(find(&laid, "zero").column, 0);
    assert_eq!(
      find(&laid, "other").column,
      1
    );
  }

  #[test]
  fn zero_length_event_near_midnight_stays_in_day()
  {
    let event = at("late", "23:50", "23:50");
    let span =
      TimedSpan::from_event(&event, 30)
        .expect("span");
    assert_eq!(span.start_minutes, 1430);
    assert_eq!(span.end_minutes, 1440);
    assert!(span.end_minutes > span.start_minutes);

    let last = at("last", "23:59", "23:59");
    let span =
      TimedSpan::from_event(&last, 0)
        .expect("span");
    assert_eq!(span.end_minutes, 1440);
  }

  #[test]
  fn overnight_event_clips_to_midnight() {
    let event = CalendarEvent::timed(
      "late",
      "cal",
      "Party",
      "2024-01-06T22:00:00Z",
      "2024-01-07T02:00:00Z"
    );
    let span =
      TimedSpan::from_event(&event, 30)
        .expect("span");
    assert_eq!(span.end_minutes, 1440);
  }

  #[test]
  fn unreadable_events_are_skipped() {
    let mut broken =
      at("broken", "09:00", "10:00");
    broken.end.date_time = None;
    let events = vec![
      broken,
      at("ok", "09:00", "10:00"),
    ];
    let laid = layout(&events);
    assert_eq!(laid.len(), 1);
    assert_eq!(laid[0].event.id, "ok");
    assert_eq!(laid[0].total_columns, 1);
  }

  #[test]
  fn repeated_calls_match() {
    let events = vec![
      at("a", "09:00", "10:00"),
      at("b", "09:30", "10:30"),
    ];
    assert_eq!(
      layout(&events),
      layout(&events)
    );
  }

  #[test]
  fn empty_day_is_empty() {
    assert!(layout(&[]).is_empty());
  }
}
