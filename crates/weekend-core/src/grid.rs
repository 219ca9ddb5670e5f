use serde::{
  Deserialize,
  Serialize
};

use crate::aggregate::DayBucket;
use crate::layout::{
  LaidOutEvent,
  layout_with_min_duration
};
use crate::summary::hour_label;

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct GridConfig {
  pub start_hour:           u32,
  pub end_hour:             u32,
  pub px_per_hour:          f64,
  pub min_duration_minutes: u32
}

impl Default for GridConfig {
  fn default() -> Self {
    Self {
      start_hour:           7,
      end_hour:             22,
      px_per_hour:          48.0,
      min_duration_minutes: 30
    }
  }
}

impl GridConfig {
  #[must_use]
  pub fn visible_hours(&self) -> u32 {
    self
      .end_hour
      .saturating_sub(self.start_hour)
  }

  #[must_use]
  pub fn total_height_px(&self) -> f64 {
    f64::from(self.visible_hours())
      * self.px_per_hour
  }

  /// One horizontal rule per visible
  /// hour, top edge first.
  #[must_use]
  pub fn hour_marks(&self) -> Vec<HourMark> {
    (self.start_hour..self.end_hour)
      .map(|hour| HourMark {
        hour,
        top_px: f64::from(
          hour - self.start_hour
        ) * self.px_per_hour,
        label: hour_label(hour)
      })
      .collect()
  }
}

#[derive(
  Debug, Clone, PartialEq, Serialize,
)]
pub struct HourMark {
  pub hour:   u32,
  pub top_px: f64,
  pub label:  String
}

#[derive(
  Debug, Clone, Copy, PartialEq, Serialize,
)]
pub struct GridGeometry {
  pub top_px:        f64,
  pub height_px:     f64,
  pub left_percent:  f64,
  pub width_percent: f64
}

/// Pixel box for a laid-out event.
///
/// Short events are stretched to the
/// minimum duration; anything reaching
/// past either edge of the visible range
/// is cropped at that edge. Events that
/// start after the range collapse onto
/// the bottom edge.
#[must_use]
pub fn map_to_grid(
  event: &LaidOutEvent<'_>,
  grid: &GridConfig
) -> GridGeometry {
  let duration = event
    .end_minutes
    .saturating_sub(event.start_minutes)
    .max(grid.min_duration_minutes);

  let offset_minutes =
    f64::from(event.start_minutes)
      - f64::from(grid.start_hour * 60);
  let total_px = grid.total_height_px();
  let top_px = (offset_minutes / 60.0
    * grid.px_per_hour)
    .max(0.0)
    .min(total_px);

  let height_px = (f64::from(duration)
    / 60.0
    * grid.px_per_hour)
    .min(total_px - top_px)
    .max(0.0);

  let columns =
    event.total_columns.max(1) as f64;
  let width_percent = 100.0 / columns;

  GridGeometry {
    top_px,
    height_px,
    left_percent: event.column as f64
      * width_percent,
    width_percent
  }
}

#[derive(
  Debug, Clone, PartialEq, Serialize,
)]
pub struct PlacedEvent<'a> {
  pub layout:   LaidOutEvent<'a>,
  pub geometry: GridGeometry
}

/// Column layout and pixel geometry for
/// every timed event of one day.
pub fn layout_day<'a>(
  bucket: &'a DayBucket,
  grid: &GridConfig
) -> Vec<PlacedEvent<'a>> {
  layout_with_min_duration(
    &bucket.timed,
    grid.min_duration_minutes
  )
  .into_iter()
  .map(|layout| {
    let geometry =
      map_to_grid(&layout, grid);
    PlacedEvent { layout, geometry }
  })
  .collect()
}

#[cfg(test)]
mod tests {
  use super::{
    GridConfig,
    map_to_grid
  };
  use crate::event::CalendarEvent;
  use crate::layout::LaidOutEvent;

  fn laid(
    event: &CalendarEvent,
    start: u32,
    end: u32,
    column: usize,
    total_columns: usize
  ) -> LaidOutEvent<'_> {
    LaidOutEvent {
      event,
      start_minutes: start,
      end_minutes: end,
      column,
      total_columns
    }
  }

  fn sample() -> CalendarEvent {
    CalendarEvent::all_day(
      "x", "cal", "x", "2024-01-06"
    )
  }

  #[test]
  fn maps_hour_offsets_to_pixels() {
    let event = sample();
    let grid = GridConfig::default();
    let geo = map_to_grid(
      &laid(&event, 9 * 60, 10 * 60 + 30, 0, 1),
      &grid
    );
    assert_eq!(geo.top_px, 96.0);
    assert_eq!(geo.height_px, 72.0);
    assert_eq!(geo.left_percent, 0.0);
    assert_eq!(geo.width_percent, 100.0);
  }

  #[test]
  fn short_events_use_minimum_height() {
    let event = sample();
    let geo = map_to_grid(
      &laid(&event, 9 * 60, 9 * 60 + 5, 0, 1),
      &GridConfig::default()
    );
    assert_eq!(geo.height_px, 24.0);
  }

  #[test]
  fn early_events_clamp_to_top() {
    let event = sample();
    let geo = map_to_grid(
      &laid(&event, 6 * 60, 8 * 60, 0, 1),
      &GridConfig::default()
    );
    assert_eq!(geo.top_px, 0.0);
    assert_eq!(geo.height_px, 96.0);
  }

  #[test]
  fn late_events_crop_at_bottom() {
    let event = sample();
    let grid = GridConfig::default();
    let geo = map_to_grid(
      &laid(&event, 21 * 60 + 30, 23 * 60, 0, 1),
      &grid
    );
    assert_eq!(geo.top_px, 696.0);
    assert_eq!(
      geo.top_px + geo.height_px,
      grid.total_height_px()
    );

    let after = map_to_grid(
      &laid(&event, 23 * 60, 23 * 60 + 30, 0, 1),
      &grid
    );
    assert_eq!(after.top_px, 720.0);
    assert_eq!(after.height_px, 0.0);
  }

  #[test]
  fn boxes_stay_inside_grid() {
    let event = sample();
    let grid = GridConfig::default();
    for start in (0..24 * 60).step_by(10) {
      let geo = map_to_grid(
        &laid(&event, start, start + 45, 0, 1),
        &grid
      );
      assert!(geo.top_px >= 0.0);
      assert!(
        geo.top_px + geo.height_px
          <= grid.total_height_px(),
        "start {start} overflows"
      );
    }
  }

  #[test]
  fn columns_split_width_evenly() {
    let event = sample();
    let geo = map_to_grid(
      &laid(&event, 9 * 60, 10 * 60, 2, 4),
      &GridConfig::default()
    );
    assert_eq!(geo.width_percent, 25.0);
    assert_eq!(geo.left_percent, 50.0);
  }

  #[test]
  fn top_grows_with_start_until_clamp() {
    let event = sample();
    let grid = GridConfig::default();
    let mut previous = None;
    for start in (7 * 60..22 * 60).step_by(15) {
      let geo = map_to_grid(
        &laid(&event, start, start + 60, 0, 1),
        &grid
      );
      if let Some(prev) = previous {
        assert!(geo.top_px > prev);
      }
      previous = Some(geo.top_px);
    }
  }

  #[test]
  fn hour_marks_cover_visible_range() {
    let grid = GridConfig::default();
    let marks = grid.hour_marks();
    assert_eq!(marks.len(), 15);
    assert_eq!(marks[0].label, "7a");
    assert_eq!(marks[0].top_px, 0.0);
    assert_eq!(marks[5].label, "12p");
    assert_eq!(marks[14].label, "9p");
    assert_eq!(marks[14].top_px, 672.0);
    assert_eq!(grid.total_height_px(), 720.0);
  }
}
