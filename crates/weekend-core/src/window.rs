use chrono::{
  Datelike,
  Days,
  NaiveDate
};
use serde::Serialize;

/// A Saturday and the Sunday after it, rendered as one card.
#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct WeekendWindow {
  pub key:      String,
  pub saturday: NaiveDate,
  pub sunday:   NaiveDate
}

impl WeekendWindow {
  fn starting(
    saturday: NaiveDate
  ) -> Option<Self> {
    let sunday = saturday
      .checked_add_days(Days::new(1))?;
    Some(Self {
      key: format_iso_date(saturday),
      saturday,
      sunday
    })
  }

  #[must_use]
  pub fn saturday_key(&self) -> String {
    format_iso_date(self.saturday)
  }

  #[must_use]
  pub fn sunday_key(&self) -> String {
    format_iso_date(self.sunday)
  }
}

#[must_use]
pub fn format_iso_date(
  date: NaiveDate
) -> String {
  date.format("%Y-%m-%d").to_string()
}

/// Days from `reference` to the first
/// Saturday shown. A Sunday skips its
/// own (half-finished) weekend.
fn days_to_first_saturday(
  reference: NaiveDate
) -> u64 {
  match reference
    .weekday()
    .num_days_from_sunday()
  {
    | 6 => 0,
    | 0 => 6,
    | dow => u64::from(6 - dow)
  }
}

/// Builds `count` consecutive weekend
/// windows starting at the first
/// Saturday on or after `reference`.
///
/// Generation stops early only if the
/// calendar runs out of representable
/// dates.
#[tracing::instrument(level = "debug")]
pub fn generate(
  reference: NaiveDate,
  count: usize
) -> Vec<WeekendWindow> {
  let Some(first) = reference
    .checked_add_days(Days::new(
      days_to_first_saturday(reference)
    ))
  else {
    tracing::warn!(
      %reference,
      "reference date too close to calendar limit"
    );
    return vec![];
  };

  let windows = std::iter::successors(
    Some(first),
    |saturday| {
      saturday
        .checked_add_days(Days::new(7))
    }
  )
  .take(count)
  .map_while(WeekendWindow::starting)
  .collect::<Vec<_>>();

  tracing::debug!(
    generated = windows.len(),
    first = ?windows.first().map(|w| &w.key),
    "generated weekend windows"
  );
  windows
}
