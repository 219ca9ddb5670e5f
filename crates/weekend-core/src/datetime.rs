use chrono::{
  DateTime,
  LocalResult,
  NaiveDate,
  NaiveDateTime,
  NaiveTime,
  TimeZone,
  Timelike,
  Utc
};
use chrono_tz::Tz;

pub const TIMEZONE_ENV_VAR: &str =
  "WEEKENDS_TIMEZONE";

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Picks the display timezone: the
/// configured id, then the env var, then
/// UTC. Bad ids are logged and skipped.
pub fn resolve_timezone(
  configured: Option<&str>
) -> Tz {
  if let Some(raw) = configured
    && let Some(tz) =
      parse_timezone(raw, "config")
  {
    return tz;
  }

  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(&raw, TIMEZONE_ENV_VAR)
  {
    return tz;
  }

  tracing::debug!(
    "no timezone configured; using UTC"
  );
  chrono_tz::UTC
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "configured display timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

#[must_use]
pub fn today_in(
  tz: &Tz,
  now: DateTime<Utc>
) -> NaiveDate {
  now.with_timezone(tz).date_naive()
}

/// Converts a wall-clock time in `tz` to
/// UTC. Ambiguous times take the earlier
/// instant; times skipped by a DST jump
/// move forward an hour.
pub fn local_to_utc(
  tz: &Tz,
  local: NaiveDateTime
) -> Option<DateTime<Utc>> {
  match tz.from_local_datetime(&local) {
    | LocalResult::Single(dt) => {
      Some(dt.with_timezone(&Utc))
    }
    | LocalResult::Ambiguous(
      first,
      second
    ) => {
      let chosen = if first <= second {
        first
      } else {
        second
      };
      Some(chosen.with_timezone(&Utc))
    }
    | LocalResult::None => {
      tracing::warn!(
        %local,
        "local time does not exist; shifting forward one hour"
      );
      let shifted = local
        .checked_add_signed(
          chrono::Duration::hours(1)
        )?;
      tz.from_local_datetime(&shifted)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
    }
  }
}

/// First and last instant of `date` in
/// `tz`, both as UTC.
pub fn day_bounds(
  tz: &Tz,
  date: NaiveDate
) -> Option<(DateTime<Utc>, DateTime<Utc>)>
{
  let midnight =
    NaiveTime::from_hms_opt(0, 0, 0)?;
  let start =
    local_to_utc(tz, date.and_time(midnight))?;
  let last = NaiveTime::from_hms_milli_opt(
    23, 59, 59, 999
  )?;
  let end =
    local_to_utc(tz, date.and_time(last))?;
  Some((start, end))
}

/// Reads the wall-clock date and time
/// written in an event instant, without
/// converting between offsets.
#[must_use]
pub fn parse_wall_clock(
  raw: &str
) -> Option<NaiveDateTime> {
  let token = raw.trim();
  if let Ok(dt) =
    DateTime::parse_from_rfc3339(token)
  {
    return Some(dt.naive_local());
  }

  [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M"
  ]
  .into_iter()
  .find_map(|fmt| {
    NaiveDateTime::parse_from_str(
      token, fmt
    )
    .ok()
  })
}

#[must_use]
pub fn minutes_since_midnight(
  dt: NaiveDateTime
) -> u32 {
  dt.hour() * 60 + dt.minute()
}
