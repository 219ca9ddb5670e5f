use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::aggregate::aggregate;
use crate::cli::{Command, ShowArgs, WindowArgs};
use crate::config::Config;
use crate::datetime::{resolve_timezone, today_in};
use crate::event::CalendarEvent;
use crate::render::Renderer;
use crate::source::{CalendarInfo, EventQuery, decode_events, filter_hidden, selected_calendars};
use crate::window::{WeekendWindow, generate};

/// Runs one command against `out`. `now`
/// is only consulted when no reference
/// date is given.
#[tracing::instrument(skip(cfg, command, out))]
pub fn dispatch<W: Write>(
    cfg: &Config,
    command: Command,
    now: DateTime<Utc>,
    color: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Show(args) => cmd_show(cfg, args, now, color, out),
        Command::Range(args) => cmd_range(cfg, &args, now, out),
    }
}

fn visible_windows(cfg: &Config, args: &WindowArgs, now: DateTime<Utc>) -> Vec<WeekendWindow> {
    let reference = reference_date(cfg, args.today, now);
    let count = args.count.filter(|&n| n > 0).unwrap_or(cfg.weekend_count);
    info!(%reference, count, "generating weekends");
    generate(reference, count)
}

fn reference_date(cfg: &Config, today: Option<NaiveDate>, now: DateTime<Utc>) -> NaiveDate {
    today.unwrap_or_else(|| {
        let tz = resolve_timezone(cfg.timezone.as_deref());
        today_in(&tz, now)
    })
}

fn cmd_show<W: Write>(
    cfg: &Config,
    args: ShowArgs,
    now: DateTime<Utc>,
    color: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let windows = visible_windows(cfg, &args.window, now);

    let mut events = Vec::new();
    for path in &args.events {
        events.extend(load_events_file(path)?);
    }

    let hidden: BTreeSet<String> = cfg
        .hidden_calendars
        .iter()
        .cloned()
        .chain(args.hide.iter().cloned())
        .collect();
    let events = filter_hidden(events, &hidden);
    let grouped = aggregate(&events, &windows);

    let renderer = Renderer::new(cfg, color);
    if let Some(path) = &args.calendars {
        let calendars = load_calendars_file(path)?;
        renderer.write_legend(out, &calendars, &hidden)?;
    }

    let view = args.view.unwrap_or(cfg.default_view);
    debug!(?view, events = events.len(), "rendering weekends");
    renderer.render(out, &windows, &grouped, view)
}

fn cmd_range<W: Write>(
    cfg: &Config,
    args: &WindowArgs,
    now: DateTime<Utc>,
    out: &mut W,
) -> anyhow::Result<()> {
    let windows = visible_windows(cfg, args, now);
    let tz = resolve_timezone(cfg.timezone.as_deref());
    let query = EventQuery::for_windows(&windows, &tz)
        .ok_or_else(|| anyhow!("no weekends to build a range for"))?;

    for (key, value) in query.query_pairs() {
        writeln!(out, "{key}={value}")?;
    }
    Ok(())
}

/// Reads an events file. Events without
/// a calendar id take the file stem.
#[tracing::instrument]
pub fn load_events_file(path: &Path) -> anyhow::Result<Vec<CalendarEvent>> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("failed to read events file {}", path.display()))?;
    let calendar_id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    decode_events(&body, &calendar_id)
        .with_context(|| format!("failed to load events from {}", path.display()))
}

/// Reads a calendar-list response and keeps the selected calendars.
#[tracing::instrument]
pub fn load_calendars_file(path: &Path) -> anyhow::Result<Vec<CalendarInfo>> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("failed to read calendar list {}", path.display()))?;
    selected_calendars(&body)
        .with_context(|| format!("failed to load calendars from {}", path.display()))
}
