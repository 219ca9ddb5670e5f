use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::aggregate::{DayBucket, WeekendEvents};
use crate::config::Config;
use crate::grid::{GridConfig, layout_day};
use crate::source::CalendarInfo;
use crate::summary::{Availability, summarize, time_label, time_range_label};
use crate::window::WeekendWindow;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Cards,
    Grid,
}

impl std::str::FromStr for View {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cards" | "card" | "list" => Ok(Self::Cards),
            "grid" => Ok(Self::Grid),
            other => Err(anyhow::anyhow!("unknown view: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    grid: GridConfig,
    busy_threshold: usize,
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config, color: bool) -> Self {
        Self {
            grid: cfg.grid.clone(),
            busy_threshold: cfg.busy_threshold,
            color,
        }
    }

    #[tracing::instrument(skip(self, out, windows, grouped))]
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        windows: &[WeekendWindow],
        grouped: &BTreeMap<String, WeekendEvents>,
        view: View,
    ) -> anyhow::Result<()> {
        if view == View::Grid {
            self.write_hour_axis(out)?;
        }

        let empty = WeekendEvents::default();
        for (idx, window) in windows.iter().enumerate() {
            if idx > 0 {
                writeln!(out)?;
            }
            let events = grouped.get(&window.key);
            self.write_header(out, window, events)?;

            let events = events.unwrap_or(&empty);
            let days = [
                ("Sat", window.saturday, &events.saturday),
                ("Sun", window.sunday, &events.sunday),
            ];
            for (label, date, bucket) in days {
                match view {
                    View::Cards => self.write_day_card(out, label, date, bucket)?,
                    View::Grid => self.write_day_grid(out, label, date, bucket)?,
                }
            }
        }
        Ok(())
    }

    /// One line per selected calendar, in its own colour. Hidden
    /// calendars stay listed so they can be toggled back on.
    pub fn write_legend<W: Write>(
        &self,
        out: &mut W,
        calendars: &[CalendarInfo],
        hidden: &BTreeSet<String>,
    ) -> anyhow::Result<()> {
        if calendars.is_empty() {
            return Ok(());
        }

        writeln!(out, "Calendars")?;
        let rows = calendars
            .iter()
            .map(|cal| {
                let name = if cal.summary.is_empty() {
                    cal.id.as_str()
                } else {
                    cal.summary.as_str()
                };
                let state = if hidden.contains(&cal.id) { "hidden" } else { "shown" };
                // Swatch last; escape codes have no display width.
                vec![
                    name.to_string(),
                    cal.color().to_string(),
                    state.to_string(),
                    self.paint_hex("\u{25a0}", cal.color()),
                ]
            })
            .collect::<Vec<_>>();
        write_rows(out, "  ", rows)?;
        writeln!(out)?;
        Ok(())
    }

    fn write_hour_axis<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let marks = self
            .grid
            .hour_marks()
            .into_iter()
            .map(|mark| format!("{}@{:.0}px", mark.label, mark.top_px))
            .collect::<Vec<_>>();
        if marks.is_empty() {
            return Ok(());
        }
        writeln!(
            out,
            "Hours  {}  (grid {:.0}px)",
            marks.join(" "),
            self.grid.total_height_px()
        )?;
        writeln!(out)?;
        Ok(())
    }

    fn write_header<W: Write>(
        &self,
        out: &mut W,
        window: &WeekendWindow,
        events: Option<&WeekendEvents>,
    ) -> anyhow::Result<()> {
        let summary = summarize(window, events, self.busy_threshold);
        write!(out, "{}  {}", summary.month_label, summary.day_range)?;
        if let Some(badge) = summary.availability.badge() {
            let code = match summary.availability {
                Availability::Free => "32",
                _ => "33",
            };
            write!(out, "  [{}]", self.paint(badge, code))?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_day_card<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        date: NaiveDate,
        bucket: &DayBucket,
    ) -> anyhow::Result<()> {
        writeln!(out, "  {label} {}", date.day())?;
        if bucket.is_empty() {
            writeln!(out, "    Free")?;
            return Ok(());
        }

        let rows = bucket
            .iter()
            .map(|event| vec![time_label(event), event.display_title().to_string()])
            .collect::<Vec<_>>();
        write_rows(out, "    ", rows)
    }

    fn write_day_grid<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        date: NaiveDate,
        bucket: &DayBucket,
    ) -> anyhow::Result<()> {
        writeln!(out, "  {label} {}", date.day())?;
        for event in &bucket.all_day {
            writeln!(out, "    [all day] {}", event.display_title())?;
        }

        let placed = layout_day(bucket, &self.grid);
        if placed.is_empty() {
            if bucket.all_day.is_empty() {
                writeln!(out, "    Free")?;
            }
            return Ok(());
        }

        let mut rows = vec![vec![
            "Time".to_string(),
            "Title".to_string(),
            "Col".to_string(),
            "Top".to_string(),
            "Height".to_string(),
            "Left".to_string(),
            "Width".to_string(),
        ]];
        for entry in &placed {
            let geo = entry.geometry;
            rows.push(vec![
                time_range_label(entry.layout.event),
                entry.layout.event.display_title().to_string(),
                format!("{}/{}", entry.layout.column + 1, entry.layout.total_columns),
                format!("{:.1}px", geo.top_px),
                format!("{:.1}px", geo.height_px),
                format!("{:.1}%", geo.left_percent),
                format!("{:.1}%", geo.width_percent),
            ]);
        }
        write_rows(out, "    ", rows)
    }

    fn paint_hex(&self, text: &str, hex: &str) -> String {
        match parse_hex_color(hex) {
            Some((r, g, b)) => self.paint(text, &format!("38;2;{r};{g};{b}")),
            None => text.to_string(),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn parse_hex_color(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn write_rows<W: Write>(out: &mut W, indent: &str, rows: Vec<Vec<String>>) -> anyhow::Result<()> {
    let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; column_count];

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    for row in rows {
        let mut line = String::from(indent);
        for (idx, cell) in row.iter().enumerate() {
            line.push_str(cell);
            if idx + 1 < row.len() {
                let padding = widths[idx].saturating_sub(UnicodeWidthStr::width(cell.as_str()));
                line.push_str(&" ".repeat(padding + 2));
            }
        }
        writeln!(out, "{}", line.trim_end())?;
    }

    Ok(())
}
