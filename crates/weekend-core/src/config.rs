use std::collections::BTreeSet;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

use crate::grid::GridConfig;
use crate::render::View;
use crate::summary::DEFAULT_BUSY_THRESHOLD;

pub const CONFIG_ENV_VAR: &str =
  "WEEKENDS_CONFIG";
const CONFIG_DIR_NAME: &str = "weekends";
const CONFIG_FILE_NAME: &str =
  "config.toml";
const DEFAULT_WEEKEND_COUNT: usize = 12;
const MAX_HOUR: u32 = 24;

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct Config {
  pub weekend_count:    usize,
  pub timezone:         Option<String>,
  pub busy_threshold:   usize,
  pub hidden_calendars: BTreeSet<String>,
  pub default_view:     View,
  pub grid:             GridConfig,
  #[serde(skip)]
  pub loaded_from:      Option<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      weekend_count:    DEFAULT_WEEKEND_COUNT,
      timezone:         None,
      busy_threshold:
        DEFAULT_BUSY_THRESHOLD,
      hidden_calendars: BTreeSet::new(),
      default_view:     View::Cards,
      grid:             GridConfig::default(),
      loaded_from:      None
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    path_override
  ))]
  pub fn load(
    path_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) =
      resolve_config_path(path_override)?
    else {
      warn!(
        "no config file found; using \
         defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    let mut cfg = Self::from_file(&path)?;
    cfg.loaded_from = Some(path);
    cfg.sanitize();
    Ok(cfg)
  }

  pub fn from_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let text = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    Self::from_toml(&text).with_context(
      || {
        format!(
          "failed to parse {}",
          path.display()
        )
      }
    )
  }

  pub fn from_toml(
    text: &str
  ) -> anyhow::Result<Self> {
    let mut cfg: Self = toml::from_str(text)
      .context("invalid config TOML")?;
    cfg.sanitize();
    Ok(cfg)
  }

  /// Applies `key=value` overrides, then
  /// repairs any values they broke.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      debug!(key = %key, value = %value, "applying override");
      self.set(key.trim(), value.trim())?;
    }
    self.sanitize();
    Ok(())
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    match key {
      | "weekend_count" => {
        self.weekend_count =
          parse_value(key, value)?;
      }
      | "timezone" => {
        self.timezone = if value.is_empty() {
          None
        } else {
          Some(value.to_string())
        };
      }
      | "busy_threshold" => {
        self.busy_threshold =
          parse_value(key, value)?;
      }
      | "hidden_calendars" => {
        self.hidden_calendars = value
          .split(',')
          .map(str::trim)
          .filter(|id| !id.is_empty())
          .map(str::to_string)
          .collect();
      }
      | "default_view" => {
        self.default_view =
          parse_value(key, value)?;
      }
      | "grid.start_hour" => {
        self.grid.start_hour =
          parse_value(key, value)?;
      }
      | "grid.end_hour" => {
        self.grid.end_hour =
          parse_value(key, value)?;
      }
      | "grid.px_per_hour" => {
        self.grid.px_per_hour =
          parse_value(key, value)?;
      }
      | "grid.min_duration_minutes" => {
        self.grid.min_duration_minutes =
          parse_value(key, value)?;
      }
      | other => {
        return Err(anyhow!(
          "unknown config key: {other}"
        ));
      }
    }
    Ok(())
  }

  /// Replaces values that would make the
  /// grid or window list meaningless.
  pub fn sanitize(&mut self) {
    if self.weekend_count == 0 {
      self.weekend_count =
        DEFAULT_WEEKEND_COUNT;
    }
    if self.busy_threshold == 0 {
      self.busy_threshold =
        DEFAULT_BUSY_THRESHOLD;
    }

    let grid = &mut self.grid;
    grid.start_hour =
      grid.start_hour.min(MAX_HOUR - 1);
    grid.end_hour =
      grid.end_hour.min(MAX_HOUR);
    if grid.end_hour <= grid.start_hour {
      warn!(
        start = grid.start_hour,
        end = grid.end_hour,
        "grid end hour not after start; widening"
      );
      grid.end_hour = grid.start_hour + 1;
    }
    if !grid.px_per_hour.is_finite()
      || grid.px_per_hour <= 0.0
    {
      grid.px_per_hour =
        GridConfig::default().px_per_hour;
    }
  }
}

fn parse_value<T>(
  key: &str,
  value: &str
) -> anyhow::Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display
{
  value.parse::<T>().map_err(|err| {
    anyhow!(
      "invalid value for {key}: \
       {value} ({err})"
    )
  })
}

#[tracing::instrument(skip(
  path_override
))]
fn resolve_config_path(
  path_override: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = path_override {
    if !path.exists() {
      return Err(anyhow!(
        "config file does not exist: {}",
        path.display()
      ));
    }
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Ok(Some(PathBuf::from(
        trimmed
      )));
    }
  }

  let Some(dir) = dirs::config_dir()
  else {
    debug!(
      "no platform config directory"
    );
    return Ok(None);
  };
  let candidate = dir
    .join(CONFIG_DIR_NAME)
    .join(CONFIG_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}
