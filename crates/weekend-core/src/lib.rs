pub mod aggregate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod event;
pub mod grid;
pub mod layout;
pub mod render;
pub mod source;
pub mod summary;
pub mod window;

use std::ffi::OsString;
use std::io::IsTerminal;

use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting weekends CLI"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  )?;
  debug!(?cfg, "effective config");

  let command = cli.command.unwrap_or_else(
    || {
      cli::Command::Show(
        cli::ShowArgs::default()
      )
    }
  );

  let stdout = std::io::stdout();
  let color = stdout.is_terminal();
  let mut out = stdout.lock();
  commands::dispatch(
    &cfg,
    command,
    chrono::Utc::now(),
    color,
    &mut out
  )?;

  info!("done");
  Ok(())
}
