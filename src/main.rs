mod api;
mod checks;
mod commands;
mod core;
mod edit;
mod inputs;
mod ui;

use clap::{Parser, Subcommand};
use core::error::{PlayError, print_error};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Publish Android apps to Google Play in one edit transaction
#[derive(Parser)]
#[command(name = "play-rail")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Upload artifacts, update a track and commit, all in one edit
  Publish(commands::PublishArgs),

  /// Validate configuration, credentials and metadata without calling the API
  Doctor {
    /// Config file (default: play.toml, .play.toml or .config/play.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run a single check (config, credentials, metadata)
    #[arg(long)]
    check: Option<String>,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Cyan))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Diagnostics go to stderr, filtered by PLAY_RAIL_LOG (default: warn)
fn init_tracing() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_env("PLAY_RAIL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing();

  let result = match cli.command {
    Commands::Publish(args) => commands::run_publish(args),
    Commands::Doctor { config, check, json } => commands::run_doctor(config, check, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: PlayError) -> ! {
  if let Some(step) = err.failed_step() {
    tracing::debug!(step, "publish run aborted");
  }
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
