//! raydesk - ray-pointer interaction engine for desktop overlays in VR
//!
//! Headless driver: plays a scripted controller session against a demo scene
//! of overlays and reports what every overlay saw.

mod config;
mod headless;
mod scripted_input;

use anyhow::Result;
use clap::Parser;
use config::{AppConfig, DEFAULT_CONFIG_PATH};
use headless::HeadlessOptions;
use scripted_input::ScriptedInputPlayer;
use std::path::PathBuf;
use tracing::info;

const DEMO_SESSION: &str = include_str!("../config/demo_session.json");

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless ray-pointer session runner", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Scripted input session (JSON); plays the built-in demo if omitted
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Write every overlay event as JSON lines to this path
    #[arg(long)]
    events: Option<PathBuf>,

    /// Write a JSON session summary to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Log at info level unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting raydesk v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_from_path(&args.config);
    if let Some(path) = &args.write_config {
        config.save_to_path(path)?;
        info!(path = %path.display(), "Configuration written");
        return Ok(());
    }

    let script = match &args.script {
        Some(path) => ScriptedInputPlayer::from_path(path, config.frame_time())?,
        None => ScriptedInputPlayer::from_json(DEMO_SESSION, "demo", config.frame_time())?,
    };

    let options = HeadlessOptions {
        events_path: args.events,
        report_path: args.report,
        max_frames: args.max_frames,
    };
    let report = headless::run(&config, script, &options)?;

    println!(
        "{}: {} frames, {:?}, {} grabs, {} clicks",
        report.session,
        report.frames,
        report.result,
        report.event_count("grabbed"),
        report.event_count("down"),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_point_at_bundled_config() {
        let args = Args::parse_from(["raydesk"]);
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(args.script.is_none());
        assert!(!args.verbose);
    }
}
