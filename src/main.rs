mod config;
mod core;
mod game;

use std::io;
use std::path::PathBuf;

use clap::Parser;

use crate::core::cancel::CancelToken;
use crate::core::clock::{VirtualClock, WallClock};
use crate::game::{diagnostics, replay, session};

#[derive(Debug, Parser)]
#[command(name = "comboreplay")]
#[command(about = "Replay a recorded input log in real time and rebuild its combo")]
struct Cli {
    /// Replay JSON document. Defaults to Options.ReplayPath from the config file.
    replay: Option<PathBuf>,
    /// Run on virtual time instead of waiting out the replay in real time.
    #[arg(long, default_value_t = false)]
    instant: bool,
    /// Config file to read (created with defaults when missing).
    #[arg(long, default_value = config::CONFIG_PATH)]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install logger immediately, then set runtime max level from config after loading it.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    // Startup default when config is missing or malformed.
    log::set_max_level(log::LevelFilter::Warn);

    let cli = Cli::parse();
    config::load(&cli.config);
    let cfg = config::get();
    log::set_max_level(cfg.log_level.as_level_filter());

    let path = cli.replay.unwrap_or_else(|| PathBuf::from(&cfg.replay_path));
    let loaded = match replay::load_replay(&path) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Failed to load replay: {e}");
            return Err(e.into());
        }
    };
    diagnostics::log_all(&loaded.diagnostics);

    let settings = cfg.engine_settings();
    let cancel = CancelToken::new();
    let mut out = io::stdout().lock();
    let report = if cli.instant {
        let mut clock = VirtualClock::new();
        session::play(&loaded.record, settings, &mut clock, &cancel, &mut out)?
    } else {
        let mut clock = WallClock::new();
        session::play(&loaded.record, settings, &mut clock, &cancel, &mut out)?
    };
    let anomalies = loaded.diagnostics.len() + report.diagnostics.len();
    if anomalies > 0 {
        log::warn!(
            "Replay '{}' finished with {anomalies} anomalies (max combo {}).",
            path.display(),
            report.summary.max_combo
        );
    }
    Ok(())
}
