use crate::game::engine::{
    DEFAULT_END_GRACE_S, DEFAULT_POLL_INTERVAL, DEFAULT_RUNAWAY_MARGIN_S, EngineSettings,
};
use ini::Ini;
use log::{info, warn};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

pub const CONFIG_PATH: &str = "comboreplay.ini";
const SECTION: &str = "Options";
const DEFAULT_REPLAY_PATH: &str = "b7ab40e922ed57078f6423b3758ae15cf7d1b777.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }

    pub const fn as_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Off => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Replay document used when none is given on the command line.
    pub replay_path: String,
    /// Sleep between engine polls, in milliseconds.
    pub poll_interval_ms: u64,
    pub end_grace_seconds: f64,
    pub runaway_margin_seconds: f64,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            replay_path: DEFAULT_REPLAY_PATH.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            end_grace_seconds: DEFAULT_END_GRACE_S,
            runaway_margin_seconds: DEFAULT_RUNAWAY_MARGIN_S,
            log_level: LogLevel::Warn,
        }
    }
}

impl Config {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            end_grace_s: self.end_grace_seconds,
            runaway_margin_s: self.runaway_margin_seconds,
        }
    }
}

// Global, mutable configuration instance.
static CONFIG: std::sync::LazyLock<Mutex<Config>> =
    std::sync::LazyLock::new(|| Mutex::new(Config::default()));

// --- File I/O ---

fn create_default_config_file(path: &Path) -> Result<(), std::io::Error> {
    info!("'{}' not found, creating with default values.", path.display());
    let default = Config::default();

    // Keys in alphabetical order
    let mut conf = Ini::new();
    conf.with_section(Some(SECTION))
        .set("EndGraceSeconds", default.end_grace_seconds.to_string())
        .set("LogLevel", default.log_level.as_str())
        .set("PollIntervalMs", default.poll_interval_ms.to_string())
        .set("ReplayPath", default.replay_path.as_str())
        .set("RunawayMarginSeconds", default.runaway_margin_seconds.to_string());
    conf.write_to_file(path)
}

#[inline(always)]
fn non_negative_seconds(conf: &Ini, key: &str, default: f64) -> f64 {
    match conf.get_from(Some(SECTION), key) {
        None => default,
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => v,
            _ => {
                warn!("Invalid {key}={raw:?} in config; using {default}");
                default
            }
        },
    }
}

/// Builds a `Config` from parsed INI, falling back to defaults for missing
/// or malformed keys.
pub fn from_ini(conf: &Ini) -> Config {
    let default = Config::default();

    let replay_path = conf
        .get_from(Some(SECTION), "ReplayPath")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or(default.replay_path.clone(), str::to_string);
    let poll_interval_ms = match conf.get_from(Some(SECTION), "PollIntervalMs") {
        None => default.poll_interval_ms,
        // Zero would busy-spin the wall clock.
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => ms,
            _ => {
                warn!("Invalid PollIntervalMs={raw:?} in config; using {}", default.poll_interval_ms);
                default.poll_interval_ms
            }
        },
    };
    let log_level = match conf.get_from(Some(SECTION), "LogLevel") {
        None => default.log_level,
        Some(raw) => LogLevel::from_str(raw).unwrap_or_else(|()| {
            warn!("Invalid LogLevel={raw:?} in config; using {}", default.log_level.as_str());
            default.log_level
        }),
    };

    Config {
        replay_path,
        poll_interval_ms,
        end_grace_seconds: non_negative_seconds(conf, "EndGraceSeconds", default.end_grace_seconds),
        runaway_margin_seconds: non_negative_seconds(
            conf,
            "RunawayMarginSeconds",
            default.runaway_margin_seconds,
        ),
        log_level,
    }
}

pub fn load(path: &Path) {
    if !path.exists()
        && let Err(e) = create_default_config_file(path)
    {
        warn!("Failed to create default config file: {e}");
    }

    match Ini::load_from_file(path) {
        Ok(conf) => {
            let cfg = from_ini(&conf);
            info!("Configuration loaded from '{}'.", path.display());
            *CONFIG.lock().unwrap_or_else(PoisonError::into_inner) = cfg;
        }
        Err(e) => {
            warn!("Failed to load '{}': {e}. Using default settings.", path.display());
        }
    }
}

pub fn get() -> Config {
    CONFIG.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

#[cfg(test)]
mod tests {
    use super::{Config, LogLevel, from_ini};
    use ini::Ini;
    use std::time::Duration;

    fn parse(text: &str) -> Config {
        from_ini(&Ini::load_from_str(text).expect("test ini should parse"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse(""), Config::default());
    }

    #[test]
    fn values_are_read_from_options() {
        let cfg = parse(
            "[Options]\nReplayPath=replays/run.json\nPollIntervalMs=4\nEndGraceSeconds=1.25\nRunawayMarginSeconds=3\nLogLevel=debug\n",
        );
        assert_eq!(cfg.replay_path, "replays/run.json");
        assert_eq!(cfg.poll_interval_ms, 4);
        assert_eq!(cfg.end_grace_seconds, 1.25);
        assert_eq!(cfg.runaway_margin_seconds, 3.0);
        assert_eq!(cfg.log_level, LogLevel::Debug);

        let settings = cfg.engine_settings();
        assert_eq!(settings.poll_interval, Duration::from_millis(4));
        assert_eq!(settings.end_grace_s, 1.25);
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let cfg = parse(
            "[Options]\nReplayPath=\nPollIntervalMs=-5\nEndGraceSeconds=soon\nRunawayMarginSeconds=-1\nLogLevel=loud\n",
        );
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn zero_poll_interval_uses_default() {
        let cfg = parse("[Options]\nPollIntervalMs=0\n");
        assert_eq!(cfg.poll_interval_ms, Config::default().poll_interval_ms);
        assert!(!cfg.engine_settings().poll_interval.is_zero());
    }

    #[test]
    fn log_level_names() {
        assert_eq!("Warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(" TRACE ".parse::<LogLevel>(), Ok(LogLevel::Trace));
        assert_eq!(LogLevel::Off.as_level_filter(), log::LevelFilter::Off);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn default_file_round_trips() {
        let path = std::env::temp_dir().join(format!("comboreplay-cfg-{}.ini", std::process::id()));
        let _ = std::fs::remove_file(&path);
        super::create_default_config_file(&path).expect("write default config");
        let conf = Ini::load_from_file(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(from_ini(&conf.expect("reload default config")), Config::default());
    }
}
