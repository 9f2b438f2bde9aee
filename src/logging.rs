//! Logging
//!
//! The namespace only emits `tracing` events; it never installs a subscriber
//! on its own. Embedders that want those events on the console or in a file
//! call [`init_logging`] once at startup, or install the result of
//! [`build_subscriber`] themselves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("no platform state directory for the default log file")]
    NoLogDirectory,

    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(LoggingError::InvalidValue {
                key: "format",
                value: other.to_string(),
            }),
        }
    }
}

/// Where formatted events go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
    File,
    #[serde(rename = "file+stderr")]
    FileAndStderr,
    /// stdout and stderr
    Both,
}

impl LogOutput {
    fn has_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::FileAndStderr)
    }
}

impl FromStr for LogOutput {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            "file+stderr" => Ok(LogOutput::FileAndStderr),
            "both" => Ok(LogOutput::Both),
            other => Err(LoggingError::InvalidValue {
                key: "output",
                value: other.to_string(),
            }),
        }
    }
}

/// `[logging]` section of the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base filter: a level (`info`) or a full `EnvFilter` directive list
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file when `output` includes a file; platform state dir otherwise
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// ANSI colors for text output to a console
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-target levels, e.g. `treefs::store = "trace"`
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file: None,
            color: true,
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Overlay `TREEFS_LOG`, `TREEFS_LOG_FORMAT`, `TREEFS_LOG_OUTPUT`,
    /// `TREEFS_LOG_FILE` and `TREEFS_LOG_MODULES` (`target=level,...`).
    pub fn with_env_overrides(mut self) -> Result<Self, LoggingError> {
        if let Some(level) = env_value("TREEFS_LOG") {
            self.level = level;
        }
        if let Some(format) = env_value("TREEFS_LOG_FORMAT") {
            self.format = format.parse()?;
        }
        if let Some(output) = env_value("TREEFS_LOG_OUTPUT") {
            self.output = output.parse()?;
        }
        if let Some(file) = env_value("TREEFS_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Some(modules) = env_value("TREEFS_LOG_MODULES") {
            for spec in modules.split(',') {
                if let Some((target, level)) = spec.split_once('=') {
                    self.modules
                        .insert(target.trim().to_string(), level.trim().to_string());
                }
            }
        }
        Ok(self)
    }

    /// File that `File` and `FileAndStderr` outputs append to.
    pub fn log_file_path(&self) -> Result<PathBuf, LoggingError> {
        if let Some(path) = self.file.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            return Ok(path.clone());
        }
        let dirs = directories::ProjectDirs::from("", "treefs", "treefs")
            .ok_or(LoggingError::NoLogDirectory)?;
        // state_dir is Linux-only
        let dir = dirs.state_dir().unwrap_or_else(|| dirs.data_local_dir());
        Ok(dir.join("treefs.log"))
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        if !self.enabled {
            return Ok(EnvFilter::new("off"));
        }
        let mut filter = EnvFilter::try_new(&self.level).map_err(|e| LoggingError::InvalidFilter {
            directive: self.level.clone(),
            reason: e.to_string(),
        })?;
        for (target, level) in &self.modules {
            let directive = format!("{}={}", target, level);
            let parsed = directive.parse().map_err(|e: tracing_subscriber::filter::ParseError| {
                LoggingError::InvalidFilter {
                    directive: directive.clone(),
                    reason: e.to_string(),
                }
            })?;
            filter = filter.add_directive(parsed);
        }
        Ok(filter)
    }

    fn writer(&self) -> Result<BoxMakeWriter, LoggingError> {
        let console = match self.output {
            LogOutput::Stdout => return Ok(BoxMakeWriter::new(std::io::stdout)),
            LogOutput::Stderr => return Ok(BoxMakeWriter::new(std::io::stderr)),
            LogOutput::Both => return Ok(BoxMakeWriter::new(std::io::stdout.and(std::io::stderr))),
            LogOutput::File => false,
            LogOutput::FileAndStderr => true,
        };

        let path = self.log_file_path()?;
        let open_error = |source| LoggingError::LogFile {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(open_error)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_error)?;
        let file = Arc::new(file);
        Ok(if console {
            BoxMakeWriter::new(file.and(std::io::stderr))
        } else {
            BoxMakeWriter::new(file)
        })
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Build a subscriber from `config` alone; the environment is not consulted.
pub fn build_subscriber(
    config: &LoggingConfig,
) -> Result<Box<dyn Subscriber + Send + Sync>, LoggingError> {
    let filter = config.filter()?;
    let writer = config.writer()?;
    let registry = Registry::default().with(filter);

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.format {
        LogFormat::Json => Box::new(
            registry.with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            ),
        ),
        LogFormat::Text => Box::new(
            registry.with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(config.color && !config.output.has_file())
                    .with_writer(writer),
            ),
        ),
    };
    Ok(subscriber)
}

/// Install the global subscriber: environment overrides first, then `config`,
/// then defaults. Fails if any global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let config = config.clone().with_env_overrides()?;
    let subscriber = build_subscriber(&config)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| LoggingError::AlreadyInitialized)?;
    tracing::debug!(format = ?config.format, output = ?config.output, "Logging initialized");
    Ok(())
}
