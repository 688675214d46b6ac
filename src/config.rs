use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::logging::LogLevel;
use crate::phrases::Situation;
use crate::speech::google::{DEFAULT_TIMEOUT, DEFAULT_TLD};
use crate::speech::{TtsSettings, DEFAULT_LANGUAGE};

/// Phrase source used when none is configured
pub const DEFAULT_SOURCE: &str = "classroom_expressions.csv";

/// Config file read from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "classroom-phrases.cfg";

/// Longest accepted request timeout in seconds
const MAX_TIMEOUT_SECS: u64 = 120;

/// Application options that can be set via CLI or config file
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    // Commandline and config options
    pub source: String,
    pub language: String,
    pub tld: String,
    pub tts_endpoint: Option<String>,
    pub timeout: Duration,
    pub output_dir: Option<PathBuf>,
    pub play_audio: bool,
    pub log_level: LogLevel,

    // Commandline-only options
    pub situation: Option<Situation>,
    /// One-based expression number for non-interactive runs
    pub expression: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            tld: DEFAULT_TLD.to_string(),
            tts_endpoint: None,
            timeout: DEFAULT_TIMEOUT,
            output_dir: None,
            play_audio: true,
            log_level: LogLevel::default(),
            situation: None,
            expression: 1,
        }
    }
}

impl Options {
    /// Speech service settings derived from these options
    pub fn tts_settings(&self) -> TtsSettings {
        let settings = TtsSettings::for_tld(&self.tld).with_timeout(self.timeout);
        match &self.tts_endpoint {
            Some(endpoint) => settings.with_endpoint(endpoint.clone()),
            None => settings,
        }
    }
}

/// Load options from a config file
///
/// An explicit `path` must exist. Without one, `classroom-phrases.cfg` in
/// the working directory is read if present and defaults are used otherwise.
pub fn load_config(path: Option<&Path>) -> Result<Options> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                return Ok(Options::default());
            }
            default
        }
    };

    let data = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&data).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Parse `key = value` lines; `#` starts a comment
pub fn parse_config(data: &str) -> Result<Options> {
    let mut opts = Options::default();

    for (number, raw) in data.lines().enumerate() {
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            log::warn!("Config line {} has no value: {}", number + 1, line);
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "source" => opts.source = parse_nonempty(key, value)?,
            "language" => opts.language = parse_nonempty(key, value)?,
            "tld" => opts.tld = parse_nonempty(key, value)?,
            "tts_endpoint" => opts.tts_endpoint = Some(parse_nonempty(key, value)?),
            "timeout_secs" => opts.timeout = parse_timeout(value)?,
            "output_dir" => opts.output_dir = Some(PathBuf::from(parse_nonempty(key, value)?)),
            "play_audio" => opts.play_audio = parse_bool(value)?,
            "log_level" => opts.log_level = value.parse()?,
            _ => log::warn!("Unknown config key '{}' on line {}", key, number + 1),
        }
    }

    Ok(opts)
}

/// Parse a timeout in whole seconds (1-120)
pub fn parse_timeout(s: &str) -> Result<Duration> {
    let secs: u64 = s.trim().parse().context("Invalid timeout value")?;

    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        anyhow::bail!("Timeout out of range (1 to {} seconds)", MAX_TIMEOUT_SECS);
    }

    Ok(Duration::from_secs(secs))
}

/// Parse a boolean config value
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("Invalid boolean: {}. Valid options: true, false", s),
    }
}

fn parse_nonempty(key: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        anyhow::bail!("Config key '{}' needs a value", key);
    }
    Ok(value.to_string())
}
