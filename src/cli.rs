use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{parse_timeout, Options};
use crate::logging::LogLevel;
use crate::phrases::Situation;

/// Classroom English expressions with spoken audio
#[derive(Parser, Debug, Default)]
#[command(name = "classroom-phrases")]
#[command(version)]
#[command(
    about = "Practice classroom English expressions and listen to them spoken aloud",
    long_about = None
)]
pub struct Cli {
    /// CSV file path or http(s) URL with one column per situation
    #[arg(long, value_name = "PATH|URL")]
    pub source: Option<String>,

    /// Situation for a single non-interactive run (opening, giving-feedback, closing)
    #[arg(long, value_name = "NAME")]
    pub situation: Option<String>,

    /// Expression number within the situation (default 1)
    #[arg(short, long, value_name = "N")]
    pub expression: Option<String>,

    /// Language tag for synthesized speech (e.g. en, en-GB)
    #[arg(short, long = "lang", value_name = "TAG")]
    pub lang: Option<String>,

    /// Top-level domain of the speech service (e.g. com, co.uk)
    #[arg(long, value_name = "TLD")]
    pub tld: Option<String>,

    /// Full URL of the speech endpoint, overriding --tld
    #[arg(long, value_name = "URL")]
    pub tts_endpoint: Option<String>,

    /// Network timeout in seconds (1-120)
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<String>,

    /// Save audio files into this directory
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Do not play audio on the speakers
    #[arg(long)]
    pub no_play: bool,

    /// Write the sample CSV to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub export_sample: Option<PathBuf>,

    /// Print the expressions and exit
    #[arg(long)]
    pub list: bool,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref source) = self.source {
            opts.source = source.clone();
        }

        if let Some(ref situation) = self.situation {
            opts.situation = Some(situation.parse::<Situation>()?);
        }

        if let Some(ref expression) = self.expression {
            opts.expression = Self::parse_expression_number(expression)?;
        }

        if let Some(ref lang) = self.lang {
            opts.language = lang.clone();
        }

        if let Some(ref tld) = self.tld {
            opts.tld = tld.clone();
        }

        if let Some(ref endpoint) = self.tts_endpoint {
            opts.tts_endpoint = Some(endpoint.clone());
        }

        if let Some(ref timeout) = self.timeout {
            opts.timeout = parse_timeout(timeout)?;
        }

        if let Some(ref dir) = self.output_dir {
            opts.output_dir = Some(dir.clone());
        }

        if self.no_play {
            opts.play_audio = false;
        }

        if let Some(ref level) = self.log_level {
            opts.log_level = level.parse::<LogLevel>()?;
        }

        Ok(opts)
    }

    fn parse_expression_number(s: &str) -> Result<usize> {
        let number: usize = s.trim().parse().context("Invalid expression number")?;
        if number == 0 {
            anyhow::bail!("Expression numbers start at 1");
        }
        Ok(number)
    }
}
