//! Phrase table sources
//!
//! A source string is either a local CSV path or an `http://`/`https://`
//! URL. [`DataSource::try_load_or_default`] never fails: when the source
//! cannot be read, does not parse, or has no data rows, the built-in sample
//! table is used instead and the reason is recorded in the
//! [`TableOrigin`].
//!
//! # Example
//! ```ignore
//! let source = DataSource::default();
//! let loaded = source.try_load_or_default("classroom_expressions.csv");
//! if let Some(notice) = loaded.notice() {
//!     println!("{notice}");
//! }
//! ```

pub mod cache;

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use crate::phrases::{parse_table, sample_table, CodecError, PhraseTable};

pub use cache::TableCache;

/// Timeout applied to remote CSV fetches
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on a remote CSV body
pub const MAX_REMOTE_BYTES: u64 = 4 * 1024 * 1024;

/// Message shown when the sample table stands in for the configured source
pub const FALLBACK_NOTICE: &str = "No CSV file found. Using built-in sample data instead. \
     You can download the sample CSV from the menu.";

/// Why a source could not be used
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },

    #[error("Transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Response from {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: u64 },

    #[error("Malformed CSV in {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: CodecError,
    },
}

/// Reason the fallback table was used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The source failed to load; holds the rendered error
    Unavailable(String),
    /// The source parsed but had no data rows
    Empty,
}

/// Where a loaded table came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOrigin {
    Source(String),
    Fallback(FallbackReason),
}

/// A phrase table together with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTable {
    table: PhraseTable,
    origin: TableOrigin,
}

impl LoadedTable {
    pub fn new(table: PhraseTable, origin: TableOrigin) -> Self {
        Self { table, origin }
    }

    /// The built-in sample table, marked as a fallback
    pub fn fallback(reason: FallbackReason) -> Self {
        Self::new(sample_table().clone(), TableOrigin::Fallback(reason))
    }

    pub fn table(&self) -> &PhraseTable {
        &self.table
    }

    pub fn origin(&self) -> &TableOrigin {
        &self.origin
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, TableOrigin::Fallback(_))
    }

    /// Informational notice for the user, present only for fallback tables
    pub fn notice(&self) -> Option<&'static str> {
        self.is_fallback().then_some(FALLBACK_NOTICE)
    }
}

/// True for `http://` and `https://` sources
pub fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Reads phrase tables from files or URLs
#[derive(Debug, Clone)]
pub struct DataSource {
    agent: ureq::Agent,
}

impl Default for DataSource {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

impl DataSource {
    /// Create a data source whose remote fetches use `timeout`
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self { agent }
    }

    /// Load and parse a table
    ///
    /// # Errors
    /// * `NotFound` - Local file does not exist
    /// * `Io` - Local file could not be read
    /// * `Http` / `Transport` - Remote fetch failed
    /// * `TooLarge` - Remote body is over `MAX_REMOTE_BYTES`
    /// * `Malformed` - Content is not a usable CSV table
    pub fn load(&self, source: &str) -> Result<PhraseTable, SourceError> {
        let bytes = if is_remote(source) {
            self.fetch(source.trim())?
        } else {
            read_local(source)?
        };

        parse_table(&bytes).map_err(|source_err| SourceError::Malformed {
            path: source.to_string(),
            source: source_err,
        })
    }

    /// Load a table, substituting the sample table on failure or emptiness
    pub fn try_load_or_default(&self, source: &str) -> LoadedTable {
        match self.load(source) {
            Ok(table) if table.is_empty() => {
                log::warn!("Phrase source '{}' has no rows; using sample data", source);
                LoadedTable::fallback(FallbackReason::Empty)
            }
            Ok(table) => {
                log::info!(
                    "Loaded {} rows in {} columns from '{}'",
                    table.row_count(),
                    table.column_count(),
                    source
                );
                LoadedTable::new(table, TableOrigin::Source(source.to_string()))
            }
            Err(err) => {
                log::warn!("Phrase source unavailable ({}); using sample data", err);
                LoadedTable::fallback(FallbackReason::Unavailable(err.to_string()))
            }
        }
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        log::debug!("Fetching phrase CSV from {}", url);
        let response = self.agent.get(url).call().map_err(|err| match err {
            ureq::Error::Status(status, _) => SourceError::Http {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => SourceError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            },
        })?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_REMOTE_BYTES + 1)
            .read_to_end(&mut bytes)
            .map_err(|err| SourceError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        if bytes.len() as u64 > MAX_REMOTE_BYTES {
            return Err(SourceError::TooLarge {
                url: url.to_string(),
                limit: MAX_REMOTE_BYTES,
            });
        }
        Ok(bytes)
    }
}

fn read_local(source: &str) -> Result<Vec<u8>, SourceError> {
    let path = Path::new(source);
    fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => SourceError::NotFound(source.to_string()),
        _ => SourceError::Io {
            path: source.to_string(),
            source: err,
        },
    })
}
