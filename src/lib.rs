// Classroom phrases library
// Phrase tables, speech synthesis and the interaction shell

pub mod cli;
pub mod config;
pub mod logging;
pub mod phrases;
pub mod shell;
pub mod source;
pub mod speech;

pub use cli::Cli;
pub use config::Options;
pub use logging::LogLevel;
pub use phrases::{PhraseTable, Situation};
pub use shell::{InteractionShell, ShellError};
pub use source::{DataSource, LoadedTable, TableCache};
pub use speech::{AudioClip, SpeechSynthesizer, SynthesisError};
