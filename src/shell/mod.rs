//! Interaction shell
//!
//! Tracks what the user has chosen: a situation, then one of its
//! expressions, then an explicit request for audio. Changing the situation
//! recomputes the expression list; changing the expression discards any
//! audio outcome. A situation with nothing to offer halts the shell until
//! another situation is chosen.
//!
//! # Example
//! ```ignore
//! let mut shell = InteractionShell::new(loaded, synthesizer);
//! shell.select_situation(Situation::Closing)?;
//! shell.select_expression(0)?;
//! match shell.request_audio()? {
//!     AudioOutcome::Playable(clip) => println!("{} bytes", clip.size()),
//!     AudioOutcome::Errored(message) => eprintln!("{message}"),
//! }
//! ```

pub mod prompt;

use std::mem;
use std::sync::Arc;

use crate::phrases::{PhraseTable, Situation};
use crate::source::LoadedTable;
use crate::speech::{AudioClip, SpeechSynthesizer, DEFAULT_LANGUAGE};

pub use prompt::{run_once, write_listing, Prompt};

/// A situation that offers no expressions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmptySelection {
    #[error("Column '{0}' not found in CSV file.")]
    MissingColumn(Situation),

    #[error("No expressions found in column '{0}'.")]
    NoValues(Situation),
}

impl EmptySelection {
    pub fn situation(&self) -> Situation {
        match self {
            EmptySelection::MissingColumn(s) | EmptySelection::NoValues(s) => *s,
        }
    }
}

/// Errors from shell transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    EmptySelection(#[from] EmptySelection),

    #[error("Choose a situation first")]
    NoSituation,

    #[error("No expression #{number} for '{situation}' ({available} available)")]
    NoSuchExpression {
        situation: Situation,
        number: usize,
        available: usize,
    },

    #[error("'{text}' is not an expression for '{situation}'")]
    UnknownExpression { situation: Situation, text: String },

    #[error("Choose an expression before generating audio")]
    TriggerUnavailable,
}

/// Result of pressing the audio trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioOutcome {
    /// Audio is ready for the playback sink
    Playable(AudioClip),
    /// Synthesis failed; holds the message shown to the user
    Errored(String),
}

/// Shell state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellState {
    /// Nothing chosen yet
    Idle,
    SituationSelected {
        situation: Situation,
    },
    ExpressionSelected {
        situation: Situation,
        index: usize,
    },
    AudioRequested {
        situation: Situation,
        index: usize,
        outcome: AudioOutcome,
    },
    /// The chosen situation has no expressions
    Halted(EmptySelection),
}

/// Selection state machine over a loaded phrase table
pub struct InteractionShell<S> {
    table: Arc<LoadedTable>,
    synthesizer: S,
    language: String,
    state: ShellState,
    /// Expressions of the current situation
    expressions: Vec<String>,
}

impl<S: SpeechSynthesizer> InteractionShell<S> {
    pub fn new(table: Arc<LoadedTable>, synthesizer: S) -> Self {
        Self {
            table,
            synthesizer,
            language: DEFAULT_LANGUAGE.to_string(),
            state: ShellState::Idle,
            expressions: Vec::new(),
        }
    }

    /// Use `language` for synthesis
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn table(&self) -> &PhraseTable {
        self.table.table()
    }

    /// Informational notice about the table source, if any
    pub fn notice(&self) -> Option<&'static str> {
        self.table.notice()
    }

    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// Currently selected situation, including a halted one
    pub fn situation(&self) -> Option<Situation> {
        match &self.state {
            ShellState::Idle => None,
            ShellState::SituationSelected { situation }
            | ShellState::ExpressionSelected { situation, .. }
            | ShellState::AudioRequested { situation, .. } => Some(*situation),
            ShellState::Halted(error) => Some(error.situation()),
        }
    }

    /// Expressions offered for the current situation
    pub fn expressions(&self) -> &[String] {
        &self.expressions
    }

    /// Zero-based index of the selected expression
    pub fn selected_index(&self) -> Option<usize> {
        match &self.state {
            ShellState::ExpressionSelected { index, .. }
            | ShellState::AudioRequested { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn selected_expression(&self) -> Option<&str> {
        self.selected_index()
            .and_then(|index| self.expressions.get(index))
            .map(String::as_str)
    }

    /// The halting error, when the current situation has no expressions
    pub fn error(&self) -> Option<&EmptySelection> {
        match &self.state {
            ShellState::Halted(error) => Some(error),
            _ => None,
        }
    }

    /// Outcome of the last audio request for the current expression
    pub fn outcome(&self) -> Option<&AudioOutcome> {
        match &self.state {
            ShellState::AudioRequested { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// Whether the audio trigger can be pressed
    pub fn trigger_available(&self) -> bool {
        self.selected_index().is_some()
    }

    /// Choose a situation and recompute its expressions
    ///
    /// # Errors
    /// `EmptySelection` if the situation's column is missing or has no
    /// values. The shell halts in that case.
    pub fn select_situation(&mut self, situation: Situation) -> Result<&[String], ShellError> {
        let halt = match self.table.table().column(situation) {
            None => Some(EmptySelection::MissingColumn(situation)),
            Some([]) => Some(EmptySelection::NoValues(situation)),
            Some(values) => {
                self.expressions = values.to_vec();
                None
            }
        };

        if let Some(error) = halt {
            log::warn!("{}", error);
            self.expressions.clear();
            self.state = ShellState::Halted(error.clone());
            return Err(error.into());
        }

        log::debug!(
            "Situation '{}' selected with {} expressions",
            situation,
            self.expressions.len()
        );
        self.state = ShellState::SituationSelected { situation };
        Ok(&self.expressions)
    }

    /// Choose the expression at zero-based `index`
    pub fn select_expression(&mut self, index: usize) -> Result<&str, ShellError> {
        let situation = self.require_situation()?;

        if index >= self.expressions.len() {
            return Err(ShellError::NoSuchExpression {
                situation,
                number: index + 1,
                available: self.expressions.len(),
            });
        }

        self.state = ShellState::ExpressionSelected { situation, index };
        Ok(&self.expressions[index])
    }

    /// Choose an expression by its exact text
    pub fn select_expression_text(&mut self, text: &str) -> Result<&str, ShellError> {
        let situation = self.require_situation()?;

        match self.expressions.iter().position(|e| e == text) {
            Some(index) => self.select_expression(index),
            None => Err(ShellError::UnknownExpression {
                situation,
                text: text.to_string(),
            }),
        }
    }

    /// Press the audio trigger
    ///
    /// Synthesizes the selected expression once. Success makes the clip
    /// available through [`take_clip`](Self::take_clip); failure records a
    /// message and leaves the table and selection untouched. Pressing again
    /// retries.
    pub fn request_audio(&mut self) -> Result<&AudioOutcome, ShellError> {
        if let ShellState::Halted(error) = &self.state {
            return Err(error.clone().into());
        }

        let (situation, index) = match &self.state {
            ShellState::ExpressionSelected { situation, index }
            | ShellState::AudioRequested {
                situation, index, ..
            } => (*situation, *index),
            _ => return Err(ShellError::TriggerUnavailable),
        };

        let text = &self.expressions[index];
        let outcome = match self.synthesizer.synthesize(text, &self.language) {
            Ok(clip) => AudioOutcome::Playable(clip),
            Err(err) => {
                log::warn!("Audio generation failed: {}", err);
                AudioOutcome::Errored(format!("Error generating audio: {}", err))
            }
        };

        self.state = ShellState::AudioRequested {
            situation,
            index,
            outcome,
        };
        self.outcome().ok_or(ShellError::TriggerUnavailable)
    }

    /// Hand a playable clip to the caller
    ///
    /// The shell keeps no copy; the state returns to `ExpressionSelected`.
    pub fn take_clip(&mut self) -> Option<AudioClip> {
        let ShellState::AudioRequested {
            situation,
            index,
            outcome: AudioOutcome::Playable(_),
        } = &self.state
        else {
            return None;
        };

        let next = ShellState::ExpressionSelected {
            situation: *situation,
            index: *index,
        };
        match mem::replace(&mut self.state, next) {
            ShellState::AudioRequested {
                outcome: AudioOutcome::Playable(clip),
                ..
            } => Some(clip),
            _ => None,
        }
    }

    fn require_situation(&self) -> Result<Situation, ShellError> {
        match &self.state {
            ShellState::Idle => Err(ShellError::NoSituation),
            ShellState::Halted(error) => Err(error.clone().into()),
            ShellState::SituationSelected { situation }
            | ShellState::ExpressionSelected { situation, .. }
            | ShellState::AudioRequested { situation, .. } => Ok(*situation),
        }
    }
}
