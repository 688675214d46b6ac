//! Speech synthesis
//!
//! A [`SpeechSynthesizer`] turns one expression into a complete, playable
//! [`AudioClip`] with a single remote call. There is no retry; a failure is
//! returned to the caller as a [`SynthesisError`] and the user decides
//! whether to try again.

pub mod google;
pub mod playback;

pub use google::{GoogleTranslateTts, TtsSettings};
pub use playback::{FileSink, PlaybackError, PlaybackSink, SpeakerSink, TeeSink};

/// Language tag used when none is configured
pub const DEFAULT_LANGUAGE: &str = "en";

/// Longest text the speech service accepts in one request
pub const MAX_TEXT_CHARS: usize = 200;

/// Errors from speech synthesis
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("Text rejected: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Speech service returned HTTP {0}")]
    Status(u16),

    #[error("Speech service returned no playable audio")]
    InvalidAudio,

    #[error("Speech service response exceeds {0} bytes")]
    TooLarge(u64),
}

/// Container format of a synthesized clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Ogg,
}

impl AudioFormat {
    /// Identify the container from its leading bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [b'I', b'D', b'3', ..] => Some(AudioFormat::Mp3),
            [0xFF, second, ..] if second & 0xE0 == 0xE0 => Some(AudioFormat::Mp3),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => {
                Some(AudioFormat::Wav)
            }
            [b'O', b'g', b'g', b'S', ..] => Some(AudioFormat::Ogg),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Ogg => "ogg",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Ogg => "audio/ogg",
        }
    }
}

/// Encoded audio for one expression
///
/// Never empty, and always starts with a recognised container header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    bytes: Vec<u8>,
    format: AudioFormat,
}

impl AudioClip {
    /// Wrap encoded audio, rejecting empty or unrecognised data
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SynthesisError> {
        let format = AudioFormat::sniff(&bytes).ok_or(SynthesisError::InvalidAudio)?;
        Ok(Self { bytes, format })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Converts text to audio
pub trait SpeechSynthesizer {
    /// Synthesize `text` spoken in `language`
    ///
    /// Performs at most one outbound request.
    fn synthesize(&self, text: &str, language: &str) -> Result<AudioClip, SynthesisError>;
}

impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for &T {
    fn synthesize(&self, text: &str, language: &str) -> Result<AudioClip, SynthesisError> {
        (**self).synthesize(text, language)
    }
}

impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for Box<T> {
    fn synthesize(&self, text: &str, language: &str) -> Result<AudioClip, SynthesisError> {
        (**self).synthesize(text, language)
    }
}

/// Trim `text` and check it can be sent to the speech service
pub fn prepare_text(text: &str) -> Result<&str, SynthesisError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SynthesisError::Rejected("text is empty".to_string()));
    }

    let chars = trimmed.chars().count();
    if chars > MAX_TEXT_CHARS {
        return Err(SynthesisError::Rejected(format!(
            "text is {} characters long (limit {})",
            chars, MAX_TEXT_CHARS
        )));
    }

    Ok(trimmed)
}

/// Check a language tag such as `en` or `en-GB`
pub fn validate_language(language: &str) -> Result<&str, SynthesisError> {
    let language = language.trim();
    let valid = !language.is_empty()
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');

    if valid {
        Ok(language)
    } else {
        Err(SynthesisError::Rejected(format!(
            "invalid language tag '{}'",
            language
        )))
    }
}
