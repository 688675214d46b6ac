//! Google Translate speech endpoint
//!
//! Sends one blocking GET per expression to the public `translate_tts`
//! endpoint and returns the MP3 body. The endpoint is configurable so tests
//! and mirrors can stand in for the real service.

use std::io::Read;
use std::time::Duration;

use super::{prepare_text, validate_language, AudioClip, SpeechSynthesizer, SynthesisError};

/// Top-level domain of the default endpoint
pub const DEFAULT_TLD: &str = "com";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The endpoint rejects clients without a browser user agent
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Upper bound on an audio response body
pub const MAX_AUDIO_BYTES: u64 = 8 * 1024 * 1024;

/// Connection settings for [`GoogleTranslateTts`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsSettings {
    /// Full URL of the `translate_tts` endpoint
    pub endpoint: String,
    /// Connect, read and write timeout
    pub timeout: Duration,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self::for_tld(DEFAULT_TLD)
    }
}

impl TtsSettings {
    /// Settings for `https://translate.google.<tld>/translate_tts`
    pub fn for_tld(tld: &str) -> Self {
        Self {
            endpoint: format!("https://translate.google.{}/translate_tts", tld),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Speech synthesizer backed by the Google Translate TTS endpoint
#[derive(Debug, Clone)]
pub struct GoogleTranslateTts {
    agent: ureq::Agent,
    endpoint: String,
}

impl GoogleTranslateTts {
    pub fn new(settings: &TtsSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(settings.timeout)
            .timeout_read(settings.timeout)
            .timeout_write(settings.timeout)
            .user_agent(USER_AGENT)
            .build();

        Self {
            agent,
            endpoint: settings.endpoint.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SpeechSynthesizer for GoogleTranslateTts {
    fn synthesize(&self, text: &str, language: &str) -> Result<AudioClip, SynthesisError> {
        let text = prepare_text(text)?;
        let language = validate_language(language)?;
        let text_len = text.chars().count().to_string();

        log::debug!(
            "Requesting speech for {} chars in '{}' from {}",
            text_len,
            language,
            self.endpoint
        );

        let response = self
            .agent
            .get(&self.endpoint)
            .query("ie", "UTF-8")
            .query("client", "tw-ob")
            .query("tl", language)
            .query("q", text)
            .query("total", "1")
            .query("idx", "0")
            .query("textlen", &text_len)
            .call()
            .map_err(synthesis_error_from_ureq)?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_AUDIO_BYTES + 1)
            .read_to_end(&mut bytes)
            .map_err(|err| SynthesisError::Network(err.to_string()))?;

        if bytes.len() as u64 > MAX_AUDIO_BYTES {
            log::warn!("Speech response exceeds {} bytes", MAX_AUDIO_BYTES);
            return Err(SynthesisError::TooLarge(MAX_AUDIO_BYTES));
        }

        let clip = AudioClip::from_bytes(bytes)?;
        log::info!(
            "Synthesized {} bytes of {:?} audio",
            clip.size(),
            clip.format()
        );
        Ok(clip)
    }
}

fn synthesis_error_from_ureq(err: ureq::Error) -> SynthesisError {
    match err {
        ureq::Error::Status(status, _) => {
            log::warn!("Speech service answered HTTP {}", status);
            SynthesisError::Status(status)
        }
        ureq::Error::Transport(transport) => {
            let kind = classify_transport_error(&format!("{:?} {}", transport.kind(), transport));
            log::warn!("Speech request failed ({}): {}", kind, transport);
            SynthesisError::Network(format!("{}: {}", kind, transport))
        }
    }
}

fn classify_transport_error(raw: &str) -> &'static str {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        "timeout"
    } else if lower.contains("tls") || lower.contains("ssl") {
        "tls"
    } else if lower.contains("dns") {
        "dns"
    } else if lower.contains("connection") || lower.contains("connect") {
        "connection"
    } else {
        "transport"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_for_tld() {
        let settings = TtsSettings::for_tld("co.uk");
        assert_eq!(
            settings.endpoint,
            "https://translate.google.co.uk/translate_tts"
        );
        assert_eq!(settings.timeout, DEFAULT_TIMEOUT);
        assert_eq!(TtsSettings::default(), TtsSettings::for_tld("com"));
    }

    #[test]
    fn test_settings_builders() {
        let settings = TtsSettings::default()
            .with_endpoint("http://127.0.0.1:9/tts")
            .with_timeout(Duration::from_secs(2));
        let tts = GoogleTranslateTts::new(&settings);
        assert_eq!(tts.endpoint(), "http://127.0.0.1:9/tts");
        assert_eq!(settings.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_rejects_before_network() {
        // Unroutable endpoint: any request would fail with a network error
        let tts = GoogleTranslateTts::new(&TtsSettings::default().with_endpoint("http://0.0.0.0:1/"));
        assert!(matches!(
            tts.synthesize("   ", "en"),
            Err(SynthesisError::Rejected(_))
        ));
        assert!(matches!(
            tts.synthesize("Hello", "e n"),
            Err(SynthesisError::Rejected(_))
        ));
    }

    #[test]
    fn test_classify_transport_error() {
        assert_eq!(classify_transport_error("Io timed out reading"), "timeout");
        assert_eq!(classify_transport_error("ConnectionFailed refused"), "connection");
        assert_eq!(classify_transport_error("Dns failed to lookup"), "dns");
        assert_eq!(classify_transport_error("Tls handshake"), "tls");
        assert_eq!(classify_transport_error("something else"), "transport");
    }
}
