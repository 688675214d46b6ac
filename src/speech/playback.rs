//! Playback sinks for synthesized clips
//!
//! A sink consumes a clip once. [`SpeakerSink`] decodes it with rodio and
//! blocks until it has finished playing; [`FileSink`] saves it next to the
//! other downloads.

use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, Sink};

use super::AudioClip;

/// Longest file-name stem produced from an expression
const MAX_SLUG_LEN: usize = 48;

/// Errors from playback sinks
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("No audio output device available: {0}")]
    Device(String),

    #[error("Failed to decode audio: {0}")]
    Decode(String),

    #[error("Failed to write audio file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Destination for a synthesized clip
pub trait PlaybackSink {
    /// Play or store `clip`, which was synthesized from `expression`
    fn play(&mut self, clip: &AudioClip, expression: &str) -> Result<(), PlaybackError>;
}

impl<T: PlaybackSink + ?Sized> PlaybackSink for Box<T> {
    fn play(&mut self, clip: &AudioClip, expression: &str) -> Result<(), PlaybackError> {
        (**self).play(clip, expression)
    }
}

/// Plays clips on the default output device
#[derive(Debug, Clone, Copy)]
pub struct SpeakerSink {
    volume: f32,
}

impl Default for SpeakerSink {
    fn default() -> Self {
        Self { volume: 1.0 }
    }
}

impl SpeakerSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set playback volume, clamped to 0.0-1.0
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl PlaybackSink for SpeakerSink {
    fn play(&mut self, clip: &AudioClip, _expression: &str) -> Result<(), PlaybackError> {
        // The output stream is not Send, so it lives only for this call
        let (_stream, handle) =
            OutputStream::try_default().map_err(|e| PlaybackError::Device(e.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|e| PlaybackError::Device(e.to_string()))?;

        let source = Decoder::new(Cursor::new(clip.bytes().to_vec()))
            .map_err(|e| PlaybackError::Decode(e.to_string()))?;

        log::debug!("Playing {} bytes of {:?} audio", clip.size(), clip.format());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}

/// Writes clips to `<dir>/<slug>.<ext>`
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    last_written: Option<PathBuf>,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            last_written: None,
        }
    }

    /// Path of the most recently written clip
    pub fn last_written(&self) -> Option<&Path> {
        self.last_written.as_deref()
    }

    /// Path a clip for `expression` would be written to
    pub fn path_for(&self, clip: &AudioClip, expression: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", slugify(expression), clip.format().extension()))
    }
}

impl PlaybackSink for FileSink {
    fn play(&mut self, clip: &AudioClip, expression: &str) -> Result<(), PlaybackError> {
        let path = self.path_for(clip, expression);
        let write_error = |source| PlaybackError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_error)?;
        fs::write(&path, clip.bytes()).map_err(write_error)?;

        log::info!("Saved {} bytes of audio to {}", clip.size(), path.display());
        self.last_written = Some(path);
        Ok(())
    }
}

/// Hands each clip to two sinks in order
///
/// Stops at the first failure, so a clip that cannot be saved is not played.
#[derive(Debug, Clone)]
pub struct TeeSink<A, B> {
    first: A,
    second: B,
}

impl<A: PlaybackSink, B: PlaybackSink> TeeSink<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A: PlaybackSink, B: PlaybackSink> PlaybackSink for TeeSink<A, B> {
    fn play(&mut self, clip: &AudioClip, expression: &str) -> Result<(), PlaybackError> {
        self.first.play(clip, expression)?;
        self.second.play(clip, expression)
    }
}

/// Lowercase ASCII file-name stem for an expression
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len().min(MAX_SLUG_LEN));
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
            if slug.len() >= MAX_SLUG_LEN {
                break;
            }
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "expression".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mp3_clip() -> AudioClip {
        AudioClip::from_bytes(b"ID3\x04\x00fake-mp3".to_vec()).unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(
            slugify("Any questions before we wrap up?"),
            "any-questions-before-we-wrap-up"
        );
        assert_eq!(slugify("Let’s get started."), "let-s-get-started");
        assert_eq!(slugify("  ...  "), "expression");
        assert!(slugify(&"word ".repeat(40)).len() <= MAX_SLUG_LEN);
    }

    #[test]
    fn test_file_sink_writes_clip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let out_dir = temp_dir.path().join("audio");
        let mut sink = FileSink::new(&out_dir);
        assert!(sink.last_written().is_none());

        let clip = mp3_clip();
        sink.play(&clip, "See you next time.").unwrap();

        let expected = out_dir.join("see-you-next-time.mp3");
        assert_eq!(sink.last_written(), Some(expected.as_path()));
        assert_eq!(fs::read(&expected).unwrap(), clip.bytes());
    }

    #[test]
    fn test_file_sink_reports_write_errors() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();

        let mut sink = FileSink::new(&blocker);
        let err = sink.play(&mp3_clip(), "Hello").unwrap_err();
        assert!(matches!(err, PlaybackError::Write { .. }));
    }

    #[test]
    fn test_tee_sink_writes_both() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut tee = TeeSink::new(
            FileSink::new(temp_dir.path().join("a")),
            FileSink::new(temp_dir.path().join("b")),
        );

        tee.play(&mp3_clip(), "Good job").unwrap();
        assert!(temp_dir.path().join("a/good-job.mp3").exists());
        assert!(temp_dir.path().join("b/good-job.mp3").exists());
        assert!(tee.first().last_written().is_some());
        assert!(tee.second().last_written().is_some());
    }

    #[test]
    fn test_tee_sink_stops_on_first_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let mut tee = TeeSink::new(
            FileSink::new(&blocker),
            FileSink::new(temp_dir.path().join("b")),
        );
        assert!(tee.play(&mp3_clip(), "Hello").is_err());
        assert!(tee.second().last_written().is_none());
    }

    #[test]
    fn test_speaker_volume_clamped() {
        assert_eq!(SpeakerSink::new().volume(), 1.0);
        assert_eq!(SpeakerSink::new().with_volume(3.0).volume(), 1.0);
        assert_eq!(SpeakerSink::new().with_volume(-1.0).volume(), 0.0);
    }
}
