// End-to-end flow over the built-in sample table and custom CSV files

use std::fs;
use std::io::Cursor;
use std::sync::Arc;

use classroom_phrases::phrases::{export_sample, parse_table, sample_table, SAMPLE_FILE_NAME};
use classroom_phrases::shell::{AudioOutcome, EmptySelection, InteractionShell, Prompt, ShellError};
use classroom_phrases::source::{
    DataSource, FallbackReason, TableCache, TableOrigin, FALLBACK_NOTICE,
};
use classroom_phrases::speech::{AudioClip, FileSink, SpeechSynthesizer, SynthesisError};
use classroom_phrases::Situation;
use tempfile::TempDir;

const CLOSING_FIRST: &str = "Before we finish, let’s quickly review what we learned today.";

/// Returns the same MP3 bytes for every request
struct CannedSynth;

impl SpeechSynthesizer for CannedSynth {
    fn synthesize(&self, _text: &str, _language: &str) -> Result<AudioClip, SynthesisError> {
        AudioClip::from_bytes(b"ID3\x03\x00canned".to_vec())
    }
}

struct OfflineSynth;

impl SpeechSynthesizer for OfflineSynth {
    fn synthesize(&self, _text: &str, _language: &str) -> Result<AudioClip, SynthesisError> {
        Err(SynthesisError::Network("connection: offline".to_string()))
    }
}

#[test]
fn missing_file_falls_back_to_sample() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("classroom_expressions.csv");

    let cache = TableCache::new(DataSource::default());
    let loaded = cache.get_or_load(missing.to_str().unwrap());

    assert!(loaded.is_fallback());
    assert!(matches!(
        loaded.origin(),
        TableOrigin::Fallback(FallbackReason::Unavailable(_))
    ));
    assert_eq!(loaded.notice(), Some(FALLBACK_NOTICE));
    assert_eq!(loaded.table(), sample_table());

    let mut shell = InteractionShell::new(loaded, CannedSynth);
    let closing = shell.select_situation(Situation::Closing).unwrap();
    assert_eq!(closing.len(), 5);
    assert_eq!(closing[0], CLOSING_FIRST);

    shell.select_expression(0).unwrap();
    match shell.request_audio().unwrap() {
        AudioOutcome::Playable(clip) => assert_eq!(clip.bytes(), b"ID3\x03\x00canned"),
        AudioOutcome::Errored(message) => panic!("unexpected error: {}", message),
    }
}

#[test]
fn header_only_file_falls_back() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("empty.csv");
    fs::write(&path, "Opening,Giving feedback,Closing\n").unwrap();

    let loaded = DataSource::default().try_load_or_default(path.to_str().unwrap());
    assert_eq!(
        loaded.origin(),
        &TableOrigin::Fallback(FallbackReason::Empty)
    );
}

#[test]
fn synthesis_failure_keeps_selection() {
    let loaded = Arc::new(DataSource::default().try_load_or_default("no/such/file.csv"));
    let mut shell = InteractionShell::new(loaded, OfflineSynth);

    shell.select_situation(Situation::GivingFeedback).unwrap();
    shell.select_expression(4).unwrap();
    let outcome = shell.request_audio().unwrap().clone();

    assert_eq!(
        outcome,
        AudioOutcome::Errored(
            "Error generating audio: Network error: connection: offline".to_string()
        )
    );
    assert_eq!(shell.situation(), Some(Situation::GivingFeedback));
    assert_eq!(
        shell.selected_expression(),
        Some("Let’s check together. Who has a different answer?")
    );
}

#[test]
fn custom_csv_missing_and_empty_columns() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("custom.csv");
    fs::write(
        &path,
        "Opening,Giving feedback\nHello class.,\nLet's begin.,\n",
    )
    .unwrap();

    let cache = TableCache::new(DataSource::default());
    let loaded = cache.get_or_load(path.to_str().unwrap());
    assert!(!loaded.is_fallback());
    assert!(loaded.notice().is_none());

    let mut shell = InteractionShell::new(loaded, CannedSynth);
    assert_eq!(
        shell.select_situation(Situation::Opening).unwrap(),
        ["Hello class.", "Let's begin."]
    );

    let missing = shell.select_situation(Situation::Closing).unwrap_err();
    assert_eq!(
        missing,
        ShellError::EmptySelection(EmptySelection::MissingColumn(Situation::Closing))
    );

    let empty = shell.select_situation(Situation::GivingFeedback).unwrap_err();
    assert_eq!(
        empty,
        ShellError::EmptySelection(EmptySelection::NoValues(Situation::GivingFeedback))
    );
    assert!(!shell.trigger_available());
}

#[test]
fn exported_sample_loads_as_source() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(SAMPLE_FILE_NAME);
    fs::write(&path, export_sample()).unwrap();

    let loaded = DataSource::default().try_load_or_default(path.to_str().unwrap());
    assert!(!loaded.is_fallback());
    assert_eq!(loaded.table(), sample_table());
    assert_eq!(&parse_table(&export_sample()).unwrap(), sample_table());
}

#[test]
fn scripted_prompt_session() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let loaded = Arc::new(DataSource::default().try_load_or_default("no/such/file.csv"));
    let mut shell = InteractionShell::new(loaded, CannedSynth);
    let mut sink = FileSink::new(temp_dir.path());

    // Closing, first expression by default, play, then quit
    let script = "3\n\np\nq\n";
    let mut prompt = Prompt::new(Cursor::new(script), Vec::new());
    prompt.run(&mut shell, &mut sink).unwrap();
    let output = String::from_utf8(prompt.into_output()).unwrap();

    assert!(output.starts_with("Classroom English Expressions for Future English Teachers"));
    assert!(output.contains(FALLBACK_NOTICE));
    assert!(output.contains(&format!("> {}", CLOSING_FIRST)));
    assert!(output.contains("Generating audio..."));

    let written = sink.last_written().expect("clip written");
    assert_eq!(fs::read(written).unwrap(), b"ID3\x03\x00canned");
}
