use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use classroom_phrases::phrases::export_sample;
use classroom_phrases::shell::{run_once, write_listing, InteractionShell, Prompt};
use classroom_phrases::source::{DataSource, TableCache};
use classroom_phrases::speech::{
    FileSink, GoogleTranslateTts, PlaybackSink, SpeakerSink, TeeSink,
};
use classroom_phrases::{config, logging, Cli, Options};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Config file first, then CLI overrides
    let options = config::load_config(cli.config.as_deref())?;
    let options = cli.merge_into_options(options)?;

    logging::init(options.log_level);
    log::debug!("Options: {:?}", options);

    if let Some(path) = &cli.export_sample {
        return write_sample(path);
    }

    let cache = TableCache::new(DataSource::new(options.timeout));
    let loaded = cache.get_or_load(&options.source);

    let stdout = io::stdout();
    if cli.list {
        let mut out = stdout.lock();
        if let Some(notice) = loaded.notice() {
            writeln!(out, "Note: {}", notice)?;
        }
        write_listing(&mut out, loaded.table(), options.situation)?;
        return Ok(());
    }

    let synthesizer = GoogleTranslateTts::new(&options.tts_settings());
    let mut shell = InteractionShell::new(loaded, synthesizer).with_language(&options.language);
    let mut sink = build_sink(&options)?;

    match options.situation {
        Some(situation) => run_once(
            &mut shell,
            sink.as_mut(),
            situation,
            options.expression,
            &mut stdout.lock(),
        ),
        None => {
            let mut prompt = Prompt::new(io::stdin().lock(), stdout.lock());
            if let Some(dir) = &options.output_dir {
                prompt = prompt.with_download_dir(dir);
            }
            prompt
                .run(&mut shell, sink.as_mut())
                .context("Interactive session failed")
        }
    }
}

fn write_sample(path: &Path) -> Result<()> {
    fs::write(path, export_sample())
        .with_context(|| format!("Failed to write sample CSV to {}", path.display()))?;
    log::info!("Sample CSV written to {}", path.display());
    println!("Sample CSV saved to {}", path.display());
    Ok(())
}

/// Speakers, a directory, or both
fn build_sink(options: &Options) -> Result<Box<dyn PlaybackSink>> {
    let sink: Box<dyn PlaybackSink> = match (&options.output_dir, options.play_audio) {
        (Some(dir), true) => Box::new(TeeSink::new(FileSink::new(dir), SpeakerSink::new())),
        (Some(dir), false) => Box::new(FileSink::new(dir)),
        (None, true) => Box::new(SpeakerSink::new()),
        (None, false) => anyhow::bail!("--no-play needs --output-dir to keep the audio"),
    };
    Ok(sink)
}
