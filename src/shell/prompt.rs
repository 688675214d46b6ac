//! Terminal front-end for the interaction shell
//!
//! Renders the situation selector, the expression selector and the audio
//! trigger as numbered prompts over any `BufRead` / `Write` pair.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use super::{AudioOutcome, InteractionShell};
use crate::phrases::{export_sample, PhraseTable, Situation, SAMPLE_FILE_NAME};
use crate::speech::{PlaybackSink, SpeechSynthesizer};

const TITLE: &str = "Classroom English Expressions for Future English Teachers";

const INTRO: &str = "Choose a classroom situation, read useful expressions, and listen to the \
     audio to prepare for your 20-minute English teaching demo.";

/// What the user asked for at the action menu
enum Action {
    Play,
    OtherExpression,
    OtherSituation,
    Download,
    Quit,
}

/// Interactive prompt loop
pub struct Prompt<R, W> {
    input: R,
    output: W,
    /// Directory the sample CSV is saved into
    download_dir: PathBuf,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            download_dir: PathBuf::from("."),
        }
    }

    /// Save sample downloads into `dir`
    pub fn with_download_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.download_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Recover the writer, e.g. to inspect captured output
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the user quits or input ends
    pub fn run<S: SpeechSynthesizer>(
        &mut self,
        shell: &mut InteractionShell<S>,
        sink: &mut dyn PlaybackSink,
    ) -> io::Result<()> {
        writeln!(self.output, "{}", TITLE)?;
        writeln!(self.output, "{}", INTRO)?;
        if let Some(notice) = shell.notice() {
            writeln!(self.output)?;
            writeln!(self.output, "Note: {}", notice)?;
        }

        'situation: loop {
            writeln!(self.output)?;
            writeln!(self.output, "Classroom situation")?;
            for situation in Situation::ALL {
                writeln!(self.output, "  {}) {}", situation.menu_number(), situation)?;
            }
            writeln!(self.output, "  d) Download sample CSV")?;
            writeln!(self.output, "  q) Quit")?;

            let Some(line) = self.ask("Choose a situation: ")? else {
                return Ok(());
            };
            match line.as_str() {
                "q" | "quit" => return Ok(()),
                "d" => {
                    self.download_sample()?;
                    continue 'situation;
                }
                _ => {}
            }

            let situation = match line.parse::<Situation>() {
                Ok(situation) => situation,
                Err(err) => {
                    writeln!(self.output, "{}", err)?;
                    continue 'situation;
                }
            };

            if let Err(err) = shell.select_situation(situation) {
                writeln!(self.output, "Warning: {}", err)?;
                continue 'situation;
            }

            'expression: loop {
                writeln!(self.output)?;
                writeln!(self.output, "### Situation: {}", situation)?;
                for (i, expression) in shell.expressions().iter().enumerate() {
                    writeln!(self.output, "  {}) {}", i + 1, expression)?;
                }

                let Some(line) = self.ask("Choose an expression to practice [1]: ")? else {
                    return Ok(());
                };
                let index = if line.is_empty() {
                    0
                } else {
                    match line.parse::<usize>() {
                        Ok(number) if number > 0 => number - 1,
                        _ => {
                            writeln!(self.output, "Enter a number from the list")?;
                            continue 'expression;
                        }
                    }
                };

                match shell.select_expression(index) {
                    Ok(expression) => {
                        writeln!(self.output)?;
                        writeln!(self.output, "Selected expression")?;
                        writeln!(self.output, "> {}", expression)?;
                    }
                    Err(err) => {
                        writeln!(self.output, "{}", err)?;
                        continue 'expression;
                    }
                }

                loop {
                    let Some(action) = self.ask_action()? else {
                        return Ok(());
                    };
                    match action {
                        Action::Play => self.play(shell, sink)?,
                        Action::OtherExpression => continue 'expression,
                        Action::OtherSituation => continue 'situation,
                        Action::Download => self.download_sample()?,
                        Action::Quit => return Ok(()),
                    }
                }
            }
        }
    }

    fn ask_action(&mut self) -> io::Result<Option<Action>> {
        loop {
            writeln!(self.output)?;
            writeln!(
                self.output,
                "Listen and repeat: p) generate & play audio  e) another expression  \
                 s) another situation  d) download sample CSV  q) quit"
            )?;

            let Some(line) = self.ask("Action: ")? else {
                return Ok(None);
            };
            let action = match line.as_str() {
                "p" | "" => Action::Play,
                "e" => Action::OtherExpression,
                "s" => Action::OtherSituation,
                "d" => Action::Download,
                "q" | "quit" => Action::Quit,
                other => {
                    writeln!(self.output, "Unknown action '{}'", other)?;
                    continue;
                }
            };
            return Ok(Some(action));
        }
    }

    fn play<S: SpeechSynthesizer>(
        &mut self,
        shell: &mut InteractionShell<S>,
        sink: &mut dyn PlaybackSink,
    ) -> io::Result<()> {
        writeln!(self.output, "Generating audio...")?;

        let failure = match shell.request_audio() {
            Ok(AudioOutcome::Playable(_)) => None,
            Ok(AudioOutcome::Errored(message)) => Some(message.clone()),
            Err(err) => Some(err.to_string()),
        };
        if let Some(message) = failure {
            writeln!(self.output, "{}", message)?;
            return Ok(());
        }

        let expression = shell.selected_expression().unwrap_or_default().to_string();
        if let Some(clip) = shell.take_clip() {
            match sink.play(&clip, &expression) {
                Ok(()) => writeln!(self.output, "Audio ready ({} bytes)", clip.size())?,
                Err(err) => writeln!(self.output, "Error playing audio: {}", err)?,
            }
        }
        Ok(())
    }

    fn download_sample(&mut self) -> io::Result<()> {
        let path = self.download_dir.join(SAMPLE_FILE_NAME);
        match fs::write(&path, export_sample()) {
            Ok(()) => writeln!(self.output, "Sample CSV saved to {}", path.display()),
            Err(err) => writeln!(
                self.output,
                "Could not save sample CSV to {}: {}",
                path.display(),
                err
            ),
        }
    }

    /// Print `question` and read one trimmed line; `None` at end of input
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }
}

/// Select, synthesize and play one expression without prompting
///
/// `number` is one-based. Fails on an empty situation, an out-of-range
/// number, a synthesis error or a playback error.
pub fn run_once<S: SpeechSynthesizer, W: Write>(
    shell: &mut InteractionShell<S>,
    sink: &mut dyn PlaybackSink,
    situation: Situation,
    number: usize,
    out: &mut W,
) -> anyhow::Result<()> {
    if let Some(notice) = shell.notice() {
        writeln!(out, "Note: {}", notice)?;
    }

    shell.select_situation(situation)?;
    let expression = shell
        .select_expression(number.saturating_sub(1))?
        .to_string();
    writeln!(out, "> {}", expression)?;

    if let AudioOutcome::Errored(message) = shell.request_audio()? {
        anyhow::bail!("{}", message);
    }
    let Some(clip) = shell.take_clip() else {
        anyhow::bail!("No audio was produced for '{}'", expression);
    };

    sink.play(&clip, &expression)?;
    writeln!(out, "Audio ready ({} bytes)", clip.size())?;
    Ok(())
}

/// Print the expressions of one situation, or of all situations
pub fn write_listing<W: Write>(
    out: &mut W,
    table: &PhraseTable,
    situation: Option<Situation>,
) -> io::Result<()> {
    let situations: Vec<Situation> = match situation {
        Some(situation) => vec![situation],
        None => Situation::ALL.to_vec(),
    };

    for situation in situations {
        writeln!(out, "{}:", situation)?;
        match table.column(situation) {
            None => writeln!(out, "  (column not found)")?,
            Some([]) => writeln!(out, "  (no expressions)")?,
            Some(values) => {
                for (i, value) in values.iter().enumerate() {
                    writeln!(out, "  {}) {}", i + 1, value)?;
                }
            }
        }
    }
    Ok(())
}
