//! Line-oriented review loop over an annotation session.
//!
//! The shell owns nothing but presentation state (language, remembered
//! settings). Every edit and navigation goes through [`Session`].

use crate::resources::{Resources, FALLBACK_LANG};
use anyhow::Context;
use ptoolkit_core::{Advance, AppError, Config, LabelField, LabelPair, Session, Settings};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// One parsed line of reviewer input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Prev,
    /// `None` clears the field.
    Set(LabelField, Option<f64>),
    Lang(String),
    Help,
    Quit,
}

fn parse_reading(arg: Option<&str>) -> Option<f64> {
    arg?.parse::<f64>().ok().filter(|value| !value.is_nan())
}

/// Parse a reviewer command.
///
/// Sensitivity is entered as a `0..=100` scale reading and stored as a
/// fraction. A negative reading for either label means "unset".
///
/// # Returns
/// The command, or the offending input on failure.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let trimmed = line.trim();
    let mut parts = trimmed.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(Command::Next);
    };
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(trimmed.to_string());
    }

    let command = match (head.to_ascii_lowercase().as_str(), arg) {
        ("n" | "next", None) => Command::Next,
        ("p" | "prev" | "previous", None) => Command::Prev,
        ("h" | "help" | "?", None) => Command::Help,
        ("q" | "quit" | "exit", None) => Command::Quit,
        ("lang", Some(code)) => Command::Lang(code.to_ascii_lowercase()),
        ("s" | "nsfw", arg) => {
            let reading = parse_reading(arg).ok_or_else(|| trimmed.to_string())?;
            let value = (reading >= 0.0).then_some(reading.abs() / 100.0);
            Command::Set(LabelField::Sensitivity, value)
        }
        ("m" | "mi", arg) => {
            let reading = parse_reading(arg).ok_or_else(|| trimmed.to_string())?;
            let value = (reading >= 0.0).then_some(reading.abs());
            Command::Set(LabelField::MinorInvolved, value)
        }
        _ => return Err(trimmed.to_string()),
    };
    Ok(command)
}

fn format_labels(labels: LabelPair, unset: &str) -> (String, String) {
    let sensitivity = labels
        .sensitivity
        .map(|value| value.to_string())
        .unwrap_or_else(|| unset.to_string());
    let minor = match labels.minor_involved {
        Some(true) => "1".to_string(),
        Some(false) => "0".to_string(),
        None => unset.to_string(),
    };
    (sensitivity, minor)
}

/// Presentation state for one review run.
pub struct Reviewer<'a> {
    resources: &'a Resources,
    lang: String,
    settings: Settings,
    settings_path: PathBuf,
}

impl<'a> Reviewer<'a> {
    pub fn new(
        resources: &'a Resources,
        lang: String,
        settings: Settings,
        settings_path: PathBuf,
    ) -> Self {
        Self {
            resources,
            lang,
            settings,
            settings_path,
        }
    }

    fn text(&self, key: &'static str) -> &str {
        self.resources.text(&self.lang, key)
    }

    /// Print the current prompt, its labels, and the progress indicator.
    pub fn render<W: Write>(&self, session: &Session, out: &mut W) -> std::io::Result<()> {
        let (position, total) = session.progress();
        let row = session.current_prompt();
        let (sensitivity, minor) = format_labels(session.current_labels(), self.text("unset"));
        writeln!(out, "[{}/{}] {}", position, total, row.id)?;
        writeln!(out, "{}", row.prompt)?;
        writeln!(
            out,
            "{}: {} | {}: {}",
            self.text("nsfw"),
            sensitivity,
            self.text("mi"),
            minor
        )
    }

    fn navigate<W: Write>(
        &self,
        session: &mut Session,
        forward: bool,
        out: &mut W,
    ) -> anyhow::Result<()> {
        if session.advance(forward)? == Advance::AtBoundary {
            let key = if forward { "at_last" } else { "at_first" };
            writeln!(out, "{}", self.text(key))?;
        }
        Ok(())
    }

    fn switch_lang<W: Write>(&mut self, code: String, out: &mut W) -> anyhow::Result<()> {
        if !self.resources.has_lang(&code) {
            writeln!(
                out,
                "{} {} ({})",
                self.text("unknown_lang"),
                code,
                self.resources.languages().join(", ")
            )?;
            return Ok(());
        }
        self.lang = code;
        self.settings.last_lang = Some(self.lang.clone());
        self.settings.save(&self.settings_path)?;
        writeln!(out, "{}", self.text("lang_changed"))?;
        Ok(())
    }

    fn finish<W: Write>(&self, session: &Session, out: &mut W) -> anyhow::Result<()> {
        session.save()?;
        writeln!(out, "{}", self.text("saved"))?;
        Ok(())
    }

    /// Read commands until quit or end of input.
    ///
    /// # Errors
    /// Fatal session errors (a failed save) and output failures end the loop.
    /// Rejected labels and unknown commands are reported and the loop goes on.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        session: &mut Session,
        mut input: R,
        mut out: W,
    ) -> anyhow::Result<()> {
        writeln!(out, "{}", self.text("title"))?;
        self.render(session, &mut out)?;

        loop {
            write!(out, "> ")?;
            out.flush()?;
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return self.finish(session, &mut out);
            }

            match parse_command(&line) {
                Ok(Command::Next) => self.navigate(session, true, &mut out)?,
                Ok(Command::Prev) => self.navigate(session, false, &mut out)?,
                Ok(Command::Set(field, value)) => match session.set_label(field, value) {
                    Ok(()) => {}
                    Err(err @ AppError::InvalidLabel(_)) => {
                        writeln!(out, "{} {}", self.text("invalid_label"), err)?;
                    }
                    Err(err) => return Err(err.into()),
                },
                Ok(Command::Lang(code)) => self.switch_lang(code, &mut out)?,
                Ok(Command::Help) => {
                    writeln!(out, "{}", self.text("help"))?;
                    continue;
                }
                Ok(Command::Quit) => return self.finish(session, &mut out),
                Err(raw) => {
                    writeln!(out, "{} {}", self.text("unknown_command"), raw)?;
                    continue;
                }
            }
            self.render(session, &mut out)?;
        }
    }
}

/// Ask for a path until a usable one is entered.
///
/// # Returns
/// `None` when input ends before a path is given.
pub fn ask_path<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    resources: &Resources,
    lang: &str,
    question: &'static str,
    must_exist: bool,
) -> std::io::Result<Option<PathBuf>> {
    loop {
        write!(out, "{}", resources.text(lang, question))?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let entered = line.trim();
        if entered.is_empty() {
            writeln!(out, "{}", resources.text(lang, "no_file_selected"))?;
            continue;
        }
        let path = PathBuf::from(entered);
        if must_exist && !path.is_file() {
            writeln!(out, "{}: {}", entered, resources.text(lang, "file_not_found"))?;
            continue;
        }
        return Ok(Some(absolute(&path)));
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Paths and language passed on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogerArgs {
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub lang: Option<String>,
}

/// Resolve paths, open the session, remember the paths and review.
///
/// Flags win over remembered settings, which win over asking.
///
/// # Errors
/// Propagates fatal session errors and settings write failures.
pub fn run_cataloger<R: BufRead, W: Write>(
    config: &Config,
    resources: &Resources,
    args: CatalogerArgs,
    mut input: R,
    mut out: W,
) -> anyhow::Result<()> {
    let settings_path = config.settings_path();
    let mut settings = Settings::load(&settings_path);

    let requested = args
        .lang
        .or_else(|| settings.last_lang.clone())
        .unwrap_or_else(|| config.default_lang.clone());
    let lang = if resources.has_lang(&requested) {
        requested
    } else {
        tracing::warn!(lang = requested.as_str(), "unknown language, using fallback");
        FALLBACK_LANG.to_string()
    };

    let remembered = |value: &Option<String>| -> Option<PathBuf> {
        if config.forget_paths {
            return None;
        }
        value.as_deref().map(PathBuf::from)
    };

    let source = match args
        .source
        .or_else(|| remembered(&settings.last_source).filter(|path| path.is_file()))
    {
        Some(path) => path,
        None => ask_path(&mut input, &mut out, resources, &lang, "select_source_file", true)?
            .context(resources.text(&lang, "no_file_selected").to_string())?,
    };
    let target = match args.target.or_else(|| remembered(&settings.last_target)) {
        Some(path) => path,
        None => ask_path(&mut input, &mut out, resources, &lang, "select_target_file", false)?
            .context(resources.text(&lang, "no_file_selected").to_string())?,
    };

    let mut session = Session::open(&source, &target)?;

    // Only paths that opened cleanly are remembered.
    settings.last_source = Some(absolute(&source).display().to_string());
    settings.last_target = Some(absolute(&target).display().to_string());
    settings.last_lang = Some(lang.clone());
    settings.save(&settings_path)?;

    writeln!(out, "{}{}", resources.text(&lang, "source_header"), source.display())?;
    writeln!(out, "{}{}", resources.text(&lang, "target_header"), target.display())?;

    let mut reviewer = Reviewer::new(resources, lang, settings, settings_path);
    reviewer.run(&mut session, input, out)
}
