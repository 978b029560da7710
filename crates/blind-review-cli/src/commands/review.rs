//! Interactive review command.
//!
//! The current pair is written to a preview directory as `reference.*` and
//! `candidate.*` so the reviewer can open them without seeing which folder
//! the candidate came from.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blind_review::import::ScoreImporter;
use blind_review::review::rating::scale_label;
use blind_review::{CollectionSet, Criterion, Rating, ReportExporter, ReviewSession};
use tempfile::NamedTempFile;
use tracing::info;

use crate::SourceArgs;
use crate::commands::config;

const PREVIEW_DIR: &str = "blind-review-preview";

const HELP: &str = "\
Commands:
  <a> <b> <c>   stage all three scores, e.g. `4 5 3`
  s1 <n>        stage one score (s1, s2 or s3)
  n             save and go to the next image
  e             save and export
  q             save, export and quit
  h             show this help";

pub fn run(source: &SourceArgs, resume: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let config = config::load(source)?;
    let (collections, session) = config
        .start_session()
        .context("Failed to start the review session")?;

    let output = output.unwrap_or_else(|| PathBuf::from(&config.export_file_name));
    // The output name decides between workbook and CSV
    let exporter = match output.file_name() {
        Some(name) => ReportExporter::new(name.to_string_lossy()),
        None => config.exporter(),
    };

    let session = match resume {
        Some(path) => {
            let store = ScoreImporter::new()
                .import(&path)
                .with_context(|| format!("Failed to resume from {}", path.display()))?;
            info!(path = %path.display(), rated = store.completion_count(), "Loaded previous ratings");
            ReviewSession::resume(session.units().to_vec(), store)?
        }
        None => session,
    }
    .with_exporter(exporter);

    let preview_dir = PathBuf::from(PREVIEW_DIR);
    fs::create_dir_all(&preview_dir)
        .with_context(|| format!("Failed to create {}", preview_dir.display()))?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut review = Review {
        session,
        collections: &collections,
        preview_dir: &preview_dir,
        output: &output,
    };
    review.run_loop(stdin.lock(), stdout.lock())
}

enum Action {
    Stage(Rating),
    StageOne(Criterion, u8),
    Next,
    Export,
    Quit,
    Help,
}

fn parse_action(line: &str) -> std::result::Result<Action, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let score = |s: &str| {
        s.parse::<u8>()
            .map_err(|_| format!("not a score: {s:?} (expected 1-5)"))
    };

    match tokens.as_slice() {
        ["n" | "next"] => Ok(Action::Next),
        ["e" | "export"] => Ok(Action::Export),
        ["q" | "quit"] => Ok(Action::Quit),
        ["h" | "help" | "?"] => Ok(Action::Help),
        [criterion, value] => {
            let criterion = criterion.parse::<Criterion>()?;
            Ok(Action::StageOne(criterion, score(*value)?))
        }
        [a, b, c] => Ok(Action::Stage(Rating::new(score(*a)?, score(*b)?, score(*c)?))),
        _ => Err(format!("unrecognized input: {line:?} (h for help)")),
    }
}

struct Review<'a> {
    session: ReviewSession,
    collections: &'a CollectionSet,
    preview_dir: &'a Path,
    output: &'a Path,
}

impl Review<'_> {
    fn run_loop<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        writeln!(out, "{HELP}")?;
        self.show_unit(&mut out)?;

        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next() else {
                // End of input behaves like `q`
                self.export(&mut out)?;
                return Ok(());
            };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let action = match parse_action(&line) {
                Ok(action) => action,
                Err(message) => {
                    writeln!(out, "{message}")?;
                    continue;
                }
            };

            match action {
                Action::Stage(rating) => {
                    let result = self.session.stage_rating(rating);
                    self.report(result, &mut out)?;
                }
                Action::StageOne(criterion, value) => {
                    let result = self.session.stage(criterion, value);
                    self.report(result, &mut out)?;
                }
                Action::Next => {
                    if self.session.advance()? {
                        self.show_unit(&mut out)?;
                    } else {
                        writeln!(out, "This is the last image; use `e` to export or `q` to finish.")?;
                    }
                }
                Action::Export => self.export(&mut out)?,
                Action::Quit => {
                    self.export(&mut out)?;
                    return Ok(());
                }
                Action::Help => writeln!(out, "{HELP}")?,
            }
        }
    }

    fn report<W: Write>(&self, result: blind_review::Result<()>, out: &mut W) -> Result<()> {
        match result {
            Ok(()) => self.show_rating(out),
            Err(e) => {
                writeln!(out, "{e}")?;
                Ok(())
            }
        }
    }

    fn show_unit<W: Write>(&self, out: &mut W) -> Result<()> {
        let unit = self.session.current();
        let progress = self.session.progress();
        writeln!(out)?;
        writeln!(out, "### Progress: {progress} ({} rated)", progress.completed)?;
        writeln!(out, "Image: {}", unit.item)?;

        let extension = Path::new(unit.item.as_str())
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("img");
        let images = self.collections.load_unit(unit);
        for (side, bytes) in [("reference", &images.reference), ("candidate", &images.candidate)] {
            let path = self.preview_dir.join(format!("{side}.{extension}"));
            match bytes {
                Ok(bytes) => {
                    fs::write(&path, bytes)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    writeln!(out, "  {side:<9}  {}", path.display())?;
                }
                Err(e) => {
                    if path.exists() {
                        fs::remove_file(&path)?;
                    }
                    writeln!(out, "  {side:<9}  warning: {e}")?;
                }
            }
        }

        self.show_rating(out)
    }

    fn show_rating<W: Write>(&self, out: &mut W) -> Result<()> {
        let rating = self.session.displayed_rating();
        for &criterion in Criterion::all() {
            let value = rating.get(criterion);
            writeln!(
                out,
                "  {} {:<20} {} ({})",
                criterion.column(),
                criterion.label(),
                value,
                scale_label(value).unwrap_or("?")
            )?;
        }
        Ok(())
    }

    fn export<W: Write>(&mut self, out: &mut W) -> Result<()> {
        match self.session.export() {
            Ok(artifact) => {
                write_replacing(self.output, &artifact.bytes)?;
                writeln!(out, "Saved {} ratings to {}", artifact.rows, self.output.display())?;
            }
            // Export has no side effects on the session; the reviewer can retry
            Err(e) => writeln!(out, "{e}")?,
        }
        Ok(())
    }
}

/// Write `bytes` to a temporary file next to `path`, then rename it over
/// `path`. A failed write leaves any previous export untouched.
fn write_replacing(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create a temporary file in {}", dir.display()))?;
    file.write_all(bytes)
        .and_then(|()| file.as_file().sync_all())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
