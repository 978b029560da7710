//! Statistics command.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use blind_review::import::ScoreImporter;
use blind_review::stats::summarize_by_label;

pub fn run(input: PathBuf, json: bool) -> Result<()> {
    let bytes = fs::read(&input).with_context(|| format!("Failed to open {}", input.display()))?;
    let rows = ScoreImporter::new()
        .read_bytes(&bytes)
        .with_context(|| format!("Failed to read ratings from {}", input.display()))?;
    let summaries = summarize_by_label(&rows);

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("Total ratings: {}", rows.len());
    for label in &summaries {
        println!();
        println!("{} ({} rated)", label.label, label.rated);
        println!("{:-<60}", "");
        for entry in &label.criteria {
            let s = &entry.summary;
            println!(
                "  {} {:<20} mean {:.2}  median {:.1}  sd {:.2}  range {:.0}-{:.0}",
                entry.criterion.column(),
                entry.criterion.label(),
                s.mean,
                s.median,
                s.std_dev,
                s.min,
                s.max
            );
        }
    }

    Ok(())
}
