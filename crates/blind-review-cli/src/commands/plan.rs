//! Review order command.

use anyhow::{Context, Result};

use crate::SourceArgs;
use crate::commands::config;

pub fn run(source: &SourceArgs) -> Result<()> {
    let config = config::load(source)?;
    let (_, session) = config
        .start_session()
        .context("Failed to prepare the review session")?;

    eprintln!(
        "{} units (seed {}, {} candidate folders)",
        session.len(),
        config.seed,
        config.candidates.len()
    );
    for (i, unit) in session.units().iter().enumerate() {
        println!("{}\t{}\t{}", i + 1, unit.item, unit.label);
    }

    Ok(())
}
