//! Building a review configuration from command-line arguments.

use std::path::PathBuf;

use anyhow::{Context, Result};
use blind_review::ReviewConfig;

use crate::SourceArgs;

/// Resolve `--config` or `--reference`/`--candidate` into a configuration.
pub fn load(source: &SourceArgs) -> Result<ReviewConfig> {
    let mut config = if let Some(path) = &source.config {
        ReviewConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?
    } else {
        let reference = source
            .reference
            .clone()
            .context("Either --config or --reference is required")?;

        let mut builder = ReviewConfig::builder().reference(reference);
        for arg in &source.candidate {
            builder = match parse_candidate(arg) {
                (Some(label), path) => builder.candidate_labeled(label, path),
                (None, path) => builder.candidate(path),
            };
        }
        builder.build().context("Invalid review configuration")?
    };

    if let Some(seed) = source.seed {
        config.seed = seed;
    }
    Ok(config)
}

/// `LABEL=DIR` or plain `DIR`.
fn parse_candidate(arg: &str) -> (Option<&str>, PathBuf) {
    match arg.split_once('=') {
        Some((label, dir)) if !label.is_empty() && !dir.is_empty() => {
            (Some(label), PathBuf::from(dir))
        }
        _ => (None, PathBuf::from(arg)),
    }
}

pub fn init(source: &SourceArgs, export_name: Option<String>, output: PathBuf) -> Result<()> {
    let mut config = load(source)?;
    if let Some(name) = export_name {
        config.export_file_name = name;
    }
    config.validate().context("Invalid review configuration")?;

    config
        .save(&output)
        .with_context(|| format!("Failed to write configuration to {}", output.display()))?;
    println!("Saved configuration to: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candidate() {
        assert_eq!(
            parse_candidate("Real=/data/RealCD4"),
            (Some("Real"), PathBuf::from("/data/RealCD4"))
        );
        assert_eq!(parse_candidate("/data/OutputCD4"), (None, PathBuf::from("/data/OutputCD4")));
        assert_eq!(parse_candidate("=/data/x"), (None, PathBuf::from("=/data/x")));
    }

    #[test]
    fn test_load_from_flags() {
        let source = SourceArgs {
            config: None,
            reference: Some(PathBuf::from("/data/InputCD4")),
            candidate: vec!["/data/RealCD4".to_string(), "Out=/data/OutputCD4".to_string()],
            seed: Some(1),
        };

        let config = load(&source).unwrap();
        assert_eq!(config.seed, 1);
        assert_eq!(config.candidates[0].label.as_str(), "RealCD4");
        assert_eq!(config.candidates[1].label.as_str(), "Out");
    }

    #[test]
    fn test_load_requires_reference() {
        let source = SourceArgs {
            candidate: vec!["/data/RealCD4".to_string()],
            ..SourceArgs::default()
        };
        assert!(load(&source).is_err());
    }
}
