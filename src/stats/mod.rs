//! Descriptive statistics over exported ratings.
//!
//! - [`Summary`]: count, mean, median, std_dev, min and max of a set of values
//! - [`mean`], [`std_dev`]: Basic statistical functions
//! - [`summarize_by_label`]: one [`Summary`] per criterion for each candidate label

use serde::{Deserialize, Serialize};

use crate::review::{CandidateLabel, Criterion, ReportRow};

/// Descriptive statistics for a set of measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of values.
    pub count: usize,
    /// Mean value.
    pub mean: f64,
    /// Median value.
    pub median: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Summary {
    /// Compute summary statistics for a slice of values.
    ///
    /// Returns `None` if the slice is empty.
    #[must_use]
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Some(Self {
            count: sorted.len(),
            mean: mean(&sorted),
            median: median_sorted(&sorted),
            std_dev: std_dev(&sorted),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Median of an ascending slice; the mean of the two middle values for even
/// lengths.
fn median_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Compute arithmetic mean.
///
/// ```
/// use blind_review::stats::mean;
///
/// assert!((mean(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 3.0).abs() < 0.001);
/// ```
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Compute sample standard deviation (N-1 denominator).
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Ratings of one candidate label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSummary {
    /// Candidate label.
    pub label: CandidateLabel,
    /// Number of rated units.
    pub rated: usize,
    /// Statistics per criterion, in column order.
    pub criteria: Vec<CriterionSummary>,
}

/// Statistics for one criterion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionSummary {
    /// Criterion.
    pub criterion: Criterion,
    /// Statistics over the criterion's scores.
    pub summary: Summary,
}

/// Summarize rows per candidate label, labels in order of first appearance.
#[must_use]
pub fn summarize_by_label(rows: &[ReportRow]) -> Vec<LabelSummary> {
    let mut labels: Vec<&CandidateLabel> = Vec::new();
    for row in rows {
        if !labels.contains(&&row.folder) {
            labels.push(&row.folder);
        }
    }

    labels
        .into_iter()
        .map(|label| {
            let matching: Vec<&ReportRow> = rows.iter().filter(|r| &r.folder == label).collect();
            let criteria = Criterion::all()
                .iter()
                .filter_map(|&criterion| {
                    let values: Vec<f64> =
                        matching.iter().map(|r| f64::from(r.score(criterion))).collect();
                    Summary::compute(&values).map(|summary| CriterionSummary { criterion, summary })
                })
                .collect();

            LabelSummary {
                label: label.clone(),
                rated: matching.len(),
                criteria,
            }
        })
        .collect()
}
