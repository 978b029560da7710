//! Reading a previous export back into a [`ScoreStore`].
//!
//! A review can be interrupted and resumed: the exported sheet is loaded,
//! every row is validated through [`ScoreStore::set`], and the session picks
//! up at the first unit without a rating.
//!
//! Both export formats are accepted: workbooks are recognized by their zip
//! signature, anything else is read as CSV. Header names are matched
//! case-insensitively; `image`/`filename` and `label`/`candidate` are accepted
//! as aliases for `image_name` and `folder`. Item names and labels are kept
//! exactly as written so they match the units they were exported from.
//!
//! ## Example
//!
//! ```rust,ignore
//! use blind_review::import::ScoreImporter;
//! use blind_review::ReviewSession;
//!
//! let store = ScoreImporter::new().import("blind_review_results.xlsx")?;
//! let session = ReviewSession::resume(units, store)?;
//! ```

use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{Data, Reader, Xlsx};

use crate::error::{Error, Result};
use crate::review::rating::validate_score;
use crate::review::{CandidateLabel, Criterion, ItemId, Rating, ReportRow, ReviewUnit, ScoreStore};

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Reads exported rating sheets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreImporter;

struct Columns {
    image: usize,
    folder: usize,
    scores: [usize; 3],
}

impl ScoreImporter {
    /// Create an importer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Import an export (workbook or CSV) from a file.
    pub fn import(&self, path: impl AsRef<Path>) -> Result<ScoreStore> {
        let bytes = std::fs::read(path.as_ref())?;
        self.import_bytes(&bytes)
    }

    /// Import an export (workbook or CSV) held in memory.
    pub fn import_bytes(&self, bytes: &[u8]) -> Result<ScoreStore> {
        Self::into_store(self.read_bytes(bytes)?)
    }

    /// Parse and validate every row of an export held in memory.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Vec<ReportRow>> {
        if bytes.starts_with(ZIP_SIGNATURE) {
            self.read_workbook_rows(bytes)
        } else {
            self.read_rows(bytes)
        }
    }

    /// Parse and validate every row of a CSV export.
    pub fn read_rows<R: Read>(&self, reader: R) -> Result<Vec<ReportRow>> {
        let mut reader = csv::Reader::from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        let columns = find_columns(&header_refs)?;

        let mut rows = Vec::new();
        for (line_num, record) in reader.records().enumerate() {
            // +2 for 1-based and header
            let line = line_num + 2;
            let record = record.map_err(|e| Error::Import {
                line,
                reason: e.to_string(),
            })?;
            rows.push(parse_row(&columns, line, |idx| record.get(idx).unwrap_or(""))?);
        }

        Ok(rows)
    }

    /// Parse and validate the first worksheet of a workbook export.
    pub fn read_workbook_rows(&self, bytes: &[u8]) -> Result<Vec<ReportRow>> {
        let mut workbook =
            Xlsx::new(Cursor::new(bytes)).map_err(|e| Error::Workbook(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::Workbook("workbook has no worksheet".to_string()))?
            .map_err(|e| Error::Workbook(e.to_string()))?;

        let mut sheet_rows = range.rows();
        let headers: Vec<String> = sheet_rows
            .next()
            .ok_or_else(|| Error::Import {
                line: 1,
                reason: "missing header row".to_string(),
            })?
            .iter()
            .map(cell_text)
            .collect();
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        let columns = find_columns(&header_refs)?;

        let mut rows = Vec::new();
        for (line_num, cells) in sheet_rows.enumerate() {
            let line = line_num + 2;
            let fields: Vec<String> = cells.iter().map(cell_text).collect();
            rows.push(parse_row(&columns, line, |idx| {
                fields.get(idx).map_or("", String::as_str)
            })?);
        }

        Ok(rows)
    }

    fn into_store(rows: Vec<ReportRow>) -> Result<ScoreStore> {
        let mut store = ScoreStore::new();
        for row in rows {
            let rating = Rating::new(row.score1, row.score2, row.score3);
            store.set(ReviewUnit::new(row.image_name, row.folder), rating)?;
        }
        Ok(store)
    }
}

/// Text of a worksheet cell; whole numbers lose their fractional part.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(v) => v.to_string(),
        Data::Float(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn parse_row<'r>(
    columns: &Columns,
    line: usize,
    field: impl Fn(usize) -> &'r str,
) -> Result<ReportRow> {
    let image_name = field(columns.image);
    let folder = field(columns.folder);
    if image_name.trim().is_empty() || folder.trim().is_empty() {
        return Err(Error::Import {
            line,
            reason: "missing image_name or folder".to_string(),
        });
    }

    let mut scores = [0u8; 3];
    for (slot, (&criterion, &idx)) in
        scores.iter_mut().zip(Criterion::all().iter().zip(&columns.scores))
    {
        let raw = field(idx).trim();
        let value: u8 = raw.parse().map_err(|_| Error::Import {
            line,
            reason: format!("{} is not an integer: {raw:?}", criterion.column()),
        })?;
        *slot = validate_score(criterion, value).map_err(|e| Error::Import {
            line,
            reason: e.to_string(),
        })?;
    }

    Ok(ReportRow {
        image_name: ItemId::new(image_name),
        folder: CandidateLabel::new(folder),
        score1: scores[0],
        score2: scores[1],
        score3: scores[2],
    })
}

fn find_columns(headers: &[&str]) -> Result<Columns> {
    let find = |names: &[&str]| -> Result<usize> {
        names
            .iter()
            .find_map(|name| find_header_index(headers, name))
            .ok_or_else(|| Error::Import {
                line: 1,
                reason: format!("Could not find {} column", names[0]),
            })
    };

    Ok(Columns {
        image: find(&["image_name", "image", "filename"])?,
        folder: find(&["folder", "label", "candidate"])?,
        scores: [
            find(&[Criterion::StructuralDetail.column()])?,
            find(&[Criterion::PatternConsistency.column()])?,
            find(&[Criterion::ArtifactFree.column()])?,
        ],
    })
}

/// Find a header index by name (case-insensitive).
fn find_header_index(headers: &[&str], name: &str) -> Option<usize> {
    let name_lower = name.to_lowercase();
    headers.iter().position(|h| h.trim().to_lowercase() == name_lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::ReportExporter;

    #[test]
    fn test_import_reads_back_export() {
        let mut store = ScoreStore::new();
        store.set(ReviewUnit::new("a.png", "X"), Rating::new(1, 2, 3)).unwrap();
        store.set(ReviewUnit::new("b.png", "Y"), Rating::new(5, 4, 1)).unwrap();
        let artifact = ReportExporter::default().export(&store).unwrap();

        let imported = ScoreImporter::new().import_bytes(&artifact.bytes).unwrap();
        assert_eq!(imported.completion_count(), 2);
        assert_eq!(imported.get(&ReviewUnit::new("a.png", "X")), Rating::new(1, 2, 3));
        assert_eq!(imported.get(&ReviewUnit::new("b.png", "Y")), Rating::new(5, 4, 1));
    }

    #[test]
    fn test_import_keeps_names_byte_exact() {
        let unit = ReviewUnit::new(" a.png ", "X ");
        let mut store = ScoreStore::new();
        store.set(unit.clone(), Rating::new(1, 2, 3)).unwrap();

        for file_name in ["results.csv", "results.xlsx"] {
            let artifact = ReportExporter::new(file_name).export(&store).unwrap();
            let imported = ScoreImporter::new().import_bytes(&artifact.bytes).unwrap();
            assert!(imported.contains(&unit), "{file_name}");
            assert!(!imported.contains(&ReviewUnit::new("a.png", "X")), "{file_name}");
            assert_eq!(imported.get(&unit), Rating::new(1, 2, 3));
        }
    }

    #[test]
    fn test_import_trims_score_cells_only() {
        let csv = "image_name,folder,score1,score2,score3\na.png ,X, 4 ,2 , 3\n";
        let store = ScoreImporter::new().import_bytes(csv.as_bytes()).unwrap();
        assert_eq!(store.get(&ReviewUnit::new("a.png ", "X")), Rating::new(4, 2, 3));
        assert!(!store.contains(&ReviewUnit::new("a.png", "X")));
    }

    #[test]
    fn test_import_rejects_blank_name() {
        let csv = "image_name,folder,score1,score2,score3\n  ,X,1,2,3\n";
        let err = ScoreImporter::new().import_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Import { line: 2, .. }));
    }

    #[test]
    fn test_import_rejects_corrupt_workbook() {
        let err = ScoreImporter::new()
            .import_bytes(b"PK\x03\x04 not really a zip")
            .unwrap_err();
        assert!(matches!(err, Error::Workbook(_)));
    }

    #[test]
    fn test_import_reordered_headers_and_aliases() {
        let csv = "Score3,Score1,Label,Image,Score2\n1,2,X,a.png,3\n";
        let store = ScoreImporter::new().import_bytes(csv.as_bytes()).unwrap();
        assert_eq!(store.get(&ReviewUnit::new("a.png", "X")), Rating::new(2, 3, 1));
    }

    #[test]
    fn test_import_rejects_out_of_range_score() {
        let csv = "image_name,folder,score1,score2,score3\na.png,X,1,2,3\nb.png,X,6,2,3\n";
        let err = ScoreImporter::new().import_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Import { line: 3, .. }));
    }

    #[test]
    fn test_import_rejects_non_integer_score() {
        let csv = "image_name,folder,score1,score2,score3\na.png,X,4.5,2,3\n";
        let err = ScoreImporter::new().import_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Import { line: 2, ref reason } if reason.contains("score1")));
    }

    #[test]
    fn test_import_missing_column() {
        let csv = "image_name,folder,score1,score2\na.png,X,1,2\n";
        let err = ScoreImporter::new().import_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Import { line: 1, ref reason } if reason.contains("score3")));
    }

    #[test]
    fn test_find_header_index() {
        let headers = ["Image_Name", "Folder", "score1"];
        assert_eq!(find_header_index(&headers, "image_name"), Some(0));
        assert_eq!(find_header_index(&headers, "SCORE1"), Some(2));
        assert_eq!(find_header_index(&headers, "unknown"), None);
    }

    #[test]
    fn test_import_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        std::fs::write(&path, "image_name,folder,score1,score2,score3\na.png,X,3,3,3\n").unwrap();

        let store = ScoreImporter::new().import(&path).unwrap();
        assert_eq!(store.completion_count(), 1);
    }
}
