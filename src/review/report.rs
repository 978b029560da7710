//! Flattening ratings into report rows and serializing them.
//!
//! Row building is separate from byte encoding: [`ReportExporter`] turns a
//! [`ScoreStore`] into [`ReportRow`]s and hands them to a [`SheetWriter`],
//! which produces the final single-sheet file. [`XlsxSheet`] writes an Excel
//! workbook and is the default; [`CsvSheet`] is used for `.csv` file names.

use std::collections::HashMap;
use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::review::rating::Criterion;
use crate::review::store::ScoreStore;
use crate::review::unit::{CandidateLabel, ItemId};

/// Column names of the exported sheet, in order.
pub const REPORT_COLUMNS: [&str; 5] = ["image_name", "folder", "score1", "score2", "score3"];

/// File name used when none is configured.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "blind_review_results.xlsx";

/// MIME type of an Excel workbook.
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// One exported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Item identifier.
    pub image_name: ItemId,
    /// Candidate label.
    pub folder: CandidateLabel,
    /// Structural detail.
    pub score1: u8,
    /// Pattern consistency.
    pub score2: u8,
    /// Absence of artifacts.
    pub score3: u8,
}

impl ReportRow {
    /// Score for one criterion.
    #[must_use]
    pub fn score(&self, criterion: Criterion) -> u8 {
        match criterion {
            Criterion::StructuralDetail => self.score1,
            Criterion::PatternConsistency => self.score2,
            Criterion::ArtifactFree => self.score3,
        }
    }

    fn cells(&self) -> [Cell<'_>; 5] {
        [
            Cell::Text(self.image_name.as_str()),
            Cell::Text(self.folder.as_str()),
            Cell::Integer(i64::from(self.score1)),
            Cell::Integer(i64::from(self.score2)),
            Cell::Integer(i64::from(self.score3)),
        ]
    }
}

/// A typed sheet cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    /// UTF-8 text.
    Text(&'a str),
    /// Integer value.
    Integer(i64),
}

/// Encodes a header and rows into a single-sheet file.
pub trait SheetWriter {
    /// MIME type of the produced file.
    fn mime_type(&self) -> &'static str;

    /// Encode the whole sheet. The returned buffer is complete or not
    /// returned at all.
    fn write_sheet(&self, header: &[&str], rows: &[Vec<Cell<'_>>]) -> Result<Vec<u8>>;
}

/// Comma-separated values, UTF-8, one header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSheet;

impl SheetWriter for CsvSheet {
    fn mime_type(&self) -> &'static str {
        "text/csv"
    }

    fn write_sheet(&self, header: &[&str], rows: &[Vec<Cell<'_>>]) -> Result<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(header)?;

        for row in rows {
            let fields: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Cell::Text(s) => (*s).to_string(),
                    Cell::Integer(v) => v.to_string(),
                })
                .collect();
            wtr.write_record(&fields)?;
        }

        wtr.into_inner().map_err(|e| Error::ExportFailed(e.error().to_string()))
    }
}

/// Excel workbook with a single worksheet.
///
/// Text cells are written as strings and integer cells as numbers, so the
/// scores stay numeric when the sheet is opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxSheet;

fn xlsx_error(e: XlsxError) -> Error {
    Error::ExportFailed(e.to_string())
}

impl SheetWriter for XlsxSheet {
    fn mime_type(&self) -> &'static str {
        XLSX_MIME_TYPE
    }

    fn write_sheet(&self, header: &[&str], rows: &[Vec<Cell<'_>>]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, name) in header.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, *name)
                .map_err(xlsx_error)?;
        }

        for (i, row) in rows.iter().enumerate() {
            let r = u32::try_from(i + 1)
                .map_err(|_| Error::ExportFailed("too many rows for one worksheet".to_string()))?;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                let written = match cell {
                    Cell::Text(s) => worksheet.write_string(r, col, *s),
                    Cell::Integer(v) => worksheet.write_number(r, col, *v as f64),
                };
                written.map_err(xlsx_error)?;
            }
        }

        workbook.save_to_buffer().map_err(xlsx_error)
    }
}

/// Sheet writer matching a file name: CSV for `.csv`, a workbook otherwise.
#[must_use]
pub fn sheet_writer_for(file_name: &str) -> Box<dyn SheetWriter> {
    let is_csv = Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(CsvSheet)
    } else {
        Box::new(XlsxSheet)
    }
}

/// A fully serialized report, ready to be saved or offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name.
    pub file_name: String,
    /// MIME type of `bytes`.
    pub mime_type: &'static str,
    /// File contents.
    pub bytes: Vec<u8>,
    /// Number of data rows (header excluded).
    pub rows: usize,
}

/// Builds the tabular report from a [`ScoreStore`].
pub struct ReportExporter {
    writer: Box<dyn SheetWriter>,
    file_name: String,
}

impl std::fmt::Debug for ReportExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportExporter")
            .field("mime_type", &self.writer.mime_type())
            .field("file_name", &self.file_name)
            .finish()
    }
}

impl Default for ReportExporter {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_FILE_NAME)
    }
}

impl ReportExporter {
    /// Exporter producing `file_name`, with the writer picked by
    /// [`sheet_writer_for`].
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let writer = sheet_writer_for(&file_name);
        Self::with_writer(file_name, writer)
    }

    /// Exporter with a custom sheet writer.
    #[must_use]
    pub fn with_writer(file_name: impl Into<String>, writer: Box<dyn SheetWriter>) -> Self {
        Self {
            writer,
            file_name: file_name.into(),
        }
    }

    /// File name given to exported artifacts.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Flatten the store into rows.
    ///
    /// Rows are grouped by item in order of the item's first rating, and
    /// within an item by label in insertion order. Units never rated are
    /// absent.
    #[must_use]
    pub fn rows(store: &ScoreStore) -> Vec<ReportRow> {
        let mut item_rank: HashMap<&ItemId, usize> = HashMap::new();
        for entry in store {
            let next = item_rank.len();
            item_rank.entry(&entry.unit.item).or_insert(next);
        }

        let mut entries: Vec<_> = store.iter().collect();
        entries.sort_by_key(|entry| item_rank[&entry.unit.item]);

        entries
            .into_iter()
            .map(|entry| ReportRow {
                image_name: entry.unit.item.clone(),
                folder: entry.unit.label.clone(),
                score1: entry.rating.structural_detail,
                score2: entry.rating.pattern_consistency,
                score3: entry.rating.artifact_free,
            })
            .collect()
    }

    /// Serialize the store. The store is only read.
    pub fn export(&self, store: &ScoreStore) -> Result<ExportArtifact> {
        let rows = Self::rows(store);
        let cells: Vec<Vec<Cell<'_>>> = rows.iter().map(|row| row.cells().to_vec()).collect();

        let bytes = self
            .writer
            .write_sheet(&REPORT_COLUMNS, &cells)
            .map_err(|e| match e {
                Error::ExportFailed(reason) => Error::ExportFailed(reason),
                other => Error::ExportFailed(other.to_string()),
            })?;

        info!(rows = rows.len(), file = %self.file_name, "Exported ratings");

        Ok(ExportArtifact {
            file_name: self.file_name.clone(),
            mime_type: self.writer.mime_type(),
            bytes,
            rows: rows.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::rating::Rating;
    use crate::review::unit::ReviewUnit;

    struct FailingSheet;

    impl SheetWriter for FailingSheet {
        fn mime_type(&self) -> &'static str {
            "application/octet-stream"
        }

        fn write_sheet(&self, _header: &[&str], _rows: &[Vec<Cell<'_>>]) -> Result<Vec<u8>> {
            Err(Error::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_export_skips_unrated_units() {
        let mut store = ScoreStore::new();
        store.set(ReviewUnit::new("a.png", "X"), Rating::new(1, 2, 3)).unwrap();
        store.set(ReviewUnit::new("c.png", "X"), Rating::new(3, 2, 1)).unwrap();

        let artifact = ReportExporter::new("results.csv").export(&store).unwrap();
        assert_eq!(artifact.rows, 2);
        assert_eq!(artifact.file_name, "results.csv");
        assert_eq!(artifact.mime_type, "text/csv");

        let text = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(
            text,
            "image_name,folder,score1,score2,score3\na.png,X,1,2,3\nc.png,X,3,2,1\n"
        );
        assert!(!text.contains("b.png"));
    }

    #[test]
    fn test_export_empty_store_has_header_only() {
        let artifact = ReportExporter::new("out.csv").export(&ScoreStore::new()).unwrap();
        assert_eq!(artifact.rows, 0);
        assert_eq!(
            String::from_utf8(artifact.bytes).unwrap(),
            "image_name,folder,score1,score2,score3\n"
        );
    }

    #[test]
    fn test_rows_grouped_by_item() {
        let mut store = ScoreStore::new();
        store.set(ReviewUnit::new("b.png", "Y"), Rating::new(1, 1, 1)).unwrap();
        store.set(ReviewUnit::new("a.png", "X"), Rating::new(2, 2, 2)).unwrap();
        store.set(ReviewUnit::new("b.png", "X"), Rating::new(3, 3, 3)).unwrap();

        let rows = ReportExporter::rows(&store);
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.image_name.as_str(), r.folder.as_str()))
            .collect();
        assert_eq!(keys, vec![("b.png", "Y"), ("b.png", "X"), ("a.png", "X")]);
    }

    #[test]
    fn test_export_quotes_text_safely() {
        let mut store = ScoreStore::new();
        store
            .set(ReviewUnit::new("naïve, \"quoted\".png", "输出"), Rating::new(4, 4, 4))
            .unwrap();

        let artifact = ReportExporter::new("out.csv").export(&store).unwrap();
        let mut rdr = csv::Reader::from_reader(artifact.bytes.as_slice());
        let record = rdr.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "naïve, \"quoted\".png");
        assert_eq!(&record[1], "输出");
        assert_eq!(&record[2], "4");
    }

    #[test]
    fn test_writer_follows_file_extension() {
        assert_eq!(ReportExporter::default().file_name(), DEFAULT_EXPORT_FILE_NAME);
        assert_eq!(sheet_writer_for(DEFAULT_EXPORT_FILE_NAME).mime_type(), XLSX_MIME_TYPE);
        assert_eq!(sheet_writer_for("out.CSV").mime_type(), "text/csv");
        assert_eq!(sheet_writer_for("out").mime_type(), XLSX_MIME_TYPE);
    }

    #[test]
    fn test_default_export_is_workbook() {
        use calamine::{Data, Reader, Xlsx};

        let mut store = ScoreStore::new();
        store.set(ReviewUnit::new("a.png", "RealCD4"), Rating::new(1, 2, 3)).unwrap();
        store.set(ReviewUnit::new("b.png", "输出"), Rating::new(5, 4, 1)).unwrap();

        let artifact = ReportExporter::default().export(&store).unwrap();
        assert_eq!(artifact.mime_type, XLSX_MIME_TYPE);
        assert!(artifact.bytes.starts_with(b"PK\x03\x04"));

        let mut workbook = Xlsx::new(std::io::Cursor::new(artifact.bytes)).unwrap();
        assert_eq!(workbook.sheet_names().len(), 1);
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        assert_eq!(range.get_size(), (3, 5));

        let header: Vec<String> = range.rows().next().unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(header, REPORT_COLUMNS);
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("a.png".to_string())));
        assert_eq!(range.get_value((2, 1)), Some(&Data::String("输出".to_string())));
        assert_eq!(range.get_value((1, 4)), Some(&Data::Float(3.0)));
        assert_eq!(range.get_value((2, 2)), Some(&Data::Float(5.0)));
    }

    #[test]
    fn test_writer_failure_reported_as_export_failed() {
        let mut store = ScoreStore::new();
        store.set(ReviewUnit::new("a.png", "X"), Rating::default()).unwrap();

        let exporter = ReportExporter::with_writer("out.bin", Box::new(FailingSheet));
        let err = exporter.export(&store).unwrap_err();
        assert!(matches!(err, Error::ExportFailed(ref reason) if reason.contains("disk full")));
        assert_eq!(store.completion_count(), 1);
    }
}
