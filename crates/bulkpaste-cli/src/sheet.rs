use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use bulkpaste_core::{ContentItem, OutcomeRecorder, PasteError, PublishRecord};

pub const CONTENT_COLUMN: &str = "content";
const OUTPUT_HEADER: [&str; 6] = ["row", "status", "url", "edit_code", "method", "error"];

/// Read the `content` column of a CSV file, one item per data row.
pub fn read_items(path: &Path) -> Result<Vec<ContentItem>, PasteError> {
    let file = File::open(path)
        .map_err(|e| PasteError::Input(format!("Cannot open {}: {e}", path.display())))?;
    read_items_from(file)
}

pub fn read_items_from<R: Read>(reader: R) -> Result<Vec<ContentItem>, PasteError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| PasteError::Input(format!("Cannot read header row: {e}")))?;
    let column = headers
        .iter()
        .position(|h| h.trim() == CONTENT_COLUMN)
        .ok_or_else(|| {
            PasteError::Input(format!(
                "Missing '{CONTENT_COLUMN}' column (found: {})",
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })?;

    reader
        .records()
        .enumerate()
        .map(|(i, record)| {
            let record = record
                .map_err(|e| PasteError::Input(format!("Bad row {}: {e}", i + 1)))?;
            Ok(ContentItem::new(i + 1, record.get(column).unwrap_or("")))
        })
        .collect()
}

/// `bulkpaste_results_<UTC timestamp>.csv` in the working directory.
pub fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "bulkpaste_results_{}.csv",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Writes one CSV row per record, flushed as it goes so an interrupted run
/// keeps what it finished.
pub struct CsvRecorder<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvRecorder<File> {
    pub fn create(path: &Path) -> Result<Self, PasteError> {
        let file = File::create(path)
            .map_err(|e| PasteError::Input(format!("Cannot create {}: {e}", path.display())))?;
        Self::new(file)
    }
}

impl<W: Write> CsvRecorder<W> {
    pub fn new(inner: W) -> Result<Self, PasteError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(OUTPUT_HEADER).map_err(csv_error)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> Result<W, PasteError> {
        self.writer
            .into_inner()
            .map_err(|e| PasteError::Io(e.into_error()))
    }
}

impl<W: Write> OutcomeRecorder for CsvRecorder<W> {
    fn record(&mut self, record: PublishRecord) -> Result<(), PasteError> {
        self.writer.serialize(&record).map_err(csv_error)?;
        self.writer.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> PasteError {
    PasteError::Io(std::io::Error::other(e))
}

/// First rows of the input, one line each, long texts cut at 60 characters.
pub fn preview(items: &[ContentItem], limit: usize) -> Vec<String> {
    items
        .iter()
        .take(limit)
        .map(|item| {
            let flat = item.text.replace(['\n', '\r'], " ");
            let shown: String = flat.chars().take(60).collect();
            let ellipsis = if flat.chars().count() > 60 { "..." } else { "" };
            format!("  row {:>4}: {shown}{ellipsis}", item.row)
        })
        .collect()
}
