pub mod csv;
pub mod json;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod text;
#[cfg(feature = "xlsx")]
pub mod xlsx;

use crate::error::Result;
use crate::mapper::{to_presentation, PresentationRecord};
use crate::store::RawRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
    #[cfg(feature = "xlsx")]
    Xlsx,
    #[cfg(feature = "pdf")]
    Pdf,
    Txt,
}

/// Formats written for every table in a backup archive, in archive order.
pub const ARCHIVE_FORMATS: &[Format] = &[
    Format::Json,
    Format::Csv,
    #[cfg(feature = "xlsx")]
    Format::Xlsx,
    #[cfg(feature = "pdf")]
    Format::Pdf,
    Format::Txt,
];

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            #[cfg(feature = "xlsx")]
            Self::Xlsx => "xlsx",
            #[cfg(feature = "pdf")]
            Self::Pdf => "pdf",
            Self::Txt => "txt",
        }
    }

    /// Formats accepted when restoring from a file.
    pub fn for_import(file_name: &str) -> Option<Format> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".json") {
            Some(Self::Json)
        } else if lower.ends_with(".csv") {
            Some(Self::Csv)
        } else {
            None
        }
    }

    /// Encode one table. JSON carries the stored rows untouched; every other
    /// format is built from the presentation records. An empty result means
    /// there was nothing to write.
    pub fn encode(
        &self,
        rows: &[RawRecord],
        records: &[PresentationRecord],
        title: &str,
    ) -> Result<Vec<u8>> {
        match self {
            Self::Json => json::render(rows),
            Self::Csv => csv::render(records),
            #[cfg(feature = "xlsx")]
            Self::Xlsx => xlsx::render(records, title),
            #[cfg(feature = "pdf")]
            Self::Pdf => pdf::render(records, title),
            Self::Txt => Ok(text::render(records, title)),
        }
    }
}

pub struct EncodedFile {
    pub format: Format,
    pub bytes: Vec<u8>,
}

/// Run every archive encoder over one table's rows, dropping empty outputs.
/// JSON is always kept.
pub fn encode_table(rows: &[RawRecord], title: &str) -> Result<Vec<EncodedFile>> {
    let records: Vec<PresentationRecord> = rows.iter().map(to_presentation).collect();
    let mut files = Vec::new();
    for format in ARCHIVE_FORMATS {
        let bytes = format.encode(rows, &records, title)?;
        if bytes.is_empty() && *format != Format::Json {
            continue;
        }
        files.push(EncodedFile {
            format: *format,
            bytes,
        });
    }
    Ok(files)
}
