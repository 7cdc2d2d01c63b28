//! Declared input formats and sniffing from file name or MIME type.

use crate::error::{ExplorerError, Result};

/// Format tag for an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Delimited text with a header row.
    DelimitedText { delimiter: u8 },
    /// Spreadsheet workbook; the first sheet is read.
    Spreadsheet,
}

impl FileFormat {
    /// Comma-separated values.
    pub fn csv() -> Self {
        FileFormat::DelimitedText { delimiter: b',' }
    }

    /// Tab-separated values.
    pub fn tsv() -> Self {
        FileFormat::DelimitedText { delimiter: b'\t' }
    }

    /// Determine the format from a MIME type, falling back to the file
    /// extension.
    pub fn sniff(file_name: &str, mime: Option<&str>) -> Result<Self> {
        if let Some(format) = mime.and_then(Self::from_mime) {
            return Ok(format);
        }
        Self::from_extension(file_name).ok_or_else(|| {
            ExplorerError::Format(format!(
                "unsupported file type for '{}' (expected csv, tsv or xlsx)",
                file_name
            ))
        })
    }

    fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "text/csv" | "application/csv" | "text/plain" => Some(Self::csv()),
            "text/tab-separated-values" => Some(Self::tsv()),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "application/vnd.ms-excel"
            | "application/vnd.ms-excel.sheet.macroenabled.12"
            | "application/vnd.oasis.opendocument.spreadsheet" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    fn from_extension(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Some(Self::csv()),
            "tsv" => Some(Self::tsv()),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_by_extension() {
        assert_eq!(FileFormat::sniff("data.csv", None).unwrap(), FileFormat::csv());
        assert_eq!(FileFormat::sniff("DATA.TSV", None).unwrap(), FileFormat::tsv());
        assert_eq!(
            FileFormat::sniff("sales.xlsx", None).unwrap(),
            FileFormat::Spreadsheet
        );
    }

    #[test]
    fn mime_takes_precedence_over_extension() {
        let format = FileFormat::sniff(
            "upload.bin",
            Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        )
        .unwrap();
        assert_eq!(format, FileFormat::Spreadsheet);

        let format = FileFormat::sniff("upload", Some("text/csv; charset=utf-8")).unwrap();
        assert_eq!(format, FileFormat::csv());
    }

    #[test]
    fn unknown_type_is_a_format_error() {
        assert!(matches!(
            FileFormat::sniff("notes.pdf", Some("application/pdf")),
            Err(ExplorerError::Format(_))
        ));
        assert!(matches!(
            FileFormat::sniff("no_extension", None),
            Err(ExplorerError::Format(_))
        ));
    }
}
