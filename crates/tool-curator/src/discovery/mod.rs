//! Candidate tool intake from CSV or JSON exports, plus the built-in sample set.

mod parser;
mod samples;

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;

pub use samples::sample_tools;

use parser::JsonShapeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFormat {
    Json,
    Csv,
}

impl ToolFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(|extension| extension.parse().ok())
    }
}

impl FromStr for ToolFormat {
    type Err = ImportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ToolFormat::Json),
            "csv" => Ok(ToolFormat::Csv),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    MissingTools,
    UnsupportedFormat(String),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read tool export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid tool CSV data: {}", err),
            ImportError::Json(err) => write!(f, "invalid tool JSON data: {}", err),
            ImportError::MissingTools => {
                write!(f, "tool JSON must be an array or an object with a 'tools' array")
            }
            ImportError::UnsupportedFormat(format) => {
                write!(f, "unsupported tool export format '{}'", format)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Json(err) => Some(err),
            ImportError::MissingTools | ImportError::UnsupportedFormat(_) => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<JsonShapeError> for ImportError {
    fn from(err: JsonShapeError) -> Self {
        match err {
            JsonShapeError::Syntax(err) => Self::Json(err),
            JsonShapeError::MissingTools => Self::MissingTools,
        }
    }
}

/// Reads raw candidate records for the curation pipeline.
pub struct ToolImporter;

impl ToolImporter {
    /// Imports from a file; `format` falls back to the file extension.
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        format: Option<ToolFormat>,
    ) -> Result<Vec<Value>, ImportError> {
        let path = path.as_ref();
        let format = match format.or_else(|| ToolFormat::from_path(path)) {
            Some(format) => format,
            None => {
                let extension = path
                    .extension()
                    .and_then(|extension| extension.to_str())
                    .unwrap_or_default();
                return Err(ImportError::UnsupportedFormat(extension.to_string()));
            }
        };
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file), format)
    }

    pub fn from_reader<R: Read>(reader: R, format: ToolFormat) -> Result<Vec<Value>, ImportError> {
        match format {
            ToolFormat::Csv => Ok(parser::parse_csv(reader)?),
            ToolFormat::Json => Ok(parser::parse_json(reader)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn csv_rows_split_features_and_drop_blank_cells() {
        let csv = "name,description,url,features,category,pricing,api_available\n\
Notion AI, Writing assistant ,https://notion.so,Summaries; Drafts | Q&A,,Paid,yes\n";
        let items = ToolImporter::from_reader(Cursor::new(csv), ToolFormat::Csv).expect("parse");
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert_eq!(item["name"], "Notion AI");
        assert_eq!(item["description"], "Writing assistant");
        assert_eq!(item["features"], serde_json::json!(["Summaries", "Drafts", "Q&A"]));
        assert!(item.get("category").is_none());
        assert_eq!(item["api_available"], true);
    }

    #[test]
    fn csv_without_optional_columns_is_accepted() {
        let csv = "name,url\nZapier,zapier.com\n";
        let items = ToolImporter::from_reader(Cursor::new(csv), ToolFormat::Csv).expect("parse");
        assert_eq!(items[0]["url"], "zapier.com");
        assert!(items[0].get("features").is_none());
    }

    #[test]
    fn json_accepts_array_or_tools_object() {
        let array = r#"[{"name": "A"}, {"name": "B"}]"#;
        let wrapped = r#"{"tools": [{"name": "A"}, 7]}"#;
        assert_eq!(
            ToolImporter::from_reader(Cursor::new(array), ToolFormat::Json)
                .expect("array")
                .len(),
            2
        );
        let items =
            ToolImporter::from_reader(Cursor::new(wrapped), ToolFormat::Json).expect("wrapped");
        assert_eq!(items[1], serde_json::json!(7));
    }

    #[test]
    fn json_without_tools_is_rejected() {
        let error = ToolImporter::from_reader(Cursor::new(r#"{"items": []}"#), ToolFormat::Json)
            .expect_err("shape error");
        assert!(matches!(error, ImportError::MissingTools));
    }

    #[test]
    fn format_is_inferred_from_extension() {
        assert_eq!(ToolFormat::from_path("tools.CSV"), Some(ToolFormat::Csv));
        assert_eq!(ToolFormat::from_path("tools.json"), Some(ToolFormat::Json));
        assert_eq!(ToolFormat::from_path("tools.xml"), None);
        assert!(matches!(
            ToolImporter::from_path("tools.xml", None),
            Err(ImportError::UnsupportedFormat(ext)) if ext == "xml"
        ));
    }

    #[test]
    fn missing_file_propagates_io_error() {
        let error = ToolImporter::from_path("./does-not-exist.json", None).expect_err("io");
        match error {
            ImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
