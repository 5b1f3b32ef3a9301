use crate::error::ExportError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A downloadable export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Html,
    #[serde(rename = "txt")]
    Text,
    Pdf,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Html => "document.html",
            ExportFormat::Text => "document.txt",
            ExportFormat::Pdf => "document.pdf",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Html => "text/html",
            ExportFormat::Text => "text/plain",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// One-line description for the export dialog.
    pub fn description(self) -> &'static str {
        match self {
            ExportFormat::Html => {
                "HTML format exports the content as a web page viewable in any browser."
            }
            ExportFormat::Text => "Plain text format that preserves only the text content.",
            ExportFormat::Pdf => "PDF format for high-quality print documents.",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(ExportFormat::Html),
            "txt" | "text" => Ok(ExportFormat::Text),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dialog_names() {
        assert_eq!("txt".parse::<ExportFormat>(), Ok(ExportFormat::Text));
        assert_eq!(" HTML ".parse::<ExportFormat>(), Ok(ExportFormat::Html));
        assert_eq!(
            "docx".parse::<ExportFormat>(),
            Err(ExportError::UnknownFormat("docx".into()))
        );
    }

    #[test]
    fn text_download_is_plain() {
        assert_eq!(ExportFormat::Text.file_name(), "document.txt");
        assert_eq!(ExportFormat::Text.mime(), "text/plain");
    }
}
