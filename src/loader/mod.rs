//! Document loading: turn an uploaded file into raw text.
//!
//! Format is selected by file extension; each format delegates to its own
//! parser. The loaded text is discarded once chunking is done — only chunks
//! and their source filename survive into the index.

pub mod docx;
pub mod pdf;
pub mod pptx;

use std::fs;
use std::path::Path;

use crate::error::PipelineError;

/// Raw text extracted from one uploaded file.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub filename: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Word,
    PowerPoint,
    PlainText,
}

impl DocumentFormat {
    /// Map a file extension (without the dot, any case) to a format.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "doc" | "docx" => Some(Self::Word),
            "ppt" | "pptx" => Some(Self::PowerPoint),
            "txt" | "md" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Load a document from disk, extracting its full text.
///
/// Unknown extensions are a validation error; a file whose extracted text is
/// blank is reported as empty rather than silently indexed as nothing.
pub fn load_document(path: &Path) -> Result<LoadedDocument, PipelineError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let format = DocumentFormat::from_extension(ext)
        .ok_or_else(|| PipelineError::UnsupportedFormat(format!(".{ext}")))?;

    let text = match format {
        DocumentFormat::Pdf => pdf::extract_text(path)?,
        DocumentFormat::Word => docx::extract_text(path)?,
        DocumentFormat::PowerPoint => pptx::extract_text(path)?,
        DocumentFormat::PlainText => fs::read_to_string(path)?,
    };

    if text.trim().is_empty() {
        return Err(PipelineError::EmptyDocument(filename));
    }

    Ok(LoadedDocument { filename, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("DOCX"), Some(DocumentFormat::Word));
        assert_eq!(DocumentFormat::from_extension("pptx"), Some(DocumentFormat::PowerPoint));
        assert_eq!(DocumentFormat::from_extension("txt"), Some(DocumentFormat::PlainText));
        assert_eq!(DocumentFormat::from_extension("md"), Some(DocumentFormat::PlainText));
        assert_eq!(DocumentFormat::from_extension("exe"), None);
    }

    #[test]
    fn test_load_plain_text() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Rust is a systems programming language.").unwrap();

        let doc = load_document(file.path()).unwrap();
        assert!(doc.filename.ends_with(".txt"));
        assert_eq!(doc.text, "Rust is a systems programming language.");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".zip").tempfile().unwrap();
        let err = load_document(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(_)), "{err}");
    }

    #[test]
    fn test_empty_document_rejected() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "   \n\n  ").unwrap();

        let err = load_document(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyDocument(_)), "{err}");
    }
}
