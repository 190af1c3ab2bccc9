//! PDF text extraction via lopdf.

use std::path::Path;

use lopdf::Document;
use tracing::warn;

use crate::error::PipelineError;

/// Extract the text of every page, in page order, joined by blank lines.
///
/// Pages that fail extraction (scanned images, exotic encodings) are skipped
/// with a warning; the document is only rejected when nothing at all could be
/// read.
pub fn extract_text(path: &Path) -> Result<String, PipelineError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let doc = Document::load(path).map_err(|e| PipelineError::Parse {
        filename: filename.clone(),
        message: e.to_string(),
    })?;

    let mut pages_text = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => {
                if !text.trim().is_empty() {
                    pages_text.push(text);
                }
            }
            Err(e) => warn!("skipping page {page_number} of {filename}: {e}"),
        }
    }

    Ok(pages_text.join("\n\n"))
}
