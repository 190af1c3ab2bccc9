//! PowerPoint text extraction via pptx-to-md.

use std::path::Path;
use std::sync::OnceLock;

use pptx_to_md::{ParserConfig, PptxContainer};
use regex::Regex;

use crate::error::PipelineError;

/// Extract slide text as lightly-cleaned markdown, one labeled block per
/// slide.
pub fn extract_text(path: &Path) -> Result<String, PipelineError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let parse_err = |message: String| PipelineError::Parse {
        filename: filename.clone(),
        message,
    };

    let config = ParserConfig::builder().extract_images(false).build();

    let mut container = PptxContainer::open(path, config).map_err(|e| parse_err(e.to_string()))?;
    let slides = container.parse_all().map_err(|e| parse_err(e.to_string()))?;

    let mut blocks = Vec::new();
    for (i, slide) in slides.iter().enumerate() {
        if let Some(md) = slide.convert_to_md() {
            let cleaned = collapse_whitespace(md.trim());
            if !cleaned.is_empty() {
                blocks.push(format!("Slide {}:\n{}", i + 1, cleaned));
            }
        }
    }

    Ok(blocks.join("\n\n"))
}

fn collapse_whitespace(text: &str) -> String {
    static RUNS: OnceLock<Regex> = OnceLock::new();
    static BLANKS: OnceLock<Regex> = OnceLock::new();

    let runs = RUNS.get_or_init(|| Regex::new(r"[ \t]+").unwrap());
    let blanks = BLANKS.get_or_init(|| Regex::new(r"\n{3,}").unwrap());

    let text = runs.replace_all(text, " ");
    blanks.replace_all(&text, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a   b\t\tc"), "a b c");
        assert_eq!(collapse_whitespace("a\n\n\n\nb"), "a\n\nb");
    }
}
