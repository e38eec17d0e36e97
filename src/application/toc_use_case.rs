// ============================================================
// Layer 2 — TocUseCase
// ============================================================
// Prepares a book for retrieval by turning its PDF bookmarks
// into a nested table of contents:
//
//   Step 1: Read the outline        (Layer 6 - infra)
//   Step 2: Filter, clean, nest     (Layer 4 - data)
//   Step 3: Write pretty JSON

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::data::toc::build_toc;
use crate::infra::pdf_outline::OutlineReader;

pub struct TocUseCase {
    pdf:    PathBuf,
    output: PathBuf,
}

impl TocUseCase {
    pub fn new(pdf: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self { pdf: pdf.into(), output: output.into() }
    }

    /// Write the TOC and return how many entries it holds.
    pub fn execute(&self) -> Result<usize> {
        let outline = OutlineReader::open(&self.pdf)?.read();
        tracing::info!(
            "Read {} outline entries over {} pages",
            outline.entries.len(),
            outline.total_pages
        );

        let (toc, kept) = build_toc(&outline.entries, outline.total_pages);
        if kept == 0 {
            tracing::warn!("No usable outline entries in '{}'", self.pdf.display());
        }

        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.output, to_json_4(&toc)?)
            .with_context(|| format!("Cannot write '{}'", self.output.display()))?;

        Ok(kept)
    }
}

/// Pretty JSON with a 4-space indent.
fn to_json_4(value: &serde_json::Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::LabError;
    use crate::infra::pdf_outline::tests::sample_doc;
    use serde_json::{json, Value};

    #[test]
    fn test_writes_nested_toc() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = tmp.path().join("book.pdf");
        sample_doc().save(&pdf).unwrap();
        let out = tmp.path().join("out").join("toc.json");

        let kept = TocUseCase::new(&pdf, &out).execute().unwrap();
        assert_eq!(kept, 3);

        let toc: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(
            toc,
            json!({
                "Intro": {
                    "page_start": 1,
                    "page_end": 2,
                    "subsections": {
                        "Scope": { "page_start": 2, "page_end": 2, "subsections": {} }
                    }
                },
                "Body": { "page_start": 3, "page_end": 4, "subsections": {} }
            })
        );
        // Outline order survives serialization
        let keys: Vec<&String> = toc.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["Intro", "Body"]);
    }

    #[test]
    fn test_json_uses_four_space_indent() {
        let bytes = to_json_4(&json!({ "A": { "page_start": 1, "subsections": {} } })).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "{\n    \"A\": {\n        \"page_start\": 1,\n        \"subsections\": {}\n    }\n}"
        );
        assert_eq!(to_json_4(&json!({})).unwrap(), b"{}");
    }

    #[test]
    fn test_unreadable_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = tmp.path().join("broken.pdf");
        fs::write(&pdf, b"not a pdf").unwrap();

        let err = TocUseCase::new(&pdf, tmp.path().join("toc.json")).execute().unwrap_err();
        assert!(matches!(err.downcast_ref::<LabError>(), Some(LabError::Pdf { .. })));
    }
}
