//! Content-extraction boundary.
//!
//! Binary-to-text extraction is delegated to an external service (Tika or
//! similar) behind the [`TextExtractor`] trait. Failures never cross this
//! boundary: an extractor returns `None` and the caller logs and moves on.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{CorpusError, Result};
use crate::types::Metadata;

/// Extracts plain text (and whatever metadata the backend offers) from a
/// binary file.
///
/// Implementations wrap an external extraction service. `None` means the
/// file could not be extracted; the failure must already have been handled
/// (logged) inside the implementation.
pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Option<(String, Metadata)>;
}

/// Extract text from every file in `docs_dir` that does not yet have a
/// `.txt` counterpart in `out_dir`, saving one text file per document.
///
/// Extraction failures are logged and skipped; returns the number of new
/// files written.
pub fn extract_missing<E: TextExtractor>(
    extractor: &E,
    docs_dir: &Path,
    out_dir: &Path,
) -> Result<usize> {
    fs::create_dir_all(out_dir).map_err(|e| CorpusError::io(out_dir.display().to_string(), e))?;

    let mut written = 0;
    for path in super::dir_paths(docs_dir, false, &[]) {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let target = out_dir.join(format!("{stem}.txt"));
        if target.exists() {
            continue;
        }
        let Some((text, _meta)) = extractor.extract(&path) else {
            warn!(file = %path.display(), "extraction produced no text, skipping");
            continue;
        };
        if text.is_empty() {
            continue;
        }
        fs::write(&target, &text).map_err(|e| CorpusError::io(target.display().to_string(), e))?;
        written += 1;
    }

    info!(count = written, dir = %out_dir.display(), "extracted new text files");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pretends every `.bin` file contains its stem as text.
    struct StubExtractor;

    impl TextExtractor for StubExtractor {
        fn extract(&self, path: &Path) -> Option<(String, Metadata)> {
            let stem = path.file_stem()?.to_str()?;
            if stem == "broken" {
                return None; // simulated backend failure
            }
            Some((format!("texto de {stem}"), Metadata::new()))
        }
    }

    #[test]
    fn test_extract_missing_writes_new_and_skips_existing_and_failed() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        let out = tmp.path().join("textos");
        fs::create_dir(&docs).unwrap();
        fs::create_dir(&out).unwrap();

        fs::write(docs.join("uno.bin"), b"").unwrap();
        fs::write(docs.join("dos.bin"), b"").unwrap();
        fs::write(docs.join("broken.bin"), b"").unwrap();
        // "dos" was already extracted on a previous run.
        fs::write(out.join("dos.txt"), "previo").unwrap();

        let written = extract_missing(&StubExtractor, &docs, &out).unwrap();

        assert_eq!(written, 1);
        assert_eq!(fs::read_to_string(out.join("uno.txt")).unwrap(), "texto de uno");
        assert_eq!(fs::read_to_string(out.join("dos.txt")).unwrap(), "previo");
        assert!(!out.join("broken.txt").exists());
    }
}
