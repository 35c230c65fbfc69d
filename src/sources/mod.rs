//! Document sources.
//!
//! Every concrete source implements one capability: produce a restartable
//! stream of `(text, metadata)` pairs. The pipeline depends only on the
//! [`TextSource`] trait, never on a specific source's internals.
//!
//! Read failures at the item level (unreadable file, undecodable row) are
//! logged with the offending file name and the item is skipped; corpus
//! construction continues with the remaining items.

mod extract;
mod records;

pub use extract::{extract_missing, TextExtractor};
pub use records::{write_jsonl, CsvSource, JsonlRecord, JsonlSource};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::preprocess::drop_short_lines;
use crate::types::{Metadata, DOC_ID, META_FILE, META_SOURCE};

/// A restartable stream of `(text, metadata)` pairs.
///
/// `pairs` may be called more than once; each call starts a fresh pass over
/// the underlying items in the same order.
pub trait TextSource {
    fn pairs(&self) -> Box<dyn Iterator<Item = (String, Metadata)> + '_>;
}

/// File paths in a directory, sorted, hidden files excluded.
///
/// `exts` restricts to the given extensions (without dot) when non-empty.
pub(crate) fn dir_paths(dir: &Path, recursive: bool, exts: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    collect_paths(dir, recursive, &mut paths);
    paths.retain(|p| {
        let hidden = p
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        let ext_ok = exts.is_empty()
            || p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| exts.iter().any(|want| e.eq_ignore_ascii_case(want)));
        !hidden && ext_ok
    });
    paths.sort();
    paths
}

fn collect_paths(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), %err, "cannot read directory, skipping");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_paths(&path, recursive, out);
            }
        } else {
            out.push(path);
        }
    }
}

/// Zero-padded sequential document id, matching the persisted-artifact
/// convention (`0000001`, `0000002`, ...).
pub(crate) fn format_doc_id(n: u64) -> String {
    format!("{n:0>7}")
}

/// Plain text files in a directory, one document per file (or per paragraph).
///
/// Metadata: sequential `doc_id`, `file` (file name), `source` (parent
/// directory name).
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
    recursive: bool,
    exts: Vec<String>,
    /// Lines with this many characters or fewer are dropped before use.
    min_line_chars: usize,
    /// Treat each non-empty line (paragraph) as its own document.
    per_paragraph: bool,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            recursive: false,
            exts: Vec::new(),
            min_line_chars: 0,
            per_paragraph: false,
        }
    }

    /// Descend into subdirectories.
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Only consider files with the given extensions (without dot).
    pub fn with_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exts = exts.into_iter().map(Into::into).collect();
        self
    }

    /// Drop lines with `chars` characters or fewer before yielding text.
    pub fn with_min_line_chars(mut self, chars: usize) -> Self {
        self.min_line_chars = chars;
        self
    }

    /// Yield each non-empty line as its own document.
    pub fn per_paragraph(mut self) -> Self {
        self.per_paragraph = true;
        self
    }

    fn read_file(path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(err) => {
                warn!(file = %path.display(), %err, "cannot read file, skipping");
                None
            }
        }
    }

    fn base_meta(path: &Path) -> Metadata {
        let mut meta = Metadata::new();
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            meta.insert(META_FILE.to_string(), name.to_string());
        }
        if let Some(parent) = path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()) {
            meta.insert(META_SOURCE.to_string(), parent.to_string());
        }
        meta
    }
}

impl TextSource for DirSource {
    fn pairs(&self) -> Box<dyn Iterator<Item = (String, Metadata)> + '_> {
        let paths = dir_paths(&self.dir, self.recursive, &self.exts);
        let mut out = Vec::new();
        let mut next_id = 1u64;

        for path in paths {
            let Some(mut text) = Self::read_file(&path) else {
                continue;
            };
            if self.min_line_chars > 0 {
                text = drop_short_lines(&text, self.min_line_chars);
            }
            let base = Self::base_meta(&path);

            if self.per_paragraph {
                for line in text.lines().filter(|l| !l.is_empty()) {
                    let mut meta = base.clone();
                    meta.insert(DOC_ID.to_string(), format_doc_id(next_id));
                    next_id += 1;
                    out.push((line.to_string(), meta));
                }
            } else {
                let mut meta = base;
                meta.insert(DOC_ID.to_string(), format_doc_id(next_id));
                next_id += 1;
                out.push((text, meta));
            }
        }

        Box::new(out.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_dir_source_yields_sorted_files_with_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "b.txt", "segundo texto");
        write_file(tmp.path(), "a.txt", "primer texto");
        write_file(tmp.path(), ".hidden", "oculto");

        let source = DirSource::new(tmp.path());
        let pairs: Vec<_> = source.pairs().collect();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "primer texto");
        assert_eq!(pairs[0].1.get(DOC_ID).unwrap(), "0000001");
        assert_eq!(pairs[0].1.get(META_FILE).unwrap(), "a.txt");
        assert_eq!(pairs[1].1.get(DOC_ID).unwrap(), "0000002");
    }

    #[test]
    fn test_dir_source_extension_filter() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "keep.txt", "texto");
        write_file(tmp.path(), "skip.csv", "a,b");

        let source = DirSource::new(tmp.path()).with_extensions(["txt"]);
        let pairs: Vec<_> = source.pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1.get(META_FILE).unwrap(), "keep.txt");
    }

    #[test]
    fn test_dir_source_extension_matches_whole_extension() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "keep.csv", "a,b");
        write_file(tmp.path(), "skip.mycsv", "c,d");

        let source = DirSource::new(tmp.path()).with_extensions(["csv"]);
        let pairs: Vec<_> = source.pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1.get(META_FILE).unwrap(), "keep.csv");
    }

    #[test]
    fn test_dir_source_per_paragraph() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "doc.txt", "primer párrafo\n\nsegundo párrafo\n");

        let source = DirSource::new(tmp.path()).per_paragraph();
        let pairs: Vec<_> = source.pairs().collect();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "primer párrafo");
        assert_eq!(pairs[1].0, "segundo párrafo");
        assert_eq!(pairs[1].1.get(DOC_ID).unwrap(), "0000002");
    }

    #[test]
    fn test_dir_source_is_restartable() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "doc.txt", "texto");

        let source = DirSource::new(tmp.path());
        let first: Vec<_> = source.pairs().collect();
        let second: Vec<_> = source.pairs().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dir_source_min_line_chars() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "doc.txt", "x\nuna línea suficientemente larga\n");

        let source = DirSource::new(tmp.path()).with_min_line_chars(5);
        let pairs: Vec<_> = source.pairs().collect();
        assert_eq!(pairs[0].0, "una línea suficientemente larga\n");
    }
}
