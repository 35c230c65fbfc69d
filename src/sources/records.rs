//! Tabular and record-based document sources.
//!
//! [`CsvSource`] reads rows of delimited files; [`JsonlSource`] reads
//! pre-parsed records, one JSON object per line. Both copy a configured set
//! of columns/fields into document metadata and skip unusable rows with a
//! logged warning.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::preprocess::drop_short_lines;
use crate::sources::{dir_paths, TextSource};
use crate::types::Metadata;

/// Rows of CSV files in a directory, one document per row.
///
/// The `text_col` column supplies the document text; each column named in
/// `meta_cols` is copied into metadata under its own name. Rows with an
/// empty text cell are skipped. For the assembler to accept the documents,
/// `meta_cols` must include (or the rows must carry) the `doc_id` column.
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
    text_col: String,
    meta_cols: Vec<String>,
    recursive: bool,
    exts: Vec<String>,
    min_line_chars: usize,
    delimiter: u8,
}

impl CsvSource {
    pub fn new<S: Into<String>>(
        dir: impl Into<PathBuf>,
        text_col: impl Into<String>,
        meta_cols: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            dir: dir.into(),
            text_col: text_col.into(),
            meta_cols: meta_cols.into_iter().map(Into::into).collect(),
            recursive: false,
            exts: vec!["csv".to_string()],
            min_line_chars: 0,
            delimiter: b',',
        }
    }

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

    /// Use a non-comma field delimiter (e.g. `b';'` or `b'\t'`).
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Drop text lines with `chars` characters or fewer.
    pub fn with_min_line_chars(mut self, chars: usize) -> Self {
        self.min_line_chars = chars;
        self
    }

    fn read_rows(&self, path: &Path, out: &mut Vec<(String, Metadata)>) {
        let mut reader = match csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .from_path(path)
        {
            Ok(reader) => reader,
            Err(err) => {
                warn!(file = %path.display(), %err, "cannot open csv, skipping");
                return;
            }
        };

        let headers = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(err) => {
                warn!(file = %path.display(), %err, "cannot read csv headers, skipping");
                return;
            }
        };
        let Some(text_idx) = headers.iter().position(|h| h == self.text_col) else {
            warn!(file = %path.display(), col = %self.text_col, "text column absent, skipping file");
            return;
        };
        let meta_idx: Vec<(usize, &str)> = self
            .meta_cols
            .iter()
            .filter_map(|col| {
                headers
                    .iter()
                    .position(|h| h == col)
                    .map(|i| (i, col.as_str()))
            })
            .collect();

        for (row_no, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    warn!(file = %path.display(), row = row_no, %err, "bad csv row, skipping");
                    continue;
                }
            };
            let Some(text) = record.get(text_idx).filter(|t| !t.is_empty()) else {
                continue;
            };
            let text = if self.min_line_chars > 0 {
                drop_short_lines(text, self.min_line_chars)
            } else {
                text.to_string()
            };
            let mut meta = Metadata::new();
            for (idx, name) in &meta_idx {
                if let Some(value) = record.get(*idx) {
                    meta.insert((*name).to_string(), value.to_string());
                }
            }
            out.push((text, meta));
        }
    }
}

impl TextSource for CsvSource {
    fn pairs(&self) -> Box<dyn Iterator<Item = (String, Metadata)> + '_> {
        let mut out = Vec::new();
        for path in dir_paths(&self.dir, self.recursive, &self.exts) {
            self.read_rows(&path, &mut out);
        }
        Box::new(out.into_iter())
    }
}

/// One pre-parsed record, as persisted to JSONL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonlRecord {
    pub text: String,
    #[serde(default)]
    pub meta: Metadata,
}

/// Pre-parsed records stored as JSON Lines, one object per line.
///
/// Malformed lines are skipped individually with a logged warning; the
/// surrounding read continues.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    path: PathBuf,
}

impl JsonlSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TextSource for JsonlSource {
    fn pairs(&self) -> Box<dyn Iterator<Item = (String, Metadata)> + '_> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(file = %self.path.display(), %err, "cannot read jsonl, skipping");
                return Box::new(std::iter::empty());
            }
        };
        let mut out = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<JsonlRecord>(line) {
                Ok(record) => out.push((record.text, record.meta)),
                Err(err) => {
                    warn!(file = %self.path.display(), line = line_no, %err, "bad jsonl record, skipping");
                }
            }
        }
        Box::new(out.into_iter())
    }
}

/// Persist records as JSON Lines. Returns the number written.
pub fn write_jsonl<'a, I>(path: &Path, records: I) -> crate::error::Result<usize>
where
    I: IntoIterator<Item = &'a JsonlRecord>,
{
    use std::io::Write;

    let mut file = fs::File::create(path).map_err(|e| crate::error::CorpusError::io(path.display().to_string(), e))?;
    let mut n = 0;
    for record in records {
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}").map_err(|e| crate::error::CorpusError::io(path.display().to_string(), e))?;
        n += 1;
    }
    Ok(n)
}
