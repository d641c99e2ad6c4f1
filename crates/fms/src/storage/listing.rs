//! Lazy listing of a collection's documents.

use std::fs::ReadDir;
use std::path::{Path, PathBuf};

use super::DOCUMENT_EXTENSION;
use crate::error::{Error, Result};

/// Iterator over the `*.json` documents of one collection directory.
///
/// Backed by a live directory handle, so it reflects whatever is on disk
/// as it is consumed. Other files are skipped.
#[derive(Debug)]
pub struct DocumentPaths {
    dir: PathBuf,
    entries: Option<ReadDir>,
}

impl DocumentPaths {
    pub(super) fn new(dir: PathBuf, entries: Option<ReadDir>) -> Self {
        Self { dir, entries }
    }

    /// The directory being listed.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Iterator for DocumentPaths {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries.as_mut()?;
        for entry in entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => return Some(Err(Error::storage_io(&self.dir, source))),
            };
            let path = entry.path();
            let is_document = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
            if is_document && path.is_file() {
                return Some(Ok(path));
            }
        }
        None
    }
}

/// The identifier a document path encodes (its file stem).
#[must_use]
pub fn identifier_of(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}
