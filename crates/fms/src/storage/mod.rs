//! Storage layer for fms.
//!
//! [`EntityStore`] owns the on-disk layout: a root directory holding one
//! sub-directory per stored [`Category`], each containing one
//! `<identifier>.json` document per entity. All filesystem access for
//! entities goes through it.
//!
//! ```text
//! {root}/
//!   airplane/EI-ABC.json
//!   airports/LPPT.json
//!   flights/FR1234.json
//!   passenger/QW12ER.json
//!   staff/ST0001.json
//! ```

mod listing;

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::category::Category;
use crate::entity::Entity;
use crate::error::{Error, Result};

pub use listing::{identifier_of, DocumentPaths};

/// Extension of every stored document.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Default name-list file names, relative to the working directory.
const DEFAULT_NAMES_FILE: &str = "names.txt";
const DEFAULT_SURNAMES_FILE: &str = "surnames.txt";

/// Filesystem-backed document store.
#[derive(Debug, Clone)]
pub struct EntityStore {
    /// Root directory of every collection.
    root: PathBuf,
    /// Newline-delimited first names for generated passengers.
    names_file: PathBuf,
    /// Newline-delimited surnames for generated passengers.
    surnames_file: PathBuf,
}

impl EntityStore {
    /// Create a store rooted at `root` without touching the filesystem.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            names_file: PathBuf::from(DEFAULT_NAMES_FILE),
            surnames_file: PathBuf::from(DEFAULT_SURNAMES_FILE),
        }
    }

    /// Create a store and initialize its directory layout.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let store = Self::new(root);
        store.initialize()?;
        Ok(store)
    }

    /// Use the given name-list files for [`names`](Self::names) and
    /// [`surnames`](Self::surnames).
    #[must_use]
    pub fn with_name_lists(mut self, names: impl Into<PathBuf>, surnames: impl Into<PathBuf>) -> Self {
        self.names_file = names.into();
        self.surnames_file = surnames.into();
        self
    }

    /// Get the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the root and every collection directory exist.
    ///
    /// Idempotent; existing documents are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] if a directory cannot be created.
    pub fn initialize(&self) -> Result<()> {
        ensure_dir(&self.root)?;
        for category in Category::STORED {
            ensure_dir(&self.collection_dir(category)?)?;
        }
        debug!("Store initialized at {}", self.root.display());
        Ok(())
    }

    /// Directory holding `category`'s documents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCollection`] for categories without a collection.
    pub fn collection_dir(&self, category: Category) -> Result<PathBuf> {
        category
            .directory()
            .map(|dir| self.root.join(dir))
            .ok_or(Error::NoCollection { category })
    }

    /// Path of the document for `identifier` in `category`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCollection`] for categories without a collection
    /// and [`Error::Validation`] for identifiers that cannot name a file.
    pub fn document_path(&self, category: Category, identifier: &str) -> Result<PathBuf> {
        crate::entity::validate_identifier("identifier", identifier)?;
        Ok(self
            .collection_dir(category)?
            .join(format!("{identifier}.{DOCUMENT_EXTENSION}")))
    }

    /// Replace the document for `identifier` with `json`.
    ///
    /// Creates the collection directory and the file as needed. A failed
    /// write is not rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] or [`Error::StorageIo`] on
    /// filesystem failure.
    pub fn write(&self, category: Category, identifier: &str, json: &str) -> Result<PathBuf> {
        let path = self.document_path(category, identifier)?;
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        fs::write(&path, json).map_err(|source| Error::storage_io(&path, source))?;
        debug!("Wrote {} bytes to {}", json.len(), path.display());
        Ok(path)
    }

    /// Read a whole document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentNotFound`] if the path does not exist and
    /// [`Error::StorageIo`] for any other failure.
    pub fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|source| match source.kind() {
            IoErrorKind::NotFound => Error::DocumentNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::storage_io(path, source),
        })
    }

    /// Delete the document for `identifier`.
    ///
    /// Returns `true` if a file was removed, `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageIo`] if an existing file cannot be removed.
    pub fn delete(&self, category: Category, identifier: &str) -> Result<bool> {
        let path = self.document_path(category, identifier)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted {}", path.display());
                Ok(true)
            }
            Err(source) if source.kind() == IoErrorKind::NotFound => Ok(false),
            Err(source) => Err(Error::storage_io(path, source)),
        }
    }

    /// Whether a document for `identifier` exists.
    ///
    /// # Errors
    ///
    /// Same routing errors as [`document_path`](Self::document_path).
    pub fn exists(&self, category: Category, identifier: &str) -> Result<bool> {
        Ok(self.document_path(category, identifier)?.is_file())
    }

    /// Lazily list the documents in `category`'s collection.
    ///
    /// Each call starts a fresh listing. A missing collection directory
    /// lists as empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageIo`] if the directory exists but cannot be read.
    pub fn list_documents(&self, category: Category) -> Result<DocumentPaths> {
        let dir = self.collection_dir(category)?;
        match fs::read_dir(&dir) {
            Ok(entries) => Ok(DocumentPaths::new(dir, Some(entries))),
            Err(source) if source.kind() == IoErrorKind::NotFound => {
                Ok(DocumentPaths::new(dir, None))
            }
            Err(source) => Err(Error::storage_io(dir, source)),
        }
    }

    /// Persist an entity under its category and identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails, otherwise the
    /// errors of [`write`](Self::write).
    pub fn save<E: Entity>(&self, entity: &E) -> Result<PathBuf> {
        let json = entity.to_json()?;
        self.write(entity.category(), entity.identifier(), &json)
    }

    /// Read and decode one document without validating it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`read`](Self::read) or
    /// [`Error::Serialization`] if decoding fails.
    pub fn load<E: Entity>(&self, path: &Path) -> Result<E> {
        let json = self.read(path)?;
        E::from_json(&json).map_err(|err| match err {
            Error::Serialization { source, .. } => {
                Error::serialization(path.display().to_string(), source)
            }
            other => other,
        })
    }

    /// First names used to generate passengers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentNotFound`] if the file is missing.
    pub fn names(&self) -> Result<Vec<String>> {
        self.read_lines(&self.names_file)
    }

    /// Surnames used to generate passengers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentNotFound`] if the file is missing.
    pub fn surnames(&self) -> Result<Vec<String>> {
        self.read_lines(&self.surnames_file)
    }

    /// Count documents per stored category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageIo`] if a collection cannot be listed.
    pub fn stats(&self) -> Result<StoreStats> {
        let mut documents = Vec::with_capacity(Category::STORED.len());
        for category in Category::STORED {
            let count = self
                .list_documents(category)?
                .collect::<Result<Vec<_>>>()?
                .len();
            documents.push((category, count));
        }
        Ok(StoreStats {
            root: self.root.clone(),
            documents,
        })
    }

    fn read_lines(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self
            .read(path)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Document counts for a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Root directory of the store.
    pub root: PathBuf,
    /// Number of documents in each stored category.
    pub documents: Vec<(Category, usize)>,
}

impl StoreStats {
    /// Total number of documents.
    #[must_use]
    pub fn total(&self) -> usize {
        self.documents.iter().map(|(_, n)| n).sum()
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|source| Error::DirectoryCreate {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
