//! In-memory, write-through repositories.
//!
//! A [`Repository`] is the authoritative index for one entity category.
//! Every mutation reaches disk through the shared [`EntityStore`] before
//! memory changes, so a failed write never leaves memory ahead of disk.
//!
//! The map sits behind an [`RwLock`]: reads run concurrently, and every
//! mutation holds the write lock from its uniqueness check to its insert,
//! which keeps concurrent `add` calls from racing on one identifier.

use std::collections::btree_map::Values;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use crate::category::Category;
use crate::codegen::CodeGenerator;
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::event::{self, EventKind};
use crate::storage::{identifier_of, EntityStore};

/// A document that [`Repository::load_all`] left out.
#[derive(Debug)]
pub struct SkippedDocument {
    /// Path of the document.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: Error,
}

/// Outcome of loading one collection.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Number of entities now in memory from this load.
    pub loaded: usize,
    /// Documents that could not be used.
    pub skipped: Vec<SkippedDocument>,
}

impl LoadReport {
    /// Whether every document was loaded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Identifier-keyed index for one entity category.
#[derive(Debug)]
pub struct Repository<T: Entity> {
    store: Arc<EntityStore>,
    items: RwLock<BTreeMap<String, T>>,
}

impl<T: Entity> Repository<T> {
    /// Create an empty repository writing through `store`.
    #[must_use]
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self {
            store,
            items: RwLock::new(BTreeMap::new()),
        }
    }

    /// The category this repository holds.
    #[must_use]
    pub fn category(&self) -> Category {
        T::CATEGORY
    }

    /// The store backing this repository.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    // Memory only changes after disk succeeded and closures work on clones,
    // so a panicking holder cannot leave the map half-updated.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, T>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, T>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate, persist and index a new entity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an invalid entity,
    /// [`Error::DuplicateIdentifier`] if the identifier is taken, or the
    /// store's error if the document cannot be written. Memory is left
    /// untouched on every error.
    pub fn add(&self, entity: T) -> Result<()> {
        entity.validate()?;
        let mut items = self.write();
        self.insert_locked(&mut items, entity)
    }

    /// Build an entity around a freshly generated identifier and add it.
    ///
    /// The identifier is drawn from `codes` until it is unused in this
    /// repository. `build` also sees the current entities, so it can
    /// enforce uniqueness of other fields; the write lock is held
    /// throughout.
    ///
    /// # Errors
    ///
    /// Returns whatever `build` returns, or the errors of [`add`](Self::add).
    pub fn add_generated<F>(&self, codes: &CodeGenerator, build: F) -> Result<T>
    where
        F: FnOnce(String, Values<'_, String, T>) -> Result<T>,
    {
        let mut items = self.write();
        let identifier = codes.generate_unique(|code| items.contains_key(code));
        let entity = build(identifier, items.values())?;
        entity.validate()?;
        self.insert_locked(&mut items, entity.clone())?;
        Ok(entity)
    }

    fn insert_locked(&self, items: &mut BTreeMap<String, T>, entity: T) -> Result<()> {
        let identifier = entity.identifier().to_string();
        if items.contains_key(&identifier) {
            return Err(Error::duplicate(T::CATEGORY, identifier));
        }
        self.store.save(&entity)?;
        items.insert(identifier.clone(), entity);
        event::emit(EventKind::Added, T::CATEGORY, &identifier);
        Ok(())
    }

    /// Look up an entity by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no entity has this identifier.
    pub fn get(&self, identifier: &str) -> Result<T> {
        self.read()
            .get(identifier)
            .cloned()
            .ok_or_else(|| Error::not_found(T::CATEGORY, identifier))
    }

    /// Check whether an identifier is present.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.read().contains_key(identifier)
    }

    /// First entity matching `predicate`, in identifier order.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.read().values().find(|entity| predicate(entity)).cloned()
    }

    /// Replace a stored entity with a new version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the identifier is absent, otherwise the
    /// errors of validation and persistence.
    pub fn update(&self, entity: T) -> Result<()> {
        entity.validate()?;
        let mut items = self.write();
        let identifier = entity.identifier().to_string();
        if !items.contains_key(&identifier) {
            return Err(Error::not_found(T::CATEGORY, identifier));
        }
        self.store.save(&entity)?;
        items.insert(identifier.clone(), entity);
        event::emit(EventKind::Updated, T::CATEGORY, &identifier);
        Ok(())
    }

    /// Apply `change` to a copy of a stored entity, then persist the copy.
    ///
    /// The stored entity is only replaced if `change` succeeds, the result
    /// still validates and keeps its identifier, and the write reaches disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the identifier is absent, whatever
    /// `change` returns, or the errors of validation and persistence.
    pub fn modify<R>(&self, identifier: &str, change: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        let mut items = self.write();
        let mut entity = items
            .get(identifier)
            .cloned()
            .ok_or_else(|| Error::not_found(T::CATEGORY, identifier))?;
        let output = change(&mut entity)?;
        if entity.identifier() != identifier {
            return Err(Error::validation(
                "identifier",
                format!("cannot change from '{identifier}' to '{}'", entity.identifier()),
            ));
        }
        entity.validate()?;
        self.store.save(&entity)?;
        items.insert(identifier.to_string(), entity);
        event::emit(EventKind::Updated, T::CATEGORY, identifier);
        Ok(output)
    }

    /// Delete an entity's document, then drop it from memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] without touching the filesystem if the
    /// identifier is absent, or the store's error if the delete fails, in
    /// which case the entity stays in memory.
    pub fn remove(&self, identifier: &str) -> Result<T> {
        let mut items = self.write();
        if !items.contains_key(identifier) {
            return Err(Error::not_found(T::CATEGORY, identifier));
        }
        self.store.delete(T::CATEGORY, identifier)?;
        let removed = items
            .remove(identifier)
            .ok_or_else(|| Error::internal(format!("{} '{identifier}' vanished under lock", T::CATEGORY)))?;
        event::emit(EventKind::Removed, T::CATEGORY, identifier);
        Ok(removed)
    }

    /// Snapshot of the current identifiers, in sorted order.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Snapshot of the current entities, in identifier order.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.read().values().cloned().collect()
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Read every document of this category into memory.
    ///
    /// Documents that fail to read, decode or validate, or whose file name
    /// does not match their identifier, are skipped with a warning and
    /// reported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateIdentifier`] if a document's identifier is
    /// already in memory. Entities read before the error stay loaded. A
    /// collection that cannot be listed is reported as skipped.
    pub fn load_all(&self) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        let mut items = self.write();

        let dir = self.store.collection_dir(T::CATEGORY)?;
        let listing = match self.store.list_documents(T::CATEGORY) {
            Ok(listing) => listing,
            Err(reason) => {
                warn!(category = %T::CATEGORY, error = %reason, "Cannot list collection");
                report.skipped.push(SkippedDocument { path: dir, reason });
                return Ok(report);
            }
        };

        for path in listing {
            let path = match path {
                Ok(path) => path,
                Err(reason) => {
                    warn!(category = %T::CATEGORY, error = %reason, "Skipping unreadable entry");
                    report.skipped.push(SkippedDocument {
                        path: dir.clone(),
                        reason,
                    });
                    continue;
                }
            };
            match self.decode(&path) {
                Ok(entity) if items.contains_key(entity.identifier()) => {
                    return Err(Error::duplicate(T::CATEGORY, entity.identifier()));
                }
                Ok(entity) => {
                    items.insert(entity.identifier().to_string(), entity);
                    report.loaded += 1;
                }
                Err(reason) => {
                    warn!(path = %path.display(), error = %reason, "Skipping document");
                    report.skipped.push(SkippedDocument { path, reason });
                }
            }
        }

        info!(
            event = EventKind::Loaded.as_str(),
            category = %T::CATEGORY,
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "Loaded {} collection",
            T::CATEGORY
        );
        Ok(report)
    }

    fn decode(&self, path: &std::path::Path) -> Result<T> {
        let entity: T = self.store.load(path)?;
        entity.validate()?;
        let stem = identifier_of(path).unwrap_or_default();
        if stem != entity.identifier() {
            return Err(Error::validation(
                "identifier",
                format!(
                    "document name '{stem}' does not match identifier '{}'",
                    entity.identifier()
                ),
            ));
        }
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Airplane, Airport};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<EntityStore>) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(EntityStore::open(dir.path().join("fms")).unwrap());
        (dir, store)
    }

    fn airplane(registration: &str, capacity: u32) -> Airplane {
        Airplane::new(registration, "Ryanair", capacity, "737-800").unwrap()
    }

    #[test]
    fn test_add_then_get() {
        let (_dir, store) = setup();
        let repo = Repository::<Airplane>::new(store);
        let plane = airplane("EI-ABC", 200);
        repo.add(plane.clone()).unwrap();
        assert_eq!(repo.get("EI-ABC").unwrap(), plane);
        assert_eq!(repo.category(), Category::Airplane);
    }

    #[test]
    fn test_add_persists_document() {
        let (_dir, store) = setup();
        let repo = Repository::<Airplane>::new(Arc::clone(&store));
        repo.add(airplane("EI-ABC", 200)).unwrap();
        assert!(store.exists(Category::Airplane, "EI-ABC").unwrap());
    }

    #[test]
    fn test_duplicate_add_keeps_original() {
        let (_dir, store) = setup();
        let repo = Repository::<Airplane>::new(store);
        repo.add(airplane("EI-ABC", 200)).unwrap();

        let err = repo.add(airplane("EI-ABC", 50)).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get("EI-ABC").unwrap().capacity, 200);
    }

    #[test]
    fn test_invalid_entity_never_inserted() {
        let (_dir, store) = setup();
        let repo = Repository::<Airplane>::new(Arc::clone(&store));
        let mut plane = airplane("EI-ABC", 200);
        plane.capacity = 0;
        assert!(repo.add(plane).is_err());
        assert!(repo.is_empty());
        assert!(!store.exists(Category::Airplane, "EI-ABC").unwrap());
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let (_dir, store) = setup();
        let repo = Repository::<Airport>::new(store);
        let err = repo.get("LPPT").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_remove_deletes_document() {
        let (_dir, store) = setup();
        let repo = Repository::<Airplane>::new(Arc::clone(&store));
        repo.add(airplane("EI-ABC", 200)).unwrap();

        let removed = repo.remove("EI-ABC").unwrap();
        assert_eq!(removed.registration, "EI-ABC");
        assert!(repo.get("EI-ABC").unwrap_err().is_not_found());
        assert!(!store.exists(Category::Airplane, "EI-ABC").unwrap());
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let (_dir, store) = setup();
        let repo = Repository::<Airplane>::new(store);
        assert!(repo.remove("NON-EXISTING").unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_requires_existing() {
        let (_dir, store) = setup();
        let repo = Repository::<Airplane>::new(store);
        assert!(repo.update(airplane("EI-ABC", 200)).unwrap_err().is_not_found());

        repo.add(airplane("EI-ABC", 200)).unwrap();
        repo.update(airplane("EI-ABC", 180)).unwrap();
        assert_eq!(repo.get("EI-ABC").unwrap().capacity, 180);
    }

    #[test]
    fn test_modify_persists_change() {
        let (_dir, store) = setup();
        let repo = Repository::<Airplane>::new(Arc::clone(&store));
        repo.add(airplane("EI-ABC", 200)).unwrap();

        repo.modify("EI-ABC", |plane| {
            plane.toggle_occupied();
            Ok(())
        })
        .unwrap();

        let reloaded = Repository::<Airplane>::new(store);
        reloaded.load_all().unwrap();
        assert!(reloaded.get("EI-ABC").unwrap().is_occupied);
    }

    #[test]
    fn test_failed_modify_leaves_entity() {
        let (_dir, store) = setup();
        let repo = Repository::<Airplane>::new(store);
        repo.add(airplane("EI-ABC", 200)).unwrap();

        let result: Result<()> = repo.modify("EI-ABC", |plane| {
            plane.capacity = 0;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(repo.get("EI-ABC").unwrap().capacity, 200);

        let result: Result<()> = repo.modify("EI-ABC", |plane| {
            plane.registration = "EI-XYZ".to_string();
            Ok(())
        });
        assert!(result.is_err());
        assert!(repo.contains("EI-ABC"));
    }

    #[test]
    fn test_list_and_find() {
        let (_dir, store) = setup();
        let repo = Repository::<Airplane>::new(store);
        repo.add(airplane("EI-DEF", 180)).unwrap();
        repo.add(airplane("EI-ABC", 200)).unwrap();

        assert_eq!(repo.list(), vec!["EI-ABC", "EI-DEF"]);
        let found = repo.find(|plane| plane.capacity == 180).unwrap();
        assert_eq!(found.registration, "EI-DEF");
        assert!(repo.find(|plane| plane.capacity == 1).is_none());
    }

    #[test]
    fn test_load_all_restores_entities() {
        let (_dir, store) = setup();
        Repository::<Airplane>::new(Arc::clone(&store))
            .add(airplane("EI-ABC", 200))
            .unwrap();

        let repo = Repository::<Airplane>::new(store);
        let report = repo.load_all().unwrap();
        assert_eq!(report.loaded, 1);
        assert!(report.is_clean());
        assert_eq!(repo.get("EI-ABC").unwrap().capacity, 200);
    }

    #[test]
    fn test_load_all_skips_bad_documents() {
        let (_dir, store) = setup();
        let repo = Repository::<Airplane>::new(Arc::clone(&store));
        repo.add(airplane("EI-ABC", 200)).unwrap();

        let dir = store.collection_dir(Category::Airplane).unwrap();
        fs::write(dir.join("BROKEN.json"), "{ not json").unwrap();
        fs::write(
            dir.join("ZERO1.json"),
            r#"{"registration":"ZERO1","company":"X","capacity":0,"model":"A320"}"#,
        )
        .unwrap();
        let renamed = fs::read_to_string(dir.join("EI-ABC.json")).unwrap();
        fs::write(dir.join("OTHER.json"), renamed).unwrap();

        let fresh = Repository::<Airplane>::new(store);
        let report = fresh.load_all().unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped.len(), 3);
        assert_eq!(fresh.list(), vec!["EI-ABC"]);
    }

    #[test]
    fn test_load_all_rejects_known_identifier() {
        let (_dir, store) = setup();
        let repo = Repository::<Airplane>::new(store);
        repo.add(airplane("EI-ABC", 200)).unwrap();

        let err = repo.load_all().unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_load_all_missing_collection() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(EntityStore::new(dir.path().join("absent")));
        let repo = Repository::<Airport>::new(store);
        let report = repo.load_all().unwrap();
        assert_eq!(report.loaded, 0);
    }

    #[test]
    fn test_load_all_unlistable_collection_is_skipped() {
        let (_dir, store) = setup();
        let collection = store.collection_dir(Category::Airport).unwrap();
        fs::remove_dir_all(&collection).unwrap();
        fs::write(&collection, "not a directory").unwrap();

        let repo = Repository::<Airport>::new(store);
        let report = repo.load_all().unwrap();
        assert_eq!(report.loaded, 0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, collection);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_add_generated_unique() {
        let (_dir, store) = setup();
        let repo = Repository::<Airport>::new(store);
        let codes = CodeGenerator::seeded(7);
        let airport = repo
            .add_generated(&codes, |code, existing| {
                assert_eq!(existing.count(), 0);
                Airport::new(&code[..4], "OPO", "Generated")
            })
            .unwrap();
        assert!(repo.contains(&airport.icao));
    }
}
