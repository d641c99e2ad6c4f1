//! Domain entities persisted by the store.
//!
//! The set of storable entities is closed: [`Entity`] is sealed and only
//! the variants in this module implement it. Each one reports its
//! [`Category`], a stable identifier and a validation routine.
//!
//! Construction goes through validating constructors (`Airplane::new`,
//! `Flight::new`, ...). Documents read back from disk are decoded raw and
//! validated again when they are handed to a repository, so a hand-edited
//! file cannot smuggle an invalid entity into memory.

mod airplane;
mod airport;
mod flight;
mod password;
mod person;
mod reservation;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use airplane::Airplane;
pub use airport::Airport;
pub use flight::{Flight, FlightDraft};
pub use password::PasswordHash;
pub use person::{Contact, Passenger, Staff};
pub use reservation::{PassengerRef, Reservation, ReservationSummary};

use crate::category::Category;
use crate::codec;
use crate::error::{Error, Result};

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Airplane {}
    impl Sealed for super::Airport {}
    impl Sealed for super::Flight {}
    impl Sealed for super::Staff {}
    impl Sealed for super::Passenger {}
}

/// An entity that can be stored as one JSON document.
pub trait Entity:
    sealed::Sealed + Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync + 'static
{
    /// The category selecting this entity's collection.
    const CATEGORY: Category;

    /// Identifier unique within the category; also the document file stem.
    fn identifier(&self) -> &str;

    /// Check every invariant the entity must hold inside a repository.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    fn validate(&self) -> Result<()>;

    /// The category of this entity.
    fn category(&self) -> Category {
        Self::CATEGORY
    }

    /// Short human label, e.g. `airplane EI-ABC`.
    fn label(&self) -> String {
        format!("{} {}", Self::CATEGORY, self.identifier())
    }

    /// Serialize to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails.
    fn to_json(&self) -> Result<String> {
        codec::encode(self, &self.label())
    }

    /// Decode a document without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the text does not decode.
    fn from_json(json: &str) -> Result<Self> {
        codec::decode(json, &Self::CATEGORY.to_string())
    }
}

/// Reject empty or whitespace-only values.
pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "cannot be empty or whitespace"));
    }
    Ok(())
}

/// Identifiers name files, so on top of being non-blank they must not be
/// able to escape their collection directory.
pub(crate) fn validate_identifier(field: &'static str, value: &str) -> Result<()> {
    require_non_blank(field, value)?;
    if value != value.trim() {
        return Err(Error::validation(
            field,
            "cannot have leading or trailing whitespace",
        ));
    }
    if value.starts_with('.') || value.contains(['/', '\\', '\0']) {
        return Err(Error::validation(
            field,
            format!("'{value}' is not usable as a document name"),
        ));
    }
    Ok(())
}

/// Records stored in a keyed collection inside another document.
pub(crate) trait Keyed {
    fn key(&self) -> &str;
}

/// Serialize a `BTreeMap<String, V>` as a JSON array of its values and
/// rebuild the map from each value's own key. Keeping data-derived strings
/// out of object keys lets the codec normalize key case safely.
pub(crate) mod keyed_list {
    use std::collections::BTreeMap;

    use serde::de::{self, DeserializeOwned, Deserializer};
    use serde::ser::Serializer;
    use serde::{Deserialize, Serialize};

    use super::Keyed;

    pub fn serialize<V, S>(map: &BTreeMap<String, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
    where
        V: Keyed + DeserializeOwned,
        D: Deserializer<'de>,
    {
        let items = Vec::<V>::deserialize(deserializer)?;
        let mut map = BTreeMap::new();
        for item in items {
            let key = item.key().to_string();
            if map.insert(key.clone(), item).is_some() {
                return Err(de::Error::custom(format!("duplicate key '{key}'")));
            }
        }
        Ok(map)
    }
}
