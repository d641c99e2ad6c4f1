//! Random passenger names for filling flights.
//!
//! Names come from the store's two newline-delimited lists (first names and
//! surnames); each generated passenger is one of each, picked uniformly.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};
use crate::storage::EntityStore;

/// First names and surnames to combine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
    surnames: Vec<String>,
}

impl Roster {
    /// Build a roster from explicit lists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either list is empty.
    pub fn new(names: Vec<String>, surnames: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::validation("names", "list contains no names"));
        }
        if surnames.is_empty() {
            return Err(Error::validation("surnames", "list contains no surnames"));
        }
        Ok(Self { names, surnames })
    }

    /// Read both lists through the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentNotFound`] if a list file is missing, or
    /// [`Error::Validation`] if one is empty.
    pub fn from_store(store: &EntityStore) -> Result<Self> {
        Self::new(store.names()?, store.surnames()?)
    }

    /// Number of distinct name combinations.
    #[must_use]
    pub fn combinations(&self) -> usize {
        self.names.len() * self.surnames.len()
    }

    /// One random full name.
    #[must_use]
    pub fn random_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        // Both lists are non-empty by construction.
        let name = self.names.choose(rng).map_or("", String::as_str);
        let surname = self.surnames.choose(rng).map_or("", String::as_str);
        format!("{name} {surname}")
    }

    /// `count` random full names; repeats are possible.
    pub fn random_names<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<String> {
        (0..count).map(|_| self.random_name(rng)).collect()
    }
}

/// How many passengers to generate for a flight with `seats` free seats.
///
/// Picks uniformly from `minimum..=seats`, or fills every seat when fewer
/// than `minimum` are free.
pub fn random_headcount<R: Rng + ?Sized>(seats: usize, minimum: usize, rng: &mut R) -> usize {
    if seats <= minimum {
        seats
    } else {
        rng.gen_range(minimum..=seats)
    }
}
