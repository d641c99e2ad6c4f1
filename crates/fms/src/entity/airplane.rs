//! Fleet aircraft.
//!
//! An airplane is keyed by its registration mark and flagged as occupied
//! while a scheduled flight uses it.

use serde::{Deserialize, Serialize};

use super::{require_non_blank, validate_identifier, Entity};
use crate::category::Category;
use crate::error::{Error, Result};

/// Shortest accepted registration mark.
const MIN_REGISTRATION_LEN: usize = 5;

/// Longest accepted registration mark.
const MAX_REGISTRATION_LEN: usize = 10;

/// An aircraft in the fleet, identified by its registration mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airplane {
    /// Registration mark, e.g. `EI-ABC`.
    pub registration: String,
    /// Operating company.
    pub company: String,
    /// Number of passenger seats.
    pub capacity: u32,
    /// Aircraft model, e.g. `Boeing 737-800`.
    pub model: String,
    /// Whether the airplane is assigned to a scheduled flight.
    #[serde(default)]
    pub is_occupied: bool,
}

impl Airplane {
    /// Create a validated, unoccupied airplane.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank company or model, a
    /// registration outside 5 to 10 characters, or zero capacity.
    pub fn new(
        registration: impl Into<String>,
        company: impl Into<String>,
        capacity: u32,
        model: impl Into<String>,
    ) -> Result<Self> {
        let airplane = Self {
            registration: registration.into(),
            company: company.into(),
            capacity,
            model: model.into(),
            is_occupied: false,
        };
        airplane.validate()?;
        Ok(airplane)
    }

    /// Flip the occupied flag.
    pub fn toggle_occupied(&mut self) {
        self.is_occupied = !self.is_occupied;
    }
}

impl Entity for Airplane {
    const CATEGORY: Category = Category::Airplane;

    fn identifier(&self) -> &str {
        &self.registration
    }

    fn validate(&self) -> Result<()> {
        require_non_blank("company", &self.company)?;
        validate_identifier("registration", &self.registration)?;
        let len = self.registration.chars().count();
        if !(MIN_REGISTRATION_LEN..=MAX_REGISTRATION_LEN).contains(&len) {
            return Err(Error::validation(
                "registration",
                format!(
                    "must be between {MIN_REGISTRATION_LEN} and {MAX_REGISTRATION_LEN} characters"
                ),
            ));
        }
        if self.capacity == 0 {
            return Err(Error::validation("capacity", "must be greater than 0"));
        }
        require_non_blank("model", &self.model)
    }
}
