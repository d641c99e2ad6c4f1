//! Reservations and the passenger references they hold.

use serde::{Deserialize, Serialize};

use super::{require_non_blank, Keyed};
use crate::codegen;
use crate::error::{Error, Result};

/// Who a reservation is for.
///
/// Walk-in bookings carry only a name; bookings made by a registered
/// passenger also carry the passenger id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerRef {
    /// Passenger display name.
    pub name: String,
    /// Id of the registered passenger, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_id: Option<String>,
}

impl PassengerRef {
    /// Reference to an unregistered passenger.
    #[must_use]
    pub fn walk_in(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passenger_id: None,
        }
    }

    /// Reference to a registered passenger.
    #[must_use]
    pub fn registered(name: impl Into<String>, passenger_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passenger_id: Some(passenger_id.into()),
        }
    }
}

/// A seat booking, owned by the flight it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Six-character code, unique within the flight.
    pub code: String,
    /// Number of the owning flight.
    pub flight_number: String,
    /// The booked passenger.
    pub passenger: PassengerRef,
}

impl Reservation {
    /// Check the code format and that a passenger name is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] on a malformed code or blank name.
    pub fn validate(&self) -> Result<()> {
        if !codegen::is_valid_code(&self.code) {
            return Err(Error::validation(
                "reservation_code",
                format!("'{}' is not a 6-character [A-Z0-9] code", self.code),
            ));
        }
        require_non_blank("passenger_name", &self.passenger.name)
    }

    /// The passenger-side view of this reservation.
    #[must_use]
    pub fn summary(&self) -> ReservationSummary {
        ReservationSummary {
            code: self.code.clone(),
            flight_number: self.flight_number.clone(),
        }
    }
}

impl Keyed for Reservation {
    fn key(&self) -> &str {
        &self.code
    }
}

/// What a passenger document keeps about each of its bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationSummary {
    /// Reservation code.
    pub code: String,
    /// Flight holding the reservation.
    pub flight_number: String,
}

impl Keyed for ReservationSummary {
    fn key(&self) -> &str {
        &self.code
    }
}
