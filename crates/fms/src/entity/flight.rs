//! Scheduled flights.
//!
//! A flight links an origin and destination airport to one airplane and
//! owns the reservations made on it, keyed by reservation code. On disk the
//! reservations are stored as a JSON array.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{keyed_list, validate_identifier, Entity, Reservation};
use crate::category::Category;
use crate::error::{Error, Result};

/// Input for scheduling a flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightDraft {
    /// Flight number, e.g. `FR1234`.
    pub number: String,
    /// ICAO code of the departure airport.
    pub origin: String,
    /// ICAO code of the arrival airport.
    pub destination: String,
    /// Registration of the assigned airplane.
    pub airplane: String,
    /// Scheduled departure.
    pub scheduled_at: DateTime<Utc>,
}

/// A scheduled flight and the reservations it holds.
///
/// Airports and the airplane are referenced by identifier; the flight
/// document never embeds copies of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    /// Flight number.
    pub number: String,
    /// ICAO code of the departure airport.
    pub origin: String,
    /// ICAO code of the arrival airport.
    pub destination: String,
    /// Registration of the assigned airplane.
    pub airplane: String,
    /// Scheduled departure.
    #[serde(alias = "scheduled_date_time")]
    pub scheduled_at: DateTime<Utc>,
    #[serde(default, with = "keyed_list", alias = "passengers_reservations")]
    reservations: BTreeMap<String, Reservation>,
}

impl Flight {
    /// Create a validated flight with no reservations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for blank references or when origin
    /// and destination are the same airport.
    pub fn new(draft: FlightDraft) -> Result<Self> {
        let flight = Self {
            number: draft.number,
            origin: draft.origin,
            destination: draft.destination,
            airplane: draft.airplane,
            scheduled_at: draft.scheduled_at,
            reservations: BTreeMap::new(),
        };
        flight.validate()?;
        Ok(flight)
    }

    /// Whether a reservation with this code exists.
    #[must_use]
    pub fn has_reservation(&self, code: &str) -> bool {
        self.reservations.contains_key(code)
    }

    /// Look up a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no reservation has this code.
    pub fn reservation(&self, code: &str) -> Result<&Reservation> {
        self.reservations
            .get(code)
            .ok_or_else(|| Error::not_found(Category::Reservation, code))
    }

    /// Insert a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateIdentifier`] if the code is taken, or
    /// [`Error::Validation`] if the reservation is malformed or names a
    /// different flight.
    pub fn add_reservation(&mut self, reservation: Reservation) -> Result<()> {
        reservation.validate()?;
        if reservation.flight_number != self.number {
            return Err(Error::validation(
                "flight_number",
                format!(
                    "reservation {} belongs to flight {}, not {}",
                    reservation.code, reservation.flight_number, self.number
                ),
            ));
        }
        if self.has_reservation(&reservation.code) {
            return Err(Error::duplicate(Category::Reservation, reservation.code));
        }
        self.reservations
            .insert(reservation.code.clone(), reservation);
        Ok(())
    }

    /// Remove and return a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no reservation has this code.
    pub fn remove_reservation(&mut self, code: &str) -> Result<Reservation> {
        self.reservations
            .remove(code)
            .ok_or_else(|| Error::not_found(Category::Reservation, code))
    }

    /// All reservations, ordered by code.
    pub fn reservations(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.values()
    }

    /// Number of reservations held.
    #[must_use]
    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }
}

impl Entity for Flight {
    const CATEGORY: Category = Category::Flight;

    fn identifier(&self) -> &str {
        &self.number
    }

    fn validate(&self) -> Result<()> {
        validate_identifier("number", &self.number)?;
        validate_identifier("origin", &self.origin)?;
        validate_identifier("destination", &self.destination)?;
        validate_identifier("airplane", &self.airplane)?;
        if self.origin == self.destination {
            return Err(Error::validation(
                "destination",
                "must differ from the origin airport",
            ));
        }
        for (code, reservation) in &self.reservations {
            reservation.validate()?;
            if code != &reservation.code || reservation.flight_number != self.number {
                return Err(Error::validation(
                    "reservations",
                    format!("reservation {code} is filed under the wrong key or flight"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::PassengerRef;
    use chrono::TimeZone;

    fn draft() -> FlightDraft {
        FlightDraft {
            number: "FR1234".to_string(),
            origin: "LPPT".to_string(),
            destination: "EIDW".to_string(),
            airplane: "EI-ABC".to_string(),
            scheduled_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap(),
        }
    }

    fn reservation(code: &str) -> Reservation {
        Reservation {
            code: code.to_string(),
            flight_number: "FR1234".to_string(),
            passenger: PassengerRef::walk_in("Ana Silva"),
        }
    }

    #[test]
    fn test_new_flight() {
        let flight = Flight::new(draft()).unwrap();
        assert_eq!(flight.identifier(), "FR1234");
        assert_eq!(flight.category(), Category::Flight);
        assert_eq!(flight.reservation_count(), 0);
    }

    #[test]
    fn test_rejects_blank_number() {
        let mut d = draft();
        d.number = "  ".to_string();
        assert!(Flight::new(d).is_err());
    }

    #[test]
    fn test_rejects_same_origin_and_destination() {
        let mut d = draft();
        d.destination = "LPPT".to_string();
        let err = Flight::new(d).unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn test_add_and_get_reservation() {
        let mut flight = Flight::new(draft()).unwrap();
        flight.add_reservation(reservation("AB12CD")).unwrap();

        assert!(flight.has_reservation("AB12CD"));
        assert_eq!(
            flight.reservation("AB12CD").unwrap().passenger.name,
            "Ana Silva"
        );
    }

    #[test]
    fn test_duplicate_reservation_code_rejected() {
        let mut flight = Flight::new(draft()).unwrap();
        flight.add_reservation(reservation("AB12CD")).unwrap();

        let err = flight.add_reservation(reservation("AB12CD")).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(flight.reservation_count(), 1);
    }

    #[test]
    fn test_reservation_for_other_flight_rejected() {
        let mut flight = Flight::new(draft()).unwrap();
        let mut res = reservation("AB12CD");
        res.flight_number = "FR9999".to_string();
        assert!(flight.add_reservation(res).is_err());
    }

    #[test]
    fn test_missing_reservation_not_found() {
        let mut flight = Flight::new(draft()).unwrap();
        assert!(flight.reservation("NOPE00").unwrap_err().is_not_found());
        assert!(flight.remove_reservation("NOPE00").unwrap_err().is_not_found());
    }

    #[test]
    fn test_remove_reservation() {
        let mut flight = Flight::new(draft()).unwrap();
        flight.add_reservation(reservation("AB12CD")).unwrap();
        let removed = flight.remove_reservation("AB12CD").unwrap();
        assert_eq!(removed.code, "AB12CD");
        assert!(!flight.has_reservation("AB12CD"));
    }

    #[test]
    fn test_json_round_trip_with_reservations() {
        let mut flight = Flight::new(draft()).unwrap();
        flight.add_reservation(reservation("AB12CD")).unwrap();
        flight.add_reservation(reservation("ZX98YW")).unwrap();

        let json = flight.to_json().unwrap();
        let decoded = Flight::from_json(&json).unwrap();
        assert_eq!(decoded, flight);
        assert!(decoded.validate().is_ok());
    }

    #[test]
    fn test_decode_rejects_duplicate_codes_in_document() {
        let json = r#"{
            "number": "FR1234",
            "origin": "LPPT",
            "destination": "EIDW",
            "airplane": "EI-ABC",
            "scheduled_at": "2025-03-14T09:30:00Z",
            "reservations": [
                {"code": "AB12CD", "flight_number": "FR1234", "passenger": {"name": "A"}},
                {"code": "AB12CD", "flight_number": "FR1234", "passenger": {"name": "B"}}
            ]
        }"#;
        assert!(Flight::from_json(json).is_err());
    }
}
