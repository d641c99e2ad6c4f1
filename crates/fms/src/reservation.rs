//! Reservation code assignment.

use std::sync::Arc;

use crate::codegen::CodeGenerator;
use crate::entity::{Flight, PassengerRef, Reservation};
use crate::error::Result;

/// Hands out reservation codes that are unique within one flight.
#[derive(Debug, Clone)]
pub struct ReservationAssigner {
    codes: Arc<CodeGenerator>,
}

impl ReservationAssigner {
    /// Create an assigner drawing codes from `codes`.
    #[must_use]
    pub fn new(codes: Arc<CodeGenerator>) -> Self {
        Self { codes }
    }

    /// Book `passenger` on `flight` under a fresh code and return the code.
    ///
    /// Only the flight value changes; persisting it is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) if the
    /// passenger name is blank.
    pub fn assign(&self, flight: &mut Flight, passenger: PassengerRef) -> Result<String> {
        self.assign_avoiding(flight, passenger, |_| false)
    }

    /// Like [`assign`](Self::assign), but also rejects codes for which
    /// `is_taken` returns `true`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) if the
    /// passenger name is blank.
    pub fn assign_avoiding(
        &self,
        flight: &mut Flight,
        passenger: PassengerRef,
        is_taken: impl Fn(&str) -> bool,
    ) -> Result<String> {
        let code = self
            .codes
            .generate_unique(|code| flight.has_reservation(code) || is_taken(code));
        flight.add_reservation(Reservation {
            code: code.clone(),
            flight_number: flight.number.clone(),
            passenger,
        })?;
        Ok(code)
    }
}
