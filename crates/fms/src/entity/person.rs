//! Staff and passenger accounts.
//!
//! Both kinds of account store their contact details as top-level fields
//! next to a salted password digest. Passengers also keep a summary of each
//! booking they hold.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{keyed_list, require_non_blank, validate_identifier, Entity, PasswordHash};
use super::ReservationSummary;
use crate::category::Category;
use crate::codegen;
use crate::error::{Error, Result};

/// Personal details shared by staff and passengers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Full name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Contact {
    /// Create validated contact details.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name or a malformed email.
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: Option<String>) -> Result<Self> {
        let contact = Self {
            name: name.into(),
            email: email.into().trim().to_string(),
            phone: phone.filter(|p| !p.trim().is_empty()),
        };
        contact.validate()?;
        Ok(contact)
    }

    /// Check name and email.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        validate_contact(&self.name, &self.email)
    }

    /// Case-insensitive email comparison.
    #[must_use]
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

fn validate_contact(name: &str, email: &str) -> Result<()> {
    require_non_blank("name", name)?;
    require_non_blank("email", email)?;
    if !email.contains('@') {
        return Err(Error::validation(
            "email",
            format!("'{email}' is not an email address"),
        ));
    }
    Ok(())
}

/// A staff account, identified by its generated staff code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    /// Six-character staff code.
    pub staff_code: String,
    /// Full name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Salted password digest.
    pub password: PasswordHash,
}

impl Staff {
    /// Create a staff account, hashing `password`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed code, contact or a
    /// blank password.
    pub fn new(staff_code: impl Into<String>, contact: Contact, password: &str) -> Result<Self> {
        let staff = Self {
            staff_code: staff_code.into(),
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            password: PasswordHash::create(password)?,
        };
        staff.validate()?;
        Ok(staff)
    }

    /// Case-insensitive email comparison.
    #[must_use]
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

impl Entity for Staff {
    const CATEGORY: Category = Category::Staff;

    fn identifier(&self) -> &str {
        &self.staff_code
    }

    fn validate(&self) -> Result<()> {
        validate_identifier("staff_code", &self.staff_code)?;
        if !codegen::is_valid_code(&self.staff_code) {
            return Err(Error::validation(
                "staff_code",
                format!("'{}' is not a 6-character [A-Z0-9] code", self.staff_code),
            ));
        }
        validate_contact(&self.name, &self.email)?;
        self.password.validate()
    }
}

/// A registered passenger, identified by a generated id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    /// Six-character passenger id.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Salted password digest.
    pub password: PasswordHash,
    #[serde(default, with = "keyed_list")]
    reservations: BTreeMap<String, ReservationSummary>,
}

impl Passenger {
    /// Create a passenger, hashing `password`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed id, contact or a blank
    /// password.
    pub fn new(id: impl Into<String>, contact: Contact, password: &str) -> Result<Self> {
        let passenger = Self {
            id: id.into(),
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            password: PasswordHash::create(password)?,
            reservations: BTreeMap::new(),
        };
        passenger.validate()?;
        Ok(passenger)
    }

    /// Case-insensitive email comparison.
    #[must_use]
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }

    /// Record a booking. Returns `false` if the code was already recorded.
    pub fn add_reservation(&mut self, summary: ReservationSummary) -> bool {
        if self.reservations.contains_key(&summary.code) {
            return false;
        }
        self.reservations.insert(summary.code.clone(), summary);
        true
    }

    /// Forget a booking.
    pub fn remove_reservation(&mut self, code: &str) -> Option<ReservationSummary> {
        self.reservations.remove(code)
    }

    /// Whether this passenger holds the reservation.
    #[must_use]
    pub fn has_reservation(&self, code: &str) -> bool {
        self.reservations.contains_key(code)
    }

    /// All bookings, ordered by code.
    pub fn reservations(&self) -> impl Iterator<Item = &ReservationSummary> {
        self.reservations.values()
    }
}

impl Entity for Passenger {
    const CATEGORY: Category = Category::Passenger;

    fn identifier(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        validate_identifier("id", &self.id)?;
        if !codegen::is_valid_code(&self.id) {
            return Err(Error::validation(
                "id",
                format!("'{}' is not a 6-character [A-Z0-9] code", self.id),
            ));
        }
        validate_contact(&self.name, &self.email)?;
        self.password.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Contact {
        Contact::new("Ana Silva", "ana@example.com", Some("+351 912 345 678".to_string())).unwrap()
    }

    #[test]
    fn test_contact_validation() {
        assert!(Contact::new("", "ana@example.com", None).is_err());
        assert!(Contact::new("Ana", "", None).is_err());
        assert!(Contact::new("Ana", "not-an-email", None).is_err());
    }

    #[test]
    fn test_contact_drops_blank_phone() {
        let c = Contact::new("Ana", "ana@example.com", Some("  ".to_string())).unwrap();
        assert!(c.phone.is_none());
    }

    #[test]
    fn test_has_email_ignores_case() {
        assert!(contact().has_email(" ANA@example.com "));
        assert!(!contact().has_email("rui@example.com"));
    }

    #[test]
    fn test_new_staff() {
        let staff = Staff::new("ST0001", contact(), "hunter2").unwrap();
        assert_eq!(staff.identifier(), "ST0001");
        assert_eq!(staff.category(), Category::Staff);
        assert!(staff.password.verify("hunter2"));
    }

    #[test]
    fn test_staff_rejects_bad_code() {
        assert!(Staff::new("st-1", contact(), "hunter2").is_err());
        assert!(Staff::new("ST0001", contact(), " ").is_err());
    }

    #[test]
    fn test_staff_json_is_flat() {
        let staff = Staff::new("ST0001", contact(), "hunter2").unwrap();
        let json = staff.to_json().unwrap();
        assert!(json.contains("\"email\": \"ana@example.com\""));
        let decoded = Staff::from_json(&json).unwrap();
        assert_eq!(decoded, staff);
    }

    #[test]
    fn test_staff_code_key_ignores_case() {
        let password = PasswordHash::create("hunter2").unwrap();
        let json = format!(
            r#"{{"STAFFCODE": "ST0001", "NAME": "Ana Silva", "Email": "ana@example.com", "PASSWORD": "{}"}}"#,
            password.as_str()
        );
        let staff = Staff::from_json(&json).unwrap();
        assert_eq!(staff.staff_code, "ST0001");
        assert_eq!(staff.name, "Ana Silva");
        assert!(staff.phone.is_none());
        assert!(staff.password.verify("hunter2"));
    }

    #[test]
    fn test_passenger_has_email() {
        let passenger = Passenger::new("PA0001", contact(), "pw").unwrap();
        assert!(passenger.has_email("ANA@EXAMPLE.COM"));
    }

    #[test]
    fn test_passenger_reservations() {
        let mut passenger = Passenger::new("PA0001", contact(), "pw").unwrap();
        let summary = ReservationSummary {
            code: "AB12CD".to_string(),
            flight_number: "FR1234".to_string(),
        };
        assert!(passenger.add_reservation(summary.clone()));
        assert!(!passenger.add_reservation(summary));
        assert!(passenger.has_reservation("AB12CD"));
        assert_eq!(passenger.reservations().count(), 1);
        assert!(passenger.remove_reservation("AB12CD").is_some());
        assert!(!passenger.has_reservation("AB12CD"));
    }

    #[test]
    fn test_passenger_json_round_trip() {
        let mut passenger = Passenger::new("PA0001", contact(), "pw").unwrap();
        passenger.add_reservation(ReservationSummary {
            code: "AB12CD".to_string(),
            flight_number: "FR1234".to_string(),
        });
        let decoded = Passenger::from_json(&passenger.to_json().unwrap()).unwrap();
        assert_eq!(decoded, passenger);
    }
}
