//! Entity categories and the on-disk collection each one maps to.

use serde::{Deserialize, Serialize};

/// The kind of entity a document holds.
///
/// Every category that owns a collection maps to exactly one sub-directory
/// of the store root. `Reservation` records live inside their flight's
/// document and `Unknown` is a fallback tag; neither has a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Aircraft in the fleet.
    Airplane,
    /// Airports, keyed by ICAO code.
    Airport,
    /// Scheduled flights, keyed by flight number.
    Flight,
    /// Staff accounts, keyed by staff code.
    Staff,
    /// Registered passengers, keyed by generated id.
    Passenger,
    /// Reservations held by a flight.
    Reservation,
    /// Unclassified.
    Unknown,
}

/// Fixed category to directory table.
const COLLECTIONS: &[(Category, &str)] = &[
    (Category::Flight, "flights"),
    (Category::Airplane, "airplane"),
    (Category::Staff, "staff"),
    (Category::Passenger, "passenger"),
    (Category::Airport, "airports"),
];

impl Category {
    /// Categories that own an on-disk collection, in initialization order.
    pub const STORED: [Category; 5] = [
        Category::Flight,
        Category::Airplane,
        Category::Staff,
        Category::Passenger,
        Category::Airport,
    ];

    /// Directory name of this category's collection, if it has one.
    #[must_use]
    pub fn directory(self) -> Option<&'static str> {
        COLLECTIONS
            .iter()
            .find(|(category, _)| *category == self)
            .map(|(_, dir)| *dir)
    }

    /// Whether documents of this category are stored in their own collection.
    #[must_use]
    pub fn has_collection(self) -> bool {
        self.directory().is_some()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Airplane => write!(f, "airplane"),
            Self::Airport => write!(f, "airport"),
            Self::Flight => write!(f, "flight"),
            Self::Staff => write!(f, "staff"),
            Self::Passenger => write!(f, "passenger"),
            Self::Reservation => write!(f, "reservation"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_table() {
        assert_eq!(Category::Flight.directory(), Some("flights"));
        assert_eq!(Category::Airplane.directory(), Some("airplane"));
        assert_eq!(Category::Staff.directory(), Some("staff"));
        assert_eq!(Category::Passenger.directory(), Some("passenger"));
        assert_eq!(Category::Airport.directory(), Some("airports"));
    }

    #[test]
    fn test_categories_without_collection() {
        assert!(Category::Reservation.directory().is_none());
        assert!(Category::Unknown.directory().is_none());
        assert!(!Category::Unknown.has_collection());
    }

    #[test]
    fn test_stored_categories_all_have_collections() {
        for category in Category::STORED {
            assert!(category.has_collection(), "{category} has no collection");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Category::Airplane.to_string(), "airplane");
        assert_eq!(Category::Reservation.to_string(), "reservation");
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Category::Passenger).unwrap();
        assert_eq!(json, "\"passenger\"");
    }
}
