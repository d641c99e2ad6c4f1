//! Structured events for mutating operations.
//!
//! Every mutation emits exactly one `tracing` event at INFO level carrying
//! `event`, `category` and `identifier` fields. Formatting is left to the
//! installed subscriber.

use crate::category::Category;

/// What happened to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// An entity was added to its repository.
    Added,
    /// A stored entity was replaced.
    Updated,
    /// An entity was removed along with its document.
    Removed,
    /// A reservation code was assigned on a flight.
    Reserved,
    /// A reservation was cancelled.
    ReservationCancelled,
    /// A repository finished loading its collection.
    Loaded,
}

impl EventKind {
    /// Stable name used as the `event` field value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Removed => "removed",
            Self::Reserved => "reserved",
            Self::ReservationCancelled => "reservation_cancelled",
            Self::Loaded => "loaded",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emit one mutation event.
pub fn emit(kind: EventKind, category: Category, identifier: &str) {
    tracing::info!(
        event = kind.as_str(),
        category = %category,
        identifier = identifier,
        "{} {} {}",
        category,
        identifier,
        kind
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(EventKind::Added.as_str(), "added");
        assert_eq!(EventKind::Removed.to_string(), "removed");
        assert_eq!(
            EventKind::ReservationCancelled.as_str(),
            "reservation_cancelled"
        );
    }

    #[test]
    fn test_emit_without_subscriber() {
        emit(EventKind::Added, Category::Airplane, "EI-ABC");
    }
}
