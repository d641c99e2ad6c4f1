//! Email and password sessions for staff and passengers.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::entity::{Entity, Passenger, Staff};
use crate::error::{Error, Result};
use crate::repository::Repository;

/// Who is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Principal {
    /// A staff member.
    Staff,
    /// A registered passenger.
    Passenger,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Kind of account.
    pub principal: Principal,
    /// Staff code or passenger id.
    pub identifier: String,
    /// Display name.
    pub name: String,
    /// When the session started.
    pub created_at: DateTime<Utc>,
}

/// Validates credentials against the staff and passenger repositories and
/// holds at most one active session.
#[derive(Debug)]
pub struct SessionAuthenticator {
    staff: Arc<Repository<Staff>>,
    passengers: Arc<Repository<Passenger>>,
    current: RwLock<Option<Session>>,
}

impl SessionAuthenticator {
    /// Create an authenticator with no active session.
    #[must_use]
    pub fn new(staff: Arc<Repository<Staff>>, passengers: Arc<Repository<Passenger>>) -> Self {
        Self {
            staff,
            passengers,
            current: RwLock::new(None),
        }
    }

    /// Log in a staff member, replacing any active session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`] if no staff member has this
    /// email or the password does not match.
    pub fn login_staff(&self, email: &str, password: &str) -> Result<Session> {
        let staff = self
            .staff
            .find(|staff| staff.has_email(email))
            .filter(|staff| staff.password.verify(password))
            .ok_or(Error::InvalidCredentials)?;
        Ok(self.start(Principal::Staff, staff.identifier(), &staff.name))
    }

    /// Log in a passenger, replacing any active session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`] if no passenger has this email
    /// or the password does not match.
    pub fn login_passenger(&self, email: &str, password: &str) -> Result<Session> {
        let passenger = self
            .passengers
            .find(|passenger| passenger.has_email(email))
            .filter(|passenger| passenger.password.verify(password))
            .ok_or(Error::InvalidCredentials)?;
        Ok(self.start(
            Principal::Passenger,
            passenger.identifier(),
            &passenger.name,
        ))
    }

    fn start(&self, principal: Principal, identifier: &str, name: &str) -> Session {
        let session = Session {
            principal,
            identifier: identifier.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        info!(principal = ?principal, identifier = identifier, "Session started");
        session
    }

    /// End the active session, returning it.
    pub fn logout(&self) -> Option<Session> {
        let ended = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = &ended {
            debug!(identifier = %session.identifier, "Session ended");
        }
        ended
    }

    /// The active session, if any.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether someone is logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    /// The active session, provided it belongs to staff.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] if nobody is logged in or the
    /// session belongs to a passenger.
    pub fn require_staff(&self) -> Result<Session> {
        self.current_session()
            .filter(|session| session.principal == Principal::Staff)
            .ok_or(Error::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Contact;
    use crate::storage::EntityStore;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SessionAuthenticator) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(EntityStore::open(dir.path()).unwrap());
        let staff = Arc::new(Repository::<Staff>::new(Arc::clone(&store)));
        let passengers = Arc::new(Repository::<Passenger>::new(store));

        let contact = Contact::new("Marta Reis", "marta@fms.pt", None).unwrap();
        staff.add(Staff::new("ST0001", contact, "s3cret").unwrap()).unwrap();
        let contact = Contact::new("Ana Silva", "ana@mail.pt", None).unwrap();
        passengers
            .add(Passenger::new("QW12ER", contact, "hunter2").unwrap())
            .unwrap();

        (dir, SessionAuthenticator::new(staff, passengers))
    }

    #[test]
    fn test_staff_login() {
        let (_dir, auth) = setup();
        assert!(!auth.is_authenticated());

        let session = auth.login_staff("MARTA@fms.pt", "s3cret").unwrap();
        assert_eq!(session.principal, Principal::Staff);
        assert_eq!(session.identifier, "ST0001");
        assert_eq!(session.name, "Marta Reis");
        assert!(auth.require_staff().is_ok());
    }

    #[test]
    fn test_wrong_password() {
        let (_dir, auth) = setup();
        assert!(matches!(
            auth.login_staff("marta@fms.pt", "nope"),
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login_passenger("nobody@mail.pt", "hunter2"),
            Err(Error::InvalidCredentials)
        ));
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn test_passenger_is_not_staff() {
        let (_dir, auth) = setup();
        auth.login_passenger("ana@mail.pt", "hunter2").unwrap();
        assert!(auth.is_authenticated());
        assert!(matches!(auth.require_staff(), Err(Error::NotAuthenticated)));
    }

    #[test]
    fn test_logout() {
        let (_dir, auth) = setup();
        auth.login_passenger("ana@mail.pt", "hunter2").unwrap();
        let ended = auth.logout().unwrap();
        assert_eq!(ended.identifier, "QW12ER");
        assert!(auth.current_session().is_none());
        assert!(auth.logout().is_none());
    }
}
