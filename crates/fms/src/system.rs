//! The assembled flight management system.
//!
//! [`Fms`] wires one [`EntityStore`] into a repository per stored category
//! and implements the operations that span several of them: scheduling
//! flights against the fleet, booking passengers, and registering
//! accounts.
//!
//! Operations touching two documents write them one after the other. When
//! the second write fails the first is undone, so the pair either lands
//! together or not at all as far as memory is concerned.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::auth::SessionAuthenticator;
use crate::category::Category;
use crate::codegen::CodeGenerator;
use crate::config::Config;
use crate::entity::{
    Airplane, Airport, Contact, Flight, FlightDraft, Passenger, PassengerRef,
    Reservation, Staff,
};
use crate::error::{Error, Result};
use crate::event::{self, EventKind};
use crate::repository::{LoadReport, Repository};
use crate::reservation::ReservationAssigner;
use crate::roster::{random_headcount, Roster};
use crate::storage::{EntityStore, StoreStats};

/// Details for a new staff or passenger account.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Full name.
    pub name: String,
    /// Login email, unique per account kind.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Plain-text password; only its digest is stored.
    pub password: String,
}

/// Per-category outcome of loading the store.
#[derive(Debug, Default)]
pub struct StartupReport {
    /// One report per stored category.
    pub collections: Vec<(Category, LoadReport)>,
}

impl StartupReport {
    /// Entities loaded across all categories.
    #[must_use]
    pub fn loaded(&self) -> usize {
        self.collections.iter().map(|(_, r)| r.loaded).sum()
    }

    /// Documents skipped across all categories.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.collections.iter().map(|(_, r)| r.skipped.len()).sum()
    }
}

/// A flight together with what is left on board.
#[derive(Debug, Clone, Serialize)]
pub struct FlightOccupancy {
    /// Flight number.
    pub number: String,
    /// Seats on the assigned airplane.
    pub capacity: u32,
    /// Reservations held.
    pub booked: usize,
}

impl FlightOccupancy {
    /// Seats still free.
    #[must_use]
    pub fn free(&self) -> usize {
        seats(self.capacity).saturating_sub(self.booked)
    }
}

/// Entry point owning the store and every repository.
#[derive(Debug)]
pub struct Fms {
    config: Config,
    store: Arc<EntityStore>,
    codes: Arc<CodeGenerator>,
    assigner: ReservationAssigner,
    airplanes: Arc<Repository<Airplane>>,
    airports: Arc<Repository<Airport>>,
    flights: Arc<Repository<Flight>>,
    staff: Arc<Repository<Staff>>,
    passengers: Arc<Repository<Passenger>>,
    auth: SessionAuthenticator,
}

impl Fms {
    /// Open the store described by `config` with empty repositories.
    ///
    /// Call [`load_all`](Self::load_all) to read existing documents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] for an invalid configuration or
    /// [`Error::DirectoryCreate`] if the layout cannot be created.
    pub fn open(config: &Config) -> Result<Self> {
        Self::with_codes(config, CodeGenerator::new())
    }

    /// Open a store at `root` with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] if the layout cannot be created.
    pub fn open_at(root: impl Into<std::path::PathBuf>) -> Result<Self> {
        Self::open(&Config::default().with_root(root))
    }

    /// Open with a specific code generator, e.g. a seeded one.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn with_codes(config: &Config, codes: CodeGenerator) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(config.entity_store());
        store.initialize()?;

        let codes = Arc::new(codes);
        let staff = Arc::new(Repository::new(Arc::clone(&store)));
        let passengers = Arc::new(Repository::new(Arc::clone(&store)));
        let auth = SessionAuthenticator::new(Arc::clone(&staff), Arc::clone(&passengers));

        Ok(Self {
            config: config.clone(),
            assigner: ReservationAssigner::new(Arc::clone(&codes)),
            airplanes: Arc::new(Repository::new(Arc::clone(&store))),
            airports: Arc::new(Repository::new(Arc::clone(&store))),
            flights: Arc::new(Repository::new(Arc::clone(&store))),
            store,
            codes,
            staff,
            passengers,
            auth,
        })
    }

    /// Load every collection from disk.
    ///
    /// # Errors
    ///
    /// Returns an error only if a collection directory cannot be listed;
    /// unusable documents are skipped and reported.
    pub fn load_all(&self) -> Result<StartupReport> {
        Ok(StartupReport {
            collections: vec![
                (Category::Flight, self.flights.load_all()?),
                (Category::Airplane, self.airplanes.load_all()?),
                (Category::Staff, self.staff.load_all()?),
                (Category::Passenger, self.passengers.load_all()?),
                (Category::Airport, self.airports.load_all()?),
            ],
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Document counts per category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageIo`] if a collection cannot be listed.
    pub fn stats(&self) -> Result<StoreStats> {
        self.store.stats()
    }

    /// The fleet.
    #[must_use]
    pub fn airplanes(&self) -> &Repository<Airplane> {
        &self.airplanes
    }

    /// Known airports.
    #[must_use]
    pub fn airports(&self) -> &Repository<Airport> {
        &self.airports
    }

    /// Scheduled flights.
    #[must_use]
    pub fn flights(&self) -> &Repository<Flight> {
        &self.flights
    }

    /// Staff accounts.
    #[must_use]
    pub fn staff(&self) -> &Repository<Staff> {
        &self.staff
    }

    /// Passenger accounts.
    #[must_use]
    pub fn passengers(&self) -> &Repository<Passenger> {
        &self.passengers
    }

    /// Session handling over the staff and passenger accounts.
    #[must_use]
    pub fn authenticator(&self) -> &SessionAuthenticator {
        &self.auth
    }

    // === Fleet and airports ===

    /// Add an airplane to the fleet.
    ///
    /// # Errors
    ///
    /// See [`Repository::add`].
    pub fn add_airplane(&self, airplane: Airplane) -> Result<()> {
        self.airplanes.add(airplane)
    }

    /// Remove an airplane that is not assigned to a flight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if absent, or
    /// [`Error::AirplaneUnavailable`] while a flight uses it.
    pub fn remove_airplane(&self, registration: &str) -> Result<Airplane> {
        let airplane = self.airplanes.get(registration)?;
        if airplane.is_occupied {
            return Err(Error::AirplaneUnavailable {
                registration: airplane.registration,
            });
        }
        self.airplanes.remove(registration)
    }

    /// Add an airport.
    ///
    /// # Errors
    ///
    /// See [`Repository::add`].
    pub fn add_airport(&self, airport: Airport) -> Result<()> {
        self.airports.add(airport)
    }

    /// Remove an airport no flight departs from or arrives at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if absent, or [`Error::Validation`]
    /// while a flight references it.
    pub fn remove_airport(&self, icao: &str) -> Result<Airport> {
        if let Some(flight) = self
            .flights
            .find(|flight| flight.origin == icao || flight.destination == icao)
        {
            return Err(Error::validation(
                "airport",
                format!("{icao} is used by flight {}", flight.number),
            ));
        }
        self.airports.remove(icao)
    }

    // === Flights ===

    /// Schedule a flight and mark its airplane occupied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown airport or airplane,
    /// [`Error::AirplaneUnavailable`] if the airplane already flies,
    /// [`Error::DuplicateIdentifier`] for a taken flight number, or
    /// [`Error::Validation`] for a malformed draft.
    pub fn schedule_flight(&self, draft: FlightDraft) -> Result<Flight> {
        self.airports.get(&draft.origin)?;
        self.airports.get(&draft.destination)?;
        let flight = Flight::new(draft)?;
        if self.flights.contains(&flight.number) {
            return Err(Error::duplicate(Category::Flight, flight.number));
        }

        self.airplanes.modify(&flight.airplane, |airplane| {
            if airplane.is_occupied {
                return Err(Error::AirplaneUnavailable {
                    registration: airplane.registration.clone(),
                });
            }
            airplane.toggle_occupied();
            Ok(())
        })?;

        if let Err(err) = self.flights.add(flight.clone()) {
            self.release_airplane(&flight.airplane);
            return Err(err);
        }
        Ok(flight)
    }

    /// Cancel a flight, free its airplane and drop its reservations from
    /// the passengers holding them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the flight is absent, or the store's
    /// error if its document cannot be deleted.
    pub fn cancel_flight(&self, number: &str) -> Result<Flight> {
        let flight = self.flights.remove(number)?;
        self.release_airplane(&flight.airplane);
        for reservation in flight.reservations() {
            if let Some(passenger_id) = &reservation.passenger.passenger_id {
                self.forget_reservation(passenger_id, &reservation.code);
            }
        }
        Ok(flight)
    }

    fn release_airplane(&self, registration: &str) {
        let result = self.airplanes.modify(registration, |airplane| {
            airplane.is_occupied = false;
            Ok(())
        });
        if let Err(err) = result {
            warn!(registration = registration, error = %err, "Failed to release airplane");
        }
    }

    fn forget_reservation(&self, passenger_id: &str, code: &str) {
        let result = self.passengers.modify(passenger_id, |passenger| {
            passenger.remove_reservation(code);
            Ok(())
        });
        if let Err(err) = result {
            warn!(passenger = passenger_id, code = code, error = %err, "Failed to update passenger");
        }
    }

    /// Capacity and bookings of a flight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the flight or its airplane is absent.
    pub fn occupancy(&self, number: &str) -> Result<FlightOccupancy> {
        let flight = self.flights.get(number)?;
        let airplane = self.airplanes.get(&flight.airplane)?;
        let booked = flight.reservation_count();
        Ok(FlightOccupancy {
            number: flight.number,
            capacity: airplane.capacity,
            booked,
        })
    }

    fn check_capacity(&self, flight: &Flight, extra: usize) -> Result<()> {
        if !self.config.booking.enforce_capacity {
            return Ok(());
        }
        let capacity = self.airplanes.get(&flight.airplane)?.capacity;
        if flight.reservation_count() + extra > seats(capacity) {
            return Err(Error::CapacityExceeded {
                flight: flight.number.clone(),
                capacity,
            });
        }
        Ok(())
    }

    // === Reservations ===

    /// Book a registered passenger on a flight.
    ///
    /// The reservation is stored on the flight and its summary on the
    /// passenger.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown flight or passenger, or
    /// [`Error::CapacityExceeded`] when the flight is full.
    pub fn book(&self, flight_number: &str, passenger_id: &str) -> Result<Reservation> {
        let passenger = self.passengers.get(passenger_id)?;
        let guest = PassengerRef::registered(&passenger.name, passenger_id);
        let reservation = self.flights.modify(flight_number, |flight| {
            self.check_capacity(flight, 1)?;
            let code = self.assigner.assign_avoiding(flight, guest, |code| {
                passenger.has_reservation(code)
            })?;
            flight.reservation(&code).cloned()
        })?;

        let recorded = self.passengers.modify(passenger_id, |passenger| {
            passenger.add_reservation(reservation.summary());
            Ok(())
        });
        if let Err(err) = recorded {
            let undo = self.flights.modify(flight_number, |flight| {
                flight.remove_reservation(&reservation.code).map(drop)
            });
            if let Err(undo_err) = undo {
                warn!(code = %reservation.code, error = %undo_err, "Failed to undo reservation");
            }
            return Err(err);
        }
        event::emit(EventKind::Reserved, Category::Reservation, &reservation.code);
        Ok(reservation)
    }

    /// Book an unregistered passenger by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown flight,
    /// [`Error::CapacityExceeded`] when it is full, or
    /// [`Error::Validation`] for a blank name.
    pub fn book_walk_in(&self, flight_number: &str, name: &str) -> Result<Reservation> {
        let reservation = self.flights.modify(flight_number, |flight| {
            self.check_capacity(flight, 1)?;
            let code = self.assigner.assign(flight, PassengerRef::walk_in(name))?;
            flight.reservation(&code).cloned()
        })?;
        event::emit(EventKind::Reserved, Category::Reservation, &reservation.code);
        Ok(reservation)
    }

    /// Look up a reservation on a flight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the flight or the code is absent.
    pub fn get_reservation(&self, flight_number: &str, code: &str) -> Result<Reservation> {
        self.flights.get(flight_number)?.reservation(code).cloned()
    }

    /// Cancel a reservation, also removing it from its passenger.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the flight or the code is absent.
    pub fn cancel_reservation(&self, flight_number: &str, code: &str) -> Result<Reservation> {
        let reservation = self
            .flights
            .modify(flight_number, |flight| flight.remove_reservation(code))?;
        if let Some(passenger_id) = &reservation.passenger.passenger_id {
            self.forget_reservation(passenger_id, code);
        }
        event::emit(EventKind::ReservationCancelled, Category::Reservation, code);
        Ok(reservation)
    }

    /// The reservations a passenger holds, resolved against their flights.
    ///
    /// Summaries whose flight or reservation no longer exists are left out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the passenger is absent.
    pub fn passenger_reservations(&self, passenger_id: &str) -> Result<Vec<Reservation>> {
        let passenger = self.passengers.get(passenger_id)?;
        Ok(passenger
            .reservations()
            .filter_map(|summary| {
                self.get_reservation(&summary.flight_number, &summary.code)
                    .ok()
            })
            .collect())
    }

    /// Fill a flight with randomly named walk-in passengers.
    ///
    /// Books `count` passengers, or a random number between the configured
    /// minimum and the free seats when `count` is `None`. With capacity
    /// enforcement on, the number never exceeds the free seats. Returns the
    /// new reservation codes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown flight or airplane, or
    /// [`Error::DocumentNotFound`] if a name list is missing.
    pub fn populate_flight(&self, flight_number: &str, count: Option<usize>) -> Result<Vec<String>> {
        let roster = Roster::from_store(&self.store)?;
        let occupancy = self.occupancy(flight_number)?;
        let free = occupancy.free();
        let mut rng = rand::thread_rng();

        let wanted = match count {
            Some(n) if self.config.booking.enforce_capacity => n.min(free),
            Some(n) => n,
            None => random_headcount(free, self.config.roster.min_generated_passengers, &mut rng),
        };
        if wanted == 0 {
            return Ok(Vec::new());
        }

        let names = roster.random_names(wanted, &mut rng);
        let codes: Vec<String> = self.flights.modify(flight_number, |flight| {
            self.check_capacity(flight, names.len())?;
            names
                .into_iter()
                .map(|name| self.assigner.assign(flight, PassengerRef::walk_in(name)))
                .collect()
        })?;
        for code in &codes {
            event::emit(EventKind::Reserved, Category::Reservation, code);
        }
        Ok(codes)
    }

    // === Accounts ===

    /// Register a staff member under a generated staff code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateIdentifier`] if the email is taken, or
    /// [`Error::Validation`] for malformed details.
    pub fn register_staff(&self, registration: Registration) -> Result<Staff> {
        let contact = Contact::new(registration.name, registration.email, registration.phone)?;
        self.staff.add_generated(&self.codes, |code, mut existing| {
            if existing.any(|s| s.has_email(&contact.email)) {
                return Err(Error::duplicate(Category::Staff, contact.email.clone()));
            }
            Staff::new(code, contact, &registration.password)
        })
    }

    /// Register a passenger under a generated id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateIdentifier`] if the email is taken, or
    /// [`Error::Validation`] for malformed details.
    pub fn register_passenger(&self, registration: Registration) -> Result<Passenger> {
        let contact = Contact::new(registration.name, registration.email, registration.phone)?;
        self.passengers.add_generated(&self.codes, |id, mut existing| {
            if existing.any(|p| p.has_email(&contact.email)) {
                return Err(Error::duplicate(Category::Passenger, contact.email.clone()));
            }
            Passenger::new(id, contact, &registration.password)
        })
    }
}

fn seats(capacity: u32) -> usize {
    usize::try_from(capacity).unwrap_or(usize::MAX)
}
