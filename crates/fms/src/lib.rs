//! `fms` - A flight management system persisted as a directory of JSON
//! documents.
//!
//! Airplanes, airports, flights, staff and passengers each live in their
//! own collection directory, one `<identifier>.json` document per entity.
//! In memory every collection is a [`Repository`], an identifier-keyed
//! index that writes through to the [`EntityStore`]. [`Fms`] assembles the
//! repositories and implements flight scheduling, bookings and account
//! registration on top of them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod category;
pub mod cli;
pub mod codec;
pub mod codegen;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod logging;
pub mod repository;
pub mod reservation;
pub mod roster;
pub mod storage;
pub mod system;

pub use auth::{Principal, Session, SessionAuthenticator};
pub use category::Category;
pub use codegen::CodeGenerator;
pub use config::Config;
pub use entity::{
    Airplane, Airport, Contact, Entity, Flight, FlightDraft, Passenger, PassengerRef,
    Reservation, ReservationSummary, Staff,
};
pub use error::{Error, ErrorKind, Result};
pub use logging::init_logging;
pub use repository::{LoadReport, Repository};
pub use reservation::ReservationAssigner;
pub use storage::{EntityStore, StoreStats};
pub use system::{Fms, Registration, StartupReport};
