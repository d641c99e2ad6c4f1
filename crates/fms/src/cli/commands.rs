//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand, ValueEnum};

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Options shared by list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Fleet commands.
#[derive(Debug, Subcommand)]
pub enum AirplaneCommand {
    /// Add an airplane to the fleet
    Add {
        /// Registration mark, e.g. EI-ABC
        registration: String,

        /// Operating company
        #[arg(long)]
        company: String,

        /// Number of passenger seats
        #[arg(long)]
        capacity: u32,

        /// Aircraft model
        #[arg(long)]
        model: String,
    },

    /// List the fleet
    List(ListArgs),

    /// Show one airplane
    Show {
        /// Registration mark
        registration: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Remove an airplane not assigned to a flight
    Remove {
        /// Registration mark
        registration: String,
    },
}

/// Airport commands.
#[derive(Debug, Subcommand)]
pub enum AirportCommand {
    /// Add an airport
    Add {
        /// Four-letter ICAO code
        icao: String,

        /// Three-letter IATA code
        iata: String,

        /// Airport name
        name: String,
    },

    /// List airports
    List(ListArgs),

    /// Show one airport
    Show {
        /// ICAO code
        icao: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Remove an airport no flight uses
    Remove {
        /// ICAO code
        icao: String,
    },
}

/// Flight and reservation commands.
#[derive(Debug, Subcommand)]
pub enum FlightCommand {
    /// Schedule a flight
    Schedule {
        /// Flight number
        number: String,

        /// ICAO code of the departure airport
        #[arg(long)]
        from: String,

        /// ICAO code of the arrival airport
        #[arg(long)]
        to: String,

        /// Registration of the airplane
        #[arg(long)]
        airplane: String,

        /// Departure time (RFC 3339, e.g. 2026-12-01T07:00:00Z)
        #[arg(long)]
        at: DateTime<Utc>,
    },

    /// List flights
    List(ListArgs),

    /// Show a flight and its reservations
    Show {
        /// Flight number
        number: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Cancel a flight and free its airplane
    Cancel {
        /// Flight number
        number: String,
    },

    /// Book a seat
    Book {
        /// Flight number
        number: String,

        /// Id of a registered passenger
        #[arg(long, conflicts_with = "name", required_unless_present = "name")]
        passenger: Option<String>,

        /// Name of a walk-in passenger
        #[arg(long)]
        name: Option<String>,
    },

    /// Cancel a reservation
    Unbook {
        /// Flight number
        number: String,

        /// Reservation code
        code: String,
    },

    /// Fill a flight with randomly named passengers
    Populate {
        /// Flight number
        number: String,

        /// How many passengers (random when omitted)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
}

/// Details for a new account.
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Full name
    pub name: String,

    /// Login email
    pub email: String,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Password
    #[arg(long)]
    pub password: String,
}

/// Credentials for a login check.
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Login email
    pub email: String,

    /// Password
    #[arg(long)]
    pub password: String,
}

/// Staff account commands.
#[derive(Debug, Subcommand)]
pub enum StaffCommand {
    /// Register a staff member
    Register(RegisterArgs),

    /// List staff
    List(ListArgs),

    /// Check staff credentials
    Login(LoginArgs),
}

/// Passenger account commands.
#[derive(Debug, Subcommand)]
pub enum PassengerCommand {
    /// Register a passenger
    Register(RegisterArgs),

    /// List passengers
    List(ListArgs),

    /// Check passenger credentials
    Login(LoginArgs),

    /// Show the reservations a passenger holds
    Reservations {
        /// Passenger id
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for list commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Identifiers only, one per line
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
