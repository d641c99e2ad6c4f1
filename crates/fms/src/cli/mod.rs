//! Command-line interface for fms.
//!
//! This module provides the CLI structure parsed by the `fms` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AirplaneCommand, AirportCommand, ConfigCommand, FlightCommand, ListArgs, LoginArgs,
    OutputFormat, PassengerCommand, RegisterArgs, StaffCommand, StatusCommand,
};

use crate::logging::Verbosity;

/// fms - Flight management over a directory of JSON documents
///
/// Keeps the fleet, airports, flights, staff and passengers as one JSON
/// file per entity under a store root.
#[derive(Debug, Parser)]
#[command(name = "fms")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Store root directory (overrides the configuration)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the store directory layout
    Init,

    /// Show document counts per collection
    Status(StatusCommand),

    /// Manage the fleet
    #[command(subcommand)]
    Airplane(AirplaneCommand),

    /// Manage airports
    #[command(subcommand)]
    Airport(AirportCommand),

    /// Schedule flights and manage reservations
    #[command(subcommand)]
    Flight(FlightCommand),

    /// Manage staff accounts
    #[command(subcommand)]
    Staff(StaffCommand),

    /// Manage passenger accounts
    #[command(subcommand)]
    Passenger(PassengerCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
