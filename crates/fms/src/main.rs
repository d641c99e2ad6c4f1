//! `fms` - CLI for the flight management store
//!
//! Each invocation opens the store, loads every collection, performs one
//! operation and exits.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use fms::cli::{
    AirplaneCommand, AirportCommand, Cli, Command, ConfigCommand, FlightCommand, ListArgs,
    LoginArgs, OutputFormat, PassengerCommand, RegisterArgs, StaffCommand,
};
use fms::{
    init_logging, Airplane, Airport, Config, Entity, Fms, FlightDraft, Registration, Session,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<fms::Error>() {
                Some(fms_err) => eprintln!("error [{}]: {err:#}", fms_err.kind()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Checks one file in isolation, so it must not load the environment first.
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        return validate_config(file.clone());
    }

    let mut config = Config::load_from(cli.config.clone())?;
    if let Some(root) = cli.root {
        config = config.with_root(root);
    }

    match cli.command {
        Command::Init => handle_init(&config),
        Command::Config(cmd) => handle_config(&config, &cmd),
        Command::Status(status_cmd) => handle_status(&open(&config)?, status_cmd.json),
        Command::Airplane(cmd) => handle_airplane(&open(&config)?, cmd),
        Command::Airport(cmd) => handle_airport(&open(&config)?, cmd),
        Command::Flight(cmd) => handle_flight(&open(&config)?, cmd),
        Command::Staff(cmd) => handle_staff(&open(&config)?, cmd),
        Command::Passenger(cmd) => handle_passenger(&open(&config)?, cmd),
    }
}

fn open(config: &Config) -> anyhow::Result<Fms> {
    let fms = Fms::open(config)?;
    let report = fms.load_all()?;
    if report.skipped() > 0 {
        warn!(
            skipped = report.skipped(),
            "Some documents could not be loaded"
        );
    }
    Ok(fms)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_init(config: &Config) -> anyhow::Result<()> {
    let store = config.entity_store();
    store.initialize()?;
    println!("Initialized store at {}", store.root().display());
    Ok(())
}

fn handle_status(fms: &Fms, json: bool) -> anyhow::Result<()> {
    let stats = fms.stats()?;
    if json {
        let collections: serde_json::Map<String, serde_json::Value> = stats
            .documents
            .iter()
            .map(|(category, count)| (category.to_string(), (*count).into()))
            .collect();
        return print_json(&serde_json::json!({
            "root": stats.root,
            "collections": collections,
            "total": stats.total(),
        }));
    }

    println!("fms status");
    println!("----------");
    println!("Root:          {}", stats.root.display());
    for (category, count) in &stats.documents {
        println!("{:<14} {count}", format!("{category}:"));
    }
    println!("Total:         {}", stats.total());
    Ok(())
}

fn handle_airplane(fms: &Fms, cmd: AirplaneCommand) -> anyhow::Result<()> {
    match cmd {
        AirplaneCommand::Add {
            registration,
            company,
            capacity,
            model,
        } => {
            let airplane = Airplane::new(registration, company, capacity, model)?;
            let label = airplane.label();
            fms.add_airplane(airplane)?;
            println!("Added {label}");
        }
        AirplaneCommand::List(ListArgs { format }) => {
            let fleet = fms.airplanes().values();
            match format {
                OutputFormat::Json => print_json(&fleet)?,
                OutputFormat::Plain => fleet.iter().for_each(|a| println!("{}", a.registration)),
                OutputFormat::Table => {
                    println!("{:<12} {:<20} {:<16} {:>8}  STATUS", "REGISTRATION", "COMPANY", "MODEL", "SEATS");
                    for a in &fleet {
                        let status = if a.is_occupied { "assigned" } else { "free" };
                        println!(
                            "{:<12} {:<20} {:<16} {:>8}  {status}",
                            a.registration, a.company, a.model, a.capacity
                        );
                    }
                }
            }
        }
        AirplaneCommand::Show { registration, json } => {
            let airplane = fms.airplanes().get(&registration)?;
            if json {
                println!("{}", airplane.to_json()?);
            } else {
                println!("Registration: {}", airplane.registration);
                println!("Company:      {}", airplane.company);
                println!("Model:        {}", airplane.model);
                println!("Capacity:     {}", airplane.capacity);
                println!("Assigned:     {}", airplane.is_occupied);
            }
        }
        AirplaneCommand::Remove { registration } => {
            let airplane = fms.remove_airplane(&registration)?;
            println!("Removed {}", airplane.label());
        }
    }
    Ok(())
}

fn handle_airport(fms: &Fms, cmd: AirportCommand) -> anyhow::Result<()> {
    match cmd {
        AirportCommand::Add { icao, iata, name } => {
            let airport = Airport::new(&icao, &iata, name)?;
            let label = airport.label();
            fms.add_airport(airport)?;
            println!("Added {label}");
        }
        AirportCommand::List(ListArgs { format }) => {
            let airports = fms.airports().values();
            match format {
                OutputFormat::Json => print_json(&airports)?,
                OutputFormat::Plain => airports.iter().for_each(|a| println!("{}", a.icao)),
                OutputFormat::Table => {
                    println!("{:<6} {:<6} NAME", "ICAO", "IATA");
                    for a in &airports {
                        println!("{:<6} {:<6} {}", a.icao, a.iata, a.name);
                    }
                }
            }
        }
        AirportCommand::Show { icao, json } => {
            let airport = fms.airports().get(&icao.to_ascii_uppercase())?;
            if json {
                println!("{}", airport.to_json()?);
            } else {
                println!("{} / {}  {}", airport.icao, airport.iata, airport.name);
            }
        }
        AirportCommand::Remove { icao } => {
            let airport = fms.remove_airport(&icao.to_ascii_uppercase())?;
            println!("Removed {}", airport.label());
        }
    }
    Ok(())
}

fn handle_flight(fms: &Fms, cmd: FlightCommand) -> anyhow::Result<()> {
    match cmd {
        FlightCommand::Schedule {
            number,
            from,
            to,
            airplane,
            at,
        } => {
            let flight = fms.schedule_flight(FlightDraft {
                number,
                origin: from,
                destination: to,
                airplane,
                scheduled_at: at,
            })?;
            println!(
                "Scheduled {} {} -> {} at {} on {}",
                flight.number,
                flight.origin,
                flight.destination,
                flight.scheduled_at.to_rfc3339(),
                flight.airplane
            );
        }
        FlightCommand::List(ListArgs { format }) => {
            let flights = fms.flights().values();
            match format {
                OutputFormat::Json => print_json(&flights)?,
                OutputFormat::Plain => flights.iter().for_each(|f| println!("{}", f.number)),
                OutputFormat::Table => {
                    println!(
                        "{:<10} {:<6} {:<6} {:<12} {:<20} {:>6}",
                        "NUMBER", "FROM", "TO", "AIRPLANE", "DEPARTURE", "BOOKED"
                    );
                    for f in &flights {
                        println!(
                            "{:<10} {:<6} {:<6} {:<12} {:<20} {:>6}",
                            f.number,
                            f.origin,
                            f.destination,
                            f.airplane,
                            f.scheduled_at.format("%Y-%m-%d %H:%M"),
                            f.reservation_count()
                        );
                    }
                }
            }
        }
        FlightCommand::Show { number, json } => {
            let flight = fms.flights().get(&number)?;
            if json {
                println!("{}", flight.to_json()?);
                return Ok(());
            }
            let occupancy = fms.occupancy(&number).ok();
            println!("Flight:     {}", flight.number);
            println!("Route:      {} -> {}", flight.origin, flight.destination);
            println!("Departure:  {}", flight.scheduled_at.to_rfc3339());
            println!("Airplane:   {}", flight.airplane);
            match occupancy {
                Some(o) => println!("Booked:     {}/{} ({} free)", o.booked, o.capacity, o.free()),
                None => println!("Booked:     {}", flight.reservation_count()),
            }
            for r in flight.reservations() {
                let id = r.passenger.passenger_id.as_deref().unwrap_or("-");
                println!("  {}  {:<8} {}", r.code, id, r.passenger.name);
            }
        }
        FlightCommand::Cancel { number } => {
            let flight = fms.cancel_flight(&number)?;
            println!(
                "Cancelled {} ({} reservations dropped)",
                flight.number,
                flight.reservation_count()
            );
        }
        FlightCommand::Book {
            number,
            passenger,
            name,
        } => {
            let reservation = match (passenger, name) {
                (Some(id), _) => fms.book(&number, &id)?,
                (None, Some(name)) => fms.book_walk_in(&number, &name)?,
                (None, None) => anyhow::bail!("either --passenger or --name is required"),
            };
            println!(
                "Reserved {} on {} for {}",
                reservation.code, reservation.flight_number, reservation.passenger.name
            );
        }
        FlightCommand::Unbook { number, code } => {
            let reservation = fms.cancel_reservation(&number, &code)?;
            println!("Cancelled reservation {} on {}", reservation.code, number);
        }
        FlightCommand::Populate { number, count } => {
            let codes = fms
                .populate_flight(&number, count)
                .with_context(|| format!("failed to populate flight {number}"))?;
            println!("Booked {} passengers on {number}", codes.len());
        }
    }
    Ok(())
}

fn registration(args: RegisterArgs) -> Registration {
    Registration {
        name: args.name,
        email: args.email,
        phone: args.phone,
        password: args.password,
    }
}

fn print_accounts(format: OutputFormat, rows: &[(String, String, String)]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = rows
                .iter()
                .map(|(id, name, email)| serde_json::json!({"id": id, "name": name, "email": email}))
                .collect();
            print_json(&rows)?;
        }
        OutputFormat::Plain => rows.iter().for_each(|(id, _, _)| println!("{id}")),
        OutputFormat::Table => {
            println!("{:<8} {:<28} EMAIL", "ID", "NAME");
            for (id, name, email) in rows {
                println!("{id:<8} {name:<28} {email}");
            }
        }
    }
    Ok(())
}

fn print_login(session: &Session) {
    println!(
        "Credentials valid for {} ({:?} {})",
        session.name, session.principal, session.identifier
    );
}

fn handle_staff(fms: &Fms, cmd: StaffCommand) -> anyhow::Result<()> {
    match cmd {
        StaffCommand::Register(args) => {
            let staff = fms.register_staff(registration(args))?;
            println!("Registered staff {} ({})", staff.staff_code, staff.email);
        }
        StaffCommand::List(ListArgs { format }) => {
            let rows: Vec<_> = fms
                .staff()
                .values()
                .into_iter()
                .map(|s| (s.staff_code, s.name, s.email))
                .collect();
            print_accounts(format, &rows)?;
        }
        StaffCommand::Login(LoginArgs { email, password }) => {
            let session = fms.authenticator().login_staff(&email, &password)?;
            print_login(&session);
        }
    }
    Ok(())
}

fn handle_passenger(fms: &Fms, cmd: PassengerCommand) -> anyhow::Result<()> {
    match cmd {
        PassengerCommand::Register(args) => {
            let passenger = fms.register_passenger(registration(args))?;
            println!("Registered passenger {} ({})", passenger.id, passenger.email);
        }
        PassengerCommand::List(ListArgs { format }) => {
            let rows: Vec<_> = fms
                .passengers()
                .values()
                .into_iter()
                .map(|p| (p.id, p.name, p.email))
                .collect();
            print_accounts(format, &rows)?;
        }
        PassengerCommand::Login(LoginArgs { email, password }) => {
            let session = fms.authenticator().login_passenger(&email, &password)?;
            print_login(&session);
        }
        PassengerCommand::Reservations { id, json } => {
            let reservations = fms.passenger_reservations(&id)?;
            if json {
                print_json(&reservations)?;
            } else if reservations.is_empty() {
                println!("No reservations for passenger {id}");
            } else {
                for r in &reservations {
                    println!("{}  {}", r.code, r.flight_number);
                }
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: &ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if *json {
                print_json(config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Root:               {}", config.storage.root.display());
                println!();
                println!("[Roster]");
                println!("  Names file:         {}", config.roster.names_file.display());
                println!("  Surnames file:      {}", config.roster.surnames_file.display());
                println!(
                    "  Min generated:      {}",
                    config.roster.min_generated_passengers
                );
                println!();
                println!("[Booking]");
                println!("  Enforce capacity:   {}", config.booking.enforce_capacity);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => validate_config(file.clone())?,
    }
    Ok(())
}

fn validate_config(file: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    Config::load_file(&path)?;
    println!("Configuration is valid.");
    Ok(())
}
