//! Runnable demonstrations of client/car association designs.
//!
//! Each scenario opens its own store file, performs a fixed script of writes,
//! and prints what navigation returns afterwards.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;

use junction_foundation::{Error, ErrorKind, Result};
use junction_storage::{AssociationSchema, Attributes, Car, Client, IS_RENTED, Store};
use thiserror::Error;

use crate::config::SessionConfig;
use crate::session::Session;

/// Errors raised while running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] Error),
    /// Writing the report failed.
    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}

/// One of the demonstration scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// A single foreign key on the car: a second client silently replaces
    /// the first.
    Implicit,
    /// An explicit join table: many clients per car, many cars per client.
    JoinTable,
    /// A join table whose rows record when they were created.
    Timestamped,
    /// A join table with a required, caller-supplied `is_rented` flag.
    Rental,
}

impl Scenario {
    /// Every scenario in presentation order.
    pub const ALL: [Scenario; 4] = [
        Scenario::Implicit,
        Scenario::JoinTable,
        Scenario::Timestamped,
        Scenario::Rental,
    ];

    /// Scenario number, used in the store file name.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Implicit => 1,
            Self::JoinTable => 2,
            Self::Timestamped => 3,
            Self::Rental => 7,
        }
    }

    /// Short human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Implicit => "implicit relationship",
            Self::JoinTable => "explicit relationship with a join table",
            Self::Timestamped => "auto-filled extra attribute on the relationship",
            Self::Rental => "required extra attribute on the relationship",
        }
    }

    /// Association schema the scenario runs against.
    #[must_use]
    pub fn schema(self) -> AssociationSchema {
        match self {
            Self::Implicit => AssociationSchema::foreign_key(),
            Self::JoinTable => AssociationSchema::join_table(),
            Self::Timestamped => AssociationSchema::timestamped(),
            Self::Rental => AssociationSchema::rental(),
        }
    }

    /// Store file name, e.g. `junction_07.msgpack`.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("junction_{:02}.msgpack", self.number())
    }

    /// Session configuration for this scenario inside `data_dir`.
    ///
    /// Unless `keep` is set, an existing store file is discarded.
    #[must_use]
    pub fn config(self, data_dir: &Path, keep: bool) -> SessionConfig {
        SessionConfig::at(data_dir.join(self.file_name()))
            .with_schema(self.schema())
            .with_reset(!keep)
    }

    /// Opens the scenario's session in `data_dir` and runs it.
    ///
    /// # Errors
    ///
    /// Returns the first store or output error.
    pub fn run_in(self, data_dir: &Path, keep: bool, out: &mut impl Write) -> std::result::Result<(), ScenarioError> {
        let mut session = Session::open(self.config(data_dir, keep))?;
        writeln!(out, "== {:02} {} ({}) ==", self.number(), self.title(), self.file_name())?;
        self.run(&mut session, out)?;
        writeln!(out)?;
        Ok(())
    }

    /// Runs the scenario against an open session.
    ///
    /// # Errors
    ///
    /// Returns the first store or output error.
    pub fn run(self, session: &mut Session, out: &mut impl Write) -> std::result::Result<(), ScenarioError> {
        match self {
            Self::Implicit => implicit(session, out),
            Self::JoinTable => join_table(session, out),
            Self::Timestamped => timestamped(session, out),
            Self::Rental => rental(session, out),
        }
    }
}

fn implicit(session: &mut Session, out: &mut impl Write) -> std::result::Result<(), ScenarioError> {
    session.transaction(|tx| {
        let tesla = tx.create_car("Tesla Model S")?;
        let ferrari = tx.create_car("Ferrari 458")?;
        let john = tx.create_client(Some("John Doe"))?;
        tx.associate(john, tesla, &Attributes::new())?;
        tx.associate(john, ferrari, &Attributes::new())?;
        Ok(())
    })?;

    let store = session.store();
    let john = client_named(store, "John Doe")?;
    writeln!(out, "Car rentals for client 1: {}", list(&store.cars_for_client(john.id)?))?;
    print_clients_of(store, out)?;

    session.transaction(|tx| {
        let tesla = car_model(tx.store(), "Tesla Model S")?;
        let ferrari = car_model(tx.store(), "Ferrari 458")?;
        let jane = tx.create_client(Some("Jane Doe"))?;
        tx.associate(jane, tesla.id, &Attributes::new())?;
        tx.associate(jane, ferrari.id, &Attributes::new())?;
        Ok(())
    })?;

    let store = session.store();
    let jane = client_named(store, "Jane Doe")?;
    writeln!(out, "Car rentals for client 2: {}", list(&store.cars_for_client(jane.id)?))?;
    print_clients_of(store, out)?;

    writeln!(out, "!!! A car holds a single client_id, so it cannot be rented by many clients.")?;
    writeln!(out, "John Doe lost the references to the cars he rented.")?;
    writeln!(out, "John Doe car rentals: {}", list(&store.cars_for_client(john.id)?))?;
    Ok(())
}

fn join_table(session: &mut Session, out: &mut impl Write) -> std::result::Result<(), ScenarioError> {
    session.transaction(|tx| {
        let tesla = tx.create_car("Tesla Model S")?;
        let ferrari = tx.create_car("Ferrari 458")?;
        for name in ["John Doe", "Jane Doe"] {
            let client = tx.create_client(Some(name))?;
            tx.associate(client, tesla, &Attributes::new())?;
            tx.associate(client, ferrari, &Attributes::new())?;
        }
        Ok(())
    })?;

    let store = session.store();
    let john = client_named(store, "John Doe")?;
    let jane = client_named(store, "Jane Doe")?;
    writeln!(out, "Car rentals for client 1: {}", list(&store.cars_for_client(john.id)?))?;
    writeln!(out, "Car rentals for client 2: {}", list(&store.cars_for_client(jane.id)?))?;
    print_clients_of(store, out)?;

    writeln!(out, "!!! A client can rent many cars and a car can be rented by many clients.")?;
    writeln!(out, "No information is lost.")?;
    Ok(())
}

fn timestamped(session: &mut Session, out: &mut impl Write) -> std::result::Result<(), ScenarioError> {
    session.transaction(|tx| {
        let first = tx.create_car("Tesla Model S")?;
        let second = tx.create_car("Tesla Model S")?;
        for name in ["John Doe", "Jane Doe"] {
            let client = tx.create_client(Some(name))?;
            tx.associate(client, first, &Attributes::new())?;
            tx.associate(client, second, &Attributes::new())?;
        }
        Ok(())
    })?;

    for link in session.store().associations()? {
        writeln!(out, "{link}")?;
    }
    writeln!(out, "!!! rented_time is filled in automatically to record when a car was rented and by whom.")?;
    Ok(())
}

fn rental(session: &mut Session, out: &mut impl Write) -> std::result::Result<(), ScenarioError> {
    let (first, second) = session.transaction(|tx| {
        Ok((tx.create_car("Tesla Model S")?, tx.create_car("Tesla Model S")?))
    })?;
    let john = session.transaction(|tx| tx.create_client(Some("John Doe")))?;
    let jane = session.transaction(|tx| tx.create_client(Some("Jane Doe")))?;

    session.transaction(|tx| {
        for (client, car, is_rented) in [
            (john, first, false),
            (john, second, true),
            (jane, first, true),
            (jane, second, false),
        ] {
            tx.associate(client, car, &Attributes::new().with(IS_RENTED, is_rented))?;
        }
        Ok(())
    })?;

    for link in session.store().associations()? {
        writeln!(out, "{link}")?;
    }

    let attempt = session.transaction(|tx| tx.associate(john, first, &Attributes::new()));
    match attempt {
        Err(e) if e.is_missing_attribute() => {
            writeln!(out, "!!! is_rented has no default and must be supplied: {e}")?;
        }
        Err(e) => return Err(e.into()),
        Ok(_) => {
            return Err(Error::new(ErrorKind::Internal(
                "association without is_rented was accepted".into(),
            ))
            .into());
        }
    }
    Ok(())
}

fn print_clients_of(store: &Store, out: &mut impl Write) -> std::result::Result<(), ScenarioError> {
    for (label, model) in [("car_1", "Tesla Model S"), ("car_2", "Ferrari 458")] {
        let car = car_model(store, model)?;
        writeln!(out, "Clients who rented {label}: {}", list(&store.clients_for_car(car.id)?))?;
    }
    Ok(())
}

fn client_named(store: &Store, fullname: &str) -> Result<Client> {
    store
        .find_client_by_name(fullname)?
        .ok_or_else(|| Error::new(ErrorKind::Internal(format!("no client named {fullname}"))))
}

fn car_model(store: &Store, model: &str) -> Result<Car> {
    store
        .find_car_by_model(model)?
        .ok_or_else(|| Error::new(ErrorKind::Internal(format!("no car with model {model}"))))
}

fn list<T: Display>(items: &[T]) -> String {
    let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}
