//! Sessions and units of work.
//!
//! A [`Session`] owns the committed store and, when configured with a path,
//! its snapshot file. Writes happen inside a [`Transaction`], which works on
//! its own copy of the store. Committing installs that copy in one step and
//! persists it; rolling back or dropping the transaction discards it.

use std::path::Path;

use chrono::{DateTime, Utc};
use junction_foundation::{Error, ErrorContext, ErrorKind, Result};
use junction_storage::{AssociationId, Attributes, Car, CarId, Client, ClientId, Store};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::serialize;

/// An open store and its persistence settings.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    store: Store,
}

impl Session {
    /// Opens a session.
    ///
    /// Loads the configured store file when it exists and `reset` is not set.
    /// Otherwise starts from an empty store, writing it out immediately when a
    /// path is configured.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSchema` if the schema is inconsistent or the store file
    /// was created with a different schema, and `Io`/`Serialization` errors
    /// from reading or writing the file.
    pub fn open(config: SessionConfig) -> Result<Self> {
        let store = match config.path.as_deref() {
            Some(path) if path.exists() && !config.reset => load(path, &config)?,
            Some(path) => {
                let store = Store::new(config.schema.clone())?;
                serialize::save_to_file(&store, path).map_err(|e| with_path(e, "open", path))?;
                store
            }
            None => Store::new(config.schema.clone())?,
        };

        info!(
            path = ?config.path,
            clients = store.client_count(),
            cars = store.car_count(),
            associations = store.association_count(),
            "session opened"
        );

        Ok(Self { config, store })
    }

    /// Opens an in-memory session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSchema` if the schema is inconsistent.
    pub fn in_memory(schema: junction_storage::AssociationSchema) -> Result<Self> {
        Self::open(SessionConfig::in_memory().with_schema(schema))
    }

    /// Returns the committed store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Starts a unit of work.
    pub fn begin(&mut self) -> Transaction<'_> {
        let working = self.store.clone();
        debug!("transaction started");
        Transaction {
            session: self,
            working,
            aborted: None,
            writes: 0,
            finished: false,
        }
    }

    /// Runs `f` in a unit of work, committing if it returns `Ok` and rolling
    /// back if it returns `Err`.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or the commit error.
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T>,
    {
        let mut tx = self.begin();
        match f(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                tx.rollback();
                Err(e)
            }
        }
    }

    /// Persists `store` (if configured) and makes it the committed store.
    fn install(&mut self, store: Store) -> Result<()> {
        if let Some(path) = self.config.path.as_deref() {
            serialize::save_to_file(&store, path).map_err(|e| with_path(e, "commit", path))?;
            debug!(path = %path.display(), "snapshot persisted");
        }
        self.store = store;
        Ok(())
    }
}

fn load(path: &Path, config: &SessionConfig) -> Result<Store> {
    let store = serialize::load_from_file(path).map_err(|e| with_path(e, "open", path))?;
    if *store.schema() != config.schema {
        return Err(with_path(
            Error::invalid_schema("store file was created with a different association schema"),
            "open",
            path,
        ));
    }
    Ok(store)
}

fn with_path(e: Error, operation: &str, path: &Path) -> Error {
    e.with_context(
        ErrorContext::new()
            .with_operation(operation)
            .with_path(path.display().to_string()),
    )
}

/// A unit of work against a session.
///
/// Reads through [`Transaction::store`] observe the transaction's own writes.
/// The first failed write aborts the transaction: later writes and
/// [`Transaction::commit`] return `TransactionAborted`.
pub struct Transaction<'s> {
    session: &'s mut Session,
    working: Store,
    aborted: Option<String>,
    writes: usize,
    finished: bool,
}

impl Transaction<'_> {
    /// Returns the working store, including uncommitted writes.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.working
    }

    /// Returns true if an earlier write failed.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    fn apply<T>(
        &mut self,
        operation: &str,
        write: impl FnOnce(&Store) -> Result<(Store, T)>,
    ) -> Result<T> {
        let context = || ErrorContext::new().with_operation(operation);

        if let Some(reason) = &self.aborted {
            return Err(Error::new(ErrorKind::TransactionAborted(reason.clone())).with_context(context()));
        }

        match write(&self.working) {
            Ok((store, value)) => {
                self.working = store;
                self.writes += 1;
                Ok(value)
            }
            Err(e) => {
                warn!(operation, error = %e, "write failed; transaction aborted");
                self.aborted = Some(format!("{operation} failed: {e}"));
                Err(e.with_context(context()))
            }
        }
    }

    /// Inserts a client.
    ///
    /// # Errors
    ///
    /// See [`Store::create_client`].
    pub fn create_client(&mut self, fullname: Option<&str>) -> Result<ClientId> {
        self.apply("create_client", |s| s.create_client(fullname))
    }

    /// Inserts a car.
    ///
    /// # Errors
    ///
    /// See [`Store::create_car`].
    pub fn create_car(&mut self, model: &str) -> Result<CarId> {
        self.apply("create_car", |s| s.create_car(model))
    }

    /// Associates a client with a car.
    ///
    /// # Errors
    ///
    /// See [`Store::associate_at`].
    pub fn associate(&mut self, client: ClientId, car: CarId, attributes: &Attributes) -> Result<AssociationId> {
        self.apply("associate", |s| s.associate(client, car, attributes))
    }

    /// Associates a client with a car, filling defaults as of `now`.
    ///
    /// # Errors
    ///
    /// See [`Store::associate_at`].
    pub fn associate_at(
        &mut self,
        client: ClientId,
        car: CarId,
        attributes: &Attributes,
        now: DateTime<Utc>,
    ) -> Result<AssociationId> {
        self.apply("associate", |s| s.associate_at(client, car, attributes, now))
    }

    /// Removes one association.
    ///
    /// # Errors
    ///
    /// See [`Store::dissociate`].
    pub fn dissociate(&mut self, association: AssociationId) -> Result<()> {
        self.apply("dissociate", |s| Ok((s.dissociate(association)?, ())))
    }

    /// Deletes a client.
    ///
    /// # Errors
    ///
    /// See [`Store::delete_client`].
    pub fn delete_client(&mut self, client: ClientId) -> Result<()> {
        self.apply("delete_client", |s| Ok((s.delete_client(client)?, ())))
    }

    /// Deletes a car.
    ///
    /// # Errors
    ///
    /// See [`Store::delete_car`].
    pub fn delete_car(&mut self, car: CarId) -> Result<()> {
        self.apply("delete_car", |s| Ok((s.delete_car(car)?, ())))
    }

    /// Cars associated with a client, including uncommitted associations.
    ///
    /// # Errors
    ///
    /// See [`Store::cars_for_client`].
    pub fn cars_for_client(&self, client: ClientId) -> Result<Vec<Car>> {
        self.working.cars_for_client(client)
    }

    /// Clients associated with a car, including uncommitted associations.
    ///
    /// # Errors
    ///
    /// See [`Store::clients_for_car`].
    pub fn clients_for_car(&self, car: CarId) -> Result<Vec<Client>> {
        self.working.clients_for_car(car)
    }

    /// Makes every write in this transaction visible at once, persisting the
    /// result when the session has a store file.
    ///
    /// # Errors
    ///
    /// Returns `TransactionAborted` if a write failed, or the persistence
    /// error. In both cases the session keeps its previous store.
    pub fn commit(mut self) -> Result<()> {
        self.finished = true;

        if let Some(reason) = self.aborted.take() {
            debug!(%reason, "commit refused");
            return Err(Error::new(ErrorKind::TransactionAborted(reason))
                .with_context(ErrorContext::new().with_operation("commit")));
        }

        let writes = self.writes;
        let store = self.working.clone();
        self.session.install(store)?;
        debug!(writes, "transaction committed");
        Ok(())
    }

    /// Discards every write in this transaction.
    pub fn rollback(mut self) {
        self.finished = true;
        debug!(writes = self.writes, "transaction rolled back");
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!(writes = self.writes, "transaction dropped without commit; rolled back");
        }
    }
}
