//! The association store with immutable snapshots.
//!
//! A `Store` holds the client, car, and (under join-table storage) association
//! tables plus the bidirectional index. Every mutation returns a new `Store`
//! and leaves the receiver untouched; a failed operation therefore never
//! leaves a partial write behind. Cloning is O(1) through structural sharing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use junction_foundation::{Error, Result, RowId, Value};
use tracing::trace;

use crate::catalog::{self, CAR, CAR_ID, CLIENT, CLIENT_ID, FULLNAME, MODEL};
use crate::index::AssociationIndex;
use crate::record::{AssociationId, Car, CarId, Client, ClientCar, ClientId, Record};
use crate::row::Attributes;
use crate::schema::{AssociationSchema, OnDelete, TableSchema};
use crate::table::Table;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable snapshot of clients, cars, and their associations.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Store {
    schema: Arc<AssociationSchema>,
    clients: Arc<Table>,
    cars: Arc<Table>,
    /// Association rows; `None` under foreign-key storage.
    links: Option<Arc<Table>>,
    index: Arc<AssociationIndex>,
}

impl Store {
    /// Creates an empty store for an association schema.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSchema` if the schema is inconsistent.
    pub fn new(schema: AssociationSchema) -> Result<Self> {
        schema.validate()?;

        Ok(Self {
            clients: Arc::new(Table::new(catalog::client_table())),
            cars: Arc::new(Table::new(catalog::car_table(schema.storage))),
            links: catalog::client_car_table(&schema).map(|t| Arc::new(Table::new(t))),
            index: Arc::new(AssociationIndex::new()),
            schema: Arc::new(schema),
        })
    }

    /// Returns the association schema.
    #[must_use]
    pub fn schema(&self) -> &AssociationSchema {
        &self.schema
    }

    /// Returns the table layouts in creation order.
    #[must_use]
    pub fn tables(&self) -> Vec<&TableSchema> {
        let mut tables = vec![self.clients.schema(), self.cars.schema()];
        tables.extend(self.links.as_deref().map(Table::schema));
        tables
    }

    // --- Writes ---

    /// Inserts a client.
    ///
    /// # Errors
    ///
    /// Only fails if the client table rejects a text value, which the built-in
    /// layout never does.
    pub fn create_client(&self, fullname: Option<&str>) -> Result<(Store, ClientId)> {
        let mut clients = (*self.clients).clone();
        let id = clients.insert(&Client::values(fullname), Utc::now())?;
        trace!(client = %id, ?fullname, "created client");

        let store = Store {
            clients: Arc::new(clients),
            ..self.clone()
        };
        Ok((store, ClientId::new(id)))
    }

    /// Inserts a car.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `model` is empty.
    pub fn create_car(&self, model: &str) -> Result<(Store, CarId)> {
        let mut cars = (*self.cars).clone();
        let id = cars.insert(&Car::values(model), Utc::now())?;
        trace!(car = %id, model, "created car");

        let store = Store {
            cars: Arc::new(cars),
            ..self.clone()
        };
        Ok((store, CarId::new(id)))
    }

    /// Associates a client with a car, filling defaults with the current time.
    ///
    /// # Errors
    ///
    /// See [`Store::associate_at`].
    pub fn associate(
        &self,
        client: ClientId,
        car: CarId,
        attributes: &Attributes,
    ) -> Result<(Store, AssociationId)> {
        self.associate_at(client, car, attributes, Utc::now())
    }

    /// Associates a client with a car, filling defaults as of `now`.
    ///
    /// Under join-table storage each call creates a new association row, even
    /// for a pair that is already associated. Under foreign-key storage the
    /// car's single `client_id` is overwritten, detaching the car from any
    /// previous client.
    ///
    /// # Errors
    ///
    /// - `ReferentialIntegrity` if the client or car does not exist
    /// - `MissingRequiredAttribute` if a required attribute is not supplied
    /// - `UnknownAttribute` if an attribute is not declared
    /// - `TypeMismatch` if an attribute has the wrong type
    pub fn associate_at(
        &self,
        client: ClientId,
        car: CarId,
        attributes: &Attributes,
        now: DateTime<Utc>,
    ) -> Result<(Store, AssociationId)> {
        let table = self.association_table_name();
        if !self.clients.exists(client.row_id()) {
            return Err(Error::referential_integrity(table, CLIENT_ID, client.row_id()));
        }
        if !self.cars.exists(car.row_id()) {
            let column = if self.links.is_some() { CAR_ID } else { "id" };
            return Err(Error::referential_integrity(table, column, car.row_id()));
        }

        match &self.links {
            Some(links) => self.insert_link(links, client, car, attributes, now),
            None => self.set_foreign_key(client, car, attributes),
        }
    }

    fn insert_link(
        &self,
        links: &Table,
        client: ClientId,
        car: CarId,
        attributes: &Attributes,
        now: DateTime<Utc>,
    ) -> Result<(Store, AssociationId)> {
        if let Some(name) = [CLIENT_ID, CAR_ID].into_iter().find(|n| attributes.contains(n)) {
            return Err(Error::unknown_attribute(links.name(), name));
        }

        let mut links = links.clone();
        let id = links.insert(&ClientCar::values(client, car, attributes), now)?;

        let mut index = (*self.index).clone();
        index.insert(id, client.row_id(), car.row_id());
        trace!(association = %id, %client, %car, "associated");

        let store = Store {
            links: Some(Arc::new(links)),
            index: Arc::new(index),
            ..self.clone()
        };
        Ok((store, AssociationId::new(id)))
    }

    fn set_foreign_key(
        &self,
        client: ClientId,
        car: CarId,
        attributes: &Attributes,
    ) -> Result<(Store, AssociationId)> {
        if let Some((name, _)) = attributes.iter().next() {
            return Err(Error::unknown_attribute(CAR, name));
        }

        let mut cars = (*self.cars).clone();
        let mut index = (*self.index).clone();

        if let Some(previous) = self.owner_of(car) {
            index.remove(car.row_id(), previous.row_id(), car.row_id());
            trace!(%car, %previous, %client, "foreign key overwritten");
        }
        cars.update(car.row_id(), CLIENT_ID, Value::Ref(client.row_id()))?;
        index.insert(car.row_id(), client.row_id(), car.row_id());
        trace!(%client, %car, "associated");

        let store = Store {
            cars: Arc::new(cars),
            index: Arc::new(index),
            ..self.clone()
        };
        Ok((store, AssociationId::new(car.row_id())))
    }

    /// Removes one association.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the association does not exist.
    pub fn dissociate(&self, association: AssociationId) -> Result<Store> {
        let link = self.association(association)?;
        let mut store = self.clone();
        store.drop_link(&link)?;
        trace!(%association, "dissociated");
        Ok(store)
    }

    /// Deletes a client and applies the delete policy to its associations.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the client does not exist, and `Restricted`
    /// if the policy is `Restrict` and associations exist.
    pub fn delete_client(&self, client: ClientId) -> Result<Store> {
        self.clients.validate(client.row_id())?;
        self.check_restrict(CLIENT, client.row_id(), self.index.client_degree(client.row_id()))?;
        let dependents = self.associations_for_client(client)?;

        let mut store = self.clone();
        for link in &dependents {
            match self.schema.on_delete {
                OnDelete::Cascade => store.drop_car(link.car_id)?,
                _ => store.drop_link(link)?,
            }
        }

        let mut clients = (*store.clients).clone();
        clients.remove(client.row_id())?;
        store.clients = Arc::new(clients);
        trace!(%client, associations = dependents.len(), policy = ?self.schema.on_delete, "deleted client");
        Ok(store)
    }

    /// Deletes a car and its associations.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the car does not exist, and `Restricted` if
    /// the policy is `Restrict` and associations exist.
    pub fn delete_car(&self, car: CarId) -> Result<Store> {
        self.cars.validate(car.row_id())?;
        let dependents = self.index.car_degree(car.row_id());
        self.check_restrict(CAR, car.row_id(), dependents)?;

        let mut store = self.clone();
        store.drop_car(car)?;
        trace!(%car, associations = dependents, "deleted car");
        Ok(store)
    }

    fn check_restrict(&self, table: &str, id: RowId, dependents: usize) -> Result<()> {
        if self.schema.on_delete == OnDelete::Restrict && dependents > 0 {
            return Err(Error::restricted(table, id, dependents));
        }
        Ok(())
    }

    /// Removes a car row and every association that references it.
    fn drop_car(&mut self, car: CarId) -> Result<()> {
        for link in self.associations_for_car(car)? {
            self.drop_link(&link)?;
        }
        let mut cars = (*self.cars).clone();
        cars.remove(car.row_id())?;
        self.cars = Arc::new(cars);
        Ok(())
    }

    /// Removes one association from the table (or clears the foreign key) and
    /// from the index.
    fn drop_link(&mut self, link: &ClientCar) -> Result<()> {
        match &self.links {
            Some(links) => {
                let mut links = (**links).clone();
                links.remove(link.id.row_id())?;
                self.links = Some(Arc::new(links));
            }
            None => {
                let mut cars = (*self.cars).clone();
                cars.update(link.car_id.row_id(), CLIENT_ID, Value::Nil)?;
                self.cars = Arc::new(cars);
            }
        }

        let mut index = (*self.index).clone();
        index.remove(link.id.row_id(), link.client_id.row_id(), link.car_id.row_id());
        self.index = Arc::new(index);
        Ok(())
    }

    // --- Navigation ---

    /// Cars associated with a client, in association insertion order.
    ///
    /// A car associated twice appears twice.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the client does not exist.
    pub fn cars_for_client(&self, client: ClientId) -> Result<Vec<Car>> {
        self.clients.validate(client.row_id())?;
        self.index
            .for_client(client.row_id())
            .map(|(_, car)| self.car(CarId::new(car)))
            .collect()
    }

    /// Clients associated with a car, in association insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the car does not exist.
    pub fn clients_for_car(&self, car: CarId) -> Result<Vec<Client>> {
        self.cars.validate(car.row_id())?;
        self.index
            .for_car(car.row_id())
            .map(|(_, client)| self.client(ClientId::new(client)))
            .collect()
    }

    /// Associations held by a client, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the client does not exist.
    pub fn associations_for_client(&self, client: ClientId) -> Result<Vec<ClientCar>> {
        self.clients.validate(client.row_id())?;
        self.index
            .for_client(client.row_id())
            .map(|(id, _)| self.association(AssociationId::new(id)))
            .collect()
    }

    /// Associations held by a car, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the car does not exist.
    pub fn associations_for_car(&self, car: CarId) -> Result<Vec<ClientCar>> {
        self.cars.validate(car.row_id())?;
        self.index
            .for_car(car.row_id())
            .map(|(id, _)| self.association(AssociationId::new(id)))
            .collect()
    }

    // --- Reads ---

    /// Gets a client by identifier.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the client does not exist.
    pub fn client(&self, id: ClientId) -> Result<Client> {
        read(&self.clients, id.row_id())
    }

    /// Gets a car by identifier.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the car does not exist.
    pub fn car(&self, id: CarId) -> Result<Car> {
        read(&self.cars, id.row_id())
    }

    /// Gets an association by identifier.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the association does not exist.
    pub fn association(&self, id: AssociationId) -> Result<ClientCar> {
        match &self.links {
            Some(links) => read(links, id.row_id()),
            None => {
                let car = self.car(CarId::new(id.row_id()))?;
                let client_id = car
                    .client_id
                    .ok_or_else(|| Error::row_not_found(CAR, id.row_id()))?;
                Ok(ClientCar {
                    id,
                    client_id,
                    car_id: car.id,
                    attributes: Attributes::new(),
                })
            }
        }
    }

    /// All clients in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if a stored row no longer matches its schema.
    pub fn clients(&self) -> Result<Vec<Client>> {
        read_all(&self.clients)
    }

    /// All cars in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if a stored row no longer matches its schema.
    pub fn cars(&self) -> Result<Vec<Car>> {
        read_all(&self.cars)
    }

    /// All associations in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if a stored row no longer matches its schema.
    pub fn associations(&self) -> Result<Vec<ClientCar>> {
        match &self.links {
            Some(links) => read_all(links),
            None => self
                .cars()?
                .into_iter()
                .filter_map(|car| {
                    car.client_id.map(|client_id| ClientCar {
                        id: AssociationId::new(car.id.row_id()),
                        client_id,
                        car_id: car.id,
                        attributes: Attributes::new(),
                    })
                })
                .map(Ok)
                .collect(),
        }
    }

    /// First client with the given full name.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if a stored row no longer matches its schema.
    pub fn find_client_by_name(&self, fullname: &str) -> Result<Option<Client>> {
        let wanted = Value::from(fullname);
        find_first(&self.clients, FULLNAME, &wanted)
    }

    /// First car with the given model name.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if a stored row no longer matches its schema.
    pub fn find_car_by_model(&self, model: &str) -> Result<Option<Car>> {
        let wanted = Value::from(model);
        find_first(&self.cars, MODEL, &wanted)
    }

    /// The client currently holding a car's foreign key.
    fn owner_of(&self, car: CarId) -> Option<ClientId> {
        self.cars
            .value(car.row_id(), CLIENT_ID)
            .and_then(Value::as_ref_id)
            .map(ClientId::new)
    }

    fn association_table_name(&self) -> &str {
        self.links.as_deref().map_or(CAR, Table::name)
    }

    /// Number of clients.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Number of cars.
    #[must_use]
    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    /// Number of associations.
    #[must_use]
    pub fn association_count(&self) -> usize {
        match &self.links {
            Some(links) => links.len(),
            None => self
                .cars
                .iter()
                .filter(|(id, _)| self.owner_of(CarId::new(*id)).is_some())
                .count(),
        }
    }
}

fn read<R: Record>(table: &Table, id: RowId) -> Result<R> {
    let row = table.get(id).ok_or_else(|| Error::row_not_found(R::TABLE, id))?;
    R::from_row(id, table.schema(), row)
}

fn read_all<R: Record>(table: &Table) -> Result<Vec<R>> {
    table
        .iter()
        .map(|(id, row)| R::from_row(id, table.schema(), row))
        .collect()
}

fn find_first<R: Record>(table: &Table, column: &str, wanted: &Value) -> Result<Option<R>> {
    table
        .iter()
        .find(|(id, _)| table.value(*id, column) == Some(wanted))
        .map(|(id, row)| R::from_row(id, table.schema(), row))
        .transpose()
}
