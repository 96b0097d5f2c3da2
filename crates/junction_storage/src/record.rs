//! Typed records and their mapping to table rows.
//!
//! Each record type knows its table, offers a `values` builder for inserts,
//! and reads positional rows back by column name. No reflection is involved:
//! the mapping is written out per record.

use std::fmt;

use chrono::{DateTime, Utc};
use junction_foundation::{Error, ErrorKind, Result, RowId, Value};

use crate::catalog::{CAR, CAR_ID, CLIENT, CLIENT_CAR, CLIENT_ID, FULLNAME, MODEL};
use crate::row::{Attributes, Row};
use crate::schema::{IS_RENTED, RENTED_TIME, TableSchema};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(RowId);

        impl $name {
            /// Wraps a raw row identifier.
            #[must_use]
            pub const fn new(id: RowId) -> Self {
                Self(id)
            }

            /// Returns the underlying row identifier.
            #[must_use]
            pub const fn row_id(self) -> RowId {
                self.0
            }
        }

        impl From<RowId> for $name {
            fn from(id: RowId) -> Self {
                Self(id)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(RowId::new(raw))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(
    /// Identifier of a client row.
    ClientId
);
typed_id!(
    /// Identifier of a car row.
    CarId
);
typed_id!(
    /// Identifier of an association.
    ///
    /// Under foreign-key storage this is the identifier of the car whose
    /// foreign key carries the association.
    AssociationId
);

/// A typed view of a table row.
pub trait Record: Sized {
    /// Table the record lives in.
    const TABLE: &'static str;

    /// Rebuilds the record from a stored row.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the row does not match the schema.
    fn from_row(id: RowId, schema: &TableSchema, row: &Row) -> Result<Self>;
}

fn column<'r>(schema: &TableSchema, row: &'r Row, name: &str) -> Result<&'r Value> {
    schema
        .column_index(name)
        .and_then(|i| row.get(i))
        .ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!(
                "{} row has no {name} column",
                schema.name
            )))
        })
}

fn ref_column(schema: &TableSchema, row: &Row, name: &str) -> Result<RowId> {
    column(schema, row, name)?.as_ref_id().ok_or_else(|| {
        Error::new(ErrorKind::Internal(format!(
            "{}.{name} is not a row reference",
            schema.name
        )))
    })
}

/// A client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Client {
    /// Identifier.
    pub id: ClientId,
    /// Full name, if known.
    pub fullname: Option<String>,
}

impl Client {
    /// Values for inserting a client row.
    #[must_use]
    pub fn values(fullname: Option<&str>) -> Attributes {
        Attributes::new().with(FULLNAME, fullname)
    }
}

impl Record for Client {
    const TABLE: &'static str = CLIENT;

    fn from_row(id: RowId, schema: &TableSchema, row: &Row) -> Result<Self> {
        Ok(Self {
            id: ClientId(id),
            fullname: column(schema, row, FULLNAME)?.as_str().map(str::to_owned),
        })
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fullname {
            Some(name) => write!(f, "Client(id={}, fullname='{name}')", self.id),
            None => write!(f, "Client(id={}, fullname=None)", self.id),
        }
    }
}

/// A car.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Car {
    /// Identifier.
    pub id: CarId,
    /// Model name.
    pub model: String,
    /// Owning client, under foreign-key storage only.
    pub client_id: Option<ClientId>,
}

impl Car {
    /// Values for inserting a car row.
    #[must_use]
    pub fn values(model: &str) -> Attributes {
        Attributes::new().with(MODEL, model)
    }
}

impl Record for Car {
    const TABLE: &'static str = CAR;

    fn from_row(id: RowId, schema: &TableSchema, row: &Row) -> Result<Self> {
        let model = column(schema, row, MODEL)?
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::new(ErrorKind::Internal("car.model is not text".into())))?;
        let client_id = match schema.column_index(CLIENT_ID) {
            Some(_) => column(schema, row, CLIENT_ID)?.as_ref_id().map(ClientId),
            None => None,
        };
        Ok(Self {
            id: CarId(id),
            model,
            client_id,
        })
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Car(id={}, model='{}')", self.id, self.model)
    }
}

/// An association between a client and a car.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCar {
    /// Identifier.
    pub id: AssociationId,
    /// The associated client.
    pub client_id: ClientId,
    /// The associated car.
    pub car_id: CarId,
    /// Extra attributes declared by the association schema.
    pub attributes: Attributes,
}

impl ClientCar {
    /// Values for inserting an association row.
    #[must_use]
    pub fn values(client: ClientId, car: CarId, extra: &Attributes) -> Attributes {
        extra
            .iter()
            .fold(Attributes::new(), |acc, (name, value)| acc.with(name, value.clone()))
            .with(CLIENT_ID, client.row_id())
            .with(CAR_ID, car.row_id())
    }

    /// When the association was created, if the schema records it.
    #[must_use]
    pub fn rented_time(&self) -> Option<DateTime<Utc>> {
        self.attributes.get(RENTED_TIME).and_then(Value::as_timestamp)
    }

    /// Whether the car is currently rented, if the schema records it.
    #[must_use]
    pub fn is_rented(&self) -> Option<bool> {
        self.attributes.get(IS_RENTED).and_then(Value::as_bool)
    }
}

impl Record for ClientCar {
    const TABLE: &'static str = CLIENT_CAR;

    fn from_row(id: RowId, schema: &TableSchema, row: &Row) -> Result<Self> {
        let attributes = schema
            .columns
            .iter()
            .zip(row.values())
            .filter(|(c, _)| c.name != CLIENT_ID && c.name != CAR_ID)
            .map(|(c, v)| (c.name.clone(), v.clone()))
            .collect();

        Ok(Self {
            id: AssociationId(id),
            client_id: ClientId(ref_column(schema, row, CLIENT_ID)?),
            car_id: CarId(ref_column(schema, row, CAR_ID)?),
            attributes,
        })
    }
}

impl fmt::Display for ClientCar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClientCar(id={}, client_id={}, car_id={}",
            self.id, self.client_id, self.car_id
        )?;
        for (name, value) in self.attributes.iter() {
            write!(f, ", {name}={value}")?;
        }
        write!(f, ")")
    }
}
