//! Table layouts for clients, cars, and their associations.

use junction_foundation::Type;

use crate::schema::{AssociationSchema, ColumnSchema, LinkStorage, TableSchema};

/// Client table name.
pub const CLIENT: &str = "client";
/// Car table name.
pub const CAR: &str = "car";
/// Association table name.
pub const CLIENT_CAR: &str = "client_car";

/// Client full name column.
pub const FULLNAME: &str = "fullname";
/// Car model column.
pub const MODEL: &str = "model";
/// Foreign key to the client table.
pub const CLIENT_ID: &str = "client_id";
/// Foreign key to the car table.
pub const CAR_ID: &str = "car_id";

/// `client(id, fullname)`
#[must_use]
pub fn client_table() -> TableSchema {
    TableSchema::new(CLIENT).with_column(ColumnSchema::optional_nil(FULLNAME, Type::option(Type::Text)))
}

/// `car(id, model)`, plus `client_id -> client.id` under foreign-key storage.
#[must_use]
pub fn car_table(storage: LinkStorage) -> TableSchema {
    let table = TableSchema::new(CAR).with_column(ColumnSchema::required(MODEL, Type::Text).non_empty());
    match storage {
        LinkStorage::ForeignKey => table
            .with_column(ColumnSchema::optional_nil(CLIENT_ID, Type::option(Type::Ref)))
            .with_foreign_key(CLIENT_ID, CLIENT),
        LinkStorage::JoinTable => table,
    }
}

/// `client_car(id, client_id -> client.id, car_id -> car.id, ...)` with the
/// schema's extra attributes appended. `None` under foreign-key storage.
#[must_use]
pub fn client_car_table(schema: &AssociationSchema) -> Option<TableSchema> {
    if schema.storage == LinkStorage::ForeignKey {
        return None;
    }

    let table = TableSchema::new(CLIENT_CAR)
        .with_column(ColumnSchema::required(CLIENT_ID, Type::Ref))
        .with_column(ColumnSchema::required(CAR_ID, Type::Ref))
        .with_foreign_key(CLIENT_ID, CLIENT)
        .with_foreign_key(CAR_ID, CAR);

    Some(
        schema
            .attributes
            .iter()
            .cloned()
            .fold(table, TableSchema::with_column),
    )
}
