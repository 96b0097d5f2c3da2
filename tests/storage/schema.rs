//! Integration tests for table layouts and association schemas

use chrono::{TimeZone, Utc};
use junction_foundation::{ErrorKind, Type, Value};
use junction_storage::{
    AssociationSchema, Attributes, ColumnSchema, DefaultValue, IS_RENTED, LinkStorage, OnDelete,
    RENTED_TIME, Store, catalog,
};

#[test]
fn store_tables_follow_storage_mode() {
    let fk = Store::new(AssociationSchema::foreign_key()).unwrap();
    let rendered: Vec<String> = fk.tables().iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["client(id, fullname)", "car(id, model, client_id -> client.id)"]);

    let rental = Store::new(AssociationSchema::rental()).unwrap();
    assert_eq!(rental.tables().len(), 3);
    assert_eq!(
        rental.tables()[2].to_string(),
        "client_car(id, client_id -> client.id, car_id -> car.id, rented_time, is_rented)"
    );
}

#[test]
fn presets_carry_expected_attributes() {
    assert!(AssociationSchema::join_table().attributes.is_empty());

    let timestamped = AssociationSchema::timestamped();
    let rented_time = timestamped.attribute(RENTED_TIME).unwrap();
    assert_eq!(rented_time.default, Some(DefaultValue::CurrentTimestamp));
    assert!(timestamped.attribute(IS_RENTED).is_none());

    let rental = AssociationSchema::rental();
    let is_rented = rental.attribute(IS_RENTED).unwrap();
    assert!(is_rented.required);
    assert_eq!(is_rented.default, None);
}

#[test]
fn default_delete_policy_depends_on_storage() {
    assert_eq!(AssociationSchema::new(LinkStorage::JoinTable).on_delete, OnDelete::Remove);
    assert_eq!(AssociationSchema::new(LinkStorage::ForeignKey).on_delete, OnDelete::Cascade);
}

#[test]
fn custom_attribute_with_constant_default() {
    let schema = AssociationSchema::join_table().with_attribute(ColumnSchema::optional(
        "note",
        Type::Text,
        "walk-in".into(),
    ));
    let table = catalog::client_car_table(&schema).unwrap();
    assert_eq!(table.column_index("note"), Some(2));
    assert!(Store::new(schema).is_ok());
}

#[test]
fn inconsistent_schemas_are_rejected_by_store() {
    for schema in [
        AssociationSchema::join_table().with_on_delete(OnDelete::Cascade),
        AssociationSchema::foreign_key().with_attribute(ColumnSchema::required(IS_RENTED, Type::Bool)),
        AssociationSchema::rental().with_attribute(ColumnSchema::required(RENTED_TIME, Type::Timestamp)),
    ] {
        let err = Store::new(schema).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidSchema(_)));
    }
}

// =============================================================================
// Column Rules Through the Store
// =============================================================================

#[test]
fn blank_model_is_kept_but_empty_model_is_rejected() {
    let store = Store::new(AssociationSchema::join_table()).unwrap();

    let (store, blank) = store.create_car(" ").unwrap();
    assert_eq!(store.car(blank).unwrap().model, " ");
    assert!(store.create_car("").unwrap_err().is_validation());
}

#[test]
fn nil_rented_time_is_filled_like_an_omitted_one() {
    let now = Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap();
    let store = Store::new(AssociationSchema::timestamped()).unwrap();
    let (store, john) = store.create_client(Some("John Doe")).unwrap();
    let (store, tesla) = store.create_car("Tesla Model S").unwrap();

    let attrs = Attributes::new().with(RENTED_TIME, Value::Nil);
    let (store, link) = store.associate_at(john, tesla, &attrs, now).unwrap();

    assert_eq!(store.association(link).unwrap().rented_time(), Some(now));
}

#[test]
fn nil_is_rented_counts_as_missing() {
    let store = Store::new(AssociationSchema::rental()).unwrap();
    let (store, john) = store.create_client(Some("John Doe")).unwrap();
    let (store, tesla) = store.create_car("Tesla Model S").unwrap();

    let err = store
        .associate(john, tesla, &Attributes::new().with(IS_RENTED, Value::Nil))
        .unwrap_err();
    assert!(err.is_missing_attribute());
    assert_eq!(store.association_count(), 0);
}
