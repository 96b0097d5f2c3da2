//! Integration tests for delete policies

use junction_foundation::ErrorKind;
use junction_storage::{AssociationSchema, Attributes, CarId, ClientId, OnDelete, Store};

/// John and Jane both associated with the Tesla; John also with the Ferrari.
fn rentals(schema: AssociationSchema) -> (Store, ClientId, ClientId, CarId, CarId) {
    let store = Store::new(schema).unwrap();
    let (store, john) = store.create_client(Some("John Doe")).unwrap();
    let (store, jane) = store.create_client(Some("Jane Doe")).unwrap();
    let (store, tesla) = store.create_car("Tesla Model S").unwrap();
    let (store, ferrari) = store.create_car("Ferrari 458").unwrap();
    let (store, _) = store.associate(john, tesla, &Attributes::new()).unwrap();
    let (store, _) = store.associate(jane, tesla, &Attributes::new()).unwrap();
    let (store, _) = store.associate(john, ferrari, &Attributes::new()).unwrap();
    (store, john, jane, tesla, ferrari)
}

#[test]
fn remove_policy_deletes_only_the_links() {
    let (store, john, jane, tesla, ferrari) = rentals(AssociationSchema::join_table());
    let store = store.delete_client(john).unwrap();

    assert_eq!(store.car_count(), 2);
    assert_eq!(store.association_count(), 1);
    assert_eq!(store.clients_for_car(tesla).unwrap()[0].id, jane);
    assert!(store.clients_for_car(ferrari).unwrap().is_empty());
}

#[test]
fn deleting_a_car_detaches_it_from_every_client() {
    let (store, john, jane, tesla, _) = rentals(AssociationSchema::join_table());
    let store = store.delete_car(tesla).unwrap();

    assert_eq!(store.cars_for_client(john).unwrap().len(), 1);
    assert!(store.cars_for_client(jane).unwrap().is_empty());
    assert_eq!(store.client_count(), 2);
}

#[test]
fn restrict_policy_rejects_and_changes_nothing() {
    let schema = AssociationSchema::join_table().with_on_delete(OnDelete::Restrict);
    let (store, john, _, _, _) = rentals(schema);

    let err = store.delete_client(john).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Restricted { dependents: 2, .. }));
    assert_eq!(store.client_count(), 2);
    assert_eq!(store.association_count(), 3);
}

#[test]
fn restrict_allows_clients_without_links() {
    let schema = AssociationSchema::join_table().with_on_delete(OnDelete::Restrict);
    let (store, _, _, _, _) = rentals(schema);
    let (store, walk_in) = store.create_client(None).unwrap();
    assert!(store.delete_client(walk_in).is_ok());
}

#[test]
fn deleting_twice_is_row_not_found() {
    let (store, john, _, _, _) = rentals(AssociationSchema::join_table());
    let store = store.delete_client(john).unwrap();
    let err = store.delete_client(john).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::RowNotFound { .. }));
}

#[test]
fn dissociate_removes_one_row() {
    let (store, john, _, tesla, _) = rentals(AssociationSchema::join_table());
    let link = store.associations_for_client(john).unwrap()[0].id;
    let store = store.dissociate(link).unwrap();

    assert_eq!(store.association_count(), 2);
    assert!(store.association(link).is_err());
    assert_eq!(store.clients_for_car(tesla).unwrap().len(), 1);
}

#[test]
fn foreign_key_cascade_takes_held_cars() {
    let store = Store::new(AssociationSchema::foreign_key()).unwrap();
    let (store, john) = store.create_client(Some("John Doe")).unwrap();
    let (store, tesla) = store.create_car("Tesla Model S").unwrap();
    let (store, ferrari) = store.create_car("Ferrari 458").unwrap();
    let (store, _) = store.associate(john, tesla, &Attributes::new()).unwrap();
    let (store, _) = store.associate(john, ferrari, &Attributes::new()).unwrap();

    let store = store.delete_client(john).unwrap();
    assert_eq!(store.car_count(), 0);
    assert_eq!(store.association_count(), 0);
}

#[test]
fn foreign_key_delete_car_keeps_client() {
    let store = Store::new(AssociationSchema::foreign_key()).unwrap();
    let (store, john) = store.create_client(Some("John Doe")).unwrap();
    let (store, tesla) = store.create_car("Tesla Model S").unwrap();
    let (store, _) = store.associate(john, tesla, &Attributes::new()).unwrap();

    let store = store.delete_car(tesla).unwrap();
    assert_eq!(store.client_count(), 1);
    assert!(store.cars_for_client(john).unwrap().is_empty());
}
