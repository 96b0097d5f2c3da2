//! Integration tests for associating clients with cars and navigating both ways

use chrono::{TimeZone, Utc};
use junction_foundation::ErrorKind;
use junction_storage::{AssociationSchema, Attributes, CarId, ClientId, IS_RENTED, Store};
use proptest::prelude::*;

fn models(store: &Store, client: ClientId) -> Vec<String> {
    store
        .cars_for_client(client)
        .unwrap()
        .into_iter()
        .map(|c| c.model)
        .collect()
}

fn names(store: &Store, car: CarId) -> Vec<Option<String>> {
    store
        .clients_for_car(car)
        .unwrap()
        .into_iter()
        .map(|c| c.fullname)
        .collect()
}

// =============================================================================
// Join Table
// =============================================================================

#[test]
fn client_without_associations_has_no_cars() {
    let (store, john) = Store::new(AssociationSchema::join_table())
        .unwrap()
        .create_client(Some("John Doe"))
        .unwrap();
    assert!(store.cars_for_client(john).unwrap().is_empty());
}

#[test]
fn unknown_client_navigation_is_row_not_found() {
    let store = Store::new(AssociationSchema::join_table()).unwrap();
    let err = store.cars_for_client(ClientId::from(1)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::RowNotFound { .. }));
}

#[test]
fn cars_come_back_in_association_order() {
    let store = Store::new(AssociationSchema::join_table()).unwrap();
    let (store, john) = store.create_client(Some("John Doe")).unwrap();
    let (store, tesla) = store.create_car("Tesla Model S").unwrap();
    let (store, ferrari) = store.create_car("Ferrari 458").unwrap();
    let (store, _) = store.associate(john, ferrari, &Attributes::new()).unwrap();
    let (store, _) = store.associate(john, tesla, &Attributes::new()).unwrap();

    assert_eq!(models(&store, john), vec!["Ferrari 458", "Tesla Model S"]);
}

#[test]
fn same_pair_twice_creates_two_rows() {
    let store = Store::new(AssociationSchema::join_table()).unwrap();
    let (store, john) = store.create_client(Some("John Doe")).unwrap();
    let (store, tesla) = store.create_car("Tesla Model S").unwrap();
    let (store, a) = store.associate(john, tesla, &Attributes::new()).unwrap();
    let (store, b) = store.associate(john, tesla, &Attributes::new()).unwrap();

    assert_ne!(a, b);
    assert_eq!(store.association_count(), 2);
    assert_eq!(models(&store, john).len(), 2);
}

#[test]
fn failed_associate_leaves_store_unchanged() {
    let store = Store::new(AssociationSchema::rental()).unwrap();
    let (store, john) = store.create_client(Some("John Doe")).unwrap();
    let (store, tesla) = store.create_car("Tesla Model S").unwrap();

    let before = store.clone();
    let err = store
        .associate(john, tesla, &Attributes::new().with(IS_RENTED, "yes"))
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    assert_eq!(store, before);
}

#[test]
fn rental_rows_keep_their_own_timestamp() {
    let first = Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap();
    let second = Utc.with_ymd_and_hms(2024, 1, 21, 8, 15, 0).unwrap();

    let store = Store::new(AssociationSchema::rental()).unwrap();
    let (store, john) = store.create_client(Some("John Doe")).unwrap();
    let (store, tesla) = store.create_car("Tesla Model S").unwrap();
    let attrs = Attributes::new().with(IS_RENTED, true);
    let (store, a) = store.associate_at(john, tesla, &attrs, first).unwrap();
    let (store, b) = store.associate_at(john, tesla, &attrs, second).unwrap();

    assert_eq!(store.association(a).unwrap().rented_time(), Some(first));
    assert_eq!(store.association(b).unwrap().rented_time(), Some(second));
}

// =============================================================================
// Foreign Key
// =============================================================================

#[test]
fn foreign_key_car_follows_latest_client() {
    let store = Store::new(AssociationSchema::foreign_key()).unwrap();
    let (store, john) = store.create_client(Some("John Doe")).unwrap();
    let (store, jane) = store.create_client(Some("Jane Doe")).unwrap();
    let (store, tesla) = store.create_car("Tesla Model S").unwrap();

    let (store, _) = store.associate(john, tesla, &Attributes::new()).unwrap();
    assert_eq!(names(&store, tesla), vec![Some("John Doe".to_string())]);

    let (store, _) = store.associate(jane, tesla, &Attributes::new()).unwrap();
    assert_eq!(names(&store, tesla), vec![Some("Jane Doe".to_string())]);
    assert!(models(&store, john).is_empty());
    assert_eq!(store.car(tesla).unwrap().client_id, Some(jane));
}

#[test]
fn foreign_key_associations_view() {
    let store = Store::new(AssociationSchema::foreign_key()).unwrap();
    let (store, john) = store.create_client(Some("John Doe")).unwrap();
    let (store, _) = store.create_car("Tesla Model S").unwrap();
    let (store, ferrari) = store.create_car("Ferrari 458").unwrap();
    let (store, link) = store.associate(john, ferrari, &Attributes::new()).unwrap();

    let all = store.associations().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, link);
    assert_eq!(all[0].car_id, ferrari);
    assert!(all[0].attributes.is_empty());
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn associate_is_visible_from_both_sides(
        pairs in proptest::collection::vec((0usize..4, 0usize..4), 1..24)
    ) {
        let mut store = Store::new(AssociationSchema::join_table()).unwrap();
        let mut clients = Vec::new();
        let mut cars = Vec::new();
        for i in 0..4 {
            let (next, client) = store.create_client(Some(format!("Client {i}").as_str())).unwrap();
            let (next, car) = next.create_car(&format!("Model {i}")).unwrap();
            store = next;
            clients.push(client);
            cars.push(car);
        }

        for (c, x) in &pairs {
            let (next, _) = store.associate(clients[*c], cars[*x], &Attributes::new()).unwrap();
            store = next;
        }

        for (c, x) in &pairs {
            let car_ids: Vec<_> = store.cars_for_client(clients[*c]).unwrap().iter().map(|car| car.id).collect();
            let client_ids: Vec<_> = store.clients_for_car(cars[*x]).unwrap().iter().map(|cl| cl.id).collect();
            prop_assert!(car_ids.contains(&cars[*x]));
            prop_assert!(client_ids.contains(&clients[*c]));
        }
        prop_assert_eq!(store.association_count(), pairs.len());
    }

    #[test]
    fn missing_client_never_creates_rows(missing in 2u64..1_000) {
        let store = Store::new(AssociationSchema::join_table()).unwrap();
        let (store, _) = store.create_client(None).unwrap();
        let (store, car) = store.create_car("Tesla Model S").unwrap();

        let err = store.associate(ClientId::from(missing), car, &Attributes::new()).unwrap_err();
        prop_assert!(err.is_referential_integrity());
        prop_assert_eq!(store.association_count(), 0);
    }
}
