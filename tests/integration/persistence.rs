//! Store files: commit persistence, reopening, and reset

use junction_foundation::ErrorKind;
use junction_runtime::{Session, SessionConfig, serialize};
use junction_storage::{AssociationSchema, Attributes, IS_RENTED};

fn config(dir: &tempfile::TempDir) -> SessionConfig {
    SessionConfig::at(dir.path().join("junction_07.msgpack")).with_schema(AssociationSchema::rental())
}

#[test]
fn open_writes_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let session = Session::open(config.clone()).unwrap();

    let on_disk = serialize::load_from_file(config.path.as_ref().unwrap()).unwrap();
    assert_eq!(&on_disk, session.store());
}

#[test]
fn committed_transaction_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let (john, tesla) = {
        let mut session = Session::open(config(&dir)).unwrap();
        session
            .transaction(|tx| {
                let john = tx.create_client(Some("John Doe"))?;
                let tesla = tx.create_car("Tesla Model S")?;
                tx.associate(john, tesla, &Attributes::new().with(IS_RENTED, true))?;
                Ok((john, tesla))
            })
            .unwrap()
    };

    let session = Session::open(config(&dir)).unwrap();
    let store = session.store();
    assert_eq!(store.cars_for_client(john).unwrap()[0].id, tesla);
    assert_eq!(store.associations().unwrap()[0].is_rented(), Some(true));
}

#[test]
fn rolled_back_transaction_is_not_persisted() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = Session::open(config(&dir)).unwrap();
        let mut tx = session.begin();
        tx.create_client(Some("John Doe")).unwrap();
        tx.rollback();
    }

    let session = Session::open(config(&dir)).unwrap();
    assert_eq!(session.store().client_count(), 0);
}

#[test]
fn reset_discards_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = Session::open(config(&dir)).unwrap();
        session.transaction(|tx| tx.create_car("Ferrari 458")).unwrap();
    }

    let session = Session::open(config(&dir).with_reset(true)).unwrap();
    assert_eq!(session.store().car_count(), 0);

    let reopened = Session::open(config(&dir)).unwrap();
    assert_eq!(reopened.store().car_count(), 0);
}

#[test]
fn ids_continue_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let first = {
        let mut session = Session::open(config(&dir)).unwrap();
        session.transaction(|tx| tx.create_car("Tesla Model S")).unwrap()
    };

    let mut session = Session::open(config(&dir)).unwrap();
    let second = session.transaction(|tx| tx.create_car("Tesla Model S")).unwrap();
    assert!(second > first);
}

#[test]
fn schema_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    Session::open(config(&dir)).unwrap();

    let other = config(&dir).with_schema(AssociationSchema::join_table());
    let err = Session::open(other).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::InvalidSchema(_)));
    assert_eq!(err.context.and_then(|c| c.operation).as_deref(), Some("open"));
}

#[test]
fn failed_persist_keeps_previous_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone").join("junction_02.msgpack");
    std::fs::create_dir(path.parent().unwrap()).unwrap();

    let mut session = Session::open(SessionConfig::at(&path)).unwrap();
    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();

    let err = session.transaction(|tx| tx.create_client(Some("John Doe"))).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
    assert_eq!(session.store().client_count(), 0);
}

#[test]
fn corrupt_file_is_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    std::fs::write(config.path.as_ref().unwrap(), b"not a snapshot").unwrap();

    let err = Session::open(config).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Serialization(_)));
}
