//! Object lifecycle against the fake gateway: create, delete, clear, add.

mod common;

use common::{FakeGateway, ip};
use dynobj_core::{AddrRange, AddrSpec, DynObjEngine, Error};

fn engine(gateway: &FakeGateway) -> DynObjEngine {
    DynObjEngine::new(Box::new(gateway.handle()))
}

#[tokio::test]
async fn create_then_get_then_delete() {
    let gateway = FakeGateway::new();
    let engine = engine(&gateway);

    engine.create_object("obj1", false).await.unwrap();
    assert!(gateway.object_exists("obj1"));
    assert_eq!(engine.get_object("obj1").await.unwrap(), vec![]);

    engine.delete_object("obj1").await.unwrap();
    assert!(!gateway.object_exists("obj1"));
}

#[tokio::test]
async fn create_existing_object_respects_allow_flag() {
    let gateway = FakeGateway::new();
    let engine = engine(&gateway);
    gateway.seed("obj1", &[]);

    // Tolerated, and no command is sent
    engine.create_object("obj1", true).await.unwrap();
    assert!(gateway.mutations().is_empty());

    let err = engine.create_object("obj1", false).await.unwrap_err();
    assert!(matches!(err, Error::ObjectAlreadyExists(name) if name == "obj1"));
}

#[tokio::test]
async fn delete_missing_object_fails() {
    let gateway = FakeGateway::new();
    let err = engine(&gateway).delete_object("ghost").await.unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(name) if name == "ghost"));
    assert!(gateway.mutations().is_empty());
}

#[tokio::test]
async fn get_object_distinguishes_absent_from_empty() {
    let gateway = FakeGateway::new();
    let engine = engine(&gateway);
    gateway.seed("empty", &[]);

    assert_eq!(engine.find_object("empty").await.unwrap(), Some(vec![]));
    assert_eq!(engine.find_object("ghost").await.unwrap(), None);
    assert!(matches!(
        engine.get_object("ghost").await,
        Err(Error::ObjectNotFound(_))
    ));
}

#[tokio::test]
async fn clear_object_deletes_every_range_in_one_command() {
    let gateway = FakeGateway::new();
    gateway.seed(
        "obj1",
        &[(ip("10.0.0.1"), ip("10.0.0.5")), (ip("10.0.1.0"), ip("10.0.1.0"))],
    );

    engine(&gateway).clear_object("obj1").await.unwrap();

    assert_eq!(gateway.ranges("obj1").unwrap(), vec![]);
    assert_eq!(gateway.mutations().len(), 1);
}

#[tokio::test]
async fn clear_empty_object_sends_no_mutation() {
    let gateway = FakeGateway::new();
    gateway.seed("obj1", &[]);

    engine(&gateway).clear_object("obj1").await.unwrap();

    // Only the listing fetch happened
    assert!(gateway.mutations().is_empty());
    assert_eq!(gateway.executed().len(), 1);
}

#[tokio::test]
async fn add_addresses_batches_specs_into_one_command() {
    let gateway = FakeGateway::new();
    gateway.seed("obj1", &[]);
    let engine = engine(&gateway);

    let specs = [
        AddrSpec::parse("10.2.3.4/31").unwrap(),
        AddrSpec::parse("10.2.3.8-10.2.3.9").unwrap(),
        AddrSpec::parse("10.2.3.13").unwrap(),
    ];
    engine.add_addresses("obj1", &specs).await.unwrap();

    assert_eq!(
        gateway.ranges("obj1").unwrap(),
        vec![
            (ip("10.2.3.4"), ip("10.2.3.5")),
            (ip("10.2.3.8"), ip("10.2.3.9")),
            (ip("10.2.3.13"), ip("10.2.3.13")),
        ]
    );
    assert_eq!(gateway.mutations().len(), 1);
}

#[tokio::test]
async fn add_addresses_rejects_empty_list_before_any_round_trip() {
    let gateway = FakeGateway::new();
    gateway.seed("obj1", &[]);

    let err = engine(&gateway).add_addresses("obj1", &[]).await.unwrap_err();
    assert!(matches!(err, Error::EmptyAddressList));
    assert!(gateway.executed().is_empty());
}

#[tokio::test]
async fn listing_reports_gateway_order_unmodified() {
    // Overlapping, unsorted ranges come back exactly as stored
    let gateway = FakeGateway::new();
    gateway.seed(
        "obj1",
        &[(ip("10.0.0.9"), ip("10.0.0.12")), (ip("10.0.0.1"), ip("10.0.0.10"))],
    );

    let ranges = engine(&gateway).get_object("obj1").await.unwrap();
    assert_eq!(
        ranges,
        vec![
            AddrRange { begin: ip("10.0.0.9"), end: ip("10.0.0.12") },
            AddrRange { begin: ip("10.0.0.1"), end: ip("10.0.0.10") },
        ]
    );
}
