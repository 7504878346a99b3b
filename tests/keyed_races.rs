//! Concurrency tests: keyed read-modify-write sequences must never lose
//! an update against the shared fake store.

use std::sync::Arc;

use serde_json::json;
use stratus::test_support::FakeRemote;
use stratus::{PollTuning, Provisioner, Route};

fn fast_tuning() -> PollTuning {
    PollTuning {
        timeout_secs: 5,
        initial_delay_secs: 0,
        min_poll_interval_secs: 0,
    }
}

const ROUTERS: &str = "routers";

fn seeded_router(remote: &FakeRemote, id: &str) {
    remote.insert(ROUTERS, id, json!({"status": "ACTIVE", "routes": []}));
}

fn stored_route_count(remote: &FakeRemote, id: &str) -> usize {
    remote
        .object(ROUTERS, id)
        .and_then(|fields| {
            fields
                .get("routes")
                .and_then(serde_json::Value::as_array)
                .map(Vec::len)
        })
        .unwrap_or(0)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_to_one_router_all_survive() {
    let remote = FakeRemote::new();
    seeded_router(&remote, "r1");
    let provisioner = Arc::new(Provisioner::new(remote.clone(), fast_tuning()));

    let mut tasks = Vec::new();
    for worker in 0..2 {
        let shared = Arc::clone(&provisioner);
        tasks.push(tokio::spawn(async move {
            for index in 0..5 {
                let route = Route::new(
                    format!("10.{worker}.{index}.0/24"),
                    format!("10.{worker}.0.1"),
                );
                shared
                    .add_router_route("r1", &route)
                    .await
                    .unwrap_or_else(|err| panic!("append must succeed: {err}"));
            }
        }));
    }
    for task in tasks {
        task.await.unwrap_or_else(|err| panic!("worker panicked: {err}"));
    }

    assert_eq!(
        stored_route_count(&remote, "r1"),
        10,
        "every concurrently appended route must survive"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn distinct_routers_do_not_contend() {
    let remote = FakeRemote::new();
    seeded_router(&remote, "r1");
    seeded_router(&remote, "r2");
    let provisioner = Provisioner::new(remote.clone(), fast_tuning());

    let route_one = Route::new("10.0.0.0/24", "10.0.0.1");
    let route_two = Route::new("10.1.0.0/24", "10.1.0.1");
    let (first, second) = tokio::join!(
        provisioner.add_router_route("r1", &route_one),
        provisioner.add_router_route("r2", &route_two),
    );
    first.unwrap_or_else(|err| panic!("r1 append must succeed: {err}"));
    second.unwrap_or_else(|err| panic!("r2 append must succeed: {err}"));

    assert_eq!(stored_route_count(&remote, "r1"), 1);
    assert_eq!(stored_route_count(&remote, "r2"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_add_and_remove_serialise() {
    let remote = FakeRemote::new();
    remote.insert(
        ROUTERS,
        "r1",
        json!({"status": "ACTIVE", "routes": [
            {"destination": "192.168.0.0/24", "nexthop": "10.0.0.2"}
        ]}),
    );
    let provisioner = Arc::new(Provisioner::new(remote.clone(), fast_tuning()));

    let adder = Arc::clone(&provisioner);
    let add = tokio::spawn(async move {
        adder
            .add_router_route("r1", &Route::new("10.0.0.0/24", "10.0.0.1"))
            .await
    });
    let remover = Arc::clone(&provisioner);
    let remove = tokio::spawn(async move {
        remover
            .remove_router_route("r1", &Route::new("192.168.0.0/24", "10.0.0.2"))
            .await
    });

    add.await
        .unwrap_or_else(|err| panic!("add task panicked: {err}"))
        .unwrap_or_else(|err| panic!("add must succeed: {err}"));
    remove
        .await
        .unwrap_or_else(|err| panic!("remove task panicked: {err}"))
        .unwrap_or_else(|err| panic!("remove must succeed: {err}"));

    let stored = remote
        .object(ROUTERS, "r1")
        .unwrap_or_else(|| panic!("router must exist"));
    assert_eq!(
        stored.get("routes"),
        Some(&json!([
            {"destination": "10.0.0.0/24", "nexthop": "10.0.0.1"}
        ])),
        "the add and the remove must both take effect"
    );
}
