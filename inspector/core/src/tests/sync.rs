use crate::sync::{self, SyncEntry, SyncState};
use bytes::Bytes;
use maplit::btreemap;
use serde_json::json;

fn body(value: serde_json::Value) -> Bytes {
    Bytes::from(serde_json::to_vec(&value).unwrap())
}

#[test]
fn compares_sent_and_acked_nonces() {
    assert_eq!(SyncState::compare("", ""), SyncState::NotSent);
    assert_eq!(SyncState::compare("", "abc"), SyncState::NotSent);
    assert_eq!(SyncState::compare("abc", "abc"), SyncState::Synced);
    assert_eq!(SyncState::compare("abc", "abd"), SyncState::Stale);
    assert_eq!(SyncState::NotSent.to_string(), "NOT SENT");
}

#[test]
fn reports_each_replica_that_knows_the_proxy() {
    let replicas = btreemap! {
        "istiod-b".to_string() => body(json!([
            {
                "proxy": "reviews-v1-abc.bookinfo",
                "istio_version": "1.20.0",
                "cluster_sent": "n1", "cluster_acked": "n1",
                "listener_sent": "n2", "listener_acked": "n1",
                "route_sent": "n3", "route_acked": "n3",
            },
            { "proxy": "ratings-v1-def.bookinfo", "cluster_sent": "n1" },
        ])),
        "istiod-a".to_string() => body(json!([
            { "proxy": "ratings-v1-def.bookinfo", "cluster_sent": "n1" },
        ])),
    };

    assert_eq!(
        sync::project(&replicas, "reviews-v1-abc.bookinfo").unwrap(),
        vec![SyncEntry {
            replica: "istiod-b".to_string(),
            proxy: "reviews-v1-abc.bookinfo".to_string(),
            istio_version: "1.20.0".to_string(),
            cluster: SyncState::Synced,
            listener: SyncState::Stale,
            route: SyncState::Synced,
            endpoint: SyncState::NotSent,
        }]
    );
}

#[test]
fn malformed_replica_bodies_fail() {
    let replicas = btreemap! { "istiod-a".to_string() => Bytes::from_static(b"<html>") };
    assert!(sync::project(&replicas, "p.ns").is_err());
}

#[test]
fn entries_round_trip() {
    let entry = SyncEntry {
        replica: "istiod-a".to_string(),
        proxy: "p.ns".to_string(),
        istio_version: "1.20.0".to_string(),
        cluster: SyncState::Synced,
        listener: SyncState::Stale,
        route: SyncState::NotSent,
        endpoint: SyncState::Synced,
    };
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["route"], "NOT SENT");
    assert_eq!(json["istioVersion"], "1.20.0");
    assert_eq!(serde_json::from_value::<SyncEntry>(json).unwrap(), entry);
}
