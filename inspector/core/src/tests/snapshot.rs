use super::*;
use crate::{
    envoy::{cluster::Cluster, listener::Listener},
    DecodeError, Section, SectionKind, Typed, TypedAny,
};

#[test]
fn rejects_malformed_envelopes() {
    let bodies: [&[u8]; 4] = [b"not json", b"[]", b"{}", b"{\"configs\": 3}"];
    for body in bodies {
        assert!(
            matches!(
                Snapshot::decode(body),
                Err(DecodeError::MalformedEnvelope(_))
            ),
            "{}",
            String::from_utf8_lossy(body)
        );
    }
}

#[test]
fn missing_sections_are_not_found() {
    let snapshot = snapshot(vec![json!({
        "@type": "type.googleapis.com/envoy.admin.v3.BootstrapConfigDump",
        "bootstrap": {},
    })]);

    for kind in [SectionKind::Clusters, SectionKind::Listeners, SectionKind::Routes] {
        match snapshot.section(kind) {
            Err(DecodeError::SectionNotFound { type_url }) => assert_eq!(type_url, kind.type_url()),
            other => panic!("unexpected result for {kind:?}: {other:?}"),
        }
    }
}

#[test]
fn empty_snapshot_has_no_sections() {
    let snapshot = snapshot(vec![]);
    assert!(snapshot.clusters().unwrap_err().is_not_found());
    assert!(snapshot.listeners().unwrap_err().is_not_found());
    assert!(snapshot.routes().unwrap_err().is_not_found());
}

#[test]
fn static_clusters_precede_dynamic_clusters() {
    let snapshot = snapshot(vec![clusters_dump(
        vec![cluster("prometheus_stats"), cluster("agent")],
        vec![cluster("outbound|80||a.default.svc.cluster.local")],
    )]);

    let names = snapshot
        .clusters()
        .unwrap()
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        ["prometheus_stats", "agent", "outbound|80||a.default.svc.cluster.local"]
    );
}

#[test]
fn entries_are_retagged_before_decoding() {
    let mut legacy = cluster("legacy");
    legacy["@type"] = json!("type.googleapis.com/envoy.api.v2.Cluster");
    let snapshot = snapshot(vec![clusters_dump(vec![legacy], vec![])]);

    let clusters = snapshot.clusters().unwrap();
    assert_eq!(clusters.skipped, 0);
    assert_eq!(clusters.items[0].name, "legacy");
}

#[test]
fn undecodable_entries_are_skipped() {
    let mut entries = (0..9).map(|i| cluster(&format!("c{i}"))).collect::<Vec<_>>();
    entries.insert(4, json!({ "@type": type_url::CLUSTER, "name": 42 }));
    let snapshot = snapshot(vec![clusters_dump(vec![], entries)]);

    let clusters = snapshot.clusters().unwrap();
    assert_eq!(clusters.len(), 9);
    assert_eq!(clusters.skipped, 1);
    assert_eq!(clusters.items[4].name, "c4");
}

#[test]
fn malformed_section_is_reported() {
    let snapshot = snapshot(vec![json!({
        "@type": type_url::CLUSTERS_CONFIG_DUMP,
        "static_clusters": "nope",
    })]);
    assert!(matches!(
        snapshot.clusters(),
        Err(DecodeError::MalformedSection { .. })
    ));
    // The failure is cached and reported again.
    assert!(matches!(
        snapshot.section(SectionKind::Clusters),
        Err(DecodeError::MalformedSection { .. })
    ));
}

#[test]
fn first_matching_section_wins() {
    let snapshot = snapshot(vec![
        clusters_dump(vec![cluster("first")], vec![]),
        clusters_dump(vec![cluster("second")], vec![]),
    ]);
    let Section::Clusters(clusters) = snapshot.section(SectionKind::Clusters).unwrap() else {
        panic!("expected clusters");
    };
    assert_eq!(clusters.items.len(), 1);
    assert_eq!(clusters.items[0].name, "first");
}

#[test]
fn only_active_dynamic_listeners_are_read() {
    let dump = json!({
        "@type": type_url::LISTENERS_CONFIG_DUMP,
        "static_listeners": [{ "listener": listener("static", "0.0.0.0", 15090, vec![]) }],
        "dynamic_listeners": [
            {
                "name": "active",
                "active_state": { "listener": listener("active", "0.0.0.0", 15006, vec![]) },
                "warming_state": { "listener": listener("warming", "0.0.0.0", 15006, vec![]) },
            },
            {
                "name": "warming-only",
                "warming_state": { "listener": listener("warming-only", "0.0.0.0", 80, vec![]) },
            },
        ],
    });
    let snapshot = snapshot(vec![dump]);

    let names = snapshot
        .listeners()
        .unwrap()
        .iter()
        .map(|l| l.name.clone())
        .collect::<Vec<_>>();
    assert_eq!(names, ["static", "active"]);
}

#[test]
fn unpack_requires_an_exact_tag() {
    let any: TypedAny = serde_json::from_value(json!({
        "@type": "type.googleapis.com/envoy.api.v2.Listener",
        "name": "l",
    }))
    .unwrap();
    assert!(!any.is::<Listener>());
    assert!(matches!(
        any.clone().unpack::<Listener>(),
        Err(DecodeError::TypeMismatch { expected, .. }) if expected == Listener::TYPE_URL
    ));
    assert_eq!(any.retag::<Listener>().unwrap().name, "l");
    assert!(any.retag::<Cluster>().is_ok(), "retagging ignores the original tag");
}

#[test]
fn type_tags_must_be_strings() {
    let res = serde_json::from_value::<TypedAny>(json!({ "@type": 7 }));
    assert!(res.is_err());
}
