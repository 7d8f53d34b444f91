use super::*;
use crate::cluster::{self, ClusterEntry, ClusterKey};

#[test]
fn parses_subset_keys() {
    assert_eq!(
        ClusterKey::parse("outbound|9080|v2|reviews.bookinfo.svc.cluster.local"),
        ClusterKey {
            direction: "outbound",
            port: 9080,
            subset: "v2",
            fqdn: "reviews.bookinfo.svc.cluster.local",
        }
    );
}

#[test]
fn ignores_trailing_key_fields() {
    assert_eq!(
        ClusterKey::parse("outbound|9080||reviews.bookinfo.svc.cluster.local|extra"),
        ClusterKey {
            direction: "outbound",
            port: 9080,
            subset: "",
            fqdn: "reviews.bookinfo.svc.cluster.local",
        }
    );
}

#[test]
fn short_names_use_placeholders() {
    for name in ["BlackHoleCluster", "inbound|8080", "outbound|80|v1", ""] {
        let entry = ClusterEntry::from_cluster(&crate::envoy::cluster::Cluster {
            name: name.to_string(),
            ..Default::default()
        });
        assert_eq!(entry.fqdn, name);
        assert_eq!(entry.direction, "-");
        assert_eq!(entry.subset, "-");
        assert_eq!(entry.port, 0);
        assert_eq!(entry.discovery_type, "STATIC");
    }
}

#[test]
fn projects_clusters() {
    let mut reviews = cluster("outbound|9080|v2|reviews.bookinfo.svc.cluster.local");
    reviews["metadata"] = json!({
        "filter_metadata": {
            "istio": {
                "config": "/apis/networking.istio.io/v1alpha3/namespaces/bookinfo/destination-rule/reviews",
                "default_original_port": 9080,
            },
        },
    });
    let mut ratings = cluster("outbound|9080||ratings.bookinfo.svc.cluster.local");
    ratings["metadata"] = json!({
        "filter_metadata": { "istio": { "config": "/apis/other" } },
    });
    let snapshot = snapshot(vec![clusters_dump(
        vec![json!({ "@type": type_url::CLUSTER, "name": "BlackHoleCluster" })],
        vec![reviews, ratings],
    )]);

    assert_eq!(
        cluster::project(&snapshot).unwrap(),
        vec![
            ClusterEntry {
                fqdn: "BlackHoleCluster".to_string(),
                port: 0,
                subset: "-".to_string(),
                direction: "-".to_string(),
                discovery_type: "STATIC".to_string(),
                destination_rule: "".to_string(),
            },
            ClusterEntry {
                fqdn: "reviews.bookinfo.svc.cluster.local".to_string(),
                port: 9080,
                subset: "v2".to_string(),
                direction: "outbound".to_string(),
                discovery_type: "EDS".to_string(),
                destination_rule: "reviews.bookinfo".to_string(),
            },
            ClusterEntry {
                fqdn: "ratings.bookinfo.svc.cluster.local".to_string(),
                port: 9080,
                subset: "-".to_string(),
                direction: "outbound".to_string(),
                discovery_type: "EDS".to_string(),
                destination_rule: "<unknown>".to_string(),
            },
        ]
    );
}

#[test]
fn absent_section_projects_nothing() {
    assert!(cluster::project(&snapshot(vec![])).unwrap().is_empty());
}

#[test]
fn projection_is_repeatable() {
    let snapshot = snapshot(vec![clusters_dump(
        vec![cluster("a"), cluster("outbound|80||b.ns.svc.cluster.local")],
        vec![cluster("inbound|8080||")],
    )]);
    let first = serde_json::to_vec(&cluster::project(&snapshot).unwrap()).unwrap();
    let second = serde_json::to_vec(&cluster::project(&snapshot).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn decodes_camel_case_dumps() {
    let dump = json!({
        "@type": type_url::CLUSTERS_CONFIG_DUMP,
        "staticClusters": [{ "cluster": cluster("outbound|80||a.default.svc.cluster.local") }],
        "dynamicActiveClusters": [{
            "versionInfo": "2024-01-01T00:00:00Z/1",
            "cluster": cluster("outbound|9080|v1|b.default.svc.cluster.local"),
            "lastUpdated": "2024-01-01T00:00:00Z",
        }],
    });
    let rows = cluster::project(&snapshot(vec![dump])).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].fqdn, "a.default.svc.cluster.local");
    assert_eq!(rows[0].port, 80);
    assert_eq!(rows[1].subset, "v1");
}

#[test]
fn entries_serialize_with_display_names() {
    let entry = ClusterEntry {
        fqdn: "a.ns.svc.cluster.local".to_string(),
        port: 80,
        subset: "-".to_string(),
        direction: "outbound".to_string(),
        discovery_type: "EDS".to_string(),
        destination_rule: "a.ns".to_string(),
    };
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(
        value,
        json!({
            "fqdn": "a.ns.svc.cluster.local",
            "port": 80,
            "subset": "-",
            "direction": "outbound",
            "type": "EDS",
            "destinationRule": "a.ns",
        })
    );
    assert_eq!(serde_json::from_value::<ClusterEntry>(value).unwrap(), entry);
}
