use super::*;
use crate::route::{self, collapse_aliases, describe_domains, describe_match, RouteEntry};

fn vs_metadata(name: &str, ns: &str) -> Value {
    json!({
        "filter_metadata": {
            "istio": {
                "config": format!("/apis/networking.istio.io/v1alpha3/namespaces/{ns}/virtual-service/{name}"),
            },
        },
    })
}

#[test]
fn collapses_domain_aliases_to_the_longest_form() {
    assert_eq!(
        collapse_aliases(&["a.svc.cluster.local", "a.svc", "a"]),
        ["a.svc.cluster.local"]
    );
    assert_eq!(
        collapse_aliases(&["a", "b.ns.svc.cluster.local", "a.svc", "b.ns", "10.0.0.1"]),
        ["b.ns.svc.cluster.local", "a.svc", "10.0.0.1"]
    );
}

#[test]
fn drops_domains_with_ports() {
    let domains = [
        "reviews.bookinfo.svc.cluster.local",
        "reviews.bookinfo.svc.cluster.local:9080",
        "reviews",
        "reviews:9080",
        "reviews.bookinfo",
        "reviews.bookinfo.svc",
        "10.96.0.17",
        "10.96.0.17:9080",
        "[fd00:10:96::7fc7]",
        "[fd00:10:96::7fc7]:9080",
    ]
    .map(String::from);
    assert_eq!(
        describe_domains(&domains),
        [
            "reviews.bookinfo.svc.cluster.local",
            "reviews",
            "10.96.0.17",
            "[fd00:10:96::7fc7]"
        ]
    );
}

#[test]
fn describes_path_criteria_only() {
    let m = serde_json::from_value(json!({
        "prefix": "/api",
        "headers": [{ "name": "end-user", "string_match": { "exact": "jason" } }],
    }))
    .unwrap();
    assert_eq!(describe_match(&m), "/api*");

    let m = serde_json::from_value(json!({ "path": "/productpage" })).unwrap();
    assert_eq!(describe_match(&m), "/productpage");

    let m = serde_json::from_value(json!({ "safe_regex": { "regex": "/v[12]/.*" } })).unwrap();
    assert_eq!(describe_match(&m), "regex /v[12]/.*");
}

#[test]
fn projects_route_rows() {
    let config = json!({
        "@type": type_url::ROUTE_CONFIGURATION,
        "name": "9080",
        "virtual_hosts": [
            {
                "name": "reviews.bookinfo.svc.cluster.local:9080",
                "domains": ["reviews.bookinfo.svc.cluster.local", "reviews", "reviews:9080"],
                "routes": [
                    {
                        "match": { "prefix": "/", "headers": [{ "name": "end-user" }] },
                        "route": { "cluster": "outbound|9080|v2|reviews.bookinfo.svc.cluster.local" },
                        "metadata": vs_metadata("reviews", "bookinfo"),
                    },
                    {
                        "match": { "prefix": "/" },
                        "route": {
                            "weighted_clusters": {
                                "clusters": [
                                    { "name": "outbound|9080|v1|reviews.bookinfo.svc.cluster.local", "weight": 50 },
                                    { "name": "outbound|9080|v3|reviews.bookinfo.svc.cluster.local", "weight": 50 },
                                ],
                            },
                        },
                        "metadata": { "filter_metadata": { "istio": { "config": "/apis/odd" } } },
                    },
                ],
            },
            {
                "name": "allow_any",
                "domains": ["*"],
                "routes": [{ "match": { "prefix": "/" }, "route": { "cluster": "PassthroughCluster" } }],
            },
        ],
    });
    let snapshot = snapshot(vec![routes_dump(vec![], vec![config])]);

    let domains = vec![
        "reviews.bookinfo.svc.cluster.local".to_string(),
        "reviews".to_string(),
    ];
    assert_eq!(
        route::project(&snapshot).unwrap(),
        vec![
            RouteEntry {
                name: "9080".to_string(),
                domains: domains.clone(),
                route_match: "/*".to_string(),
                virtual_service: "reviews.bookinfo".to_string(),
            },
            RouteEntry {
                name: "9080".to_string(),
                domains,
                route_match: "/*".to_string(),
                virtual_service: "<unknown>".to_string(),
            },
            RouteEntry {
                name: "9080".to_string(),
                domains: vec!["*".to_string()],
                route_match: "/*".to_string(),
                virtual_service: "404".to_string(),
            },
        ]
    );
}

#[test]
fn virtual_hosts_without_routes_report_not_found() {
    let config = json!({
        "@type": type_url::ROUTE_CONFIGURATION,
        "name": "blackhole:80",
        "virtual_hosts": [{ "name": "blackhole", "domains": ["*"] }],
    });
    let snapshot = snapshot(vec![routes_dump(vec![config], vec![])]);
    assert_eq!(
        route::project(&snapshot).unwrap(),
        vec![RouteEntry {
            name: "blackhole:80".to_string(),
            domains: vec!["*".to_string()],
            route_match: "/*".to_string(),
            virtual_service: "404".to_string(),
        }]
    );
}

#[test]
fn passthrough_only_hosts_report_not_found() {
    let config = json!({
        "@type": type_url::ROUTE_CONFIGURATION,
        "name": "80",
        "virtual_hosts": [{
            "name": "allow_any",
            "domains": ["*"],
            "routes": [{ "match": { "prefix": "/" }, "route": { "cluster": "PassthroughCluster" } }],
        }],
    });
    let snapshot = snapshot(vec![routes_dump(vec![config], vec![])]);
    assert_eq!(
        route::project(&snapshot).unwrap(),
        vec![RouteEntry {
            name: "80".to_string(),
            domains: vec!["*".to_string()],
            route_match: "/*".to_string(),
            virtual_service: "404".to_string(),
        }]
    );
}

#[test]
fn projection_is_repeatable() {
    let config = json!({
        "@type": type_url::ROUTE_CONFIGURATION,
        "name": "9080",
        "virtual_hosts": [
            {
                "name": "reviews.bookinfo.svc.cluster.local:9080",
                "domains": ["reviews.bookinfo.svc.cluster.local", "reviews.bookinfo.svc", "reviews", "reviews:9080"],
                "routes": [
                    { "match": { "prefix": "/api" }, "route": { "cluster": "outbound|9080||reviews.bookinfo.svc.cluster.local" } },
                    { "match": { "path": "/health" }, "route": { "cluster": "PassthroughCluster" } },
                ],
            },
            { "name": "empty", "domains": ["*"] },
        ],
    });
    let snapshot = snapshot(vec![routes_dump(vec![config], vec![])]);
    let first = serde_json::to_vec(&route::project(&snapshot).unwrap()).unwrap();
    let second = serde_json::to_vec(&route::project(&snapshot).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn static_routes_precede_dynamic_routes() {
    let named = |name: &str| {
        json!({
            "@type": type_url::ROUTE_CONFIGURATION,
            "name": name,
            "virtual_hosts": [{ "domains": ["*"] }],
        })
    };
    let snapshot = snapshot(vec![routes_dump(
        vec![named("static")],
        vec![named("dynamic-a"), named("dynamic-b")],
    )]);
    let names = route::project(&snapshot)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect::<Vec<_>>();
    assert_eq!(names, ["static", "dynamic-a", "dynamic-b"]);
}

#[test]
fn entries_round_trip() {
    let entry = RouteEntry {
        name: "9080".to_string(),
        domains: vec!["reviews.bookinfo.svc.cluster.local".to_string()],
        route_match: "/api* regex /v[12]/.*".to_string(),
        virtual_service: "reviews.bookinfo".to_string(),
    };
    let json = serde_json::to_string(&entry).unwrap();
    assert_eq!(serde_json::from_str::<RouteEntry>(&json).unwrap(), entry);
}
