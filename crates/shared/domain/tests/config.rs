use serde_json::json;
use vhub_domain::config::{ApiConfig, DatabaseConfig, DomainsConfig, PlansConfig, ServerConfig};

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 4680);
    assert!(server.ssl.is_none());

    let db = DatabaseConfig::default();
    assert_eq!(db.url, "mem://");
    assert_eq!(db.namespace, "vhub");
    assert_eq!(db.database, "core");
    assert!(db.credentials.is_some());

    let domains = DomainsConfig::default();
    assert_eq!(domains.cname_target, "domains.vhub.app");
    assert_eq!(domains.dns_timeout_ms, 5_000);

    let plans = PlansConfig::default();
    assert_eq!(plans.limits.custom_domains, 1);
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "database": { "url": "mem://", "namespace": "n", "database": "d", "credentials": null },
        "domains": { "cname_target": "edge.example.net", "dns_timeout_ms": 250 },
        "plans": { "limits": { "vcards": -1, "custom_domains": 5 } }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.database.namespace, "n");
    assert_eq!(cfg.domains.cname_target, "edge.example.net");
    assert_eq!(cfg.plans.limits.vcards, -1);
    assert_eq!(cfg.plans.limits.custom_domains, 5);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: ApiConfig = serde_json::from_value(json!({})).expect("config deserialize");
    assert_eq!(cfg.server.port, 4680);
    assert_eq!(cfg.domains.dns_timeout_ms, 5_000);
    assert_eq!(cfg.plans.limits.pixels, 1);
}
