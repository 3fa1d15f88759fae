//! Shared constants for API documentation tags and persistence tables.

/// OpenAPI tag for system endpoints (health, diagnostics).
pub const SYSTEM_TAG: &str = "System";
/// OpenAPI tag for the custom domain endpoints.
pub const CUSTOM_DOMAINS_TAG: &str = "CustomDomains";

/// SurrealDB table holding custom domain records.
pub const CUSTOM_DOMAIN_TABLE: &str = "custom_domain";

/// Sentinel plan limit meaning "unlimited".
pub const UNLIMITED: i64 = -1;
