//! Facade crate for `vCardHub` features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `vhub` with the `server` feature flag.
//! - Call `vhub::init` to register feature slices; extend as new slices appear.

pub use vhub_domain as domain;
pub use vhub_kernel as kernel;
#[cfg(feature = "server")]
use {vhub_database::Database, vhub_domain::config::ApiConfig};

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use vhub_custom_domains::api::router as domains_router;
        pub use vhub_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    #[cfg(feature = "server")]
    pub use vhub_custom_domains as custom_domains;
    pub use vhub_entitlement as entitlement;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        "entitlement",
        #[cfg(feature = "server")]
        "server",
        #[cfg(feature = "server")]
        "custom_domains",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize all enabled features for server mode.
///
/// # Errors
/// Returns an error if any feature initialization fails.
#[cfg(feature = "server")]
pub fn init(
    config: &ApiConfig,
    database: &Database,
) -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error>> {
    let mut slices = Vec::new();

    // Plan entitlement
    slices.push(features::entitlement::init(config.plans.clone())?);

    // Custom domains
    slices.push(features::custom_domains::init(database.clone(), config)?);

    Ok(slices)
}
