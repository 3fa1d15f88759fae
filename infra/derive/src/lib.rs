#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the workspace infrastructure: error enums with
//! attachable context, API model/handler decoration, vertical-slice handles,
//! and the async runtime bootstrap.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to bootstrap the specialized Tokio runtime.
///
/// Transforms an `async fn main` into a standard `fn main` that initializes a
/// pre-configured Tokio runtime based on the selected performance profile.
///
/// # Arguments
///
/// * `high_performance` - Optimized for high-throughput server environments.
/// * `memory_efficient` - Optimized for low-footprint environments.
/// * `default` - Worker threads auto-detected from available parallelism.
///
/// # Examples
///
/// ```rust,ignore
/// #[vhub_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
/// # Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro to define a standard API data model.
///
/// Ensures consistency across all DTOs in the platform:
///
/// * **Derives**: adds `Debug`, `Serialize`, `Deserialize`, and
///   `utoipa::ToSchema` when missing.
/// * **Serde policy**: `rename_all = "camelCase"` plus `deny_unknown_fields`
///   unless the struct already declares either.
///
/// # Example
///
/// ```rust,ignore
/// use vhub_derive::api_model;
///
/// #[api_model]
/// pub struct DomainSummary {
///     pub id: String,
///     pub is_disabled: bool,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(input).into()
}

/// Attribute macro to bridge Axum handlers with `OpenAPI` documentation.
///
/// Accepts standard `utoipa::path` arguments (`get`, `post`, `path = "..."`,
/// `responses(...)`, `tag = "..."`) and applies them to the handler while
/// silencing the `clippy::unused_async` boilerplate lint that certain Axum
/// extractors trigger.
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// A high-level attribute macro for defining domain-specific error enums.
///
/// Transforms a plain enum into a fully wired error type:
///
/// * Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * Generates a companion `<Name>Ext` trait adding `.context(...)` to any
///   `Result` convertible into this error type.
/// * Implements `From<Source>` for variants carrying a `source` field, so `?`
///   works on upstream errors.
/// * Implements `From<&'static str>` / `From<String>` when an `Internal`
///   variant is present.
///
/// # Requirements
///
/// 1. Must be applied to an enum with named-field variants only.
/// 2. Variants supporting context carry `context: Option<Cow<'static, str>>`.
/// 3. Variants wrapping upstream errors carry a `source` field (or a field
///    marked `#[source]`/`#[from]`) and a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[vhub_derive::vhub_error]
/// pub enum StoreError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io {
///         #[source]
///         source: std::io::Error,
///         context: Option<Cow<'static, str>>,
///     },
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn vhub_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Attribute macro to define a Vertical Slice handle.
///
/// Transforms a struct into the full slice pattern: a thread-safe `Arc`
/// wrapper around a generated `<Name>Inner` state struct, `Deref` for
/// transparent access, and a `FeatureSlice` impl for kernel registration.
///
/// # Example
/// ```rust,ignore
/// #[vhub_derive::vhub_slice]
/// pub struct Domains {
///     pub coordinator: DomainLifecycleCoordinator,
/// }
///
/// let slice = Domains::new(DomainsInner { coordinator });
/// ```
#[proc_macro_attribute]
pub fn vhub_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
