use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, ItemFn, ItemStruct};

/// Expands the `#[api_model]` attribute macro.
///
/// Adds the common DTO derives (`Debug`, `Serialize`, `Deserialize`,
/// `ToSchema`) when absent and enforces the workspace serde policy of
/// camelCase field names with strict field checking.
pub fn expand_api_model(input: ItemStruct) -> TokenStream {
    let derives = missing_derives(&input.attrs, &input);
    let serde = serde_policy(&input.attrs);

    quote! {
        #derives
        #serde
        #input
    }
}

/// Expands the `#[api_handler]` attribute macro.
///
/// Forwards the arguments to `utoipa::path` so the handler is registered in
/// the `OpenAPI` document without duplicating route metadata.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let body = &input.block;
    let sig = &input.sig;
    let vis = &input.vis;
    let attrs = &input.attrs;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #vis #sig {
            #body
        }
    }
}

fn missing_derives(attrs: &[Attribute], input: &ItemStruct) -> TokenStream {
    let mut have = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("derive") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(seg) = meta.path.segments.last() {
                have.push(seg.ident.to_string());
            }
            Ok(())
        });
    }

    // Response-only models with borrowed fields cannot own deserialized data.
    let borrowed_fields =
        input.fields.iter().any(|f| matches!(f.ty, syn::Type::Reference(_)));

    let mut tokens = Vec::new();
    if !have.iter().any(|t| t == "Debug") {
        tokens.push(quote! { Debug });
    }
    if !have.iter().any(|t| t == "Serialize") {
        tokens.push(quote! { ::serde::Serialize });
    }
    if !borrowed_fields && !have.iter().any(|t| t == "Deserialize") {
        tokens.push(quote! { ::serde::Deserialize });
    }
    if !have.iter().any(|t| t == "ToSchema") {
        tokens.push(quote! { ::utoipa::ToSchema });
    }

    if tokens.is_empty() { quote!() } else { quote! { #[derive(#(#tokens),*)] } }
}

fn serde_policy(attrs: &[Attribute]) -> TokenStream {
    let mut has_rename_all = false;
    let mut has_deny_unknown = false;

    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                has_rename_all = true;
                // Consume the value so nested parsing stays in sync.
                let _ = meta.value().and_then(|v| v.parse::<syn::LitStr>());
            } else if meta.path.is_ident("deny_unknown_fields") {
                has_deny_unknown = true;
            }
            Ok(())
        });
    }

    let rename = if has_rename_all {
        quote!()
    } else {
        quote! { #[serde(rename_all = "camelCase")] }
    };
    let deny = if has_deny_unknown {
        quote!()
    } else {
        quote! { #[serde(deny_unknown_fields)] }
    };

    quote! { #rename #deny }
}
