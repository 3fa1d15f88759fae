use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};
use vhub::kernel::prelude::ApiState;

#[derive(OpenApi)]
struct ApiDoc;

#[allow(unreachable_pub)]
pub fn init(state: ApiState) -> Router {
    let api = ApiDoc::openapi();

    // System endpoints plus the custom domain surface, with the collected
    // OpenAPI document split off for the docs UI.
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(vhub::server::router::system_router())
        .merge(vhub::server::router::domains_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    let scalar_routes = Scalar::with_url("/api", api_doc);

    Router::new().merge(openapi_routes).merge(scalar_routes)
}
