//! HTTP surface of the custom domains slice.
//!
//! Authentication is handled upstream; the trusted `x-owner-id` header
//! carries the caller's identity.

use crate::Domains;
use crate::coordinator::AnnotatedDomain;
use crate::error::DomainError;
use crate::record::{CustomDomain, DomainStatus};
use crate::verifier::VerifyOutcome;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::{StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use vhub_derive::{api_handler, api_model};
use vhub_domain::constants::{CUSTOM_DOMAINS_TAG, CUSTOM_DOMAIN_TABLE};
use vhub_kernel::security::resource::ResourceGuard;
use vhub_kernel::server::state::ApiState;

const OWNER_HEADER: &str = "x-owner-id";

/// Caller identity, resolved by the upstream auth layer.
#[derive(Debug, Clone)]
pub struct OwnerId(pub String);

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match owner {
            Some(owner) => Ok(Self(owner.to_owned())),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    code: "missing_owner".to_owned(),
                    message: format!("Missing or empty '{OWNER_HEADER}' header"),
                }),
            )
                .into_response()),
        }
    }
}

#[api_model]
/// Error payload returned by every non-2xx response.
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable explanation.
    pub message: String,
}

#[api_model]
/// Request to register a new custom domain.
pub struct CreateDomainRequest {
    /// Fully qualified domain name, e.g. `cards.example.com`.
    pub domain: String,
    pub landing_url: String,
    pub not_found_url: String,
    pub linked_vcard_id: Option<String>,
}

#[api_model]
/// Partial update of a domain's settings. Omitted fields keep their value.
pub struct UpdateDomainRequest {
    pub landing_url: Option<String>,
    pub not_found_url: Option<String>,
    /// `null` clears the link, omission keeps it.
    #[serde(default, with = "double_option")]
    pub linked_vcard_id: Option<Option<String>>,
}

#[api_model]
/// A custom domain with its entitlement flag for the current plan snapshot.
pub struct DomainResponse {
    pub id: String,
    pub domain: String,
    pub status: DomainStatus,
    /// Publish this as a TXT record to verify via the TXT mechanism.
    pub verification_token: String,
    /// Point a CNAME at this to verify via the CNAME mechanism.
    pub cname_target: String,
    pub landing_url: String,
    pub not_found_url: String,
    pub linked_vcard_id: Option<String>,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Recomputed on every read, never persisted.
    pub is_disabled: bool,
}

#[api_model]
/// Outcome of a verification attempt.
pub struct VerifyResponse {
    pub status: DomainStatus,
    pub message: String,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(de).map(Some)
    }

    pub fn serialize<S>(
        value: &Option<Option<String>>,
        ser: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::Serialize;
        value.clone().flatten().serialize(ser)
    }
}

impl DomainResponse {
    fn from_domain(domain: CustomDomain, is_disabled: bool) -> Self {
        Self {
            id: domain.id,
            domain: domain.domain,
            status: domain.status,
            verification_token: domain.verification_token,
            cname_target: domain.cname_target,
            landing_url: domain.landing_url,
            not_found_url: domain.not_found_url,
            linked_vcard_id: domain.linked_vcard_id,
            created_at: domain.created_at,
            is_disabled,
        }
    }
}

impl From<AnnotatedDomain> for DomainResponse {
    fn from(annotated: AnnotatedDomain) -> Self {
        Self::from_domain(annotated.domain, annotated.is_disabled)
    }
}

impl From<VerifyOutcome> for VerifyResponse {
    fn from(outcome: VerifyOutcome) -> Self {
        Self { status: outcome.status, message: outcome.message }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            Self::Conflict { .. } => (StatusCode::CONFLICT, "domain_conflict"),
            Self::PlanLimitExceeded { .. } => {
                (StatusCode::PAYMENT_REQUIRED, "plan_limit_exceeded")
            }
            Self::DnsTransient { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "dns_verification_transient")
            }
            Self::DnsFailed { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "dns_verification_failed")
            }
            Self::Database { .. } | Self::Entitlement { .. } | Self::Internal { .. } => {
                error!(error = %self, "Domain request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { code: code.to_owned(), message })).into_response()
    }
}

/// Reduces a path ID to the bare record key, rejecting IDs that name a
/// different table.
fn domain_key(id: &str) -> Result<String, DomainError> {
    let verified = ResourceGuard::verify(id, CUSTOM_DOMAIN_TABLE).map_err(|e| {
        DomainError::Validation { message: e.to_string().into(), context: None }
    })?;

    Ok(verified.split_once(':').map(|(_, key)| key.to_owned()).unwrap_or(verified))
}

fn slice(state: &ApiState) -> Result<&Domains, DomainError> {
    state.try_get_slice::<Domains>().map_err(|e| DomainError::Internal {
        message: e.to_string().into(),
        context: Some("Domains slice lookup".into()),
    })
}

#[api_handler(
    get,
    path = "/custom-domains",
    responses(
        (status = OK, description = "The owner's domains, oldest first", body = [DomainResponse]),
    ),
    tag = CUSTOM_DOMAINS_TAG,
)]
async fn list_handler(
    State(state): State<ApiState>,
    OwnerId(owner): OwnerId,
) -> Result<Json<Vec<DomainResponse>>, DomainError> {
    let domains = slice(&state)?.coordinator.list(&owner).await?;
    Ok(Json(domains.into_iter().map(DomainResponse::from).collect()))
}

#[api_handler(
    post,
    path = "/custom-domains",
    request_body = CreateDomainRequest,
    responses(
        (status = CREATED, description = "Domain registered, pending verification", body = DomainResponse),
        (status = CONFLICT, description = "Domain already registered", body = ErrorBody),
        (status = PAYMENT_REQUIRED, description = "Plan limit reached", body = ErrorBody),
    ),
    tag = CUSTOM_DOMAINS_TAG,
)]
async fn create_handler(
    State(state): State<ApiState>,
    OwnerId(owner): OwnerId,
    Json(body): Json<CreateDomainRequest>,
) -> Result<(StatusCode, Json<DomainResponse>), DomainError> {
    let domain = slice(&state)?
        .coordinator
        .create(&owner, &body.domain, body.landing_url, body.not_found_url, body.linked_vcard_id)
        .await?;

    // A create that passed the gate is within the ceiling, hence entitled.
    Ok((StatusCode::CREATED, Json(DomainResponse::from_domain(domain, false))))
}

#[api_handler(
    post,
    path = "/custom-domains/{id}/verify",
    responses(
        (status = OK, description = "Domain verified (or already active)", body = VerifyResponse),
        (status = PAYMENT_REQUIRED, description = "Domain disabled under the current plan", body = ErrorBody),
        (status = UNPROCESSABLE_ENTITY, description = "DNS records do not satisfy the challenge", body = ErrorBody),
        (status = SERVICE_UNAVAILABLE, description = "DNS gave no usable answer, retry later", body = ErrorBody),
    ),
    tag = CUSTOM_DOMAINS_TAG,
)]
async fn verify_handler(
    State(state): State<ApiState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> Result<Json<VerifyResponse>, DomainError> {
    let outcome = slice(&state)?.coordinator.verify(&owner, &domain_key(&id)?).await?;
    Ok(Json(outcome.into()))
}

#[api_handler(
    patch,
    path = "/custom-domains/{id}",
    request_body = UpdateDomainRequest,
    responses(
        (status = OK, description = "Updated domain", body = DomainResponse),
        (status = PAYMENT_REQUIRED, description = "Domain disabled under the current plan", body = ErrorBody),
    ),
    tag = CUSTOM_DOMAINS_TAG,
)]
async fn update_handler(
    State(state): State<ApiState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
    Json(body): Json<UpdateDomainRequest>,
) -> Result<Json<DomainResponse>, DomainError> {
    let domain = slice(&state)?
        .coordinator
        .update(&owner, &domain_key(&id)?, body.landing_url, body.not_found_url, body.linked_vcard_id)
        .await?;

    // Update passed the gate, so the domain is entitled under this snapshot.
    Ok(Json(DomainResponse::from_domain(domain, false)))
}

#[api_handler(
    delete,
    path = "/custom-domains/{id}",
    responses(
        (status = NO_CONTENT, description = "Domain removed"),
        (status = NOT_FOUND, description = "No such domain", body = ErrorBody),
    ),
    tag = CUSTOM_DOMAINS_TAG,
)]
async fn delete_handler(
    State(state): State<ApiState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> Result<StatusCode, DomainError> {
    slice(&state)?.coordinator.delete(&owner, &domain_key(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// All custom domain routes, for merging into the application router.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(list_handler, create_handler))
        .routes(routes!(verify_handler))
        .routes(routes!(update_handler, delete_handler))
}
