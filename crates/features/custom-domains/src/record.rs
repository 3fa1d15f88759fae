//! Persistent shape of a custom domain.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use surrealdb::types::SurrealValue;
use vhub_domain::model::Resource;

/// Verification lifecycle of a domain.
///
/// `Pending` is the initial state. Only the verifier moves a domain between
/// states; `Blocked` is terminal and set administratively.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, utoipa::ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Pending,
    Active,
    Failed,
    Blocked,
}

/// A custom domain record as stored in the `custom_domain` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDomain {
    /// Bare record key (without the table prefix).
    pub id: String,
    pub owner_id: String,
    /// Fully qualified domain name, lowercase, unique platform-wide.
    pub domain: String,
    pub status: DomainStatus,
    /// 64 hex characters, generated once at creation, immutable.
    pub verification_token: String,
    /// The CNAME value the owner must point their domain at.
    pub cname_target: String,
    pub landing_url: String,
    pub not_found_url: String,
    pub linked_vcard_id: Option<String>,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl Resource for CustomDomain {
    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }
}

/// Raw row shape returned by the repository's SELECT projections.
#[derive(Debug, SurrealValue)]
pub(crate) struct DomainRow {
    pub id: String,
    pub owner_id: String,
    pub domain: String,
    pub status: String,
    pub verification_token: String,
    pub cname_target: String,
    pub landing_url: String,
    pub not_found_url: String,
    pub linked_vcard_id: Option<String>,
    pub created_at: i64,
}

impl TryFrom<DomainRow> for CustomDomain {
    type Error = DomainError;

    fn try_from(row: DomainRow) -> Result<Self, Self::Error> {
        let status = DomainStatus::from_str(&row.status).map_err(|_| DomainError::Internal {
            message: format!("Unknown domain status '{}'", row.status).into(),
            context: Some("Row conversion".into()),
        })?;

        Ok(Self {
            id: row.id,
            owner_id: row.owner_id,
            domain: row.domain,
            status,
            verification_token: row.verification_token,
            cname_target: row.cname_target,
            landing_url: row.landing_url,
            not_found_url: row.not_found_url,
            linked_vcard_id: row.linked_vcard_id,
            created_at: row.created_at,
        })
    }
}
