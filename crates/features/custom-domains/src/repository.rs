//! Persistence for custom domain records.
//!
//! All mutations are owner-scoped: a record belonging to another owner is
//! indistinguishable from a missing one.

use crate::error::{DomainError, DomainErrorExt};
use crate::record::{CustomDomain, DomainRow, DomainStatus};
use async_trait::async_trait;
use vhub_database::{Database, DatabaseError};
use vhub_domain::constants::CUSTOM_DOMAIN_TABLE;
use vhub_domain::model::{ResourceInstance, ResourceKind};
use vhub_entitlement::EntitlementError;
use vhub_entitlement::provider::{ResourceCatalog, ResourceCounter};

const FIELDS: &str = "id.id() AS id, owner_id, domain, status, verification_token, \
    cname_target, landing_url, not_found_url, linked_vcard_id, created_at";

/// Marker SurrealDB THROWs inside the create transaction when the domain name
/// is already taken.
const DOMAIN_TAKEN: &str = "domain_taken";

#[derive(Debug, Clone)]
pub struct CustomDomainRepository {
    db: Database,
}

impl CustomDomainRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts a new record, enforcing platform-wide domain uniqueness.
    ///
    /// The existence check and the insert run in one transaction, so two
    /// concurrent creates for the same name cannot both succeed.
    ///
    /// # Errors
    /// [`DomainError::Conflict`] when the domain name is already registered.
    pub async fn create(&self, record: CustomDomain) -> Result<CustomDomain, DomainError> {
        let result = self
            .db
            .query(format!(
                "BEGIN TRANSACTION;
                LET $existing = SELECT VALUE id FROM custom_domain WHERE domain = $domain;
                IF $existing != [] {{ THROW '{DOMAIN_TAKEN}' }};
                CREATE type::record('{CUSTOM_DOMAIN_TABLE}', $id) SET
                    owner_id = $owner_id,
                    domain = $domain,
                    status = $status,
                    verification_token = $verification_token,
                    cname_target = $cname_target,
                    landing_url = $landing_url,
                    not_found_url = $not_found_url,
                    linked_vcard_id = $linked_vcard_id,
                    created_at = $created_at;
                COMMIT TRANSACTION;"
            ))
            .bind(("id", record.id.clone()))
            .bind(("owner_id", record.owner_id.clone()))
            .bind(("domain", record.domain.clone()))
            .bind(("status", record.status.to_string()))
            .bind(("verification_token", record.verification_token.clone()))
            .bind(("cname_target", record.cname_target.clone()))
            .bind(("landing_url", record.landing_url.clone()))
            .bind(("not_found_url", record.not_found_url.clone()))
            .bind(("linked_vcard_id", record.linked_vcard_id.clone()))
            .bind(("created_at", record.created_at))
            .await
            .map_err(DatabaseError::from)
            .context("Creating custom domain")?
            .check();

        match result {
            Ok(_) => Ok(record),
            Err(err) if err.to_string().contains(DOMAIN_TAKEN) => Err(DomainError::Conflict {
                message: format!("Domain '{}' is already registered", record.domain).into(),
                context: None,
            }),
            Err(err) => Err(DomainError::Database {
                source: DatabaseError::Surreal { source: err, context: None },
                context: Some("Creating custom domain".into()),
            }),
        }
    }

    /// Fetches one of the owner's domains by record key.
    ///
    /// # Errors
    /// Database or row-conversion failures only; a foreign or missing record
    /// is `Ok(None)`.
    pub async fn get(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<CustomDomain>, DomainError> {
        let row = self
            .db
            .query(format!(
                "SELECT {FIELDS} FROM type::record('{CUSTOM_DOMAIN_TABLE}', $id)
                WHERE owner_id = $owner_id"
            ))
            .bind(("id", id.to_owned()))
            .bind(("owner_id", owner_id.to_owned()))
            .await
            .map_err(DatabaseError::from)
            .context("Fetching custom domain")?
            .take::<Option<DomainRow>>(0)
            .map_err(DatabaseError::from)
            .context("Parsing custom domain row")?;

        row.map(CustomDomain::try_from).transpose()
    }

    /// All domains of an owner in canonical order: `created_at` ascending,
    /// record key as tiebreaker.
    ///
    /// # Errors
    /// Database or row-conversion failures.
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<CustomDomain>, DomainError> {
        let rows = self
            .db
            .query(format!(
                "SELECT {FIELDS} FROM custom_domain
                WHERE owner_id = $owner_id
                ORDER BY created_at ASC, id ASC"
            ))
            .bind(("owner_id", owner_id.to_owned()))
            .await
            .map_err(DatabaseError::from)
            .context("Listing custom domains")?
            .take::<Vec<DomainRow>>(0)
            .map_err(DatabaseError::from)
            .context("Parsing custom domain rows")?;

        rows.into_iter().map(CustomDomain::try_from).collect()
    }

    /// # Errors
    /// Database failures.
    pub async fn count_for_owner(&self, owner_id: &str) -> Result<u64, DomainError> {
        let count = self
            .db
            .query(
                "SELECT VALUE count() FROM custom_domain WHERE owner_id = $owner_id GROUP ALL",
            )
            .bind(("owner_id", owner_id.to_owned()))
            .await
            .map_err(DatabaseError::from)
            .context("Counting custom domains")?
            .take::<Option<u64>>(0)
            .map_err(DatabaseError::from)
            .context("Parsing domain count")?;

        Ok(count.unwrap_or(0))
    }

    /// # Errors
    /// Database failures.
    pub async fn set_status(&self, id: &str, status: DomainStatus) -> Result<(), DomainError> {
        self.db
            .query(format!(
                "UPDATE type::record('{CUSTOM_DOMAIN_TABLE}', $id) SET status = $status"
            ))
            .bind(("id", id.to_owned()))
            .bind(("status", status.to_string()))
            .await
            .map_err(DatabaseError::from)
            .context("Updating domain status")?
            .check()
            .map_err(DatabaseError::from)
            .context("Updating domain status")?;

        Ok(())
    }

    /// Overwrites the owner-editable settings of a record.
    ///
    /// # Errors
    /// Database failures.
    pub async fn update_settings(
        &self,
        id: &str,
        landing_url: String,
        not_found_url: String,
        linked_vcard_id: Option<String>,
    ) -> Result<(), DomainError> {
        self.db
            .query(format!(
                "UPDATE type::record('{CUSTOM_DOMAIN_TABLE}', $id) SET
                    landing_url = $landing_url,
                    not_found_url = $not_found_url,
                    linked_vcard_id = $linked_vcard_id"
            ))
            .bind(("id", id.to_owned()))
            .bind(("landing_url", landing_url))
            .bind(("not_found_url", not_found_url))
            .bind(("linked_vcard_id", linked_vcard_id))
            .await
            .map_err(DatabaseError::from)
            .context("Updating domain settings")?
            .check()
            .map_err(DatabaseError::from)
            .context("Updating domain settings")?;

        Ok(())
    }

    /// # Errors
    /// Database failures.
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.db
            .query(format!("DELETE type::record('{CUSTOM_DOMAIN_TABLE}', $id)"))
            .bind(("id", id.to_owned()))
            .await
            .map_err(DatabaseError::from)
            .context("Deleting custom domain")?
            .check()
            .map_err(DatabaseError::from)
            .context("Deleting custom domain")?;

        Ok(())
    }
}

fn expect_domain_kind(kind: ResourceKind) -> Result<(), EntitlementError> {
    if kind == ResourceKind::CustomDomain {
        Ok(())
    } else {
        Err(EntitlementError::Validation {
            message: format!("Repository does not hold '{kind}' resources").into(),
            context: None,
        })
    }
}

#[async_trait]
impl ResourceCounter for CustomDomainRepository {
    async fn count(&self, owner_id: &str, kind: ResourceKind) -> Result<u64, EntitlementError> {
        expect_domain_kind(kind)?;
        self.count_for_owner(owner_id).await.map_err(|e| EntitlementError::Provider {
            message: e.to_string().into(),
            context: Some("Domain counter".into()),
        })
    }
}

#[async_trait]
impl ResourceCatalog for CustomDomainRepository {
    async fn list(
        &self,
        owner_id: &str,
        kind: ResourceKind,
    ) -> Result<Vec<ResourceInstance>, EntitlementError> {
        expect_domain_kind(kind)?;
        let domains =
            self.list_for_owner(owner_id).await.map_err(|e| EntitlementError::Provider {
                message: e.to_string().into(),
                context: Some("Domain catalog".into()),
            })?;

        Ok(domains
            .into_iter()
            .map(|d| ResourceInstance { id: d.id, owner_id: d.owner_id, created_at: d.created_at })
            .collect())
    }
}
