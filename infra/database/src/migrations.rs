use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;

/// Bookkeeping schema for the migration ledger itself. Applied unconditionally
/// on every startup; every statement is idempotent.
const BOOTSTRAP_SCRIPT: &str = "
    DEFINE TABLE IF NOT EXISTS migration SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS slice_key ON migration TYPE string;
    DEFINE FIELD IF NOT EXISTS version ON migration TYPE string;
    DEFINE FIELD IF NOT EXISTS checksum ON migration TYPE string;
    DEFINE FIELD IF NOT EXISTS applied_at ON migration TYPE number;
    DEFINE INDEX IF NOT EXISTS migration_key_idx ON migration FIELDS slice_key, version UNIQUE;
";

/// Schema for the custom domain slice. `domain` is unique across the whole
/// platform, not per owner.
const DOMAINS_0001: &str = "
    DEFINE TABLE IF NOT EXISTS custom_domain SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS owner_id ON custom_domain TYPE string;
    DEFINE FIELD IF NOT EXISTS domain ON custom_domain TYPE string;
    DEFINE FIELD IF NOT EXISTS status ON custom_domain TYPE string
        ASSERT $value IN ['pending', 'active', 'failed', 'blocked'];
    DEFINE FIELD IF NOT EXISTS verification_token ON custom_domain TYPE string;
    DEFINE FIELD IF NOT EXISTS cname_target ON custom_domain TYPE string;
    DEFINE FIELD IF NOT EXISTS landing_url ON custom_domain TYPE string;
    DEFINE FIELD IF NOT EXISTS not_found_url ON custom_domain TYPE string;
    DEFINE FIELD IF NOT EXISTS linked_vcard_id ON custom_domain TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS created_at ON custom_domain TYPE number;
    DEFINE INDEX IF NOT EXISTS custom_domain_domain_idx ON custom_domain FIELDS domain UNIQUE;
    DEFINE INDEX IF NOT EXISTS custom_domain_owner_idx ON custom_domain FIELDS owner_id;
";

#[derive(Debug)]
pub(crate) struct Migration {
    pub slice_key: &'static str,
    pub version: &'static str,
    pub script: &'static str,
}

impl Migration {
    #[must_use]
    const fn new(slice_key: &'static str, version: &'static str, script: &'static str) -> Self {
        Self { slice_key, version, script }
    }

    /// Content hash of the script, FNV-1a over the raw bytes.
    fn checksum(&self) -> String {
        format!("{:016x}", fnv1a(self.script.as_bytes()))
    }

    fn key(&self) -> String {
        format!("{}:{}", self.slice_key, self.version)
    }

    fn to_applied(&self) -> AppliedMigration {
        AppliedMigration {
            slice_key: self.slice_key.to_owned(),
            version: self.version.to_owned(),
            checksum: self.checksum(),
        }
    }
}

fn builtin_migrations() -> Vec<Migration> {
    vec![Migration::new("domains", "0001", DOMAINS_0001)]
}

const fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        i += 1;
    }
    hash
}

#[derive(Debug, Default)]
pub(crate) struct MigrationReport {
    pub applied: Vec<AppliedMigration>,
    pub skipped: Vec<AppliedMigration>,
}

#[derive(Debug, SurrealValue)]
pub(crate) struct AppliedMigration {
    pub slice_key: String,
    pub version: String,
    pub checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner {
    db: Surreal<Any>,
}

impl MigrationRunner {
    #[must_use]
    pub(crate) const fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }

    pub(crate) async fn run(&self) -> Result<MigrationReport, DatabaseError> {
        let mut report = MigrationReport::default();

        self.db.query(BOOTSTRAP_SCRIPT).await.context("Applying bootstrap schema")?.check()?;

        let applied_migrations = self.get_migrations_map().await?;

        for migration in builtin_migrations() {
            if let Some(applied) = applied_migrations.get(&migration.key()) {
                ensure_checksum_match(&migration, &applied.checksum)?;
                report.skipped.push(migration.to_applied());
                continue;
            }

            self.apply_migration(&migration).await?;
            report.applied.push(migration.to_applied());
        }

        Ok(report)
    }

    async fn apply_migration(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE migration SET
                slice_key = $slice,
                version = $version,
                checksum = $checksum,
                applied_at = time::millis(time::now());
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(&query)
            .bind(("slice", migration.slice_key))
            .bind(("version", migration.version))
            .bind(("checksum", migration.checksum()))
            .await
            .context(format!(
                "SQL execution failed at {}:{}",
                migration.slice_key, migration.version
            ))?
            .check()?;

        Ok(())
    }

    async fn get_migrations_map(
        &self,
    ) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        let entries = self
            .db
            .query("SELECT slice_key, version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing migrations map")?;

        Ok(entries
            .into_iter()
            .map(|entry| (format!("{}:{}", entry.slice_key, entry.version), entry))
            .collect())
    }
}

fn ensure_checksum_match(migration: &Migration, existing: &str) -> Result<(), DatabaseError> {
    let expected = migration.checksum();
    if existing != expected {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {} (expected {expected}, got {existing})",
                migration.key(),
            )
            .into(),
            context: Some("Migration already applied with different checksum".into()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable_and_content_sensitive() {
        let a = Migration::new("domains", "0001", DOMAINS_0001);
        assert_eq!(a.checksum(), a.checksum());

        let b = Migration::new("domains", "0001", "DEFINE TABLE other;");
        assert_ne!(a.checksum(), b.checksum());
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        let migration = Migration::new("domains", "0001", DOMAINS_0001);
        assert!(ensure_checksum_match(&migration, &migration.checksum()).is_ok());
        assert!(ensure_checksum_match(&migration, "deadbeefdeadbeef").is_err());
    }
}
