//! PostgreSQL-backed import stores.
//!
//! Organizations and addresses live in separate tables, each with its own
//! unique index (`organizations.name`, `addresses.zip_code`). Those indexes are
//! the final arbiter when concurrent imports race past validation.

use crate::import::history::{ImportHistory, NewImportHistory};
use crate::import::store::{
    HistoryStore, NewOrganization, Organization, OrganizationStore, StorageResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocket_db_pools::sqlx::{self, PgPool};

#[derive(Clone)]
pub struct PgOrganizationStore {
    pool: PgPool,
}

impl PgOrganizationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationStore for PgOrganizationStore {
    async fn exists_by_name(&self, name: &str) -> StorageResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM organizations WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn exists_by_zip_code(&self, zip_code: &str) -> StorageResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM addresses WHERE zip_code = $1)")
                .bind(zip_code)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn exists_by_rating(&self, rating: f64) -> StorageResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM organizations WHERE rating = $1)")
                .bind(rating)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Address and organization are written in one transaction so a failed
    /// organization insert never leaves an orphaned address holding a zip code.
    async fn insert(&self, organization: NewOrganization) -> StorageResult<Organization> {
        let mut tx = self.pool.begin().await?;

        let (address_id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO addresses (street, zip_code)
               VALUES ($1, $2)
               RETURNING id"#,
        )
        .bind(&organization.street)
        .bind(&organization.zip_code)
        .fetch_one(&mut *tx)
        .await?;

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"INSERT INTO organizations
               (name, full_name, rating, annual_turnover, employees_count, organization_type, address_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, created_at"#,
        )
        .bind(&organization.name)
        .bind(&organization.full_name)
        .bind(organization.rating)
        .bind(organization.annual_turnover)
        .bind(organization.employees_count)
        .bind(organization.organization_type.map(|t| t.as_str()))
        .bind(address_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Organization {
            id,
            name: organization.name,
            full_name: organization.full_name,
            rating: organization.rating,
            annual_turnover: organization.annual_turnover,
            employees_count: organization.employees_count,
            organization_type: organization.organization_type,
            address_id,
            street: organization.street,
            zip_code: organization.zip_code,
            created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn insert(&self, entry: NewImportHistory) -> StorageResult<ImportHistory> {
        let history: ImportHistory = sqlx::query_as(
            r#"INSERT INTO import_history (username, created_at, status, imported_count, error_message)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, username, created_at, status, imported_count, error_message"#,
        )
        .bind(&entry.username)
        .bind(entry.created_at)
        .bind(entry.status)
        .bind(entry.imported_count)
        .bind(&entry.error_message)
        .fetch_one(&self.pool)
        .await?;

        Ok(history)
    }

    async fn list(&self, limit: i64, offset: i64) -> StorageResult<Vec<ImportHistory>> {
        let entries: Vec<ImportHistory> = sqlx::query_as(
            r#"SELECT id, username, created_at, status, imported_count, error_message
               FROM import_history
               ORDER BY created_at DESC, id DESC
               LIMIT $1 OFFSET $2"#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn get(&self, id: i64) -> StorageResult<Option<ImportHistory>> {
        let entry: Option<ImportHistory> = sqlx::query_as(
            r#"SELECT id, username, created_at, status, imported_count, error_message
               FROM import_history
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn count(&self) -> StorageResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM import_history")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

