use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::company_dto::{CreateCompanyPayload, CreateDomainPayload};
use crate::error::{Error, Result};
use crate::models::company::{Company, CompanyDomain};

#[derive(Clone)]
pub struct CompanyService {
    pool: PgPool,
}

impl CompanyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_company(&self, payload: CreateCompanyPayload) -> Result<Company> {
        let company = sqlx::query_as::<_, Company>(
            "INSERT INTO companies (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(&payload.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => {
                Error::Conflict("Company with this name already exists".to_string())
            }
            other => other,
        })?;

        Ok(company)
    }

    pub async fn delete_company(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Company not found".to_string()));
        }
        Ok(())
    }

    /// Domains are stored lowercase so registration can match them against
    /// email domains case-insensitively.
    pub async fn create_domain(
        &self,
        company_id: Uuid,
        payload: CreateDomainPayload,
    ) -> Result<CompanyDomain> {
        let mut tx = self.pool.begin().await?;
        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM companies WHERE id = $1")
            .bind(company_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(Error::NotFound("Company not found".to_string()));
        }

        let domain = sqlx::query_as::<_, CompanyDomain>(
            "INSERT INTO company_domains (name, company_id) VALUES ($1, $2) \
             RETURNING id, name, company_id, created_at",
        )
        .bind(payload.name.trim().to_lowercase())
        .bind(company_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => {
                Error::Conflict("Domain with this name already exists".to_string())
            }
            other => other,
        })?;
        tx.commit().await?;

        Ok(domain)
    }

    /// A domain belonging to a different company is reported as missing,
    /// not forbidden. Job mutations answer 403 in the same situation; the
    /// asymmetry is intentional (see DESIGN.md).
    pub async fn delete_domain(&self, company_id: Uuid, domain_id: Uuid) -> Result<()> {
        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM companies WHERE id = $1")
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(Error::NotFound("Company not found".to_string()));
        }

        let result = sqlx::query("DELETE FROM company_domains WHERE id = $1 AND company_id = $2")
            .bind(domain_id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Domain not found".to_string()));
        }
        Ok(())
    }
}
