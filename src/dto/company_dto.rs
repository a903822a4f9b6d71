use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::company::{Company, CompanyDomain};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCompanyPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(value: Company) -> Self {
        Self {
            id: value.id,
            name: value.name,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDomainPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainResponse {
    pub id: Uuid,
    pub name: String,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<CompanyDomain> for DomainResponse {
    fn from(value: CompanyDomain) -> Self {
        Self {
            id: value.id,
            name: value.name,
            company_id: value.company_id,
            created_at: value.created_at,
        }
    }
}
