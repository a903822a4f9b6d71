use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A registrable email domain. Domain names are unique across companies and
/// stored lowercase.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyDomain {
    pub id: Uuid,
    pub name: String,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
}
