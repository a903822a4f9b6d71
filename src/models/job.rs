use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_EXPIRED: &str = "expired";
pub const STATUS_SCHEDULED: &str = "scheduled";

pub const VALID_STATUSES: [&str; 3] = [STATUS_ACTIVE, STATUS_EXPIRED, STATUS_SCHEDULED];

/// Salary bounds are stored flat; the API exposes them as a nested
/// `salary_range` object.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary_type: String,
    pub salary_currency: String,
    pub salary_min: i64,
    pub salary_max: i64,
    pub company_name: String,
    pub posting_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub required_skills: Vec<String>,
    pub status: String,
    pub created_by: Option<Uuid>,
    pub last_updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// Status is assigned at write time from the posting date. Expiration is a
/// filterable label only and is never reconciled afterwards.
pub fn derive_status(posting_date: NaiveDate, today: NaiveDate) -> &'static str {
    if posting_date > today {
        STATUS_SCHEDULED
    } else {
        STATUS_ACTIVE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_posting_date_is_scheduled() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let tomorrow = today.succ_opt().unwrap();
        assert_eq!(derive_status(tomorrow, today), STATUS_SCHEDULED);
    }

    #[test]
    fn today_or_past_posting_date_is_active() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(derive_status(today, today), STATUS_ACTIVE);
        let last_week = today - chrono::Duration::days(7);
        assert_eq!(derive_status(last_week, today), STATUS_ACTIVE);
    }
}
