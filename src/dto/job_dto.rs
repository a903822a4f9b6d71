use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::job::Job;
use crate::services::job_service::JobPage;

pub const SALARY_TYPE_ANNUALLY: &str = "annually";
pub const SALARY_TYPE_MONTHLY: &str = "monthly";

pub const MAX_SALARY: i64 = 10_000_000;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_salary_bounds"))]
pub struct SalaryRange {
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_salary_type"))]
    pub salary_type: String,
    #[validate(length(min = 1, max = 10))]
    pub currency: String,
    pub min: i64,
    pub max: i64,
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_salary_type(salary_type: &str) -> Result<(), ValidationError> {
    if salary_type == SALARY_TYPE_ANNUALLY || salary_type == SALARY_TYPE_MONTHLY {
        Ok(())
    } else {
        Err(invalid(
            "invalid_salary_type",
            "Salary type must be 'annually' or 'monthly'",
        ))
    }
}

fn validate_salary_bounds(range: &SalaryRange) -> Result<(), ValidationError> {
    if range.min <= 0 || range.max <= 0 {
        return Err(invalid(
            "salary_not_positive",
            "Salary must be positive numbers",
        ));
    }
    if range.min >= range.max {
        return Err(invalid(
            "salary_min_not_below_max",
            "Minimum salary must be less than maximum salary",
        ));
    }
    if range.max > MAX_SALARY {
        return Err(invalid(
            "salary_exceeds_limit",
            "Salary exceeds reasonable limits",
        ));
    }
    Ok(())
}

/// Create and full update share one payload; status is derived from the
/// posting date and never supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_date_order"))]
pub struct JobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: String,
    #[validate(length(max = 200))]
    pub location: String,
    #[validate(nested)]
    pub salary_range: SalaryRange,
    #[validate(length(min = 1, max = 200))]
    pub company_name: String,
    pub posting_date: NaiveDate,
    pub expiration_date: NaiveDate,
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validation::validate_required_skills"))]
    pub required_skills: Vec<String>,
}

fn validate_date_order(payload: &JobPayload) -> Result<(), ValidationError> {
    if payload.expiration_date < payload.posting_date {
        return Err(invalid(
            "expiration_before_posting",
            "Expiration date cannot be earlier than posting date",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary_range: SalaryRange,
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

impl From<Job> for JobResponse {
    fn from(value: Job) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            location: value.location,
            salary_range: SalaryRange {
                salary_type: value.salary_type,
                currency: value.salary_currency,
                min: value.salary_min,
                max: value.salary_max,
            },
            company_name: value.company_name,
            posting_date: value.posting_date,
            expiration_date: value.expiration_date,
            required_skills: value.required_skills,
            status: value.status,
            created_by: value.created_by,
            last_updated_by: value.last_updated_by,
            created_at: value.created_at,
            last_updated_at: value.last_updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub data: Vec<JobResponse>,
    pub current_page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_count: i64,
}

impl From<JobPage> for JobListResponse {
    fn from(value: JobPage) -> Self {
        Self {
            data: value.items.into_iter().map(Into::into).collect(),
            current_page: value.current_page,
            page_size: value.page_size,
            total_pages: value.total_pages,
            total_count: value.total_count,
        }
    }
}

/// Raw search parameters as they arrive on the query string. `page` stays a
/// string so non-numeric values can fall back to page 1 instead of failing
/// extraction; `required_skills` is comma-separated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobListQuery {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub required_skills: Option<String>,
    pub salary_type: Option<String>,
    pub salary_currency: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub posting_date_start: Option<NaiveDate>,
    pub posting_date_end: Option<NaiveDate>,
    pub expiration_date_start: Option<NaiveDate>,
    pub expiration_date_end: Option<NaiveDate>,
    pub order_by: Option<String>,
    pub order_direction: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> JobPayload {
        JobPayload {
            title: "Backend Engineer".to_string(),
            description: "Build services".to_string(),
            location: "Remote".to_string(),
            salary_range: SalaryRange {
                salary_type: SALARY_TYPE_ANNUALLY.to_string(),
                currency: "USD".to_string(),
                min: 60_000,
                max: 120_000,
            },
            company_name: "Acme".to_string(),
            posting_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            expiration_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            required_skills: vec!["rust".to_string()],
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn expiration_before_posting_is_rejected() {
        let mut p = payload();
        p.expiration_date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        assert!(p.validate().is_err());
    }

    #[test]
    fn salary_bounds_are_enforced() {
        let mut p = payload();
        p.salary_range.min = 120_000;
        p.salary_range.max = 60_000;
        assert!(p.validate().is_err());

        let mut p = payload();
        p.salary_range.min = 0;
        assert!(p.validate().is_err());

        let mut p = payload();
        p.salary_range.max = MAX_SALARY + 1;
        assert!(p.validate().is_err());
    }

    #[test]
    fn unknown_salary_type_is_rejected() {
        let mut p = payload();
        p.salary_range.salary_type = "weekly".to_string();
        assert!(p.validate().is_err());
    }

    #[test]
    fn blank_skill_is_rejected() {
        let mut p = payload();
        p.required_skills = vec!["rust".to_string(), " ".to_string()];
        assert!(p.validate().is_err());
    }

    #[test]
    fn salary_range_serializes_with_type_key() {
        let json = serde_json::to_value(payload().salary_range).unwrap();
        assert_eq!(json["type"], "annually");
        assert_eq!(json["min"], 60_000);
    }
}
