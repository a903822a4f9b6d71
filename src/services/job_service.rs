use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::authz::{self, Identity, VisibilityScope};
use crate::dto::job_dto::{JobListQuery, JobPayload};
use crate::error::{Error, Result};
use crate::models::job::{derive_status, Job, STATUS_ACTIVE};

const JOB_COLUMNS: &str = "id, title, description, location, salary_type, salary_currency, \
     salary_min, salary_max, company_name, posting_date, expiration_date, required_skills, \
     status, created_by, last_updated_by, created_at, last_updated_at";

const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

pub struct JobPage {
    pub items: Vec<Job>,
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub page_size: i64,
}

/// Search filters, all optional and combined with AND. Predicates are
/// composed into SQL in one fixed field order so generated queries stay
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub required_skills: Vec<String>,
    pub salary: Option<SalaryFilter>,
    pub posting_date_start: Option<NaiveDate>,
    pub posting_date_end: Option<NaiveDate>,
    pub expiration_date_start: Option<NaiveDate>,
    pub expiration_date_end: Option<NaiveDate>,
}

/// Salary bounds only make sense against one (type, currency) bucket, so
/// both discriminators are mandatory whenever a bound is present.
#[derive(Debug, Clone)]
pub struct SalaryFilter {
    pub salary_type: String,
    pub currency: String,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    PostingDate,
    ExpirationDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy)]
pub struct Sort {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: None,
            direction: SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone)]
pub struct JobSearchParams {
    pub filter: JobFilter,
    pub sort: Sort,
    pub page: PageRequest,
}

impl JobSearchParams {
    /// Validates raw query-string input into a search specification.
    /// Incomplete salary filters and unknown sort fields are client errors.
    pub fn from_query(query: JobListQuery) -> Result<Self> {
        let salary = match (query.min_salary, query.max_salary) {
            (None, None) => None,
            (min_salary, max_salary) => {
                let (Some(salary_type), Some(currency)) =
                    (query.salary_type, query.salary_currency)
                else {
                    return Err(Error::BadRequest(
                        "Salary type and currency are required for salary range filtering"
                            .to_string(),
                    ));
                };
                Some(SalaryFilter {
                    salary_type,
                    currency,
                    min_salary,
                    max_salary,
                })
            }
        };

        let field = match query.order_by.as_deref() {
            None => None,
            Some("posting_date") => Some(SortField::PostingDate),
            Some("expiration_date") => Some(SortField::ExpirationDate),
            Some(other) => {
                return Err(Error::BadRequest(format!(
                    "Cannot order by '{}': expected posting_date or expiration_date",
                    other
                )))
            }
        };
        let direction = match query.order_direction.as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(Error::BadRequest(format!(
                    "Invalid order direction '{}': expected asc or desc",
                    other
                )))
            }
        };

        let required_skills = query
            .required_skills
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|skill| !skill.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        // Non-numeric page values fall back to the first page.
        let page = query
            .page
            .as_deref()
            .map(|raw| raw.trim().parse::<i64>().unwrap_or(1))
            .unwrap_or(1);
        let page_size = query
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, 100);

        Ok(Self {
            filter: JobFilter {
                title: query.title,
                description: query.description,
                company_name: query.company_name,
                location: query.location,
                status: query.status,
                required_skills,
                salary,
                posting_date_start: query.posting_date_start,
                posting_date_end: query.posting_date_end,
                expiration_date_start: query.expiration_date_start,
                expiration_date_end: query.expiration_date_end,
            },
            sort: Sort { field, direction },
            page: PageRequest { page, page_size },
        })
    }
}

/// Appends the visibility scope and every supplied filter in a fixed
/// order: scope, text fields, status, skills, salary, date ranges.
fn apply_filters(qb: &mut QueryBuilder<'_, Postgres>, scope: &VisibilityScope, filter: &JobFilter) {
    qb.push(" WHERE TRUE");

    match scope {
        VisibilityScope::All => {}
        VisibilityScope::ActiveOnly => {
            qb.push(" AND status = ").push_bind(STATUS_ACTIVE);
        }
        VisibilityScope::ActiveOrCreatedBy(user_id) => {
            qb.push(" AND (status = ")
                .push_bind(STATUS_ACTIVE)
                .push(" OR created_by = ")
                .push_bind(*user_id)
                .push(")");
        }
    }

    if let Some(title) = &filter.title {
        qb.push(" AND title ILIKE ")
            .push_bind(format!("%{}%", title));
    }
    if let Some(description) = &filter.description {
        qb.push(" AND description ILIKE ")
            .push_bind(format!("%{}%", description));
    }
    if let Some(company_name) = &filter.company_name {
        qb.push(" AND company_name ILIKE ")
            .push_bind(format!("%{}%", company_name));
    }
    if let Some(location) = &filter.location {
        qb.push(" AND location ILIKE ")
            .push_bind(format!("%{}%", location));
    }
    if let Some(status) = &filter.status {
        qb.push(" AND status = ").push_bind(status.clone());
    }
    for skill in &filter.required_skills {
        qb.push(" AND required_skills @> ")
            .push_bind(vec![skill.clone()]);
    }
    if let Some(salary) = &filter.salary {
        qb.push(" AND salary_type = ")
            .push_bind(salary.salary_type.clone());
        qb.push(" AND salary_currency = ")
            .push_bind(salary.currency.clone());
        // Overlap test: the record's range must reach the requested bounds,
        // not be contained by them.
        if let Some(min_salary) = salary.min_salary {
            qb.push(" AND salary_max >= ").push_bind(min_salary);
        }
        if let Some(max_salary) = salary.max_salary {
            qb.push(" AND salary_min <= ").push_bind(max_salary);
        }
    }
    if let Some(start) = filter.posting_date_start {
        qb.push(" AND posting_date >= ").push_bind(start);
    }
    if let Some(end) = filter.posting_date_end {
        qb.push(" AND posting_date <= ").push_bind(end);
    }
    if let Some(start) = filter.expiration_date_start {
        qb.push(" AND expiration_date >= ").push_bind(start);
    }
    if let Some(end) = filter.expiration_date_end {
        qb.push(" AND expiration_date <= ").push_bind(end);
    }
}

/// Unspecified sort falls back to most-recent-posting-date-first; `id` is
/// always appended so the ordering is total and pagination stable.
fn apply_order(qb: &mut QueryBuilder<'_, Postgres>, sort: &Sort) {
    let column = match sort.field {
        None => {
            qb.push(" ORDER BY posting_date DESC, id");
            return;
        }
        Some(SortField::PostingDate) => "posting_date",
        Some(SortField::ExpirationDate) => "expiration_date",
    };
    qb.push(" ORDER BY ").push(column);
    match sort.direction {
        SortDirection::Asc => qb.push(" ASC"),
        SortDirection::Desc => qb.push(" DESC"),
    };
    qb.push(", id");
}

fn job_not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Job posting with ID {} not found", id))
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, identity: &Identity, payload: JobPayload) -> Result<Job> {
        let creator = authz::check_can_create(identity, &payload.company_name)?;
        let status = derive_status(payload.posting_date, Utc::now().date_naive());

        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "INSERT INTO jobs (title, description, location, salary_type, salary_currency, \
             salary_min, salary_max, company_name, posting_date, expiration_date, \
             required_skills, status, created_by, last_updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {}",
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(&payload.title)
            .bind(&payload.description)
            .bind(&payload.location)
            .bind(&payload.salary_range.salary_type)
            .bind(&payload.salary_range.currency)
            .bind(payload.salary_range.min)
            .bind(payload.salary_range.max)
            .bind(&payload.company_name)
            .bind(payload.posting_date)
            .bind(payload.expiration_date)
            .bind(&payload.required_skills)
            .bind(status)
            .bind(creator)
            .bind(creator)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(job)
    }

    pub async fn get_visible(&self, identity: &Identity, id: Uuid) -> Result<Job> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| job_not_found(id))?;

        // Invisible records are indistinguishable from missing ones.
        if !authz::visibility_scope(identity).allows(&job) {
            return Err(job_not_found(id));
        }
        Ok(job)
    }

    pub async fn update(&self, identity: &Identity, id: Uuid, payload: JobPayload) -> Result<Job> {
        let mut tx = self.pool.begin().await?;
        let job = fetch_for_update(&mut tx, id).await?;
        let editor = authz::check_can_mutate(identity, &job, "update")?;

        if payload.company_name != job.company_name {
            return Err(Error::BadRequest(
                "Company name cannot be changed".to_string(),
            ));
        }

        let status = derive_status(payload.posting_date, Utc::now().date_naive());
        let sql = format!(
            "UPDATE jobs SET title = $2, description = $3, location = $4, salary_type = $5, \
             salary_currency = $6, salary_min = $7, salary_max = $8, posting_date = $9, \
             expiration_date = $10, required_skills = $11, status = $12, last_updated_by = $13, \
             last_updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(&payload.title)
            .bind(&payload.description)
            .bind(&payload.location)
            .bind(&payload.salary_range.salary_type)
            .bind(&payload.salary_range.currency)
            .bind(payload.salary_range.min)
            .bind(payload.salary_range.max)
            .bind(payload.posting_date)
            .bind(payload.expiration_date)
            .bind(&payload.required_skills)
            .bind(status)
            .bind(editor)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(job)
    }

    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let job = fetch_for_update(&mut tx, id).await?;
        authz::check_can_mutate(identity, &job, "delete")?;

        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    /// Runs the search with the caller's visibility scope intersected with
    /// the supplied filters; `total_count` covers visible rows only.
    pub async fn search(&self, scope: VisibilityScope, params: JobSearchParams) -> Result<JobPage> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM jobs");
        apply_filters(&mut count_qb, &scope, &params.filter);
        let total_count: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let page_size = params.page.page_size;
        let total_pages = ((total_count + page_size - 1) / page_size).max(1);
        // Any numeric page outside the valid range resolves to the last
        // page; only non-numeric input falls back to page 1 (handled at
        // parse time).
        let effective_page = if params.page.page < 1 {
            total_pages
        } else {
            params.page.page.min(total_pages)
        };
        let offset = (effective_page - 1) * page_size;

        let mut qb = QueryBuilder::new(format!("SELECT {} FROM jobs", JOB_COLUMNS));
        apply_filters(&mut qb, &scope, &params.filter);
        apply_order(&mut qb, &params.sort);
        qb.push(" LIMIT ")
            .push_bind(page_size)
            .push(" OFFSET ")
            .push_bind(offset);
        let items = qb.build_query_as::<Job>().fetch_all(&self.pool).await?;

        Ok(JobPage {
            items,
            total_count,
            total_pages,
            // The requested page is echoed even when the rows come from the
            // clamped one, matching the inherited pagination contract.
            current_page: params.page.page,
            page_size,
        })
    }
}

async fn fetch_for_update(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Job> {
    let sql = format!("SELECT {} FROM jobs WHERE id = $1 FOR UPDATE", JOB_COLUMNS);
    sqlx::query_as::<_, Job>(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| job_not_found(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_where(scope: VisibilityScope, filter: &JobFilter) -> String {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM jobs");
        apply_filters(&mut qb, &scope, filter);
        qb.sql().to_string()
    }

    #[test]
    fn scope_only_query_is_minimal() {
        let sql = build_where(VisibilityScope::ActiveOnly, &JobFilter::default());
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM jobs WHERE TRUE AND status = $1"
        );
    }

    #[test]
    fn superuser_scope_adds_no_predicate() {
        let sql = build_where(VisibilityScope::All, &JobFilter::default());
        assert_eq!(sql, "SELECT COUNT(*) FROM jobs WHERE TRUE");
    }

    #[test]
    fn regular_scope_includes_ownership() {
        let sql = build_where(
            VisibilityScope::ActiveOrCreatedBy(Uuid::new_v4()),
            &JobFilter::default(),
        );
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM jobs WHERE TRUE AND (status = $1 OR created_by = $2)"
        );
    }

    #[test]
    fn filters_compose_in_fixed_order() {
        let filter = JobFilter {
            title: Some("engineer".to_string()),
            location: Some("berlin".to_string()),
            required_skills: vec!["rust".to_string(), "sql".to_string()],
            salary: Some(SalaryFilter {
                salary_type: "annually".to_string(),
                currency: "EUR".to_string(),
                min_salary: Some(50_000),
                max_salary: None,
            }),
            posting_date_start: NaiveDate::from_ymd_opt(2026, 1, 1),
            ..JobFilter::default()
        };
        let sql = build_where(VisibilityScope::ActiveOnly, &filter);
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM jobs WHERE TRUE AND status = $1 AND title ILIKE $2 \
             AND location ILIKE $3 AND required_skills @> $4 AND required_skills @> $5 \
             AND salary_type = $6 AND salary_currency = $7 AND salary_max >= $8 \
             AND posting_date >= $9"
        );
    }

    #[test]
    fn default_order_is_most_recent_first() {
        let mut qb = QueryBuilder::new("SELECT 1 FROM jobs");
        apply_order(&mut qb, &Sort::default());
        assert_eq!(qb.sql(), "SELECT 1 FROM jobs ORDER BY posting_date DESC, id");
    }

    #[test]
    fn explicit_order_keeps_id_tiebreak() {
        let mut qb = QueryBuilder::new("SELECT 1 FROM jobs");
        apply_order(
            &mut qb,
            &Sort {
                field: Some(SortField::ExpirationDate),
                direction: SortDirection::Desc,
            },
        );
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM jobs ORDER BY expiration_date DESC, id"
        );
    }

    #[test]
    fn salary_bound_without_type_and_currency_is_rejected() {
        let query = JobListQuery {
            min_salary: Some(800_000),
            ..JobListQuery::default()
        };
        let err = JobSearchParams::from_query(query).unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg)
            if msg.contains("Salary type and currency are required")));

        let query = JobListQuery {
            max_salary: Some(100_000),
            salary_type: Some("annually".to_string()),
            ..JobListQuery::default()
        };
        assert!(JobSearchParams::from_query(query).is_err());
    }

    #[test]
    fn complete_salary_filter_is_accepted() {
        let query = JobListQuery {
            min_salary: Some(50_000),
            max_salary: Some(90_000),
            salary_type: Some("annually".to_string()),
            salary_currency: Some("USD".to_string()),
            ..JobListQuery::default()
        };
        let params = JobSearchParams::from_query(query).unwrap();
        let salary = params.filter.salary.unwrap();
        assert_eq!(salary.min_salary, Some(50_000));
        assert_eq!(salary.max_salary, Some(90_000));
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let query = JobListQuery {
            order_by: Some("salary_min".to_string()),
            ..JobListQuery::default()
        };
        assert!(JobSearchParams::from_query(query).is_err());
    }

    #[test]
    fn non_numeric_page_falls_back_to_first() {
        let query = JobListQuery {
            page: Some("abc".to_string()),
            ..JobListQuery::default()
        };
        let params = JobSearchParams::from_query(query).unwrap();
        assert_eq!(params.page.page, 1);
    }

    #[test]
    fn skills_are_split_and_trimmed() {
        let query = JobListQuery {
            required_skills: Some("rust, sql ,,".to_string()),
            ..JobListQuery::default()
        };
        let params = JobSearchParams::from_query(query).unwrap();
        assert_eq!(params.filter.required_skills, vec!["rust", "sql"]);
    }

    #[test]
    fn page_size_is_clamped() {
        let query = JobListQuery {
            page_size: Some(0),
            ..JobListQuery::default()
        };
        let params = JobSearchParams::from_query(query).unwrap();
        assert_eq!(params.page.page_size, 1);

        let query = JobListQuery {
            page_size: Some(1_000),
            ..JobListQuery::default()
        };
        let params = JobSearchParams::from_query(query).unwrap();
        assert_eq!(params.page.page_size, 100);
    }
}
