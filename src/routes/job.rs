use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    authz::{visibility_scope, Identity},
    dto::job_dto::{JobListQuery, JobListResponse, JobPayload, JobResponse},
    error::Result,
    services::job_service::JobSearchParams,
    AppState,
};

#[utoipa::path(
    post,
    path = "/jobs",
    request_body = JobPayload,
    responses(
        (status = 201, description = "Job created successfully", body = Json<JobResponse>),
        (status = 400, description = "Business rule violation"),
        (status = 403, description = "Not allowed to create jobs for this company"),
        (status = 422, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<JobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.create(&identity, payload).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    get,
    path = "/jobs",
    params(
        ("title" = Option<String>, Query, description = "Filter by title substring"),
        ("description" = Option<String>, Query, description = "Filter by description substring"),
        ("company_name" = Option<String>, Query, description = "Filter by company name substring"),
        ("location" = Option<String>, Query, description = "Filter by location substring"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("required_skills" = Option<String>, Query, description = "Comma-separated skills, all required"),
        ("salary_type" = Option<String>, Query, description = "Salary type for salary filtering"),
        ("salary_currency" = Option<String>, Query, description = "Salary currency for salary filtering"),
        ("min_salary" = Option<i64>, Query, description = "Lower salary bound"),
        ("max_salary" = Option<i64>, Query, description = "Upper salary bound"),
        ("order_by" = Option<String>, Query, description = "posting_date or expiration_date"),
        ("order_direction" = Option<String>, Query, description = "asc or desc"),
        ("page" = Option<String>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated job listings", body = Json<JobListResponse>),
        (status = 400, description = "Incomplete salary filter")
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let params = JobSearchParams::from_query(query)?;
    let scope = visibility_scope(&identity);
    let page = state.job_service.search(scope, params).await?;
    Ok(Json(JobListResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = Json<JobResponse>),
        (status = 404, description = "Job not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_visible(&identity, id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    put,
    path = "/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = JobPayload,
    responses(
        (status = 200, description = "Job updated successfully", body = Json<JobResponse>),
        (status = 400, description = "Company name cannot be changed"),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Job not found"),
        (status = 422, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.update(&identity, id, payload).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    delete,
    path = "/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 204, description = "Job deleted successfully"),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.job_service.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
