use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::company_dto::{
        CompanyResponse, CreateCompanyPayload, CreateDomainPayload, DomainResponse,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/companies",
    request_body = CreateCompanyPayload,
    responses(
        (status = 201, description = "Company created successfully", body = Json<CompanyResponse>),
        (status = 409, description = "Company name already taken"),
        (status = 422, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_company(
    State(state): State<AppState>,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let company = state.company_service.create_company(payload).await?;
    Ok((StatusCode::CREATED, Json(CompanyResponse::from(company))))
}

#[utoipa::path(
    delete,
    path = "/companies/{id}",
    params(
        ("id" = Uuid, Path, description = "Company ID")
    ),
    responses(
        (status = 204, description = "Company deleted successfully"),
        (status = 404, description = "Company not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.company_service.delete_company(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/companies/{id}/domains",
    params(
        ("id" = Uuid, Path, description = "Company ID")
    ),
    request_body = CreateDomainPayload,
    responses(
        (status = 201, description = "Domain created successfully", body = Json<DomainResponse>),
        (status = 404, description = "Company not found"),
        (status = 409, description = "Domain already registered"),
        (status = 422, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_domain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateDomainPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let domain = state.company_service.create_domain(id, payload).await?;
    Ok((StatusCode::CREATED, Json(DomainResponse::from(domain))))
}

#[utoipa::path(
    delete,
    path = "/companies/{id}/domains/{domain_id}",
    params(
        ("id" = Uuid, Path, description = "Company ID"),
        ("domain_id" = Uuid, Path, description = "Domain ID")
    ),
    responses(
        (status = 204, description = "Domain deleted successfully"),
        (status = 404, description = "Company or domain not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_domain(
    State(state): State<AppState>,
    Path((id, domain_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    state.company_service.delete_domain(id, domain_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
