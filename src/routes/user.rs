use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::user_dto::{
        AccessTokenResponse, LoginPayload, RefreshPayload, RegisterUserPayload, TokenPairResponse,
        UserResponse,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "User registered successfully", body = Json<UserResponse>),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid email or weak password")
    )
)]
#[axum::debug_handler]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token pair issued", body = Json<TokenPairResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let pair = state.user_service.authenticate(payload).await?;
    Ok(Json(TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

#[utoipa::path(
    post,
    path = "/users/refresh_jwt",
    request_body = RefreshPayload,
    responses(
        (status = 200, description = "New access token issued", body = Json<AccessTokenResponse>),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
#[axum::debug_handler]
pub async fn refresh_jwt(
    State(state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> Result<impl IntoResponse> {
    let access_token = state.user_service.refresh(&payload.refresh_token).await?;
    Ok(Json(AccessTokenResponse { access_token }))
}
