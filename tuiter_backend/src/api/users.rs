use super::{ApiJson, ApiResult, AppState};
use crate::users::{CreateUserInput, UpdateUserInput, UserView};
use crate::views::{DeleteStatus, UpdateStatus};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tower_cookies::Cookies;

#[derive(Debug, Deserialize)]
pub(crate) struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub(crate) async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<UserView>> {
    Ok(Json(state.users.list_users()?))
}

pub(crate) async fn get_user(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(uid): Path<String>,
) -> ApiResult<UserView> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.users.get_user(&uid)?))
}

pub(crate) async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserInput>,
) -> ApiResult<UserView> {
    Ok(Json(state.users.create_user(payload)?))
}

pub(crate) async fn update_user(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(uid): Path<String>,
    ApiJson(payload): ApiJson<UpdateUserInput>,
) -> ApiResult<UpdateStatus> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.users.update_user(&uid, payload)?))
}

pub(crate) async fn delete_user(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(uid): Path<String>,
) -> ApiResult<DeleteStatus> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.users.delete_user(&uid)?))
}

pub(crate) async fn delete_all_users(State(state): State<AppState>) -> ApiResult<DeleteStatus> {
    Ok(Json(state.users.delete_all_users()?))
}

pub(crate) async fn delete_users_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<DeleteStatus> {
    Ok(Json(state.users.delete_users_by_username(&username)?))
}

/// Plain credential check; does not open a session.
pub(crate) async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> ApiResult<UserView> {
    let user = state
        .users
        .find_by_credentials(&payload.username, &payload.password)?;
    Ok(Json(user))
}
