use super::users::CredentialsRequest;
use super::{ApiError, ApiJson, ApiResult, AppState};
use crate::error::ServiceError;
use crate::users::{CreateUserInput, UserView};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tower_cookies::Cookies;

pub(crate) async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    ApiJson(payload): ApiJson<CreateUserInput>,
) -> ApiResult<UserView> {
    let user = state.users.signup(payload)?;
    let session_id = state.sessions.open(&user.id)?;
    cookies.add(state.session_cookie(session_id));
    Ok(Json(user))
}

pub(crate) async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> ApiResult<UserView> {
    let user = state
        .users
        .find_by_credentials(&payload.username, &payload.password)?;
    let session_id = state.sessions.open(&user.id)?;
    cookies.add(state.session_cookie(session_id));
    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(user))
}

pub(crate) async fn profile(State(state): State<AppState>, cookies: Cookies) -> ApiResult<UserView> {
    match state.session_user(&cookies)? {
        Some(user) => Ok(Json(user)),
        None => Err(ServiceError::Forbidden("not logged in".into()).into()),
    }
}

pub(crate) async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<StatusCode, ApiError> {
    if let Some(cookie) = cookies.get(super::SESSION_COOKIE) {
        state.sessions.close(cookie.value())?;
    }
    cookies.remove(state.session_cookie(String::new()));
    Ok(StatusCode::OK)
}
