use super::{ApiJson, ApiResult, AppState};
use crate::error::ServiceError;
use crate::tuits::{CreateTuitInput, TuitView, UpdateTuitInput};
use crate::views::{DeleteStatus, UpdateStatus};
use axum::extract::{Path, State};
use axum::Json;
use tower_cookies::Cookies;

pub(crate) async fn list_tuits(State(state): State<AppState>) -> ApiResult<Vec<TuitView>> {
    Ok(Json(state.tuits.list_tuits()?))
}

pub(crate) async fn get_tuit(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> ApiResult<TuitView> {
    Ok(Json(state.tuits.get_tuit(&tid)?))
}

pub(crate) async fn list_tuits_by_user(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(uid): Path<String>,
) -> ApiResult<Vec<TuitView>> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.tuits.list_tuits_by_user(&uid)?))
}

/// `POST /api/tuits`: the author comes from `postedBy` in the body.
pub(crate) async fn create_tuit(
    State(state): State<AppState>,
    cookies: Cookies,
    ApiJson(payload): ApiJson<CreateTuitInput>,
) -> ApiResult<TuitView> {
    let Some(author) = payload.posted_by.as_deref() else {
        return Err(ServiceError::Validation("postedBy is required".into()).into());
    };
    let uid = state.resolve_user(&cookies, author)?;
    Ok(Json(state.tuits.create_tuit(&uid, payload)?))
}

pub(crate) async fn create_tuit_for_user(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(uid): Path<String>,
    ApiJson(payload): ApiJson<CreateTuitInput>,
) -> ApiResult<TuitView> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.tuits.create_tuit(&uid, payload)?))
}

pub(crate) async fn update_tuit(
    State(state): State<AppState>,
    Path(tid): Path<String>,
    ApiJson(payload): ApiJson<UpdateTuitInput>,
) -> ApiResult<UpdateStatus> {
    Ok(Json(state.tuits.update_tuit(&tid, payload)?))
}

pub(crate) async fn delete_tuit(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> ApiResult<DeleteStatus> {
    Ok(Json(state.tuits.delete_tuit(&tid)?))
}
