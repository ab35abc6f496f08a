use super::{ApiResult, AppState};
use crate::likes::{DislikeView, LikeView, ToggleOutcome};
use axum::extract::{Path, State};
use axum::Json;
use tower_cookies::Cookies;

pub(crate) async fn list_liked_tuits(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(uid): Path<String>,
) -> ApiResult<Vec<LikeView>> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.likes.list_liked_tuits(&uid)?))
}

pub(crate) async fn list_disliked_tuits(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(uid): Path<String>,
) -> ApiResult<Vec<DislikeView>> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.likes.list_disliked_tuits(&uid)?))
}

pub(crate) async fn list_likers(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> ApiResult<Vec<LikeView>> {
    Ok(Json(state.likes.list_users_who_liked(&tid)?))
}

pub(crate) async fn list_dislikers(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> ApiResult<Vec<DislikeView>> {
    Ok(Json(state.likes.list_users_who_disliked(&tid)?))
}

pub(crate) async fn find_like(
    State(state): State<AppState>,
    cookies: Cookies,
    Path((uid, tid)): Path<(String, String)>,
) -> ApiResult<Option<LikeView>> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.likes.find_user_likes_tuit(&uid, &tid)?))
}

pub(crate) async fn find_dislike(
    State(state): State<AppState>,
    cookies: Cookies,
    Path((uid, tid)): Path<(String, String)>,
) -> ApiResult<Option<DislikeView>> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.likes.find_user_dislikes_tuit(&uid, &tid)?))
}

pub(crate) async fn toggle_like(
    State(state): State<AppState>,
    cookies: Cookies,
    Path((uid, tid)): Path<(String, String)>,
) -> ApiResult<ToggleOutcome> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.likes.toggle_like(&uid, &tid)?))
}

pub(crate) async fn toggle_dislike(
    State(state): State<AppState>,
    cookies: Cookies,
    Path((uid, tid)): Path<(String, String)>,
) -> ApiResult<ToggleOutcome> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.likes.toggle_dislike(&uid, &tid)?))
}
