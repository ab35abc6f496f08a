use super::{ApiResult, AppState};
use crate::follows::FollowView;
use crate::views::DeleteStatus;
use axum::extract::{Path, State};
use axum::Json;
use tower_cookies::Cookies;

pub(crate) async fn list_following(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(uid): Path<String>,
) -> ApiResult<Vec<FollowView>> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.follows.list_following(&uid)?))
}

pub(crate) async fn list_followers(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(uid): Path<String>,
) -> ApiResult<Vec<FollowView>> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.follows.list_followers(&uid)?))
}

pub(crate) async fn find_follow(
    State(state): State<AppState>,
    cookies: Cookies,
    Path((uid, target)): Path<(String, String)>,
) -> ApiResult<Option<FollowView>> {
    let uid = state.resolve_user(&cookies, &uid)?;
    let target = state.resolve_user(&cookies, &target)?;
    Ok(Json(state.follows.find_follow(&uid, &target)?))
}

pub(crate) async fn follow(
    State(state): State<AppState>,
    cookies: Cookies,
    Path((uid, target)): Path<(String, String)>,
) -> ApiResult<FollowView> {
    let uid = state.resolve_user(&cookies, &uid)?;
    let target = state.resolve_user(&cookies, &target)?;
    Ok(Json(state.follows.follow(&uid, &target)?))
}

pub(crate) async fn unfollow(
    State(state): State<AppState>,
    cookies: Cookies,
    Path((uid, target)): Path<(String, String)>,
) -> ApiResult<DeleteStatus> {
    let uid = state.resolve_user(&cookies, &uid)?;
    let target = state.resolve_user(&cookies, &target)?;
    Ok(Json(state.follows.unfollow(&uid, &target)?))
}
