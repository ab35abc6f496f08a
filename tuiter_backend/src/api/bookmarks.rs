use super::{ApiResult, AppState};
use crate::bookmarks::BookmarkView;
use crate::views::DeleteStatus;
use axum::extract::{Path, State};
use axum::Json;
use tower_cookies::Cookies;

pub(crate) async fn list_bookmarks(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(uid): Path<String>,
) -> ApiResult<Vec<BookmarkView>> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.bookmarks.list_bookmarks(&uid)?))
}

pub(crate) async fn list_bookmarkers(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> ApiResult<Vec<BookmarkView>> {
    Ok(Json(state.bookmarks.list_bookmarkers(&tid)?))
}

pub(crate) async fn find_bookmark(
    State(state): State<AppState>,
    cookies: Cookies,
    Path((uid, tid)): Path<(String, String)>,
) -> ApiResult<Option<BookmarkView>> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.bookmarks.find_bookmark(&uid, &tid)?))
}

pub(crate) async fn bookmark(
    State(state): State<AppState>,
    cookies: Cookies,
    Path((uid, tid)): Path<(String, String)>,
) -> ApiResult<BookmarkView> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.bookmarks.bookmark(&uid, &tid)?))
}

pub(crate) async fn unbookmark(
    State(state): State<AppState>,
    cookies: Cookies,
    Path((uid, tid)): Path<(String, String)>,
) -> ApiResult<DeleteStatus> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.bookmarks.unbookmark(&uid, &tid)?))
}
