use super::{ApiJson, ApiResult, AppState};
use crate::messages::{MessageView, SendMessageInput};
use crate::views::DeleteStatus;
use axum::extract::{Path, State};
use axum::Json;
use tower_cookies::Cookies;

pub(crate) async fn list_sent(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(uid): Path<String>,
) -> ApiResult<Vec<MessageView>> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.messages.list_sent(&uid)?))
}

pub(crate) async fn list_received(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(uid): Path<String>,
) -> ApiResult<Vec<MessageView>> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.messages.list_received(&uid)?))
}

/// `POST /api/users/:uid/messages/:id`: `id` is the recipient.
pub(crate) async fn send(
    State(state): State<AppState>,
    cookies: Cookies,
    Path((uid, recipient)): Path<(String, String)>,
    ApiJson(payload): ApiJson<SendMessageInput>,
) -> ApiResult<MessageView> {
    let uid = state.resolve_user(&cookies, &uid)?;
    let recipient = state.resolve_user(&cookies, &recipient)?;
    Ok(Json(state.messages.send(&uid, &recipient, payload)?))
}

/// `DELETE /api/users/:uid/messages/:id`: `id` is the message.
pub(crate) async fn delete(
    State(state): State<AppState>,
    cookies: Cookies,
    Path((uid, message_id)): Path<(String, String)>,
) -> ApiResult<DeleteStatus> {
    let uid = state.resolve_user(&cookies, &uid)?;
    Ok(Json(state.messages.delete(&uid, &message_id)?))
}
