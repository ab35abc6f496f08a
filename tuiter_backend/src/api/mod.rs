mod auth;
mod bookmarks;
mod follows;
mod health;
mod likes;
mod messages;
mod tuits;
mod users;

use crate::bookmarks::BookmarkService;
use crate::config::TuiterConfig;
use crate::database::Database;
use crate::error::ServiceError;
use crate::follows::FollowService;
use crate::likes::LikeService;
use crate::messages::MessageService;
use crate::sessions::{is_self_alias, resolve_user_id, SessionService};
use crate::tuits::TuitService;
use crate::users::{UserService, UserView};
use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub(crate) const SESSION_COOKIE: &str = "tuiter.sid";

/// Shared handler state. Every access object is built once here and cloned
/// into each request.
#[derive(Clone)]
pub struct AppState {
    pub config: TuiterConfig,
    pub database: Database,
    pub users: UserService,
    pub tuits: TuitService,
    pub follows: FollowService,
    pub bookmarks: BookmarkService,
    pub messages: MessageService,
    pub likes: LikeService,
    pub sessions: SessionService,
}

impl AppState {
    pub fn new(config: TuiterConfig, database: Database) -> Self {
        Self {
            users: UserService::new(database.clone()),
            tuits: TuitService::new(database.clone()),
            follows: FollowService::new(database.clone()),
            bookmarks: BookmarkService::new(database.clone()),
            messages: MessageService::new(database.clone()),
            likes: LikeService::new(database.clone()),
            sessions: SessionService::new(database.clone()),
            config,
            database,
        }
    }

    /// The logged-in user, if the request carries a live session cookie.
    pub(crate) fn session_user(&self, cookies: &Cookies) -> Result<Option<UserView>, ApiError> {
        let Some(cookie) = cookies.get(SESSION_COOKIE) else {
            return Ok(None);
        };
        Ok(self.sessions.profile(cookie.value())?)
    }

    /// Resolves a user path segment, swapping `me`/`my` for the session
    /// user when there is one.
    pub(crate) fn resolve_user(&self, cookies: &Cookies, raw: &str) -> Result<String, ApiError> {
        if !is_self_alias(raw) {
            return Ok(raw.to_string());
        }
        let session_user = self.session_user(cookies)?;
        Ok(resolve_user_id(raw, session_user.as_ref().map(|u| u.id.as_str())))
    }

    pub(crate) fn session_cookie(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(SESSION_COOKIE, value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        if self.config.http.secure_cookies {
            cookie.set_secure(true);
            cookie.set_same_site(SameSite::None);
        } else {
            cookie.set_same_site(SameSite::Lax);
        }
        cookie
    }
}

pub(crate) type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug)]
pub struct ApiError(ServiceError);

impl ApiError {
    fn into_response_parts(self) -> (StatusCode, ErrorResponse) {
        let kind = self.0.kind();
        match self.0 {
            ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(kind, msg)),
            ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(kind, msg)),
            ServiceError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::new(kind, msg)),
            ServiceError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorResponse::new(kind, msg)),
            ServiceError::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(kind, "internal server error".into()),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_response_parts();
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(ServiceError::Internal(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(ServiceError::Validation(rejection.body_text()))
    }
}

/// JSON body extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub(crate) struct ApiJson<T>(pub T);

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl ErrorResponse {
    fn new(error: &'static str, message: String) -> Self {
        Self { error, message }
    }
}

pub fn build_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .http
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health))
        .route("/api/login", post(users::login))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/profile", post(auth::profile))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/users",
            get(users::list_users)
                .post(users::create_user)
                .delete(users::delete_all_users),
        )
        .route("/api/users/delete", get(users::delete_all_users))
        .route(
            "/api/users/:uid",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/users/id/:uid/delete", get(users::delete_user))
        .route("/api/users/username/:username", delete(users::delete_users_by_username))
        .route(
            "/api/users/username/:username/delete",
            get(users::delete_users_by_username),
        )
        .route("/api/tuits", get(tuits::list_tuits).post(tuits::create_tuit))
        .route(
            "/api/tuits/:tid",
            get(tuits::get_tuit)
                .put(tuits::update_tuit)
                .delete(tuits::delete_tuit),
        )
        .route(
            "/api/users/:uid/tuits",
            get(tuits::list_tuits_by_user).post(tuits::create_tuit_for_user),
        )
        .route("/api/users/:uid/bookmarks", get(bookmarks::list_bookmarks))
        .route(
            "/api/users/:uid/bookmarks/:tid",
            get(bookmarks::find_bookmark)
                .post(bookmarks::bookmark)
                .delete(bookmarks::unbookmark),
        )
        .route("/api/users/:uid/unbookmarks/:tid", delete(bookmarks::unbookmark))
        .route("/api/tuits/:tid/bookmarks", get(bookmarks::list_bookmarkers))
        .route("/api/users/:uid/following", get(follows::list_following))
        .route("/api/users/:uid/followers", get(follows::list_followers))
        .route(
            "/api/users/:uid/following/:target",
            get(follows::find_follow)
                .post(follows::follow)
                .delete(follows::unfollow),
        )
        .route("/api/users/:uid/unfollowing/:target", delete(follows::unfollow))
        .route("/api/users/:uid/messages/sent", get(messages::list_sent))
        .route("/api/users/:uid/messages/receive", get(messages::list_received))
        .route(
            "/api/users/:uid/messages/:id",
            post(messages::send).delete(messages::delete),
        )
        .route("/api/users/:uid/likes", get(likes::list_liked_tuits))
        .route(
            "/api/users/:uid/likes/:tid",
            get(likes::find_like).put(likes::toggle_like),
        )
        .route("/api/tuits/:tid/likes", get(likes::list_likers))
        .route("/api/users/:uid/dislikes", get(likes::list_disliked_tuits))
        .route(
            "/api/users/:uid/dislikes/:tid",
            get(likes::find_dislike).put(likes::toggle_dislike),
        )
        .route("/api/tuits/:tid/dislikes", get(likes::list_dislikers))
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Tries to bind to the given port, or finds the next available port
async fn find_available_port(start_port: u16) -> Result<(TcpListener, u16)> {
    const MAX_PORT_ATTEMPTS: u16 = 100;

    for offset in 0..MAX_PORT_ATTEMPTS {
        let port = start_port.saturating_add(offset);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok((listener, port)),
            Err(e) => {
                if offset == 0 {
                    tracing::debug!(port, error = %e, "Port in use, trying next port");
                }
                continue;
            }
        }
    }

    anyhow::bail!(
        "Could not find available port in range {}-{}",
        start_port,
        start_port.saturating_add(MAX_PORT_ATTEMPTS - 1)
    )
}

pub async fn serve_http(config: TuiterConfig, database: Database) -> Result<()> {
    let state = AppState::new(config.clone(), database);
    let router = build_router(state);

    let (listener, actual_port) = find_available_port(config.api_port).await?;
    let addr = SocketAddr::from(([0, 0, 0, 0], actual_port));

    if actual_port != config.api_port {
        tracing::warn!(
            requested_port = config.api_port,
            actual_port = actual_port,
            "Configured port was in use, bound to next available port"
        );
    }

    tracing::info!(
        ?addr,
        allowed_origins = ?config.http.allowed_origins,
        secure_cookies = config.http.secure_cookies,
        "HTTP server listening"
    );
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
