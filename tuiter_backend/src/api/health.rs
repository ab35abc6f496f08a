use super::{ApiResult, AppState};
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    version: &'static str,
    api_port: u16,
    database: &'static str,
}

pub(crate) async fn welcome() -> &'static str {
    "Welcome!"
}

pub(crate) async fn health(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    state.database.with_repositories(|repos| {
        repos
            .conn()
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(anyhow::Error::from)
    })?;
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        api_port: state.config.api_port,
        database: "ok",
    }))
}
