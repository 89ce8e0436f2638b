use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::attrs;
use crate::diagnostics::DiagnosticsState;
use crate::facade::context::StatsSnapshot;
use crate::facade::level::Level;

#[derive(Serialize)]
pub struct Vars {
    pub version: &'static str,
    pub level: Level,
    pub uptime_secs: u64,
    pub hook_installed: bool,
    pub stats: StatsSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelBody {
    pub level: Level,
}

pub async fn get_vars(State(state): State<DiagnosticsState>) -> Json<Vars> {
    Json(Vars {
        version: env!("CARGO_PKG_VERSION"),
        level: state.ctx.level(),
        uptime_secs: state.started.elapsed().as_secs(),
        hook_installed: crate::recovery::hook::is_installed(),
        stats: state.ctx.stats(),
    })
}

pub async fn get_level(State(state): State<DiagnosticsState>) -> Json<LevelBody> {
    Json(LevelBody {
        level: state.ctx.level(),
    })
}

pub async fn put_level(
    State(state): State<DiagnosticsState>,
    Json(body): Json<LevelBody>,
) -> Json<LevelBody> {
    let previous = state.ctx.level();
    state.ctx.set_level(body.level);
    state.ctx.info(
        "log level changed",
        attrs!["from" => previous.as_str(), "to" => body.level.as_str(), "via" => "diagnostics"],
    );
    Json(body)
}

pub async fn get_metrics(State(state): State<DiagnosticsState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
