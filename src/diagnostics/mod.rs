//! Diagnostics HTTP endpoint.
//!
//! # Routes
//! - `GET /debug/vars`: version, level, uptime, record and panic counters
//! - `GET /debug/level`, `PUT /debug/level`: read or change the level
//! - `GET /metrics`: Prometheus text, when a recorder is installed
//!
//! # Design Decisions
//! - The server task runs inside a recovery boundary; a bind failure goes
//!   through `check`, so it is logged once and the task ends quietly
//! - Stops when the [`Shutdown`] broadcast fires

pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::attrs;
use crate::facade::context::LogContext;
use crate::lifecycle::shutdown::Shutdown;
use crate::recovery::spawn_recovered;
use self::handlers::*;

/// State shared by the diagnostics handlers.
#[derive(Clone)]
pub struct DiagnosticsState {
    pub ctx: Arc<LogContext>,
    pub metrics: Option<PrometheusHandle>,
    pub started: Instant,
}

impl DiagnosticsState {
    pub fn new(ctx: Arc<LogContext>, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            ctx,
            metrics,
            started: Instant::now(),
        }
    }
}

pub fn router(state: DiagnosticsState) -> Router {
    Router::new()
        .route("/debug/vars", get(get_vars))
        .route("/debug/level", get(get_level).put(put_level))
        .route("/metrics", get(get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the diagnostics endpoint on `addr` in a background task.
///
/// The task yields `None` if it ended through a recovered panic, including
/// a failed bind.
pub fn open(addr: String, state: DiagnosticsState, shutdown: Shutdown) -> JoinHandle<Option<()>> {
    let ctx = state.ctx.clone();
    spawn_recovered(ctx.clone(), true, async move {
        let listener = ctx.check(TcpListener::bind(&addr).await, attrs!["addr" => &addr]);
        if let Ok(local) = listener.local_addr() {
            ctx.info("diagnostics listening", attrs!["addr" => local.to_string()]);
        }

        let served = axum::serve(listener, router(state))
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await;
        ctx.check(served, attrs!["addr" => &addr]);
        ctx.info("diagnostics stopped", attrs![]);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::level::Level;
    use crate::facade::sink::MemorySink;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state() -> (DiagnosticsState, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let ctx = Arc::new(LogContext::new(sink.clone()));
        (DiagnosticsState::new(ctx, None), sink)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_vars_report_level_and_stats() {
        let (state, _sink) = state();
        state.ctx.warn("one", attrs![]);

        let response = router(state)
            .oneshot(Request::get("/debug/vars").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["level"], "debug");
        assert_eq!(json["stats"]["warn"], 1);
    }

    #[tokio::test]
    async fn test_put_level() {
        let (state, sink) = state();
        let ctx = state.ctx.clone();

        let response = router(state)
            .oneshot(
                Request::put("/debug/level")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"level":"error"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ctx.level(), Level::Error);
        // The change itself is logged at Info, below the new level.
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_put_invalid_level_is_rejected() {
        let (state, _sink) = state();
        let ctx = state.ctx.clone();

        let response = router(state)
            .oneshot(
                Request::put("/debug/level")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"level":"loud"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ctx.level(), Level::Debug);
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let (state, _sink) = state();
        let response = router(state)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bind_failure_is_checked_and_absorbed() {
        let (state, sink) = state();
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap().to_string();

        let outcome = open(addr, state.clone(), Shutdown::new()).await.unwrap();

        assert_eq!(outcome, None);
        assert_eq!(sink.messages(), ["checkError"]);
        assert_eq!(state.ctx.stats().checked_panics, 1);
    }

    #[tokio::test]
    async fn test_open_serves_until_shutdown() {
        let (state, sink) = state();
        let shutdown = Shutdown::new();
        let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = probe.local_addr().unwrap().to_string();
        drop(probe);

        let task = open(addr, state, shutdown.clone());
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        shutdown.trigger();

        assert_eq!(task.await.unwrap(), Some(()));
        assert!(sink.messages().contains(&"diagnostics stopped".to_string()));
    }
}
