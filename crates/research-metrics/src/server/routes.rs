//! Router and request handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{ClientError, PipelineError};
use crate::models::SuggestInput;
use crate::pipeline::{self, Dashboard, PipelineContext};
use crate::session::{Session, SessionManager};

/// Query parameters selecting a session.
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Shared state for HTTP handlers.
pub struct HttpState {
    /// Registered dashboards.
    pub dashboards: Vec<Box<dyn Dashboard>>,
    /// Pipeline context.
    pub ctx: PipelineContext,
    /// Live sessions.
    pub sessions: Arc<SessionManager>,
}

/// Create the HTTP router and start session cleanup.
pub fn create_router(dashboards: Vec<Box<dyn Dashboard>>, ctx: PipelineContext) -> Router {
    let sessions = Arc::new(SessionManager::new());
    Arc::clone(&sessions).start_cleanup_task();
    create_router_with_sessions(dashboards, ctx, sessions)
}

/// Create the HTTP router over an existing session manager.
pub fn create_router_with_sessions(
    dashboards: Vec<Box<dyn Dashboard>>,
    ctx: PipelineContext,
    sessions: Arc<SessionManager>,
) -> Router {
    let state = Arc::new(HttpState { dashboards, ctx, sessions });

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/api/suggest/institutions", get(suggest_institutions))
        .route("/api/suggest/authors", get(suggest_authors))
        .route("/api/dashboards", get(list_dashboards))
        .route("/api/dashboards/{name}", post(run_dashboard))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "research-metrics",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ready",
        "service": "research-metrics",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.session_count().await,
        "dashboards": state.dashboards.len(),
        "politePool": state.ctx.client.has_mailto()
    }))
}

fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Validation { .. } | PipelineError::Serialization(_) => StatusCode::BAD_REQUEST,
        PipelineError::NotFound { .. } | PipelineError::Client(ClientError::NotFound { .. }) => {
            StatusCode::NOT_FOUND
        }
        PipelineError::Client(ClientError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
        PipelineError::Client(_) => StatusCode::BAD_GATEWAY,
    }
}

fn error_response(err: &PipelineError, session_id: Option<&str>) -> Response {
    let mut body = json!({ "error": err.to_user_message() });
    if let Some(id) = session_id {
        body["sessionId"] = json!(id);
    }
    (status_for(err), Json(body)).into_response()
}

async fn session_body(session: &Session) -> Value {
    let status = session.status().await;
    json!({
        "sessionId": session.id,
        "status": status,
        "message": status.message(),
        "snapshot": session.snapshot().await.as_deref(),
    })
}

async fn suggest_institutions(
    State(state): State<Arc<HttpState>>,
    Query(input): Query<SuggestInput>,
) -> Response {
    match pipeline::suggest_institutions(&state.ctx, &input.query).await {
        Ok(matches) => Json(matches).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Institution suggestion failed");
            error_response(&e, None)
        }
    }
}

async fn suggest_authors(State(state): State<Arc<HttpState>>, Query(input): Query<SuggestInput>) -> Response {
    match pipeline::suggest_authors(&state.ctx, &input.query).await {
        Ok(matches) => Json(matches).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Author suggestion failed");
            error_response(&e, None)
        }
    }
}

async fn list_dashboards(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let dashboards: Vec<Value> = state
        .dashboards
        .iter()
        .map(|d| {
            json!({
                "name": d.name(),
                "description": d.description(),
                "inputSchema": d.input_schema()
            })
        })
        .collect();
    Json(json!({ "dashboards": dashboards }))
}

async fn run_dashboard(
    State(state): State<Arc<HttpState>>,
    Path(name): Path<String>,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> Response {
    let Some(dashboard) = pipeline::find_dashboard(&state.dashboards, &name) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": format!("Unknown dashboard: {name}") })))
            .into_response();
    };

    let input = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(e) => return error_response(&PipelineError::from(e), query.session_id.as_deref()),
        }
    };

    let session = state.sessions.get_or_create_session(query.session_id.as_deref()).await;
    let previous = session.snapshot().await;
    let ticket = session.begin_query().await;

    tracing::debug!(dashboard = %name, session_id = %session.id, ticket = ticket.generation(), "Running dashboard");

    match dashboard.execute(&state.ctx, input, previous).await {
        Ok(snapshot) => {
            if session.publish(ticket, snapshot).await.is_some() {
                Json(session_body(&session).await).into_response()
            } else {
                let mut body = session_body(&session).await;
                body["error"] = json!("Superseded by a newer query");
                (StatusCode::CONFLICT, Json(body)).into_response()
            }
        }
        Err(e) => {
            tracing::warn!(dashboard = %name, error = %e, "Dashboard query failed");
            session.fail(ticket, e.to_user_message()).await;
            error_response(&e, Some(&session.id))
        }
    }
}

async fn get_session(State(state): State<Arc<HttpState>>, Path(id): Path<String>) -> Response {
    match state.sessions.get_session(&id).await {
        Some(session) => {
            session.touch().await;
            Json(session_body(&session).await).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "Unknown session" }))).into_response(),
    }
}

async fn delete_session(State(state): State<Arc<HttpState>>, Path(id): Path<String>) -> StatusCode {
    if state.sessions.remove_session(&id).await { StatusCode::NO_CONTENT } else { StatusCode::NOT_FOUND }
}
