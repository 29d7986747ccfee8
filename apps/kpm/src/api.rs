//! # HTTP API
//!
//! | Method | Path                                | Action                        |
//! |--------|-------------------------------------|-------------------------------|
//! | GET    | `/health`                           | liveness                      |
//! | GET    | `/players`                          | roster grouped by year        |
//! | GET    | `/players/participation?year=YYYY`  | one year of the roster        |
//! | POST   | `/players`                          | replace the roster            |
//! | GET    | `/pool-status`                      | pool capacity                 |
//!
//! All store access goes through one async mutex, so roster saves never
//! interleave with each other or with reads.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use kpm_core::roster::{self, GroupedPlayers, PlayerView};
use kpm_core::{KpmError, PoolStatus, RosterStore, RosterSubmission};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use std::cmp::Reverse;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// STATE
// =============================================================================

/// Store shared by all handlers.
pub type SharedStore = Arc<Mutex<Box<dyn RosterStore + Send>>>;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
}

impl AppState {
    /// Wrap a store for use by the router.
    pub fn new(store: impl RosterStore + Send + 'static) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Message returned when the save body is not `{ data: [...] }`.
pub const INVALID_PAYLOAD: &str = "Invalid payload. Expected data: [{ year, players: [] }].";

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Kpm(#[from] KpmError),

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            Self::Kpm(err) => err,
            Self::InvalidPayload(rejection) => {
                tracing::warn!(error = %rejection.body_text(), "invalid roster payload");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": INVALID_PAYLOAD })),
                )
                    .into_response();
            }
        };

        let status = match err {
            KpmError::CapacityExhausted => StatusCode::CONFLICT,
            KpmError::EmptySubmission => StatusCode::BAD_REQUEST,
            KpmError::Storage(_) | KpmError::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if err.is_rejection() {
            tracing::warn!(error = %err, "request rejected");
        } else {
            tracing::error!(error = %err, "store failure");
        }

        let message = if status.is_server_error() {
            "Server error".to_string()
        } else {
            err.to_string()
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Players grouped by year, serialized as an object keyed by year with the
/// newest year first.
#[derive(Debug, Clone, Default)]
pub struct YearGroups(pub GroupedPlayers);

impl Serialize for YearGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (Reverse(year), players) in &self.0 {
            map.serialize_entry(&year.to_string(), players)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
struct Saved {
    message: &'static str,
    players: YearGroups,
}

#[derive(Debug, Deserialize)]
struct ParticipationQuery {
    year: i32,
}

#[derive(Debug, Serialize)]
struct Participation {
    year: i32,
    students: Vec<PlayerView>,
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_players(State(state): State<AppState>) -> Result<Json<YearGroups>, ApiError> {
    let store = state.store.lock().await;
    Ok(Json(YearGroups(roster::players_by_year(&**store)?)))
}

async fn participation(
    State(state): State<AppState>,
    Query(query): Query<ParticipationQuery>,
) -> Result<Json<Participation>, ApiError> {
    let store = state.store.lock().await;
    let students = roster::participation(&**store, query.year)?;
    Ok(Json(Participation {
        year: query.year,
        students,
    }))
}

async fn save_players(
    State(state): State<AppState>,
    payload: Result<Json<RosterSubmission>, JsonRejection>,
) -> Result<Json<Saved>, ApiError> {
    let Json(submission) = payload?;
    let mut store = state.store.lock().await;
    let outcome = roster::save_roster(&mut **store, &submission)?;

    tracing::info!(
        players = outcome.players.len(),
        retained = outcome.stats.retained,
        assigned = outcome.stats.assigned,
        inactive = outcome.stats.inactive,
        allocated = outcome.snapshot.allocated_count(),
        "roster saved"
    );

    Ok(Json(Saved {
        message: "Players saved successfully",
        players: YearGroups(roster::group_by_year(&outcome.players)),
    }))
}

async fn pool_status(State(state): State<AppState>) -> Result<Json<PoolStatus>, ApiError> {
    let store = state.store.lock().await;
    Ok(Json(roster::pool_status(&**store)?))
}

// =============================================================================
// ROUTER & SERVER
// =============================================================================

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/players", get(list_players).post(save_players))
        .route("/players/participation", get(participation))
        .route("/pool-status", get(pool_status))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Serve the API until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "KPM server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("KPM server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
