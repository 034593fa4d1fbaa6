//! HTTP routes exposing an indexed history.
//!
//! | Route             | Response                              |
//! |-------------------|---------------------------------------|
//! | `GET /lines`      | `{"lines": <int>}`                    |
//! | `GET /pheromones` | `{"min": <float>, "max": <float>}`    |
//! | `GET /line/:id`   | the parsed event, tagged by `"type"`  |

use std::{num::IntErrorKind, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};

use crate::{
    bounds::BoundsBody, error::Error, event::Event, index::Index, History, Indexable, ReadByLine,
    Result,
};

/// Shared state of all handlers
type AppState<S> = State<Arc<History<S>>>;

/// Response of `GET /lines`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinesBody {
    pub lines: usize,
}

/// Everything a request can fail with
#[derive(Debug)]
pub enum ServerError {
    History(Error),
    /// A line id which is an integer but doesn't even fit into an `i64`
    LineOverflow { line: String, lines: usize },
    /// A line id which isn't an integer at all
    InvalidLine(String),
}

impl From<Error> for ServerError {
    fn from(e: Error) -> Self {
        Self::History(e)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::History(err) => {
                let status = match &err {
                    Error::OutOfBounds { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                    err if err.is_unparsable() => StatusCode::UNPROCESSABLE_ENTITY,
                    err => {
                        error!(%err, "failed reading history");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.to_string()).into_response()
            }
            ServerError::LineOverflow { line, lines } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Line {} is out of bounds [0,{}]", line, lines as i64 - 1),
            )
                .into_response(),
            ServerError::InvalidLine(line) => (
                StatusCode::BAD_REQUEST,
                format!("Line {:?} is not a number", line),
            )
                .into_response(),
        }
    }
}

/// Parses the `:line_id` of a request into a valid line-index
fn resolve_line(index: &Index, line_id: String) -> std::result::Result<usize, ServerError> {
    match line_id.parse::<i64>() {
        Ok(line) => Ok(index.resolve(line)?),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Err(ServerError::LineOverflow {
                line: line_id,
                lines: index.len(),
            }),
            _ => Err(ServerError::InvalidLine(line_id)),
        },
    }
}

/// Create the router serving `history`
pub fn router<S: ReadByLine + 'static>(history: Arc<History<S>>) -> Router {
    Router::new()
        .route("/lines", get(lines::<S>))
        .route("/pheromones", get(pheromones::<S>))
        .route("/line/:line_id", get(line::<S>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(history)
}

/// Serve `history` on `listener` until the process gets stopped.
pub async fn serve<S: ReadByLine + 'static>(
    listener: TcpListener,
    history: Arc<History<S>>,
) -> Result<()> {
    info!(addr = %listener.local_addr()?, lines = history.lines(), "serving history");
    axum::serve(listener, router(history)).await?;
    Ok(())
}

async fn lines<S: ReadByLine>(State(history): AppState<S>) -> Json<LinesBody> {
    Json(LinesBody {
        lines: history.lines(),
    })
}

async fn pheromones<S: ReadByLine>(State(history): AppState<S>) -> Json<BoundsBody> {
    Json(history.pheromone_bounds().into())
}

async fn line<S: ReadByLine>(
    State(history): AppState<S>,
    Path(line_id): Path<String>,
) -> std::result::Result<Json<Event>, ServerError> {
    let line = resolve_line(history.get_index(), line_id)?;
    debug!(line, "serving line");
    Ok(Json(history.event(line).await?))
}
