use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shared::domain::RobotId;
use shared::error::{ApiError, ErrorCode};
use shared::protocol::{FleetStatus, RobotStatusDetail};

use crate::app_state::RelayState;

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    token: String,
}

async fn require_token(
    state: &RelayState,
    token: &str,
) -> Result<(), (StatusCode, Json<ApiError>)> {
    state.verifier.verify(token).await.map(|_| ()).map_err(|error| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new(
                ErrorCode::Unauthorized,
                format!("invalid token: {error}"),
            )),
        )
    })
}

pub async fn list_robots(
    State(state): State<Arc<RelayState>>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<FleetStatus>, (StatusCode, Json<ApiError>)> {
    require_token(&state, &query.token).await?;
    let statuses = state.registry.lock().await.all_statuses();
    Ok(Json(FleetStatus::from_statuses(statuses)))
}

pub async fn robot_detail(
    State(state): State<Arc<RelayState>>,
    Path(robot_id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<RobotStatusDetail>, (StatusCode, Json<ApiError>)> {
    require_token(&state, &query.token).await?;
    let robot_id = RobotId(robot_id);
    let status = state.registry.lock().await.status(&robot_id);
    Ok(Json(RobotStatusDetail { robot_id, status }))
}
