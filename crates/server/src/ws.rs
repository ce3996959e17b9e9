use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::StreamExt;
use serde::Deserialize;
use shared::domain::{Action, RobotId};
use shared::protocol::{ActionDispatch, CompletionReport, ErrorReply, IntentRequest, StatusReport};
use tracing::{debug, info, warn};

use crate::app_state::RelayState;
use crate::peer::{pump_outbound, PeerHandle, POLICY_VIOLATION};
use crate::registry::PairError;

#[derive(Debug, Deserialize)]
pub struct OperatorQuery {
    token: String,
}

pub async fn robot_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RelayState>>,
    Path(robot_id): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| robot_connection(state, socket, RobotId(robot_id)))
}

pub async fn operator_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RelayState>>,
    Path(robot_id): Path<String>,
    Query(query): Query<OperatorQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| operator_connection(state, socket, RobotId(robot_id), query.token))
}

async fn robot_connection(state: Arc<RelayState>, socket: WebSocket, robot_id: RobotId) {
    let (sink, mut stream) = socket.split();
    let (handle, rx) = PeerHandle::new();
    let pump = tokio::spawn(pump_outbound(rx, sink));

    let registered = state
        .registry
        .lock()
        .await
        .register_robot(robot_id.clone(), handle.clone());
    if registered.is_err() {
        warn!(%robot_id, "rejecting duplicate robot connection");
        handle.close(
            POLICY_VIOLATION,
            format!("robot {robot_id} is already connected"),
        );
        drop(handle);
        let _ = pump.await;
        return;
    }
    info!(%robot_id, "robot connected");

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => handle_robot_message(&state, &robot_id, &text).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!(%robot_id, "robot disconnected");
    robot_disconnected(&state, &robot_id).await;
    drop(handle);
    let _ = pump.await;
}

async fn operator_connection(
    state: Arc<RelayState>,
    socket: WebSocket,
    robot_id: RobotId,
    token: String,
) {
    let (sink, mut stream) = socket.split();
    let (handle, rx) = PeerHandle::new();
    let pump = tokio::spawn(pump_outbound(rx, sink));

    if let Err(error) = state.verifier.verify(&token).await {
        warn!(%robot_id, code = error.error_code(), "operator credential rejected");
        handle.close(POLICY_VIOLATION, error.to_string());
        drop(handle);
        let _ = pump.await;
        return;
    }

    let paired = state
        .registry
        .lock()
        .await
        .register_operator(robot_id.clone(), handle.clone());
    if let Err(error) = paired {
        let reason = match error {
            PairError::RobotNotConnected => format!("robot {robot_id} is not connected"),
            PairError::AlreadyControlled => format!("robot {robot_id} is already controlled"),
        };
        info!(%robot_id, %reason, "rejecting operator connection");
        handle.close(POLICY_VIOLATION, reason);
        drop(handle);
        let _ = pump.await;
        return;
    }
    info!(%robot_id, "operator paired");

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                handle_operator_message(&state, &robot_id, &handle, &text).await
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!(%robot_id, "operator disconnected");
    operator_disconnected(&state, &robot_id, &handle).await;
    drop(handle);
    let _ = pump.await;
}

/// Handles one inbound robot frame: a strictly parsed completion report.
/// On an identifier match the formatted status goes to the paired operator
/// (best-effort, sequencing advances whether or not anyone observes it) and
/// the next queued action, if any, is dispatched to the robot.
pub(crate) async fn handle_robot_message(state: &RelayState, robot_id: &RobotId, text: &str) {
    let report: CompletionReport = match serde_json::from_str(text) {
        Ok(report) => report,
        Err(error) => {
            warn!(%robot_id, %error, "dropping malformed robot frame");
            return;
        }
    };

    let outcome = state
        .sequencer
        .lock()
        .await
        .process_robot_completion(robot_id, &report.action_id);
    let Some(outcome) = outcome else {
        debug!(%robot_id, action_id = %report.action_id, "ignoring stale completion report");
        return;
    };

    let operator = state.registry.lock().await.get_operator(robot_id).cloned();
    if let Some(operator) = operator {
        let status = StatusReport::new(&outcome.completed, &report);
        match state.formatter.format_status(&status).await {
            Ok(text) => {
                operator.send_text(text);
            }
            Err(error) => warn!(%robot_id, %error, "status formatting failed"),
        }
    }

    match outcome.next {
        Some(next) => {
            let robot = state.registry.lock().await.get_robot(robot_id).cloned();
            if let Some(robot) = robot {
                robot.send_json(&ActionDispatch::from(&next));
            }
        }
        None => debug!(%robot_id, "action sequence finished"),
    }
}

/// Handles one inbound operator frame. A payload that parses as a structured
/// intent bypasses interpretation; anything else goes through the
/// natural-language interpreter. The resulting actions supersede any
/// in-flight sequence, and only the head is dispatched.
pub(crate) async fn handle_operator_message(
    state: &RelayState,
    robot_id: &RobotId,
    operator: &PeerHandle,
    text: &str,
) {
    let intents = match serde_json::from_str::<IntentRequest>(text) {
        Ok(single) => vec![single],
        Err(_) => match state.interpreter.interpret(text).await {
            Ok(intents) => intents,
            Err(error) => {
                warn!(%robot_id, %error, "command interpretation failed");
                Vec::new()
            }
        },
    };
    if intents.is_empty() {
        operator.send_json(&ErrorReply::new("command not understood", robot_id.clone()));
        return;
    }

    let actions: Vec<Action> = intents
        .into_iter()
        .map(|request| Action::new(request.intent, request.params))
        .collect();

    let robot = state.registry.lock().await.get_robot(robot_id).cloned();
    let Some(robot) = robot else {
        // A command aimed at an absent robot leaves no latent state behind.
        state.sequencer.lock().await.cancel_robot_actions(robot_id);
        operator.send_json(&ErrorReply::new("robot unavailable", robot_id.clone()));
        return;
    };

    let head = state
        .sequencer
        .lock()
        .await
        .create_action_sequence(robot_id.clone(), actions);
    let Some(head) = head else {
        operator.send_json(&ErrorReply::new(
            "could not build action sequence",
            robot_id.clone(),
        ));
        return;
    };
    robot.send_json(&ActionDispatch::from(&head));
}

/// Teardown for a lost robot: cancel sequencing, tell the operator why the
/// cascade is coming, then unregister (which closes the operator channel).
pub(crate) async fn robot_disconnected(state: &RelayState, robot_id: &RobotId) {
    state.sequencer.lock().await.cancel_robot_actions(robot_id);
    let mut registry = state.registry.lock().await;
    if let Some(operator) = registry.get_operator(robot_id) {
        operator.send_json(&ErrorReply::new("robot disconnected", robot_id.clone()));
    }
    registry.unregister_robot(robot_id);
}

/// Teardown for a lost operator: the robot stays registered, only the
/// pairing and sequencing state are released.
pub(crate) async fn operator_disconnected(
    state: &RelayState,
    robot_id: &RobotId,
    operator: &PeerHandle,
) {
    state.sequencer.lock().await.cancel_robot_actions(robot_id);
    let mut registry = state.registry.lock().await;
    registry.unregister_operator(operator.id());
    if let Some(robot) = registry.get_robot(robot_id) {
        robot.send_json(&ErrorReply::new("operator disconnected", robot_id.clone()));
    }
}

#[cfg(test)]
#[path = "tests/ws_tests.rs"]
mod tests;
