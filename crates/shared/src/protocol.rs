use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Action, ActionId, Intent, Params, RobotId, RobotStatus};

/// Robot to server: asserts that a previously dispatched action finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionReport {
    pub action_id: ActionId,
    pub success: bool,
    pub message: String,
}

/// Server to robot: the single action to execute now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDispatch {
    pub action_id: ActionId,
    pub intent: Intent,
    pub params: Params,
}

impl From<&Action> for ActionDispatch {
    fn from(action: &Action) -> Self {
        Self {
            action_id: action.id.clone(),
            intent: action.intent,
            params: action.params.clone(),
        }
    }
}

/// Operator to server: a pre-structured single intent.
///
/// Operator payloads that parse as this shape bypass natural-language
/// interpretation; anything else is treated as free text. Unknown fields are
/// rejected so that unrelated JSON falls through to the interpreter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntentRequest {
    pub intent: Intent,
    #[serde(default)]
    pub params: Params,
}

/// Server to operator (and best-effort to the robot on peer loss).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
    pub robot_id: RobotId,
}

impl ErrorReply {
    pub fn new(error: impl Into<String>, robot_id: RobotId) -> Self {
        Self {
            error: error.into(),
            robot_id,
        }
    }
}

/// Input handed to the status-formatting collaborator: the completed action
/// joined with the robot's raw report. The collaborator's output is opaque
/// text relayed to the operator verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub action_id: ActionId,
    pub intent: Intent,
    pub params: Params,
    pub success: bool,
    pub message: String,
}

impl StatusReport {
    pub fn new(completed: &Action, report: &CompletionReport) -> Self {
        Self {
            action_id: completed.id.clone(),
            intent: completed.intent,
            params: completed.params.clone(),
            success: report.success,
            message: report.message.clone(),
        }
    }
}

/// Aggregate status listing for the query surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetStatus {
    pub robots: BTreeMap<RobotId, RobotStatus>,
    pub total: usize,
    pub available: usize,
    pub controlled: usize,
    pub disconnected: usize,
}

impl FleetStatus {
    pub fn from_statuses(robots: BTreeMap<RobotId, RobotStatus>) -> Self {
        let count = |status: RobotStatus| robots.values().filter(|s| **s == status).count();
        Self {
            total: robots.len(),
            available: count(RobotStatus::Available),
            controlled: count(RobotStatus::Controlled),
            disconnected: count(RobotStatus::Disconnected),
            robots,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotStatusDetail {
    pub robot_id: RobotId,
    pub status: RobotStatus,
}
