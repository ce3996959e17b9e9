use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-supplied stable identifier for a robot endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RobotId(pub String);

impl RobotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RobotId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Token correlating an action dispatch with its completion report.
///
/// Generated as a UUIDv4 but held as a string: completion reports carry
/// whatever identifier the robot echoes back, and an arbitrary stale value
/// must compare unequal rather than fail to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of movement and lift verbs a robot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    #[serde(rename = "tien")]
    Forward,
    #[serde(rename = "lui")]
    Backward,
    #[serde(rename = "re_trai")]
    TurnLeft,
    #[serde(rename = "re_phai")]
    TurnRight,
    #[serde(rename = "dung_lai")]
    Stop,
    #[serde(rename = "nang")]
    Lift,
    #[serde(rename = "ha")]
    Lower,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Forward => "tien",
            Intent::Backward => "lui",
            Intent::TurnLeft => "re_trai",
            Intent::TurnRight => "re_phai",
            Intent::Stop => "dung_lai",
            Intent::Lift => "nang",
            Intent::Lower => "ha",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action parameter values, e.g. `"distance": 5` plus `"unit": "m"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

pub type Params = BTreeMap<String, ParamValue>;

/// One unit of commanded behavior, identified for completion correlation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub intent: Intent,
    pub params: Params,
    pub created_at: DateTime<Utc>,
}

impl Action {
    /// Builds an action with a fresh identifier. Identifiers are never reused.
    pub fn new(intent: Intent, params: Params) -> Self {
        Self {
            id: ActionId::generate(),
            intent,
            params,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Available,
    Controlled,
    Disconnected,
}
