use std::collections::{BTreeMap, HashMap};

use shared::domain::{RobotId, RobotStatus};
use thiserror::Error;

use crate::peer::{ConnectionId, PeerHandle, NORMAL_CLOSURE};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterRobotError {
    #[error("robot is already connected")]
    AlreadyRegistered,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairError {
    #[error("robot is not connected")]
    RobotNotConnected,
    #[error("robot is already controlled by another operator")]
    AlreadyControlled,
}

/// Tracks live robot and operator channels and enforces exclusive 1:1
/// control: at most one connection per robot identifier, at most one
/// operator per robot. Operators carry no identifier of their own, so
/// teardown goes through a reverse index keyed by connection id.
///
/// Every operation is synchronous; callers hold the state mutex for the
/// duration of a check-then-set, which keeps registrations atomic.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    robots: HashMap<RobotId, PeerHandle>,
    operators: HashMap<RobotId, PeerHandle>,
    operator_robots: HashMap<ConnectionId, RobotId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the mapping iff no live connection exists for the id.
    /// No side effects on rejection.
    pub fn register_robot(
        &mut self,
        robot_id: RobotId,
        handle: PeerHandle,
    ) -> Result<(), RegisterRobotError> {
        if self.robots.contains_key(&robot_id) {
            return Err(RegisterRobotError::AlreadyRegistered);
        }
        self.robots.insert(robot_id, handle);
        Ok(())
    }

    /// Removes the robot and cascade-closes any paired operator channel.
    /// Idempotent: unknown ids are a no-op.
    pub fn unregister_robot(&mut self, robot_id: &RobotId) {
        self.robots.remove(robot_id);
        if let Some(operator) = self.operators.remove(robot_id) {
            self.operator_robots.remove(&operator.id());
            operator.close(NORMAL_CLOSURE, format!("robot {robot_id} disconnected"));
        }
    }

    /// Pairs an operator with a robot. Fails without mutation if the robot
    /// is unknown or already under control.
    pub fn register_operator(
        &mut self,
        robot_id: RobotId,
        handle: PeerHandle,
    ) -> Result<(), PairError> {
        if !self.robots.contains_key(&robot_id) {
            return Err(PairError::RobotNotConnected);
        }
        if self.operators.contains_key(&robot_id) {
            return Err(PairError::AlreadyControlled);
        }
        self.operator_robots.insert(handle.id(), robot_id.clone());
        self.operators.insert(robot_id, handle);
        Ok(())
    }

    /// Releases a pairing via reverse lookup. Returns the robot the operator
    /// was controlling, or `None` if the connection was not paired.
    pub fn unregister_operator(&mut self, connection: ConnectionId) -> Option<RobotId> {
        let robot_id = self.operator_robots.remove(&connection)?;
        self.operators.remove(&robot_id);
        Some(robot_id)
    }

    pub fn get_robot(&self, robot_id: &RobotId) -> Option<&PeerHandle> {
        self.robots.get(robot_id)
    }

    pub fn get_operator(&self, robot_id: &RobotId) -> Option<&PeerHandle> {
        self.operators.get(robot_id)
    }

    pub fn status(&self, robot_id: &RobotId) -> RobotStatus {
        if !self.robots.contains_key(robot_id) {
            RobotStatus::Disconnected
        } else if self.operators.contains_key(robot_id) {
            RobotStatus::Controlled
        } else {
            RobotStatus::Available
        }
    }

    pub fn all_statuses(&self) -> BTreeMap<RobotId, RobotStatus> {
        self.robots
            .keys()
            .map(|id| (id.clone(), self.status(id)))
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
