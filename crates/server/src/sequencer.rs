use std::collections::{HashMap, VecDeque};

use shared::domain::{Action, ActionId, RobotId};

/// Result of matching a completion report against the executing action.
/// `next` is absent when the sequence just finished.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub completed: Action,
    pub next: Option<Action>,
}

/// Per-robot ordered pending queue plus the single currently-executing
/// action. The queue is the tail of a sequence whose head is out on the
/// wire, so it is only non-empty while an executing action exists.
#[derive(Debug, Default)]
pub struct ActionSequencer {
    queues: HashMap<RobotId, VecDeque<Action>>,
    executing: HashMap<RobotId, Action>,
}

impl ActionSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any in-flight sequence for the robot (latest command
    /// supersedes, no merge) and returns the head action, now marked
    /// executing. The caller dispatches it; the remainder stays queued,
    /// undispatched, until completions drain it. Empty input leaves the
    /// robot idle and returns `None`.
    pub fn create_action_sequence(
        &mut self,
        robot_id: RobotId,
        actions: Vec<Action>,
    ) -> Option<Action> {
        self.cancel_robot_actions(&robot_id);

        let mut queue: VecDeque<Action> = actions.into();
        let first = queue.pop_front()?;
        self.executing.insert(robot_id.clone(), first.clone());
        self.queues.insert(robot_id, queue);
        Some(first)
    }

    /// Correlates a completion report with the executing action. A stale,
    /// duplicate, or unknown identifier returns `None` and leaves all state
    /// untouched. On a match the next queued action (if any) becomes
    /// executing; otherwise all state for the robot is cleared.
    pub fn process_robot_completion(
        &mut self,
        robot_id: &RobotId,
        completed_action_id: &ActionId,
    ) -> Option<CompletionOutcome> {
        let current = self.executing.get(robot_id)?;
        if current.id != *completed_action_id {
            return None;
        }
        let completed = self.executing.remove(robot_id)?;

        match self.queues.get_mut(robot_id).and_then(VecDeque::pop_front) {
            Some(next) => {
                self.executing.insert(robot_id.clone(), next.clone());
                Some(CompletionOutcome {
                    completed,
                    next: Some(next),
                })
            }
            None => {
                self.queues.remove(robot_id);
                Some(CompletionOutcome {
                    completed,
                    next: None,
                })
            }
        }
    }

    /// Unconditionally clears the executing action and pending queue.
    /// Used on disconnect of either peer and on supersession.
    pub fn cancel_robot_actions(&mut self, robot_id: &RobotId) {
        self.executing.remove(robot_id);
        self.queues.remove(robot_id);
    }

    pub fn has_pending_actions(&self, robot_id: &RobotId) -> bool {
        self.executing.contains_key(robot_id) || self.queues.contains_key(robot_id)
    }
}

#[cfg(test)]
#[path = "tests/sequencer_tests.rs"]
mod tests;
