use std::sync::Arc;

use tokio::sync::Mutex;

use crate::auth::TokenVerifier;
use crate::interpreter::{CommandInterpreter, StatusFormatter};
use crate::registry::ConnectionRegistry;
use crate::sequencer::ActionSequencer;

/// Process-wide relay state, constructed once in `main` and shared by every
/// connection task.
///
/// The registry and sequencer guards are only held across synchronous map
/// work, never across a collaborator await, so check-then-set sequences stay
/// atomic under the multi-task runtime.
pub struct RelayState {
    pub registry: Mutex<ConnectionRegistry>,
    pub sequencer: Mutex<ActionSequencer>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub interpreter: Arc<dyn CommandInterpreter>,
    pub formatter: Arc<dyn StatusFormatter>,
}

impl RelayState {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        interpreter: Arc<dyn CommandInterpreter>,
        formatter: Arc<dyn StatusFormatter>,
    ) -> Self {
        Self {
            registry: Mutex::new(ConnectionRegistry::new()),
            sequencer: Mutex::new(ActionSequencer::new()),
            verifier,
            interpreter,
            formatter,
        }
    }
}
