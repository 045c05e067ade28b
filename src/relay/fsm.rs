use crate::{Error, Result};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Validating,
    AwaitingUpstream,
    Streaming,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEvent {
    RequestReceived,
    MethodRejected,
    PromptAccepted,
    BodyOpened,
    StreamClosed,
    ErrorOccurred,
}

/// Lifecycle of a single relay cycle. One instance per inbound request.
#[derive(Debug)]
pub struct RelayStateMachine {
    state: RelayState,
    last_error: Option<String>,
}

impl Default for RelayStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayStateMachine {
    pub fn new() -> Self {
        Self {
            state: RelayState::Idle,
            last_error: None,
        }
    }

    pub fn current_state(&self) -> RelayState {
        self.state
    }

    pub fn transition(&mut self, event: RelayEvent) -> Result<()> {
        let old_state = self.state;

        let new_state = match (old_state, event) {
            (RelayState::Idle, RelayEvent::RequestReceived) => RelayState::Validating,
            (RelayState::Idle, RelayEvent::MethodRejected) => RelayState::Failed,
            (RelayState::Validating, RelayEvent::PromptAccepted) => RelayState::AwaitingUpstream,
            (RelayState::AwaitingUpstream, RelayEvent::BodyOpened) => RelayState::Streaming,
            (RelayState::Streaming, RelayEvent::StreamClosed) => RelayState::Completed,
            (
                RelayState::Idle
                | RelayState::Validating
                | RelayState::AwaitingUpstream
                | RelayState::Streaming,
                RelayEvent::ErrorOccurred,
            ) => RelayState::Failed,
            _ => {
                warn!(
                    "Invalid relay transition from {:?} with event {:?}",
                    old_state, event
                );
                return Err(Error::InvalidTransition {
                    current: format!("{:?}", old_state),
                    requested: format!("{:?}", event),
                });
            }
        };

        debug!(
            "Relay state transition: {:?} -> {:?} (event: {:?})",
            old_state, new_state, event
        );

        self.state = new_state;
        Ok(())
    }

    /// Moves to `Failed` and records the error. Every failure is logged here.
    pub fn fail(&mut self, err: &Error) {
        error!("Relay failed in state {:?}: {}", self.state, err);
        self.last_error = Some(err.to_string());

        if self.state != RelayState::Failed {
            if let Err(e) = self.transition(RelayEvent::ErrorOccurred) {
                warn!("Could not record failure: {}", e);
            }
        }
    }

    pub fn complete(&mut self) -> Result<()> {
        self.transition(RelayEvent::StreamClosed)?;
        info!("Relay completed");
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, RelayState::Completed | RelayState::Failed)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
