//! Service state machine.
//!
//! # State Transitions
//! ```text
//! Created ──initialize──▶ Initialized ──start──▶ Running ──stop──▶ Stopped
//!                          │  ▲
//!                          └──┘ initialize (reconfigure)
//! ```
//!
//! `stop` outside `Running` is accepted and changes nothing.

use std::fmt;

use crate::lifecycle::LifecycleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Created,
    Initialized,
    Running,
    Stopped,
}

/// A lifecycle operation, for transition checks and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Initialize,
    Start,
    Stop,
}

impl ServiceState {
    pub fn permits(self, operation: Operation) -> bool {
        match operation {
            Operation::Initialize => {
                matches!(self, ServiceState::Created | ServiceState::Initialized)
            }
            Operation::Start => self == ServiceState::Initialized,
            Operation::Stop => true,
        }
    }

    pub fn check(self, operation: Operation) -> Result<(), LifecycleError> {
        if self.permits(operation) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                operation,
                state: self,
            })
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Created => "created",
            ServiceState::Initialized => "initialized",
            ServiceState::Running => "running",
            ServiceState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Initialize => "initialize",
            Operation::Start => "start",
            Operation::Stop => "stop",
        };
        f.write_str(s)
    }
}
