// Domain-level errors for the combat simulation.

use crate::domain::state::TankId;
use std::fmt;

/// Failure reported by a single teardown hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// The tank had no entry left in the named input registry.
    NotAttached { registry: &'static str },
    /// The tick subscription was already gone.
    NotSubscribed,
    /// Caller-supplied cleanup failed.
    Failed(String),
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookError::NotAttached { registry } => {
                write!(f, "tank is not attached to the {registry} registry")
            }
            HookError::NotSubscribed => write!(f, "tick subscription already cancelled"),
            HookError::Failed(message) => write!(f, "cleanup failed: {message}"),
        }
    }
}

impl std::error::Error for HookError {}

/// Errors returned by simulation operations addressed to a tank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    UnknownTank(TankId),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::UnknownTank(id) => write!(f, "unknown tank {id}"),
        }
    }
}

impl std::error::Error for SimError {}
