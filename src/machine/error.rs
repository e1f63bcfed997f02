//! Configuration and transit errors.

use crate::core::HookError;
use thiserror::Error;

/// Setup mistakes: missing names, unknown nodes, a malformed graph.
///
/// These are programmer errors and are never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Node name is missing")]
    MissingNodeName,

    #[error("Transition name is missing")]
    MissingTransitionName,

    #[error("Transition target node is missing")]
    MissingTargetNode,

    #[error("Invalid node name '{0}'")]
    UnknownNode(String),

    #[error("Initial node is missing. Call set_initial_node before transit")]
    Unpositioned,

    #[error("Transition '{transition}' on node '{node}' targets unregistered node '{target}'")]
    DanglingTarget {
        node: String,
        transition: String,
        target: String,
    },
}

/// Failure reported by [`Machine::transit`](crate::Machine::transit).
#[derive(Debug, Error)]
pub enum TransitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The current node has no transition with this name. The machine did
    /// not move.
    #[error("Transition '{transition}' missing on node '{node}'")]
    TransitionMissing { transition: String, node: String },

    /// Another transit is in flight on this instance.
    #[error("Transition '{transition}' already running from node '{node}'")]
    TransitionRunning { transition: String, node: String },

    /// A pre, leave, action, enter or post hook failed.
    #[error(transparent)]
    Hook(#[from] HookError),
}

impl TransitError {
    /// Node the machine stayed at, for a missing transition.
    pub fn stayed_at(&self) -> Option<&str> {
        match self {
            Self::TransitionMissing { node, .. } => Some(node.as_str()),
            _ => None,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// The hook error, if a hook failed.
    pub fn as_hook(&self) -> Option<&HookError> {
        match self {
            Self::Hook(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[derive(Debug, Error)]
    #[error("usurpator killed")]
    struct Usurped;

    #[test]
    fn hook_errors_display_verbatim() {
        let err = TransitError::from(anyhow!("noe"));
        assert_eq!(err.to_string(), "noe");
    }

    #[test]
    fn hook_errors_can_be_downcast() {
        let err = TransitError::from(anyhow::Error::new(Usurped));

        let hook = err.as_hook().unwrap();
        assert!(hook.downcast_ref::<Usurped>().is_some());
        assert_eq!(err.to_string(), "usurpator killed");
    }

    #[test]
    fn config_errors_are_flagged() {
        let err = TransitError::from(ConfigError::Unpositioned);
        assert!(err.is_config());
        assert!(err.stayed_at().is_none());
    }

    #[test]
    fn missing_transition_reports_stayed_at() {
        let err = TransitError::TransitionMissing {
            transition: "nichtDa".to_string(),
            node: "hugo".to_string(),
        };

        assert_eq!(err.stayed_at(), Some("hugo"));
        assert!(!err.is_config());
        assert_eq!(err.to_string(), "Transition 'nichtDa' missing on node 'hugo'");
    }
}
