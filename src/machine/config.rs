//! Instance configuration.

use serde::{Deserialize, Serialize};

/// Number of history records kept when no limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Settings applied to a [`Machine`](crate::Machine) at construction.
///
/// Every field has a default, so partial documents deserialize cleanly:
///
/// ```rust
/// use transit_fsm::MachineConfig;
///
/// let config: MachineConfig = serde_json::from_str("{}").unwrap();
/// assert_eq!(config, MachineConfig::default());
///
/// let unbounded: MachineConfig = serde_json::from_str(r#"{"history_limit": null}"#).unwrap();
/// assert_eq!(unbounded.history_limit, None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Maximum number of node switches kept in the instance history.
    /// `None` keeps all of them.
    pub history_limit: Option<usize>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
        }
    }
}
