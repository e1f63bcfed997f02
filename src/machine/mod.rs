//! Graph definitions and the machine instances that walk them.
//!
//! A [`Definition`] is built once and shared behind an `Arc`. Each [`Machine`]
//! tracks its own position on that graph and runs the transit protocol,
//! allowing at most one transition in flight per instance.

mod config;
mod definition;
mod error;
mod instance;

pub use config::{MachineConfig, DEFAULT_HISTORY_LIMIT};
pub use definition::Definition;
pub use error::{ConfigError, TransitError};
pub use instance::{Machine, TransitionDescriptor, Transited};
