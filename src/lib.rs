//! Transit FSM: an embeddable asynchronous finite state machine engine.
//!
//! A host builds a graph of named nodes connected by named transitions,
//! attaches asynchronous hooks, and drives instances through it one
//! transition at a time.
//!
//! # Core Concepts
//!
//! - **Definition**: the shared graph (nodes, transitions, pre/post hooks),
//!   built once and referenced by every instance
//! - **Machine**: a per-instance position tracker with an in-flight guard
//! - **Hook**: an async action receiving `(node, transition, payload)`
//! - **Payload**: caller-owned context threaded by `&mut` through every hook
//!   of one transit call
//!
//! # Example
//!
//! ```rust
//! use futures::FutureExt;
//! use serde_json::json;
//! use std::sync::Arc;
//! use transit_fsm::{Definition, Hook, Payload};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let definition = Arc::new(Definition::<Payload>::new());
//! definition.node("start")?.transition(
//!     "thisIsTheEnd",
//!     "end",
//!     Hook::new(|_, _, payload: &mut Payload| {
//!         async move {
//!             payload.insert("job".to_string(), json!(4712));
//!             Ok(())
//!         }
//!         .boxed()
//!     }),
//! )?;
//! definition.node("end")?;
//! definition.set_initial_node("start")?;
//!
//! let machine = definition.instance();
//! let transited = futures::executor::block_on(machine.transit("thisIsTheEnd"))?;
//!
//! assert_eq!(transited.next_node, "end");
//! assert_eq!(transited.payload["job"], json!(4712));
//! assert_eq!(machine.previous_node().as_deref(), Some("start"));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod machine;

/// Default payload: a JSON object, empty unless the caller supplies one.
pub type Payload = serde_json::Map<String, serde_json::Value>;

// Re-export commonly used types
pub use core::{Hook, HookError, HookResult, Node, Transition, TransitionHistory, TransitionRecord};
pub use machine::{
    ConfigError, Definition, Machine, MachineConfig, TransitError, Transited,
    TransitionDescriptor,
};
