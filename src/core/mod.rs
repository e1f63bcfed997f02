//! Graph building blocks.
//!
//! - [`Hook`]: asynchronous actions run at well-defined points of a transit
//! - [`Transition`]: named edge with a late-bound target and an action
//! - [`Node`]: vertex owning transitions, enter/leave hooks and custom properties
//! - [`TransitionHistory`]: per-instance log of node switches

mod history;
mod hook;
mod node;
mod transition;

pub use history::{TransitionHistory, TransitionRecord};
pub use hook::{Hook, HookError, HookResult};
pub use node::Node;
pub use transition::{Transition, ENTER, LEAVE, POST_TRANSITION, PRE_TRANSITION};
