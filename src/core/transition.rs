//! Named edges between nodes.

use super::hook::{Hook, HookResult};
use super::node::Node;
use crate::machine::ConfigError;
use std::fmt;

/// Name given to a node's enter hook.
pub const ENTER: &str = "enter";
/// Name given to a node's leave hook.
pub const LEAVE: &str = "leave";
/// Name given to the definition-level pre-transition hook.
pub const PRE_TRANSITION: &str = "pre_transition";
/// Name given to the definition-level post-transition hook.
pub const POST_TRANSITION: &str = "post_transition";

/// A named edge carrying an asynchronous action.
///
/// The source is implicit (the node owning the transition). The target is
/// stored by name and only resolved against the graph when the transition
/// fires, so edges may point at nodes registered later.
pub struct Transition<P> {
    name: String,
    target: String,
    hook: Hook<P>,
}

impl<P> fmt::Debug for Transition<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl<P: Send + 'static> Transition<P> {
    /// Create a transition. Fails if `name` or `target` is empty.
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        hook: Hook<P>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let target = target.into();

        if name.is_empty() {
            return Err(ConfigError::MissingTransitionName);
        }
        if target.is_empty() {
            return Err(ConfigError::MissingTargetNode);
        }

        Ok(Self { name, target, hook })
    }

    pub(crate) fn new_unchecked(name: &str, target: String, hook: Hook<P>) -> Self {
        Self {
            name: name.to_string(),
            target,
            hook,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the node this transition leads to.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Run the action against `owner` and report the target on success.
    ///
    /// Action failures are returned unchanged.
    pub async fn run(&self, owner: &Node<P>, payload: &mut P) -> HookResult<&str> {
        self.hook.call(owner, self, payload).await?;
        Ok(&self.target)
    }
}
