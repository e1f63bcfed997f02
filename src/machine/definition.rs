//! Shared graph definition.

use super::error::ConfigError;
use super::instance::Machine;
use crate::core::{Hook, Node, Transition, POST_TRANSITION, PRE_TRANSITION};
use crate::Payload;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// The graph shared by every [`Machine`] built from it.
///
/// A definition owns the nodes (with their transitions and enter/leave hooks),
/// the pre/post transition hooks and an optional default initial node. It is
/// built once and then handed to instances behind an `Arc`; instances only
/// read from it. Nodes are returned as `Arc<Node<P>>`, so custom state stored
/// on a node through [`Node::set_property`] is visible to every instance.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use transit_fsm::{Definition, Hook, Payload};
///
/// # fn main() -> Result<(), transit_fsm::ConfigError> {
/// let definition = Arc::new(Definition::<Payload>::new());
/// definition.node("A")?.transition("t1", "B", Hook::noop())?;
/// definition.node("B")?.transition("t2", "A", Hook::noop())?;
/// definition.set_initial_node("A")?;
///
/// let machine = definition.instance();
/// assert_eq!(machine.current_node().as_deref(), Some("A"));
/// # Ok(())
/// # }
/// ```
pub struct Definition<P = Payload> {
    nodes: RwLock<HashMap<String, Arc<Node<P>>>>,
    initial: RwLock<Option<String>>,
    pre_transition: RwLock<Option<Arc<Transition<P>>>>,
    post_transition: RwLock<Option<Arc<Transition<P>>>>,
}

impl<P: Send + 'static> Definition<P> {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            initial: RwLock::new(None),
            pre_transition: RwLock::new(None),
            post_transition: RwLock::new(None),
        }
    }

    /// Register a node, or return the existing node with this name.
    ///
    /// Calling this twice with the same name yields the same `Arc`.
    pub fn node(&self, name: &str) -> Result<Arc<Node<P>>, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::MissingNodeName);
        }

        if let Some(node) = self.nodes.read().get(name) {
            return Ok(Arc::clone(node));
        }

        let mut nodes = self.nodes.write();
        let node = match nodes.get(name) {
            Some(node) => Arc::clone(node),
            None => {
                tracing::trace!(node = %name, "registered node");
                let node = Arc::new(Node::new(name)?);
                nodes.insert(name.to_string(), Arc::clone(&node));
                node
            }
        };
        Ok(node)
    }

    pub fn get_node(&self, name: &str) -> Option<Arc<Node<P>>> {
        self.nodes.read().get(name).cloned()
    }

    /// Names of all registered nodes, sorted.
    pub fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Set the node new instances start in. The node must already exist.
    ///
    /// Instances created before this call stay unpositioned.
    pub fn set_initial_node(&self, name: &str) -> Result<(), ConfigError> {
        self.resolve(name)?;
        *self.initial.write() = Some(name.to_string());
        Ok(())
    }

    pub fn initial_node(&self) -> Option<String> {
        self.initial.read().clone()
    }

    /// Install the hook run before every transit, ahead of guard acquisition.
    /// Replaces any previous pre-transition hook.
    pub fn set_pre_transition(&self, hook: Hook<P>) {
        *self.pre_transition.write() = Some(Self::definition_hook(PRE_TRANSITION, hook));
    }

    /// Install the hook run after every successful transit, once the guard is
    /// released. Replaces any previous post-transition hook.
    pub fn set_post_transition(&self, hook: Hook<P>) {
        *self.post_transition.write() = Some(Self::definition_hook(POST_TRANSITION, hook));
    }

    pub fn pre_transition(&self) -> Option<Arc<Transition<P>>> {
        self.pre_transition.read().clone()
    }

    pub fn post_transition(&self) -> Option<Arc<Transition<P>>> {
        self.post_transition.read().clone()
    }

    /// Create a new instance positioned on the current initial node.
    pub fn instance(self: &Arc<Self>) -> Machine<P> {
        Machine::new(Arc::clone(self))
    }

    /// Report every transition whose target is not a registered node.
    ///
    /// Targets stay late-bound: an unresolved target only fails when the
    /// transition fires. This check lets a host catch such mistakes up front,
    /// collecting all of them rather than stopping at the first.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigError>> {
        let nodes = self.nodes.read();
        let mut names: Vec<&String> = nodes.keys().collect();
        names.sort();

        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigError>>> = Vec::new();
        for name in names {
            let node = &nodes[name];
            for transition_name in node.transition_names() {
                let Some(transition) = node.get_transition(&transition_name) else {
                    continue;
                };
                let check = if nodes.contains_key(transition.target()) {
                    Validation::success(())
                } else {
                    Validation::fail(ConfigError::DanglingTarget {
                        node: name.clone(),
                        transition: transition_name,
                        target: transition.target().to_string(),
                    })
                };
                checks.push(check);
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<Arc<Node<P>>, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::MissingNodeName);
        }
        self.get_node(name)
            .ok_or_else(|| ConfigError::UnknownNode(name.to_string()))
    }

    fn definition_hook(name: &str, hook: Hook<P>) -> Arc<Transition<P>> {
        Arc::new(Transition::new_unchecked(name, name.to_string(), hook))
    }
}

impl<P: Send + 'static> Default for Definition<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Definition<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes: Vec<String> = self.nodes.read().keys().cloned().collect();
        nodes.sort();
        f.debug_struct("Definition")
            .field("nodes", &nodes)
            .field("initial", &*self.initial.read())
            .field("pre_transition", &self.pre_transition.read().is_some())
            .field("post_transition", &self.post_transition.read().is_some())
            .finish()
    }
}
