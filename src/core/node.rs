//! Graph vertices.
//!
//! A [`Node`] owns its outgoing transitions, its optional enter/leave hooks and
//! a bag of custom properties. Nodes live inside a shared
//! [`Definition`](crate::Definition) and are handed out as `Arc<Node<P>>`, so
//! every machine instance built from the same definition sees the same node
//! objects. All mutation goes through interior locks; the locks are never held
//! while a hook runs.

use super::hook::{Hook, HookResult};
use super::transition::{Transition, ENTER, LEAVE};
use crate::machine::{ConfigError, TransitError};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A named state in the graph.
pub struct Node<P> {
    name: String,
    transitions: RwLock<HashMap<String, Arc<Transition<P>>>>,
    leave: RwLock<Option<Arc<Transition<P>>>>,
    enter: RwLock<Option<Arc<Transition<P>>>>,
    properties: RwLock<Map<String, Value>>,
}

impl<P: Send + 'static> Node<P> {
    /// Create a detached node. Fails if `name` is empty.
    ///
    /// Most callers get nodes from [`Definition::node`](crate::Definition::node)
    /// instead.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::MissingNodeName);
        }

        Ok(Self {
            name,
            transitions: RwLock::new(HashMap::new()),
            leave: RwLock::new(None),
            enter: RwLock::new(None),
            properties: RwLock::new(Map::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an outgoing transition, replacing any transition of the same
    /// name. `target` is not checked against the graph here.
    ///
    /// ```rust
    /// use transit_fsm::{Definition, Hook, Payload};
    ///
    /// # fn main() -> Result<(), transit_fsm::ConfigError> {
    /// let definition = Definition::<Payload>::new();
    /// definition
    ///     .node("Verus")?
    ///     .transition("predecessor", "Mark Aurel", Hook::noop())?
    ///     .transition("successor", "Commodus", Hook::noop())?;
    ///
    /// let verus = definition.node("Verus")?;
    /// assert_eq!(verus.transition_names(), vec!["predecessor", "successor"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn transition(
        &self,
        name: impl Into<String>,
        target: impl Into<String>,
        hook: Hook<P>,
    ) -> Result<&Self, ConfigError> {
        let transition = Transition::new(name, target, hook)?;
        tracing::trace!(
            node = %self.name,
            transition = %transition.name(),
            target = %transition.target(),
            "registered transition"
        );
        self.transitions
            .write()
            .insert(transition.name().to_string(), Arc::new(transition));
        Ok(self)
    }

    pub fn get_transition(&self, name: &str) -> Option<Arc<Transition<P>>> {
        self.transitions.read().get(name).cloned()
    }

    /// Names of all outgoing transitions, sorted.
    pub fn transition_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.transitions.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Install the leave hook, replacing any previous one.
    pub fn on_leave(&self, hook: Hook<P>) -> &Self {
        *self.leave.write() = Some(self.self_transition(LEAVE, hook));
        self
    }

    /// Install the enter hook, replacing any previous one.
    pub fn on_enter(&self, hook: Hook<P>) -> &Self {
        *self.enter.write() = Some(self.self_transition(ENTER, hook));
        self
    }

    pub fn leave_hook(&self) -> Option<Arc<Transition<P>>> {
        self.leave.read().clone()
    }

    pub fn enter_hook(&self) -> Option<Arc<Transition<P>>> {
        self.enter.read().clone()
    }

    /// Run the leave hook if one is installed.
    pub async fn run_leave(&self, payload: &mut P) -> HookResult {
        let hook = self.leave_hook();
        self.run_hook(hook, payload).await
    }

    /// Run the enter hook if one is installed.
    pub async fn run_enter(&self, payload: &mut P) -> HookResult {
        let hook = self.enter_hook();
        self.run_hook(hook, payload).await
    }

    /// Fire the named outgoing transition and return its target.
    ///
    /// An unknown name yields [`TransitError::TransitionMissing`] naming this
    /// node, i.e. the machine stays where it is.
    pub async fn run_transit(&self, name: &str, payload: &mut P) -> Result<String, TransitError> {
        let Some(transition) = self.get_transition(name) else {
            return Err(TransitError::TransitionMissing {
                transition: name.to_string(),
                node: self.name.clone(),
            });
        };

        let target = transition.run(self, payload).await?;
        Ok(target.to_string())
    }

    /// Set a custom property. Visible to every instance sharing this node.
    pub fn set_property(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.write().insert(key.into(), value.into());
    }

    pub fn property(&self, key: &str) -> Option<Value> {
        self.properties.read().get(key).cloned()
    }

    pub fn remove_property(&self, key: &str) -> Option<Value> {
        self.properties.write().remove(key)
    }

    fn self_transition(&self, name: &str, hook: Hook<P>) -> Arc<Transition<P>> {
        // Node names are never empty, so this cannot fail.
        Arc::new(Transition::new_unchecked(name, self.name.clone(), hook))
    }

    async fn run_hook(&self, hook: Option<Arc<Transition<P>>>, payload: &mut P) -> HookResult {
        match hook {
            Some(hook) => hook.run(self, payload).await.map(|_| ()),
            None => Ok(()),
        }
    }
}

impl<P> fmt::Debug for Node<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut transitions: Vec<String> = self.transitions.read().keys().cloned().collect();
        transitions.sort();
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("transitions", &transitions)
            .field("leave", &self.leave.read().is_some())
            .field("enter", &self.enter.read().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Payload;
    use anyhow::anyhow;
    use futures::executor::block_on;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>) -> Hook<Payload> {
        let counter = Arc::clone(counter);
        Hook::from_fn(move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn new_rejects_missing_name() {
        assert!(matches!(
            Node::<Payload>::new(""),
            Err(ConfigError::MissingNodeName)
        ));
    }

    #[test]
    fn name_returns_node_name() {
        let node = Node::<Payload>::new("octavius").unwrap();
        assert_eq!(node.name(), "octavius");
    }

    #[test]
    fn transition_validates_arguments() {
        let node = Node::<Payload>::new("Test").unwrap();

        assert!(matches!(
            node.transition("", "caligula", Hook::noop()),
            Err(ConfigError::MissingTransitionName)
        ));
        assert!(matches!(
            node.transition("tiberius", "", Hook::noop()),
            Err(ConfigError::MissingTargetNode)
        ));
    }

    #[test]
    fn transition_registers_and_get_transition_finds_it() {
        let node = Node::<Payload>::new("Test").unwrap();
        assert!(node.get_transition("claudius").is_none());

        node.transition("claudius", "scribonianus", Hook::noop())
            .unwrap();

        let transition = node.get_transition("claudius").unwrap();
        assert_eq!(transition.name(), "claudius");
        assert_eq!(transition.target(), "scribonianus");
    }

    #[test]
    fn transition_overwrites_same_name() {
        let node = Node::<Payload>::new("Test").unwrap();
        node.transition("claudius", "scribonianus", Hook::noop())
            .unwrap()
            .transition("claudius", "nero", Hook::noop())
            .unwrap();

        assert_eq!(node.transition_names(), vec!["claudius"]);
        assert_eq!(node.get_transition("claudius").unwrap().target(), "nero");
    }

    #[test]
    fn enter_and_leave_hooks_target_their_node() {
        let node = Node::<Payload>::new("Test").unwrap();
        assert!(node.leave_hook().is_none());
        assert!(node.enter_hook().is_none());

        node.on_leave(Hook::noop()).on_enter(Hook::noop());

        let leave = node.leave_hook().unwrap();
        let enter = node.enter_hook().unwrap();
        assert_eq!(leave.name(), LEAVE);
        assert_eq!(leave.target(), "Test");
        assert_eq!(enter.name(), ENTER);
        assert_eq!(enter.target(), "Test");
    }

    #[test]
    fn run_leave_and_run_enter_call_hooks_once() {
        let leaves = Arc::new(AtomicUsize::new(0));
        let enters = Arc::new(AtomicUsize::new(0));
        let node = Node::<Payload>::new("Test").unwrap();
        node.on_leave(counting(&leaves)).on_enter(counting(&enters));

        let mut payload = Payload::new();
        block_on(node.run_leave(&mut payload)).unwrap();
        block_on(node.run_enter(&mut payload)).unwrap();

        assert_eq!(leaves.load(Ordering::SeqCst), 1);
        assert_eq!(enters.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn run_leave_and_run_enter_succeed_without_hooks() {
        let node = Node::<Payload>::new("Test").unwrap();
        let mut payload = Payload::new();

        assert!(block_on(node.run_leave(&mut payload)).is_ok());
        assert!(block_on(node.run_enter(&mut payload)).is_ok());
    }

    #[test]
    fn run_leave_propagates_failure() {
        let node = Node::<Payload>::new("Test").unwrap();
        node.on_leave(Hook::from_fn(|_, _, _| Err(anyhow!("ohoh"))));

        let err = block_on(node.run_leave(&mut Payload::new())).unwrap_err();
        assert_eq!(err.to_string(), "ohoh");
    }

    #[test]
    fn run_transit_reports_missing_transition_with_own_name() {
        let node = Node::<Payload>::new("Test").unwrap();

        let err = block_on(node.run_transit("kill nero", &mut Payload::new())).unwrap_err();

        assert_eq!(err.stayed_at(), Some("Test"));
        assert!(matches!(err, TransitError::TransitionMissing { ref transition, .. } if transition == "kill nero"));
    }

    #[test]
    fn run_transit_executes_transition() {
        let transits = Arc::new(AtomicUsize::new(0));
        let node = Node::<Payload>::new("Test").unwrap();
        let seen = Arc::clone(&transits);
        node.transition(
            "galba",
            "Test",
            Hook::from_fn(move |_, _, payload: &mut Payload| {
                assert_eq!(payload["pay"], json!("now"));
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        )
        .unwrap();

        let mut payload = Payload::new();
        payload.insert("pay".to_string(), json!("now"));
        let next = block_on(node.run_transit("galba", &mut payload)).unwrap();

        assert_eq!(next, "Test");
        assert_eq!(transits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn properties_are_readable_and_removable() {
        let node = Node::<Payload>::new("Septimius Severus").unwrap();
        assert!(node.property("myProp").is_none());

        node.set_property("myProp", 42);
        node.set_property("myProp", 11);
        assert_eq!(node.property("myProp"), Some(json!(11)));

        assert_eq!(node.remove_property("myProp"), Some(json!(11)));
        assert!(node.property("myProp").is_none());
    }
}
