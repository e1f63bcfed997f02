//! Per-instance runtime: position, guard and the transit protocol.

use super::config::MachineConfig;
use super::definition::Definition;
use super::error::{ConfigError, TransitError};
use crate::core::{Node, TransitionHistory, TransitionRecord};
use crate::Payload;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// The transition currently in flight on an instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDescriptor {
    /// Name of the running transition
    pub transition: String,
    /// Node the transition started from
    pub node: String,
}

/// Outcome of a successful [`Machine::transit`].
#[derive(Clone, Debug, PartialEq)]
pub struct Transited<P> {
    /// Node the machine now occupies
    pub next_node: String,
    /// Payload after every hook of the call has run
    pub payload: P,
}

#[derive(Debug)]
struct InstanceState {
    current: Option<String>,
    previous: Option<String>,
    in_flight: Option<TransitionDescriptor>,
    history: TransitionHistory,
}

/// A position tracker bound to a shared [`Definition`].
///
/// The instance owns only its current and previous node, the in-flight guard
/// and its history. `transit` takes `&self`: the state lock is held only for
/// short synchronous sections and never across a hook, so a second call made
/// while the first is suspended observes the guard and fails with
/// [`TransitError::TransitionRunning`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use transit_fsm::{Definition, Hook, Payload};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let definition = Arc::new(Definition::<Payload>::new());
/// definition.node("A")?.transition("t1", "B", Hook::noop())?;
/// definition.node("B")?.transition("t2", "A", Hook::noop())?;
/// definition.set_initial_node("A")?;
///
/// let machine = definition.instance();
/// futures::executor::block_on(async {
///     machine.transit("t1").await?;
///     machine.transit("t2").await
/// })?;
///
/// assert_eq!(machine.current_node().as_deref(), Some("A"));
/// assert_eq!(machine.previous_node().as_deref(), Some("B"));
/// # Ok(())
/// # }
/// ```
pub struct Machine<P = Payload> {
    id: Uuid,
    definition: Arc<Definition<P>>,
    state: Mutex<InstanceState>,
}

impl<P: Send + 'static> Machine<P> {
    /// Create an instance with the default configuration.
    pub fn new(definition: Arc<Definition<P>>) -> Self {
        Self::with_config(definition, MachineConfig::default())
    }

    /// Create an instance. It starts on the definition's initial node if one
    /// is set, and unpositioned otherwise.
    pub fn with_config(definition: Arc<Definition<P>>, config: MachineConfig) -> Self {
        let current = definition.initial_node();
        Self {
            id: Uuid::new_v4(),
            definition,
            state: Mutex::new(InstanceState {
                current,
                previous: None,
                in_flight: None,
                history: TransitionHistory::with_limit(config.history_limit),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn definition(&self) -> &Arc<Definition<P>> {
        &self.definition
    }

    /// Position this instance on `name`, overriding the definition's default.
    ///
    /// Fails with [`TransitError::TransitionRunning`] while a transit is in
    /// flight, since that transit would overwrite the new position.
    pub fn set_initial_node(&self, name: &str) -> Result<(), TransitError> {
        self.definition.resolve(name)?;

        let mut state = self.state.lock();
        if let Some(running) = &state.in_flight {
            tracing::warn!(running = %running.transition, "cannot reposition mid-transit");
            return Err(TransitError::TransitionRunning {
                transition: running.transition.clone(),
                node: running.node.clone(),
            });
        }
        state.current = Some(name.to_string());
        Ok(())
    }

    pub fn current_node(&self) -> Option<String> {
        self.state.lock().current.clone()
    }

    pub fn previous_node(&self) -> Option<String> {
        self.state.lock().previous.clone()
    }

    /// The in-flight transition, if any.
    pub fn current_transition(&self) -> Option<TransitionDescriptor> {
        self.state.lock().in_flight.clone()
    }

    pub fn is_transiting(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    /// Snapshot of the node switches performed so far.
    pub fn history(&self) -> TransitionHistory {
        self.state.lock().history.clone()
    }

    /// Fire `transition` with a fresh default payload.
    ///
    /// On failure only the error is returned and the payload is dropped. A
    /// failing enter or post-transition hook still leaves the machine on the
    /// new node, so callers that need the payload or the reached node in that
    /// case should call [`transit_with`](Self::transit_with) with their own
    /// payload and read [`current_node`](Self::current_node).
    pub async fn transit(&self, transition: &str) -> Result<Transited<P>, TransitError>
    where
        P: Default,
    {
        let mut payload = P::default();
        let next_node = self.transit_with(transition, &mut payload).await?;
        Ok(Transited { next_node, payload })
    }

    /// Fire `transition`, threading `payload` through every hook, and return
    /// the node the machine ends up on.
    ///
    /// Order: pre-transition hook, guard, leave hook, transition action, node
    /// switch, enter hook, guard release, post-transition hook. Any failure
    /// stops the sequence and is returned as-is. The guard is always released
    /// before returning. A failing enter hook leaves the machine on the new
    /// node; a failing post-transition hook leaves it there as well.
    #[tracing::instrument(level = "debug", skip(self, payload), fields(machine = %self.id))]
    pub async fn transit_with(
        &self,
        transition: &str,
        payload: &mut P,
    ) -> Result<String, TransitError> {
        if transition.is_empty() {
            return Err(ConfigError::MissingTransitionName.into());
        }
        let occupied = self.occupied_node()?;

        if let Some(pre) = self.definition.pre_transition() {
            pre.run(&occupied, payload).await?;
        }

        let in_flight = self.begin(transition)?;
        let from = self.definition.resolve(&in_flight.node)?;

        if from.get_transition(transition).is_none() {
            tracing::warn!(node = %from.name(), "transition missing, staying put");
            return Err(TransitError::TransitionMissing {
                transition: transition.to_string(),
                node: from.name().to_string(),
            });
        }

        from.run_leave(payload).await?;
        let target = from.run_transit(transition, payload).await?;

        let Some(to) = self.definition.get_node(&target) else {
            tracing::error!(
                node = %from.name(),
                target = %target,
                "transition targets an unregistered node"
            );
            return Err(ConfigError::DanglingTarget {
                node: from.name().to_string(),
                transition: transition.to_string(),
                target,
            }
            .into());
        };

        self.switch(transition, from.name(), to.name());
        to.run_enter(payload).await?;

        drop(in_flight);

        if let Some(post) = self.definition.post_transition() {
            post.run(&to, payload).await?;
        }

        Ok(target)
    }

    fn occupied_node(&self) -> Result<Arc<Node<P>>, ConfigError> {
        let current = self
            .state
            .lock()
            .current
            .clone()
            .ok_or(ConfigError::Unpositioned)?;
        self.definition.resolve(&current)
    }

    fn begin(&self, transition: &str) -> Result<InFlight<'_>, TransitError> {
        let mut state = self.state.lock();
        if let Some(running) = &state.in_flight {
            tracing::warn!(running = %running.transition, "transition already running");
            return Err(TransitError::TransitionRunning {
                transition: running.transition.clone(),
                node: running.node.clone(),
            });
        }

        let node = state.current.clone().ok_or(ConfigError::Unpositioned)?;
        state.in_flight = Some(TransitionDescriptor {
            transition: transition.to_string(),
            node: node.clone(),
        });
        tracing::debug!(node = %node, "guard acquired");

        Ok(InFlight {
            state: &self.state,
            node,
        })
    }

    fn switch(&self, transition: &str, from: &str, to: &str) {
        let mut state = self.state.lock();
        state.previous = Some(from.to_string());
        state.current = Some(to.to_string());
        state.history.push(TransitionRecord {
            transition: transition.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            timestamp: Utc::now(),
        });
        tracing::debug!(from = %from, to = %to, "switched node");
    }
}

impl<P> fmt::Debug for Machine<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Machine")
            .field("id", &self.id)
            .field("current", &state.current)
            .field("previous", &state.previous)
            .field("in_flight", &state.in_flight)
            .finish_non_exhaustive()
    }
}

/// Clears the in-flight guard when dropped, including when the transit future
/// is dropped mid-hook.
struct InFlight<'m> {
    state: &'m Mutex<InstanceState>,
    node: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.lock().in_flight = None;
        tracing::debug!(node = %self.node, "guard released");
    }
}
