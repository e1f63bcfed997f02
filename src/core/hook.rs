//! Asynchronous hook actions.
//!
//! Every callback the engine runs (transition actions, enter/leave hooks,
//! pre/post transition hooks) is a [`Hook`]. Hooks receive the node they run
//! against, the transition carrying them, and the caller's payload by mutable
//! reference, so later hooks in the same `transit` call observe earlier edits.

use super::node::Node;
use super::transition::Transition;
use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::sync::Arc;

/// Error surfaced by a failing hook.
///
/// The engine never wraps or translates it; `TransitError::Hook` displays it
/// as-is and callers can `downcast_ref` to their own error types.
pub type HookError = anyhow::Error;

/// Result returned by hooks.
pub type HookResult<T = ()> = Result<T, HookError>;

type HookFn<P> = dyn for<'a> Fn(&'a Node<P>, &'a Transition<P>, &'a mut P) -> BoxFuture<'a, HookResult>
    + Send
    + Sync;

/// Asynchronous action invoked with `(node, transition, payload)`.
///
/// # Example
///
/// ```rust
/// use futures::FutureExt;
/// use transit_fsm::{Hook, Payload};
///
/// let stamp: Hook<Payload> = Hook::new(|node, transition, payload: &mut Payload| {
///     let marker = format!("{}:{}", node.name(), transition.name());
///     async move {
///         payload.insert("last".to_string(), marker.into());
///         Ok(())
///     }
///     .boxed()
/// });
/// ```
pub struct Hook<P> {
    action: Arc<HookFn<P>>,
}

impl<P: Send + 'static> Hook<P> {
    /// Create a hook from an async action.
    ///
    /// The returned future may borrow the node, the transition and the payload
    /// for as long as it runs.
    pub fn new<F>(action: F) -> Self
    where
        F: for<'a> Fn(&'a Node<P>, &'a Transition<P>, &'a mut P) -> BoxFuture<'a, HookResult>
            + Send
            + Sync
            + 'static,
    {
        Hook {
            action: Arc::new(action),
        }
    }

    /// Create a hook from a synchronous body.
    ///
    /// ```rust
    /// use transit_fsm::Hook;
    ///
    /// #[derive(Default)]
    /// struct Counter {
    ///     hits: u32,
    /// }
    ///
    /// let count = Hook::from_fn(|_, _, counter: &mut Counter| {
    ///     counter.hits += 1;
    ///     Ok(())
    /// });
    /// # let _ = count;
    /// ```
    pub fn from_fn<F>(body: F) -> Self
    where
        F: Fn(&Node<P>, &Transition<P>, &mut P) -> HookResult + Send + Sync + 'static,
    {
        Self::new(move |node, transition, payload| {
            future::ready(body(node, transition, payload)).boxed()
        })
    }

    /// A hook that always succeeds without touching the payload.
    pub fn noop() -> Self {
        Self::new(|_, _, _| future::ready(Ok(())).boxed())
    }

    /// Invoke the action.
    pub fn call<'a>(
        &self,
        node: &'a Node<P>,
        transition: &'a Transition<P>,
        payload: &'a mut P,
    ) -> BoxFuture<'a, HookResult> {
        (self.action)(node, transition, payload)
    }
}

impl<P> Clone for Hook<P> {
    fn clone(&self) -> Self {
        Hook {
            action: Arc::clone(&self.action),
        }
    }
}

impl<P> fmt::Debug for Hook<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").finish_non_exhaustive()
    }
}
