//! Callback types invoked while an event fires.
//!
//! Entry/exit hooks live on states, will-fire/did-fire hooks live on events.
//! All of them are fallible: a hook returns [`HookResult`] and the first
//! failure stops the firing protocol.

use super::event::Event;
use super::state::State;
use super::transition::Transition;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result returned by every notification hook.
pub type HookResult = Result<(), HookError>;

/// Hook attached to a state, run when the machine enters or exits it.
pub type StateHook<P> = Arc<dyn Fn(&State<P>, &Transition<'_, P>) -> HookResult + Send + Sync>;

/// Hook attached to an event, run before or after the state change.
pub type EventHook<P> = Arc<dyn Fn(&Event<P>, &Transition<'_, P>) -> HookResult + Send + Sync>;

/// Error raised by a caller-supplied hook.
///
/// The machine never inspects it; it is handed back to the caller of
/// [`Machine::fire`](crate::machine::Machine::fire) untouched.
///
/// # Example
///
/// ```rust
/// use turnstile::core::HookError;
///
/// let err = HookError::from("coin jammed");
/// assert_eq!(err.to_string(), "coin jammed");
///
/// let io = std::io::Error::new(std::io::ErrorKind::Other, "sensor offline");
/// let err = HookError::new(io);
/// assert!(err.downcast_ref::<std::io::Error>().is_some());
/// ```
#[derive(Debug, Error)]
#[error(transparent)]
pub struct HookError(Box<dyn StdError + Send + Sync + 'static>);

impl HookError {
    /// Wrap any error (or anything convertible into a boxed error).
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self(error.into())
    }

    /// Borrow the wrapped error as a concrete type, if it is one.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }

    /// Unwrap the boxed error.
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.0
    }
}

impl From<&str> for HookError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HookError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Step of the firing protocol a hook belongs to, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookPhase {
    /// Source state's exit hook, before the commit
    Exit,

    /// Event's will-fire hook, before the commit
    WillFire,

    /// Destination state's entry hook, after the commit
    Entry,

    /// Event's did-fire hook, after the commit
    DidFire,
}

impl HookPhase {
    /// Whether the machine has already moved to the destination state
    /// when a hook of this phase runs.
    pub fn is_after_commit(self) -> bool {
        matches!(self, Self::Entry | Self::DidFire)
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Exit => "exit",
            Self::WillFire => "will-fire",
            Self::Entry => "entry",
            Self::DidFire => "did-fire",
        };
        f.write_str(label)
    }
}
