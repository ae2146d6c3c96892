//! Routing of diagnostic events.
//!
//! Networks emit [`tracing`] events (construction summaries, registry fallbacks, non-finite
//! losses) but never read a global logger at the point of emission. Each network carries a
//! [`Diagnostics`] handle chosen when it is built, and events are dispatched to it.

use std::fmt;

use tracing::dispatcher::{self, Dispatch};

/// A handle to the subscriber that receives a network's diagnostic events.
#[derive(Clone)]
pub struct Diagnostics {
    dispatch: Dispatch,
}

impl Diagnostics {
    /// Sends events to the given dispatcher.
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Captures the dispatcher that is the default for the calling thread at this point.
    pub fn current() -> Self {
        Self::new(dispatcher::get_default(Dispatch::clone))
    }

    /// Discards every event.
    pub fn none() -> Self {
        Self::new(Dispatch::none())
    }

    /// Runs `f`, which emits `tracing` events, with this handle's dispatcher as the default.
    pub(crate) fn emit<F: FnOnce()>(&self, f: F) {
        dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}

impl<S> From<S> for Diagnostics
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    fn from(subscriber: S) -> Self {
        Self::new(Dispatch::new(subscriber))
    }
}
