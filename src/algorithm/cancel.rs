use super::ServiceToken;
use crate::event::Event;
use std::cell::Cell;
use std::rc::Rc;

/// The token under which algorithms resolve their shared [`CancelManager`].
pub static CANCEL_MANAGER: ServiceToken<CancelManager> =
    ServiceToken::new("cancel-manager", || Some(Rc::new(CancelManager::new())));

/// A counting cancellation flag shared by all computations on one host.
///
/// `cancel` stacks: two requests need two resets before the flag clears.
/// Algorithms poll [`CancelManager::is_cancelling`] between steps and stop
/// when it reads true.
pub struct CancelManager {
    requests: Cell<usize>,
    cancel_requested: Event<()>,
    cancel_reset: Event<()>,
}

impl CancelManager {
    pub fn new() -> Self {
        Self {
            requests: Cell::new(0),
            cancel_requested: Event::new(),
            cancel_reset: Event::new(),
        }
    }

    pub fn is_cancelling(&self) -> bool {
        self.requests.get() > 0
    }

    /// Raises the flag. Fires `cancel_requested` only on the transition
    /// from idle to cancelling.
    pub fn cancel(&self) {
        let before = self.requests.get();
        self.requests.set(before + 1);
        if before == 0 {
            self.cancel_requested.emit(&());
        }
    }

    /// Clears the flag entirely. Fires `cancel_reset` only if it was set.
    pub fn reset_cancel(&self) {
        if self.requests.get() > 0 {
            self.requests.set(0);
            self.cancel_reset.emit(&());
        }
    }

    pub fn cancel_requested(&self) -> &Event<()> {
        &self.cancel_requested
    }

    pub fn cancel_reset(&self) -> &Event<()> {
        &self.cancel_reset
    }
}

impl Default for CancelManager {
    fn default() -> Self {
        Self::new()
    }
}
