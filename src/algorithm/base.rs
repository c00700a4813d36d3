use super::{
    AlgorithmError, AlgorithmResult, CancelManager, ComputationState, ServiceRegistry,
    CANCEL_MANAGER,
};
use crate::event::Event;
use std::cell::Cell;
use std::rc::Rc;

struct CoreInner {
    state: Cell<ComputationState>,
    services: Rc<ServiceRegistry>,
    started: Event<()>,
    finished: Event<()>,
    aborted: Event<()>,
    state_changed: Event<()>,
}

/// The lifecycle state machine every algorithm runs under.
///
/// A core is a cheap clonable handle; algorithms expose their core so that
/// an event subscriber can call [`AlgorithmCore::abort`] on the very
/// computation that is notifying it. Transitions:
///
/// `NotRunning -> Running -> Finished`, or `Running -> PendingAbortion ->
/// Aborted` when an abort lands mid-run. `started`, `finished` and
/// `aborted` fire on the matching transition, each followed by
/// `state_changed`.
#[derive(Clone)]
pub struct AlgorithmCore {
    inner: Rc<CoreInner>,
}

impl AlgorithmCore {
    /// A core with its own private service registry.
    pub fn new() -> Self {
        Self::with_host(Rc::new(ServiceRegistry::new()))
    }

    /// A core resolving services from `services`. Cores sharing a registry
    /// share one cancel flag.
    pub fn with_host(services: Rc<ServiceRegistry>) -> Self {
        Self {
            inner: Rc::new(CoreInner {
                state: Cell::new(ComputationState::NotRunning),
                services,
                started: Event::new(),
                finished: Event::new(),
                aborted: Event::new(),
                state_changed: Event::new(),
            }),
        }
    }

    pub fn state(&self) -> ComputationState {
        self.inner.state.get()
    }

    pub fn services(&self) -> Rc<ServiceRegistry> {
        Rc::clone(&self.inner.services)
    }

    pub fn cancel_manager(&self) -> AlgorithmResult<Rc<CancelManager>> {
        self.inner.services.resolve(&CANCEL_MANAGER)
    }

    /// Requests that the current run stop at its next cancel poll. Does
    /// nothing unless the computation is `Running`.
    pub fn abort(&self) {
        if self.state() != ComputationState::Running {
            return;
        }
        tracing::debug!("abort requested");
        self.inner.state.set(ComputationState::PendingAbortion);
        if let Ok(cancel) = self.cancel_manager() {
            cancel.cancel();
        }
        self.inner.state_changed.emit(&());
    }

    /// Marks the computation `Running` with a clear cancel flag.
    pub fn begin_computation(&self) -> AlgorithmResult<()> {
        tracing::debug!("computation started");
        self.inner.state.set(ComputationState::Running);
        self.cancel_manager()?.reset_cancel();
        self.inner.started.emit(&());
        self.inner.state_changed.emit(&());
        Ok(())
    }

    /// Marks a `Running` computation `Finished`, or a `PendingAbortion`
    /// one `Aborted`. Any other state is an error.
    pub fn end_computation(&self) -> AlgorithmResult<()> {
        match self.state() {
            ComputationState::Running => {
                tracing::debug!("computation finished");
                self.inner.state.set(ComputationState::Finished);
                self.cancel_manager()?.reset_cancel();
                self.inner.finished.emit(&());
            }
            ComputationState::PendingAbortion => {
                tracing::debug!("computation aborted");
                self.inner.state.set(ComputationState::Aborted);
                self.cancel_manager()?.reset_cancel();
                self.inner.aborted.emit(&());
            }
            state => return Err(AlgorithmError::InvalidState { state }),
        }
        self.inner.state_changed.emit(&());
        Ok(())
    }

    pub fn started(&self) -> &Event<()> {
        &self.inner.started
    }

    pub fn finished(&self) -> &Event<()> {
        &self.inner.finished
    }

    pub fn aborted(&self) -> &Event<()> {
        &self.inner.aborted
    }

    pub fn state_changed(&self) -> &Event<()> {
        &self.inner.state_changed
    }
}

impl Default for AlgorithmCore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn natural_run_reaches_finished() {
        let core = AlgorithmCore::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let subs = [
            {
                let log = Rc::clone(&log);
                core.started()
                    .subscribe(move |_| log.borrow_mut().push("started"))
            },
            {
                let log = Rc::clone(&log);
                core.finished()
                    .subscribe(move |_| log.borrow_mut().push("finished"))
            },
            {
                let log = Rc::clone(&log);
                core.state_changed()
                    .subscribe(move |_| log.borrow_mut().push("changed"))
            },
        ];

        core.begin_computation().unwrap();
        assert_eq!(core.state(), ComputationState::Running);
        core.end_computation().unwrap();
        assert_eq!(core.state(), ComputationState::Finished);

        assert_eq!(*log.borrow(), vec!["started", "changed", "finished", "changed"]);
        for sub in subs {
            sub.unsubscribe();
        }
    }

    #[test]
    fn abort_pends_then_ends_aborted() {
        let core = AlgorithmCore::new();
        core.abort(); // not running, ignored
        assert_eq!(core.state(), ComputationState::NotRunning);

        core.begin_computation().unwrap();
        core.abort();
        assert_eq!(core.state(), ComputationState::PendingAbortion);
        assert!(core.cancel_manager().unwrap().is_cancelling());

        core.end_computation().unwrap();
        assert_eq!(core.state(), ComputationState::Aborted);
        assert!(!core.cancel_manager().unwrap().is_cancelling());
    }

    #[test]
    fn abort_from_a_state_change_subscriber_is_tolerated() {
        let core = AlgorithmCore::new();
        let handle = core.clone();
        let sub = core.state_changed().subscribe(move |_| handle.abort());

        core.begin_computation().unwrap();
        assert_eq!(core.state(), ComputationState::PendingAbortion);
        assert!(core.cancel_manager().unwrap().is_cancelling());

        core.end_computation().unwrap();
        assert_eq!(core.state(), ComputationState::Aborted);
        sub.unsubscribe();
    }

    #[test]
    fn ending_an_unstarted_computation_is_invalid() {
        let core = AlgorithmCore::new();
        assert_eq!(
            core.end_computation().unwrap_err(),
            AlgorithmError::InvalidState {
                state: ComputationState::NotRunning
            }
        );
    }

    #[test]
    fn shared_host_shares_the_cancel_manager() {
        let parent = AlgorithmCore::new();
        let child = AlgorithmCore::with_host(parent.services());
        let separate = AlgorithmCore::new();

        let a = parent.cancel_manager().unwrap();
        let b = child.cancel_manager().unwrap();
        let c = separate.cancel_manager().unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &c));
    }
}
