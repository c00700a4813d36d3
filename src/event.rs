//! Synchronous multicast notification channels.
//!
//! An [`Event`] delivers every emitted value to all current subscribers, in
//! subscription order, on the emitter's call stack. There is no buffering
//! and no replay: a late subscriber only sees values emitted after it
//! subscribed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;
type SubscriberList<T> = Rc<RefCell<Vec<(u64, Callback<T>)>>>;

/// A synchronous multicast channel carrying values of type `T`.
pub struct Event<T> {
    subscribers: SubscriberList<T>,
    next_id: Cell<u64>,
}

impl<T: 'static> Event<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
        }
    }

    /// Registers `callback` for every subsequent emission.
    ///
    /// Delivery order among subscribers is subscription order. The returned
    /// handle must be kept: dropping it without calling
    /// [`Subscription::unsubscribe`] leaves the subscription live for the
    /// lifetime of the event.
    #[must_use = "dropping the handle keeps the subscription alive; call unsubscribe to release it"]
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(callback))));
        let subscribers = Rc::downgrade(&self.subscribers);
        Subscription::new(move || {
            if let Some(subscribers) = subscribers.upgrade() {
                subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
            }
        })
    }

    /// Delivers `value` to every subscriber.
    ///
    /// The subscriber list is snapshotted first, so a callback may subscribe
    /// or unsubscribe (itself included) without affecting the in-flight
    /// round. A callback may also emit on this same event; the recursive
    /// round reaches every subscriber except the one currently running,
    /// which is never re-entered.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in snapshot {
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (*callback)(value);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl<T: 'static> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle onto one subscription of one [`Event`].
#[must_use = "dropping the handle keeps the subscription alive; call unsubscribe to release it"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Stops delivery to this subscriber. Emission order among the remaining
    /// subscribers is unaffected.
    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn delivers_in_subscription_order() {
        let event: Event<i32> = Event::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let first = {
            let seen = Rc::clone(&seen);
            event.subscribe(move |x| seen.borrow_mut().push(("first", *x)))
        };
        let second = {
            let seen = Rc::clone(&seen);
            event.subscribe(move |x| seen.borrow_mut().push(("second", *x)))
        };
        event.emit(&7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);

        first.unsubscribe();
        event.emit(&8);
        assert_eq!(seen.borrow().last(), Some(&("second", 8)));
        assert_eq!(seen.borrow().len(), 3);
        second.unsubscribe();
        assert_eq!(event.subscriber_count(), 0);
    }

    #[test]
    fn no_replay_for_late_subscribers() {
        let event: Event<i32> = Event::new();
        event.emit(&1);
        let hits = Rc::new(RefCell::new(0));
        let sub = {
            let hits = Rc::clone(&hits);
            event.subscribe(move |_| *hits.borrow_mut() += 1)
        };
        event.emit(&2);
        assert_eq!(*hits.borrow(), 1);
        sub.unsubscribe();
    }

    #[test]
    fn reentrant_emission_skips_the_running_callback() {
        let event: Rc<Event<i32>> = Rc::new(Event::new());
        let reentrant_hits = Rc::new(RefCell::new(0));
        let reemitter = {
            let event = Rc::clone(&event);
            let hits = Rc::clone(&reentrant_hits);
            event.clone().subscribe(move |x| {
                *hits.borrow_mut() += 1;
                if *x == 1 {
                    event.emit(&2);
                }
            })
        };
        let seen = Rc::new(RefCell::new(Vec::new()));
        let watcher = {
            let seen = Rc::clone(&seen);
            event.subscribe(move |x| seen.borrow_mut().push(*x))
        };

        event.emit(&1);

        // the recursive round reached the other subscriber but did not
        // re-enter the one that was running
        assert_eq!(*reentrant_hits.borrow(), 1);
        assert_eq!(*seen.borrow(), vec![2, 1]);
        reemitter.unsubscribe();
        watcher.unsubscribe();
    }

    #[test]
    fn unsubscribing_mid_emission_finishes_the_round() {
        let event: Event<i32> = Event::new();
        let hits = Rc::new(RefCell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let killer = {
            let slot = Rc::clone(&slot);
            event.subscribe(move |_| {
                if let Some(sub) = slot.borrow_mut().take() {
                    sub.unsubscribe();
                }
            })
        };
        let counted = {
            let hits = Rc::clone(&hits);
            event.subscribe(move |_| *hits.borrow_mut() += 1)
        };
        *slot.borrow_mut() = Some(counted);

        // the in-flight round still reaches the counted subscriber
        event.emit(&1);
        assert_eq!(*hits.borrow(), 1);
        // the next round does not
        event.emit(&2);
        assert_eq!(*hits.borrow(), 1);
        killer.unsubscribe();
    }
}
