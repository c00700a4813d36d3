use crate::event::Event;

/// The optional start vertex of a rooted traversal.
pub struct RootHolder<V> {
    root: Option<V>,
    root_changed: Event<()>,
}

impl<V: PartialEq + 'static> RootHolder<V> {
    pub fn new() -> Self {
        Self {
            root: None,
            root_changed: Event::new(),
        }
    }

    pub fn try_root(&self) -> Option<&V> {
        self.root.as_ref()
    }

    /// Fires `root_changed` only when the root actually changes.
    pub fn set_root(&mut self, root: V) {
        if self.root.as_ref() != Some(&root) {
            self.root = Some(root);
            self.root_changed.emit(&());
        }
    }

    pub fn clear_root(&mut self) {
        if self.root.take().is_some() {
            self.root_changed.emit(&());
        }
    }

    pub fn root_changed(&self) -> &Event<()> {
        &self.root_changed
    }
}

impl<V: PartialEq + 'static> Default for RootHolder<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn change_notifications_skip_no_ops() {
        let mut holder = RootHolder::new();
        let changes = Rc::new(Cell::new(0));
        let sub = {
            let changes = Rc::clone(&changes);
            holder
                .root_changed()
                .subscribe(move |_| changes.set(changes.get() + 1))
        };

        holder.set_root(1);
        holder.set_root(1); // same root, no event
        holder.set_root(2);
        holder.clear_root();
        holder.clear_root(); // already empty, no event

        assert_eq!(changes.get(), 3);
        assert_eq!(holder.try_root(), None);
        sub.unsubscribe();
    }
}
