// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notifications emitted by the outline view and their subscribers.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Size, Vec2};

/// Something observable changed in an [`OutlineView`](crate::OutlineView).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OutlineEvent<K> {
    /// The selection moved to a new value, possibly `None`.
    SelectionChanged(Option<K>),
    /// The node's open state flipped.
    Toggled(K),
    /// The scroll offset changed.
    ScrollChanged(Vec2),
    /// A layout pass produced a different preferred content size.
    ContentSizeChanged(Size),
}

/// Handle returned by [`Listeners::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u32);

type Callback<K> = Box<dyn FnMut(&OutlineEvent<K>)>;

/// Ordered list of event callbacks.
///
/// Each emitted event reaches every subscriber once, in subscription order.
pub struct Listeners<K> {
    entries: Vec<(ListenerId, Callback<K>)>,
    next_id: u32,
}

impl<K> Default for Listeners<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<K> fmt::Debug for Listeners<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<K> Listeners<K> {
    /// Registers `callback`.
    pub fn subscribe(&mut self, callback: impl FnMut(&OutlineEvent<K>) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscriber. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn emit(&mut self, event: &OutlineEvent<K>) {
        for (_, callback) in &mut self.entries {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::RefCell;

    #[test]
    fn delivery_follows_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::<u32>::default();
        let a = {
            let log = log.clone();
            listeners.subscribe(move |e| log.borrow_mut().push(('a', *e)))
        };
        {
            let log = log.clone();
            listeners.subscribe(move |e| log.borrow_mut().push(('b', *e)));
        }

        listeners.emit(&OutlineEvent::Toggled(7));
        assert_eq!(
            *log.borrow(),
            [('a', OutlineEvent::Toggled(7)), ('b', OutlineEvent::Toggled(7))]
        );

        assert!(listeners.unsubscribe(a));
        assert!(!listeners.unsubscribe(a));
        listeners.emit(&OutlineEvent::SelectionChanged(None));
        assert_eq!(log.borrow().len(), 3);
        assert_eq!(listeners.len(), 1);
    }
}
