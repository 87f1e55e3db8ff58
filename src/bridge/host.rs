//! Built-in reference host: value slots plus watcher callbacks.
//!
//! [`SignalHost`] is the state primitive used by this crate's own tests and
//! by headless embedders that have no rendering framework. It keeps a vector
//! of slots behind a single-threaded `Rc<RefCell<…>>` runtime; writing a
//! slot notifies that slot's watchers synchronously. There is no dependency
//! auto-tracking or batching — nothing in this domain re-runs computations.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use super::{HostSlot, SetFn, StateHost};

type Watcher = Rc<dyn Fn(&Value)>;

struct Slot {
    value: Value,
    watchers: Vec<Watcher>,
}

/// A minimal single-threaded reactive host.
///
/// Each [`register`](StateHost::register) call creates a fresh slot, i.e.
/// the host models a single mount per block. Slots are addressed by
/// registration order.
pub struct SignalHost {
    slots: Rc<RefCell<Vec<Slot>>>,
}

impl SignalHost {
    /// Create a host with no slots.
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Whether no slot has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    /// Current value of the slot at `index`, or `None` if out of range.
    pub fn value(&self, index: usize) -> Option<Value> {
        self.slots.borrow().get(index).map(|slot| slot.value.clone())
    }

    /// Attach a watcher to the slot at `index`.
    ///
    /// The watcher runs synchronously on every write to that slot. Returns
    /// `false` if the slot does not exist.
    pub fn watch(&self, index: usize, watcher: impl Fn(&Value) + 'static) -> bool {
        let mut slots = self.slots.borrow_mut();
        match slots.get_mut(index) {
            Some(slot) => {
                slot.watchers.push(Rc::new(watcher));
                true
            }
            None => false,
        }
    }
}

impl StateHost for SignalHost {
    fn register(&mut self, initial: Value) -> HostSlot {
        let index = {
            let mut slots = self.slots.borrow_mut();
            slots.push(Slot {
                value: initial.clone(),
                watchers: Vec::new(),
            });
            slots.len() - 1
        };

        let slots = Rc::clone(&self.slots);
        let set: SetFn = Rc::new(move |value: Value| {
            // Write first, then notify with the borrow released so a watcher
            // may read the host again.
            let watchers = {
                let mut slots = slots.borrow_mut();
                let slot = &mut slots[index];
                slot.value = value.clone();
                slot.watchers.clone()
            };
            for watcher in watchers {
                watcher.as_ref()(&value);
            }
        });

        HostSlot {
            value: initial,
            set,
        }
    }
}

impl Default for SignalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SignalHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalHost")
            .field("slots", &self.len())
            .finish()
    }
}
