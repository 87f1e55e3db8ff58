//! State-sync protocol between blocks and a host UI framework.
//!
//! The object graph never imports a rendering framework. Instead, the
//! rendering layer hands its own state-registration primitive — anything
//! implementing [`StateHost`] — to
//! [`Block::use_state`](crate::block::node::Block::use_state) at the moment
//! a render wants to subscribe. The block registers a slot, installs a reset
//! trigger so [`Page::init_state`](crate::page::Page::init_state) can force
//! the host back to the start state, and returns a [`StateSetter`] that
//! writes the host slot and the block's own state in the same synchronous
//! call. The two copies never diverge from the caller's perspective.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

pub mod host;

pub use host::SignalHost;

/// Update function for one host-side reactive slot.
pub type SetFn = Rc<dyn Fn(Value)>;

/// A block's state cell, shared between the block and its setters.
pub(crate) type SharedState = Rc<RefCell<Value>>;

// ---------------------------------------------------------------------------
// StateHost
// ---------------------------------------------------------------------------

/// One registered reactive slot: its current value and its update function.
pub struct HostSlot {
    /// The slot's current value as tracked by the host.
    pub value: Value,
    /// Writes a new value into the host's slot, triggering its re-render
    /// machinery.
    pub set: SetFn,
}

impl fmt::Debug for HostSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSlot").field("value", &self.value).finish()
    }
}

/// The reactive-state primitive a rendering layer supplies.
///
/// Shaped like a framework's `useState`: given an initial value, return the
/// slot's current value and an update function. A host that already owns a
/// slot for the calling site may ignore `initial` and return the tracked
/// value instead.
pub trait StateHost {
    /// Register (or re-enter) a reactive slot seeded with `initial`.
    fn register(&mut self, initial: Value) -> HostSlot;
}

// ---------------------------------------------------------------------------
// StateSetter
// ---------------------------------------------------------------------------

/// Setter returned by [`Block::use_state`](crate::block::node::Block::use_state).
///
/// `set` writes the host's reactive slot and the block's persistent state in
/// the same synchronous call. The new value's shape is not validated against
/// the block's start state; callers own that discipline.
#[derive(Clone)]
pub struct StateSetter {
    cell: SharedState,
    notify: SetFn,
}

impl StateSetter {
    pub(crate) fn new(cell: SharedState, notify: SetFn) -> Self {
        Self { cell, notify }
    }

    /// Write `value` to both the host slot and the block state.
    pub fn set(&self, value: Value) {
        *self.cell.borrow_mut() = value.clone();
        self.notify.as_ref()(value);
    }
}

impl fmt::Debug for StateSetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter")
            .field("value", &*self.cell.borrow())
            .finish()
    }
}
