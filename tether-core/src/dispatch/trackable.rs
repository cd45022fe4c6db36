//! Automatic connection tracking for slot receivers.
//!
//! A type opts into tracking by holding a [`Trackable`] field and returning
//! it from [`Tracked::trackable`]. Every method slot bound to such an object
//! registers a weak link with its `Trackable`; when the object is dropped the
//! `Trackable` severs each linked slot from the signal that owns it, so a
//! signal never calls into an object that no longer exists.
//!
//! # Ownership
//!
//! The `Trackable` never owns slots. It holds `(signal, key)` pairs and a weak
//! reference to the signal's slot table. Signals own slots and hold only a
//! [`TrackerHandle`] (a weak reference) back to the `Trackable`. Either side
//! may go away first:
//!
//! - Signal dropped first: each slot deregisters its link as it is destroyed.
//! - Trackable dropped first: links are taken out of the set before any slot
//!   is severed, so the slot's own deregistration finds nothing and is a
//!   no-op.
//!
//! # Copies
//!
//! Cloning a `Trackable` yields an empty one. Connections belong to the
//! identity of an object, not to its value, so a copy of a tracked object
//! starts with no connections at all.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use tracing::trace;

use super::id::{SignalId, SlotKey};
use super::signal::SlotOwner;

/// A weak link from a `Trackable` to one slot.
pub(crate) struct Link {
    pub(crate) signal: SignalId,
    pub(crate) key: SlotKey,
    pub(crate) owner: Weak<dyn SlotOwner>,
}

#[derive(Default)]
struct TrackerState {
    links: RefCell<SmallVec<[Link; 4]>>,
}

/// Connection set of a tracked object.
///
/// Embed this in a type and implement [`Tracked`] to have every slot that
/// targets the type disconnected automatically when it is dropped.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use tether_core::{Signal, Trackable, Tracked};
///
/// #[derive(Default)]
/// struct Label {
///     clicks: Cell<u32>,
///     tracking: Trackable,
/// }
///
/// impl Label {
///     fn on_click(&self) {
///         self.clicks.set(self.clicks.get() + 1);
///     }
/// }
///
/// impl Tracked for Label {
///     fn trackable(&self) -> Option<&Trackable> {
///         Some(&self.tracking)
///     }
/// }
///
/// let clicked: Signal<()> = Signal::new();
/// let label = Rc::new(Label::default());
/// clicked.connect_method(&label, Label::on_click);
///
/// clicked.emit(());
/// assert_eq!(label.clicks.get(), 1);
///
/// drop(label);
/// assert!(clicked.is_empty());
/// ```
pub struct Trackable {
    state: Rc<TrackerState>,
}

impl Trackable {
    /// Create a trackable with no connections.
    pub fn new() -> Self {
        Self {
            state: Rc::new(TrackerState::default()),
        }
    }

    /// Number of slots currently bound to this object.
    pub fn connection_count(&self) -> usize {
        self.state.links.borrow().len()
    }

    /// Get a weak handle that slots use to register with this object.
    pub fn handle(&self) -> TrackerHandle {
        TrackerHandle {
            state: Rc::downgrade(&self.state),
        }
    }

    /// Sever every slot bound to this object.
    ///
    /// Called automatically on drop. The links are detached before any slot
    /// is removed, so slots connected again from inside a destructor are not
    /// affected.
    pub fn disconnect_all(&self) {
        let links = std::mem::take(&mut *self.state.links.borrow_mut());
        if links.is_empty() {
            return;
        }

        trace!(connections = links.len(), "severing tracked connections");

        for link in links {
            // A dead owner means the signal is already being torn down.
            if let Some(owner) = link.owner.upgrade() {
                owner.sever(link.key);
            }
        }
    }
}

impl Default for Trackable {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Trackable {
    /// Returns a fresh `Trackable`; connections are never copied.
    fn clone(&self) -> Self {
        Self::new()
    }

    fn clone_from(&mut self, _source: &Self) {
        // Assignment keeps this object's own connections.
    }
}

impl Drop for Trackable {
    fn drop(&mut self) {
        self.disconnect_all();
    }
}

impl fmt::Debug for Trackable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trackable")
            .field("connection_count", &self.connection_count())
            .finish()
    }
}

/// Capability of exposing a [`Trackable`].
///
/// Method slots look the capability up when they are created. The default
/// implementation returns `None`, so any type can be a slot receiver by
/// writing an empty `impl Tracked for T {}`; such receivers are never
/// disconnected automatically.
pub trait Tracked {
    /// The connection set of this object, if it has one.
    fn trackable(&self) -> Option<&Trackable> {
        None
    }
}

impl Tracked for Trackable {
    fn trackable(&self) -> Option<&Trackable> {
        Some(self)
    }
}

/// Weak reference from a slot to the `Trackable` of its receiver.
#[derive(Clone)]
pub struct TrackerHandle {
    state: Weak<TrackerState>,
}

impl TrackerHandle {
    /// Check whether the tracked object is still alive.
    pub fn is_alive(&self) -> bool {
        self.state.strong_count() > 0
    }

    /// Record a link. Returns `false` if the tracked object is gone.
    pub(crate) fn register(&self, link: Link) -> bool {
        match self.state.upgrade() {
            Some(state) => {
                state.links.borrow_mut().push(link);
                true
            }
            None => false,
        }
    }

    /// Remove the link for `(signal, key)`, if it is still present.
    pub(crate) fn deregister(&self, signal: SignalId, key: SlotKey) {
        if let Some(state) = self.state.upgrade() {
            state
                .links
                .borrow_mut()
                .retain(|link| !(link.signal == signal && link.key == key));
        }
    }
}

impl fmt::Debug for TrackerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
