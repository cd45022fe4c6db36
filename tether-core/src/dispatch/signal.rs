//! Signal Implementation
//!
//! A Signal is an event source. It owns an ordered set of slots sharing one
//! call signature and invokes all of them on every emit.
//!
//! # How Signals Work
//!
//! 1. `connect` wraps the target in a slot, moves it into the signal's arena
//!    and puts its key at the front of the invocation order.
//!
//! 2. `emit` walks the invocation order, most recently connected slot first,
//!    and calls each slot with a clone of the arguments.
//!
//! 3. Slots leave the signal when they are disconnected through their
//!    [`Connection`], when the tracked receiver they target is dropped, when
//!    an emit finds them inert, or when the signal itself is dropped.
//!
//! # Memory Layout
//!
//! Slots live in a generational arena (`SlotMap`) so connection handles held
//! by callers and links held by trackable receivers never dangle: a stale key
//! simply fails to resolve. The invocation order is a separate deque of keys.
//!
//! # Reentrancy
//!
//! No internal borrow is held while a slot runs, so a slot may connect or
//! disconnect slots, or drop tracked receivers, on the signal that is calling
//! it. Which of those changes are observed by the emit in progress is
//! unspecified. Today a slot removed mid-emit is skipped and a slot added
//! mid-emit waits for the next emit, but callers must not rely on either.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::SlotMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arity::{MethodFn, SlotFn};
use super::connection::Connection;
use super::id::{SignalId, SlotKey};
use super::proxy::SignalProxy;
use super::slot::{FunctionSlot, MethodSlot, Slot};
use super::trackable::{Link, TrackerHandle, Tracked};
use crate::error::{Error, Result};

/// Type-erased access to a signal's slot table.
///
/// Connections and trackable receivers refer to the owning signal through
/// this trait so they do not need to know its call signature.
pub(crate) trait SlotOwner {
    /// Remove a slot and deregister it from its tracker.
    fn remove(&self, key: SlotKey) -> bool;

    /// Remove a slot whose tracker is being dropped.
    fn sever(&self, key: SlotKey);

    /// Check whether the slot is still connected.
    fn contains(&self, key: SlotKey) -> bool;
}

/// One owned slot plus its bookkeeping.
struct SlotEntry<Args, R> {
    signal: SignalId,
    key: SlotKey,
    slot: Rc<dyn Slot<Args, R>>,
    tracker: Option<TrackerHandle>,
}

impl<Args, R> Drop for SlotEntry<Args, R> {
    fn drop(&mut self) {
        if let Some(tracker) = self.tracker.take() {
            tracker.deregister(self.signal, self.key);
        }
    }
}

struct SlotTable<Args, R> {
    slots: SlotMap<SlotKey, SlotEntry<Args, R>>,
    order: VecDeque<SlotKey>,
}

impl<Args, R> SlotTable<Args, R> {
    fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: VecDeque::new(),
        }
    }

    fn take(&mut self, key: SlotKey) -> Option<SlotEntry<Args, R>> {
        let entry = self.slots.remove(key)?;
        self.order.retain(|k| *k != key);
        Some(entry)
    }
}

struct SignalCore<Args, R> {
    id: SignalId,
    table: RefCell<SlotTable<Args, R>>,
}

impl<Args, R> SignalCore<Args, R> {
    /// Keys in invocation order, copied so no borrow outlives the call.
    fn snapshot(&self) -> SmallVec<[SlotKey; 8]> {
        self.table.borrow().order.iter().copied().collect()
    }

    /// Disconnect a slot whose target is gone.
    fn prune(&self, key: SlotKey) {
        let entry = self.table.borrow_mut().take(key);
        if entry.is_some() {
            trace!(signal = %self.id, "inert slot pruned");
        }
        drop(entry);
    }

    fn slot(&self, key: SlotKey) -> Option<Rc<dyn Slot<Args, R>>> {
        self.table
            .borrow()
            .slots
            .get(key)
            .map(|entry| Rc::clone(&entry.slot))
    }
}

impl<Args, R> SlotOwner for SignalCore<Args, R> {
    fn remove(&self, key: SlotKey) -> bool {
        // Bind first so the entry drops after the borrow is released.
        let entry = self.table.borrow_mut().take(key);
        match entry {
            Some(entry) => {
                trace!(signal = %self.id, "slot disconnected");
                drop(entry);
                true
            }
            None => false,
        }
    }

    fn sever(&self, key: SlotKey) {
        let entry = self.table.borrow_mut().take(key);
        if let Some(mut entry) = entry {
            trace!(signal = %self.id, "slot severed by tracked receiver");
            entry.tracker = None;
        }
    }

    fn contains(&self, key: SlotKey) -> bool {
        self.table.borrow().slots.contains_key(key)
    }
}

impl<Args, R> Drop for SignalCore<Args, R> {
    fn drop(&mut self) {
        let len = self.table.get_mut().slots.len();
        if len > 0 {
            debug!(signal = %self.id, slots = len, "dropping signal with connected slots");
        }
    }
}

/// A typed event source.
///
/// # Type Parameters
///
/// - `Args`: the argument tuple passed on emit, `()` through
///   `(A1, .., A8)`. Each slot receives its own clone.
/// - `R`: the return type of every slot, `()` by default.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use tether_core::Signal;
///
/// let resized: Signal<(u32, u32)> = Signal::new();
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// let sink = Rc::clone(&log);
/// let connection = resized.connect(move |w: u32, h: u32| sink.borrow_mut().push(w * h));
///
/// resized.emit((4, 3));
/// connection.disconnect().unwrap();
/// resized.emit((5, 5));
///
/// assert_eq!(*log.borrow(), vec![12]);
/// ```
///
/// # Borrowed arguments
///
/// `Args` must be `'static`, so a signal cannot carry a plain `&Widget`.
/// Emitters that want to pass themselves along share themselves through
/// `Rc` instead:
///
/// ```
/// use std::cell::Cell;
/// use std::rc::{Rc, Weak};
/// use tether_core::Signal;
///
/// struct Widget {
///     this: Weak<Widget>,
///     width: Cell<u32>,
///     resized: Signal<(Rc<Widget>,)>,
/// }
///
/// impl Widget {
///     fn new() -> Rc<Self> {
///         Rc::new_cyclic(|this| Widget {
///             this: this.clone(),
///             width: Cell::new(0),
///             resized: Signal::new(),
///         })
///     }
///
///     fn resize(&self, width: u32) {
///         self.width.set(width);
///         if let Some(this) = self.this.upgrade() {
///             self.resized.emit((this,));
///         }
///     }
/// }
///
/// let widget = Widget::new();
/// let seen = Rc::new(Cell::new(0));
/// let sink = Rc::clone(&seen);
/// widget
///     .resized
///     .connect(move |w: Rc<Widget>| sink.set(w.width.get()));
///
/// widget.resize(640);
/// assert_eq!(seen.get(), 640);
/// ```
///
/// # Copies
///
/// Cloning a signal produces a new, empty signal. Connections are bound to
/// the identity of the source and are never duplicated or shared.
pub struct Signal<Args, R = ()> {
    core: Rc<SignalCore<Args, R>>,
}

impl<Args, R> Signal<Args, R>
where
    Args: 'static,
    R: 'static,
{
    /// Create a signal with no connected slots.
    pub fn new() -> Self {
        Self {
            core: Rc::new(SignalCore {
                id: SignalId::new(),
                table: RefCell::new(SlotTable::new()),
            }),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> SignalId {
        self.core.id
    }

    /// Take ownership of `slot` and connect it.
    ///
    /// The slot is invoked before every slot connected earlier. If the slot
    /// reports a tracker, it is registered there so dropping the tracked
    /// receiver disconnects it.
    pub fn connect_slot<S>(&self, slot: S) -> Connection
    where
        S: Slot<Args, R> + 'static,
    {
        let signal = self.core.id;
        let tracker = slot.tracker();
        let slot: Rc<dyn Slot<Args, R>> = Rc::new(slot);

        let key = {
            let mut table = self.core.table.borrow_mut();
            let key = table.slots.insert_with_key(|key| SlotEntry {
                signal,
                key,
                slot,
                tracker: tracker.clone(),
            });
            table.order.push_front(key);
            key
        };

        let owner: Weak<SignalCore<Args, R>> = Rc::downgrade(&self.core);
        let owner: Weak<dyn SlotOwner> = owner;

        if let Some(tracker) = tracker {
            let link = Link {
                signal,
                key,
                owner: Weak::clone(&owner),
            };
            if !tracker.register(link) {
                // The receiver died before the slot was connected.
                self.core.sever(key);
            }
        }

        trace!(signal = %signal, slots = self.len(), "slot connected");

        Connection::new(owner, signal, key)
    }

    /// Connect a free function or closure.
    pub fn connect<F>(&self, function: F) -> Connection
    where
        F: SlotFn<Args, R>,
    {
        self.connect_slot(FunctionSlot::new(function))
    }

    /// Connect `method` bound to `object`.
    ///
    /// If `T` exposes a [`Trackable`](super::Trackable), dropping the object
    /// disconnects the slot automatically.
    ///
    /// Receivers need at least an empty `impl Tracked for T {}`. For types
    /// that cannot implement the trait (foreign types, for instance), build
    /// the slot with [`MethodSlot::untracked`] and pass it to
    /// [`connect_slot`](Self::connect_slot).
    pub fn connect_method<T, M>(&self, object: &Rc<T>, method: M) -> Connection
    where
        T: Tracked + 'static,
        M: MethodFn<T, Args, R>,
    {
        self.connect_slot(MethodSlot::new(object, method))
    }

    /// Invoke every connected slot, discarding return values.
    pub fn emit(&self, args: Args)
    where
        Args: Clone,
    {
        let keys = self.core.snapshot();
        trace!(signal = %self.core.id, slots = keys.len(), "emit");

        for key in keys {
            if let Some(slot) = self.core.slot(key) {
                if slot.emit(args.clone()).is_none() {
                    self.core.prune(key);
                }
            }
        }
    }

    /// Invoke every connected slot and store the return values.
    ///
    /// `results` is cleared first, then receives one value per slot in
    /// invocation order. Inert slots found during the traversal are
    /// disconnected, so afterwards `results.len() == self.len()` unless a slot
    /// changed the connections while running.
    pub fn emit_collect(&self, args: Args, results: &mut Vec<R>)
    where
        Args: Clone,
    {
        results.clear();

        let keys = self.core.snapshot();
        trace!(signal = %self.core.id, slots = keys.len(), "emit with results");

        for key in keys {
            if let Some(slot) = self.core.slot(key) {
                match slot.emit(args.clone()) {
                    Some(result) => results.push(result),
                    None => self.core.prune(key),
                }
            }
        }
    }

    /// Invoke every connected slot and return the values in invocation order.
    pub fn collect(&self, args: Args) -> Vec<R>
    where
        Args: Clone,
    {
        let mut results = Vec::with_capacity(self.len());
        self.emit_collect(args, &mut results);
        results
    }

    /// Disconnect the slot behind `connection`.
    pub fn disconnect(&self, connection: &Connection) -> Result<()> {
        if connection.signal_id() != self.core.id {
            return Err(Error::NotConnected);
        }
        if self.core.remove(connection.key()) {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    /// Disconnect every slot.
    ///
    /// Existing connection handles stay stale afterwards; they never match a
    /// slot connected later.
    pub fn disconnect_all(&self) {
        let drained: Vec<SlotEntry<Args, R>> = {
            let mut table = self.core.table.borrow_mut();
            table.order.clear();
            table.slots.drain().map(|(_, entry)| entry).collect()
        };
        if !drained.is_empty() {
            trace!(signal = %self.core.id, slots = drained.len(), "all slots disconnected");
        }
        drop(drained);
    }

    /// Check whether `connection` refers to a slot of this signal.
    pub fn is_connected(&self, connection: &Connection) -> bool {
        connection.signal_id() == self.core.id && self.core.contains(connection.key())
    }

    /// Number of connected slots.
    pub fn len(&self) -> usize {
        self.core.table.borrow().slots.len()
    }

    /// Check whether no slot is connected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a connect-only view of this signal.
    pub fn proxy(&self) -> SignalProxy<'_, Args, R> {
        SignalProxy::new(self)
    }
}

impl<Args, R> Default for Signal<Args, R>
where
    Args: 'static,
    R: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Args, R> Clone for Signal<Args, R>
where
    Args: 'static,
    R: 'static,
{
    /// Returns a new, empty signal; connections are never copied.
    fn clone(&self) -> Self {
        Self::new()
    }

    fn clone_from(&mut self, _source: &Self) {
        // Assignment keeps this signal's own connections.
    }
}

impl<Args, R> fmt::Debug for Signal<Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.core.id)
            .field("slot_count", &self.core.table.borrow().slots.len())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Trackable;
    use std::cell::Cell;

    fn one() -> i32 {
        1
    }

    fn two() -> i32 {
        2
    }

    #[derive(Default)]
    struct Witness {
        seen: RefCell<Vec<String>>,
        tracking: Trackable,
    }

    impl Witness {
        fn record(&self, text: String, n: usize) {
            self.seen.borrow_mut().push(text.repeat(n));
        }
    }

    impl Tracked for Witness {
        fn trackable(&self) -> Option<&Trackable> {
            Some(&self.tracking)
        }
    }

    #[test]
    fn emit_runs_most_recent_first() {
        let signal: Signal<(), i32> = Signal::new();
        signal.connect(one);
        signal.connect(two);

        assert_eq!(signal.collect(()), vec![2, 1]);
    }

    #[test]
    fn emit_collect_clears_results() {
        let signal: Signal<(), i32> = Signal::new();
        signal.connect(one);

        let mut results = vec![7, 7, 7];
        signal.emit_collect((), &mut results);
        assert_eq!(results, vec![1]);
    }

    #[test]
    fn emit_passes_arguments_to_every_slot() {
        let signal: Signal<(String, usize)> = Signal::new();
        let witness = Rc::new(Witness::default());

        signal.connect_method(&witness, Witness::record);
        signal.connect_method(&witness, Witness::record);
        signal.emit(("ab".to_string(), 2));

        assert_eq!(*witness.seen.borrow(), vec!["abab", "abab"]);
    }

    #[test]
    fn disconnect_removes_one_slot() {
        let signal: Signal<(), i32> = Signal::new();
        let first = signal.connect(one);
        let second = signal.connect(two);

        signal.disconnect(&first).unwrap();

        assert_eq!(signal.len(), 1);
        assert!(!signal.is_connected(&first));
        assert!(signal.is_connected(&second));
        assert_eq!(signal.collect(()), vec![2]);
        assert_eq!(signal.disconnect(&first), Err(Error::NotConnected));
    }

    #[test]
    fn disconnect_rejects_foreign_connection() {
        let signal: Signal<(), i32> = Signal::new();
        let other: Signal<(), i32> = Signal::new();
        let connection = other.connect(one);

        assert_eq!(signal.disconnect(&connection), Err(Error::NotConnected));
        assert!(!signal.is_connected(&connection));
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn disconnect_all_empties_signal_and_trackers() {
        let signal: Signal<(String, usize)> = Signal::new();
        let witness = Rc::new(Witness::default());
        signal.connect_method(&witness, Witness::record);
        signal.connect(|_: String, _: usize| {});

        signal.disconnect_all();

        assert!(signal.is_empty());
        assert_eq!(witness.tracking.connection_count(), 0);
    }

    #[test]
    fn clone_is_empty_and_independent() {
        let signal: Signal<(), i32> = Signal::new();
        signal.connect(one);

        let copy = signal.clone();
        assert!(copy.is_empty());
        assert_ne!(copy.id(), signal.id());

        copy.connect(two);
        assert_eq!(signal.collect(()), vec![1]);
        assert_eq!(copy.collect(()), vec![2]);
    }

    #[test]
    fn clone_from_keeps_existing_connections() {
        let mut target: Signal<(), i32> = Signal::new();
        target.connect(one);
        let source: Signal<(), i32> = Signal::new();
        source.connect(two);
        source.connect(two);

        target.clone_from(&source);

        assert_eq!(target.collect(()), vec![1]);
    }

    #[test]
    fn dropping_tracked_receiver_removes_its_slots() {
        let signal: Signal<(String, usize)> = Signal::new();
        let witness = Rc::new(Witness::default());
        signal.connect_method(&witness, Witness::record);
        assert_eq!(signal.len(), 1);

        drop(witness);

        assert!(signal.is_empty());
        signal.emit(("x".to_string(), 1));
    }

    #[test]
    fn slot_dropped_exactly_once_with_signal() {
        struct DropCounter(Rc<Cell<u32>>);
        impl Drop for DropCounter {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        {
            let signal: Signal<()> = Signal::new();
            let guard = DropCounter(Rc::clone(&drops));
            signal.connect(move || {
                let _keep = &guard;
            });
            assert_eq!(drops.get(), 0);
        }
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn old_handle_does_not_match_slot_after_disconnect_all() {
        let signal: Signal<(), i32> = Signal::new();
        let old = signal.connect(one);

        signal.disconnect_all();
        let fresh = signal.connect(two);

        assert_ne!(old, fresh);
        assert!(!old.is_connected());
        assert_eq!(old.disconnect(), Err(Error::NotConnected));
        assert!(fresh.is_connected());
        assert_eq!(signal.collect(()), vec![2]);
    }

    #[test]
    fn inert_slots_are_pruned_on_emit() {
        struct Gone;

        impl Gone {
            fn value(&self) -> i32 {
                5
            }
        }

        let signal: Signal<(), i32> = Signal::new();
        let gone = Rc::new(Gone);
        let inert = signal.connect_slot(MethodSlot::untracked(&gone, Gone::value));
        signal.connect(one);
        drop(gone);

        let results = signal.collect(());

        assert_eq!(results, vec![1]);
        assert_eq!(results.len(), signal.len());
        assert!(!inert.is_connected());
    }

    #[test]
    fn reentrant_connect_does_not_panic() {
        let signal: Rc<Signal<()>> = Rc::new(Signal::new());
        let weak = Rc::downgrade(&signal);
        signal.connect(move || {
            if let Some(signal) = weak.upgrade() {
                signal.connect(|| {});
            }
        });

        signal.emit(());
        signal.emit(());
        assert!(signal.len() >= 2);
    }

    #[test]
    fn reentrant_disconnect_does_not_panic() {
        let signal: Rc<Signal<()>> = Rc::new(Signal::new());
        let handle: Rc<RefCell<Option<Connection>>> = Rc::new(RefCell::new(None));

        let own = Rc::clone(&handle);
        let connection = signal.connect(move || {
            if let Some(connection) = own.borrow().as_ref() {
                let _ = connection.disconnect();
            }
        });
        *handle.borrow_mut() = Some(connection);

        signal.emit(());
        assert!(signal.is_empty());
        signal.emit(());
    }
}
