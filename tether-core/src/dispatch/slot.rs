//! Slot Implementations
//!
//! A slot is one subscription: a callable target that a signal invokes on
//! every emit. Two variants cover the common targets:
//!
//! - [`FunctionSlot`]: a free function, `fn` item or closure.
//! - [`MethodSlot`]: a method bound to a shared object.
//!
//! Custom targets implement [`Slot`] directly and are connected with
//! [`Signal::connect_slot`](super::Signal::connect_slot).

use std::fmt;
use std::rc::{Rc, Weak};

use super::arity::{MethodFn, SlotFn};
use super::trackable::{TrackerHandle, Tracked};

/// A callable target connected to a signal with argument tuple `Args`.
pub trait Slot<Args, R> {
    /// Call the target.
    ///
    /// Returns `None` if the slot is inert, that is, its target no longer
    /// exists. The signal disconnects inert slots when it finds them.
    fn emit(&self, args: Args) -> Option<R>;

    /// Tracker of the receiver, for slots whose target should disconnect them
    /// automatically.
    fn tracker(&self) -> Option<TrackerHandle> {
        None
    }
}

/// Slot for free functions and closures.
pub struct FunctionSlot<F> {
    function: F,
}

impl<F> FunctionSlot<F> {
    /// Wrap a function.
    pub fn new(function: F) -> Self {
        Self { function }
    }
}

impl<F, Args, R> Slot<Args, R> for FunctionSlot<F>
where
    F: SlotFn<Args, R>,
{
    #[inline]
    fn emit(&self, args: Args) -> Option<R> {
        Some(self.function.call(args))
    }
}

impl<F> fmt::Debug for FunctionSlot<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSlot")
            .field("function", &std::any::type_name::<F>())
            .finish()
    }
}

/// Slot for a method bound to a shared object.
///
/// The slot holds the object weakly. If the object exposes a [`Trackable`]
/// through [`Tracked`], dropping the object disconnects the slot. Otherwise
/// the slot becomes inert once the object is gone and is disconnected by the
/// next emit.
///
/// [`Trackable`]: super::Trackable
pub struct MethodSlot<T, M> {
    object: Weak<T>,
    method: M,
    tracker: Option<TrackerHandle>,
}

impl<T, M> MethodSlot<T, M>
where
    T: Tracked,
{
    /// Bind `method` to `object`, tracking the object if it is trackable.
    pub fn new(object: &Rc<T>, method: M) -> Self {
        Self {
            object: Rc::downgrade(object),
            method,
            tracker: object.trackable().map(|trackable| trackable.handle()),
        }
    }
}

impl<T, M> MethodSlot<T, M> {
    /// Bind `method` to `object` without tracking.
    ///
    /// Works for any receiver type. Dropping the object does not disconnect
    /// the slot; it turns inert and the next emit removes it.
    pub fn untracked(object: &Rc<T>, method: M) -> Self {
        Self {
            object: Rc::downgrade(object),
            method,
            tracker: None,
        }
    }

    /// Check whether the bound object is still alive.
    pub fn is_alive(&self) -> bool {
        self.object.strong_count() > 0
    }
}

impl<T, M, Args, R> Slot<Args, R> for MethodSlot<T, M>
where
    M: MethodFn<T, Args, R>,
{
    #[inline]
    fn emit(&self, args: Args) -> Option<R> {
        let object = self.object.upgrade()?;
        Some(self.method.call(&object, args))
    }

    fn tracker(&self) -> Option<TrackerHandle> {
        self.tracker.clone()
    }
}

impl<T, M> fmt::Debug for MethodSlot<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSlot")
            .field("object", &std::any::type_name::<T>())
            .field("alive", &self.is_alive())
            .field("tracked", &self.tracker.is_some())
            .finish()
    }
}
