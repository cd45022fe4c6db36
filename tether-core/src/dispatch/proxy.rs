//! Connect-only views of signals.
//!
//! An owner that wants outside code to subscribe to an event, but not to fire
//! it, keeps the [`Signal`] private and hands out a [`SignalProxy`]. The proxy
//! borrows the signal, so it can never outlive it, and has no `emit`:
//!
//! ```compile_fail
//! use tether_core::{Signal, SignalProxy};
//!
//! let signal: Signal<(i32,)> = Signal::new();
//! let proxy = SignalProxy::new(&signal);
//! proxy.emit((1,));
//! ```

use std::fmt;
use std::rc::Rc;

use super::arity::{MethodFn, SlotFn};
use super::connection::Connection;
use super::signal::Signal;
use super::slot::Slot;
use super::trackable::Tracked;

/// A connect-only view of a [`Signal`].
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use tether_core::{Signal, SignalProxy};
///
/// #[derive(Default)]
/// struct Slider {
///     value: Cell<f32>,
///     value_changed: Signal<(f32,)>,
/// }
///
/// impl Slider {
///     fn value_changed(&self) -> SignalProxy<'_, (f32,)> {
///         self.value_changed.proxy()
///     }
///
///     fn set_value(&self, value: f32) {
///         self.value.set(value);
///         self.value_changed.emit((value,));
///     }
/// }
///
/// let slider = Slider::default();
/// let last = Rc::new(Cell::new(0.0));
/// let sink = Rc::clone(&last);
/// slider.value_changed().connect(move |v: f32| sink.set(v));
///
/// slider.set_value(0.5);
/// assert_eq!(last.get(), 0.5);
/// ```
pub struct SignalProxy<'a, Args, R = ()> {
    signal: &'a Signal<Args, R>,
}

impl<'a, Args, R> SignalProxy<'a, Args, R>
where
    Args: 'static,
    R: 'static,
{
    /// Create a proxy for `signal`.
    pub fn new(signal: &'a Signal<Args, R>) -> Self {
        Self { signal }
    }

    /// Connect a slot to the proxied signal.
    pub fn connect_slot<S>(&self, slot: S) -> Connection
    where
        S: Slot<Args, R> + 'static,
    {
        self.signal.connect_slot(slot)
    }

    /// Connect a free function or closure to the proxied signal.
    pub fn connect<F>(&self, function: F) -> Connection
    where
        F: SlotFn<Args, R>,
    {
        self.signal.connect(function)
    }

    /// Connect `method` bound to `object` to the proxied signal.
    pub fn connect_method<T, M>(&self, object: &Rc<T>, method: M) -> Connection
    where
        T: Tracked + 'static,
        M: MethodFn<T, Args, R>,
    {
        self.signal.connect_method(object, method)
    }
}

impl<'a, Args, R> From<&'a Signal<Args, R>> for SignalProxy<'a, Args, R>
where
    Args: 'static,
    R: 'static,
{
    fn from(signal: &'a Signal<Args, R>) -> Self {
        Self::new(signal)
    }
}

impl<Args, R> Clone for SignalProxy<'_, Args, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Args, R> Copy for SignalProxy<'_, Args, R> {}

impl<Args, R> fmt::Debug for SignalProxy<'_, Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalProxy")
            .field("signal", self.signal)
            .finish()
    }
}
