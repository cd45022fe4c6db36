//! Tether Core
//!
//! This crate provides typed signal/slot event dispatch with automatic
//! connection tracking. It implements:
//!
//! - Signals over any argument tuple up to [`MAX_ARITY`] elements
//! - Function and method slots, plus custom [`Slot`] implementations
//! - Automatic disconnection when a tracked receiver is dropped
//! - Connect-only proxies for publishing private signals
//!
//! Everything is single-threaded: signals, slots and connection handles are
//! built on `Rc` and are neither `Send` nor `Sync`.
//!
//! # Architecture
//!
//! - `dispatch`: signals, slots, trackables, proxies and connection handles
//! - `error`: errors reported by stale connection handles
//!
//! # Example
//!
//! ```
//! use tether_core::Signal;
//!
//! fn f() -> i32 {
//!     1
//! }
//!
//! fn g() -> i32 {
//!     2
//! }
//!
//! let signal: Signal<(), i32> = Signal::new();
//! signal.connect(f);
//! signal.connect(g);
//!
//! // Most recently connected slot runs first.
//! assert_eq!(signal.collect(()), vec![2, 1]);
//! ```

pub mod dispatch;
pub mod error;

pub use dispatch::{
    Connection, FunctionSlot, MethodFn, MethodSlot, ScopedConnection, Signal, SignalId,
    SignalProxy, Slot, SlotFn, SlotKey, Trackable, TrackerHandle, Tracked, MAX_ARITY,
};
pub use error::{Error, Result};
