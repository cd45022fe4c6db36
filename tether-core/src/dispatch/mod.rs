//! Signal/Slot Dispatch
//!
//! This module implements typed, single-threaded event dispatch: signals,
//! the slots they own, and automatic disconnection of slots whose receivers
//! go away.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is an event source with a fixed call signature: an argument tuple
//! and a return type. Connecting a function or method to a signal creates a
//! slot that the signal owns. Emitting the signal calls every slot, most
//! recently connected first.
//!
//! ## Slots
//!
//! A Slot is one subscription. Function slots wrap closures and `fn` items;
//! method slots bind a method to a shared object. Callers keep a
//! [`Connection`] handle to disconnect a slot explicitly.
//!
//! ## Trackables
//!
//! A receiver that embeds a [`Trackable`] and implements [`Tracked`] has every
//! slot bound to it disconnected when it is dropped, so signals never call
//! into dead objects.
//!
//! ## Proxies
//!
//! A [`SignalProxy`] is a connect-only view that lets an owner publish an
//! event without letting subscribers fire it.
//!
//! # Implementation Notes
//!
//! Signals own slots strongly; everything else refers to slots weakly through
//! generational arena keys. Copies of signals and trackables never inherit
//! connections.

mod arity;
mod connection;
mod id;
mod proxy;
mod signal;
mod slot;
mod trackable;

pub use arity::{MethodFn, SlotFn, MAX_ARITY};
pub use connection::{Connection, ScopedConnection};
pub use id::{SignalId, SlotKey};
pub use proxy::SignalProxy;
pub use signal::Signal;
pub use slot::{FunctionSlot, MethodSlot, Slot};
pub use trackable::{Trackable, TrackerHandle, Tracked};
