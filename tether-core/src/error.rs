//! Error types.

use thiserror::Error;

/// Errors reported by connection handles.
///
/// Connecting never fails: mismatched call signatures are rejected at compile
/// time. Only operations on a [`Connection`](crate::Connection) that refers to
/// a slot which no longer exists can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The signal that owned the slot has been dropped.
    #[error("the signal owning this connection has been dropped")]
    SignalDropped,

    /// The slot is not (or no longer) connected to the signal.
    #[error("slot is not connected to this signal")]
    NotConnected,
}

/// Result alias for fallible connection operations.
pub type Result<T> = std::result::Result<T, Error>;
