//! Connection handles.
//!
//! Every `connect` returns a [`Connection`] identifying the new slot. The
//! handle does not keep the signal alive and may outlive both the slot and
//! the signal; operations on a stale handle report an [`Error`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Weak;

use super::id::{SignalId, SlotKey};
use super::signal::SlotOwner;
use crate::error::{Error, Result};

/// Handle to one connected slot.
#[derive(Clone)]
pub struct Connection {
    owner: Weak<dyn SlotOwner>,
    signal: SignalId,
    key: SlotKey,
}

impl Connection {
    pub(crate) fn new(owner: Weak<dyn SlotOwner>, signal: SignalId, key: SlotKey) -> Self {
        Self { owner, signal, key }
    }

    /// ID of the signal that owns (or owned) the slot.
    pub fn signal_id(&self) -> SignalId {
        self.signal
    }

    pub(crate) fn key(&self) -> SlotKey {
        self.key
    }

    /// Check whether the slot is still connected.
    pub fn is_connected(&self) -> bool {
        self.owner
            .upgrade()
            .is_some_and(|owner| owner.contains(self.key))
    }

    /// Disconnect the slot, destroying it.
    ///
    /// Fails with [`Error::SignalDropped`] if the signal no longer exists and
    /// with [`Error::NotConnected`] if the slot was already removed.
    pub fn disconnect(&self) -> Result<()> {
        let owner = self.owner.upgrade().ok_or(Error::SignalDropped)?;
        if owner.remove(self.key) {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    /// Wrap this handle in a guard that disconnects on drop.
    pub fn scoped(self) -> ScopedConnection {
        ScopedConnection::new(self)
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.signal == other.signal && self.key == other.key
    }
}

impl Eq for Connection {}

impl Hash for Connection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signal.hash(state);
        self.key.hash(state);
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("signal", &self.signal)
            .field("key", &self.key)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Guard that disconnects its slot when dropped.
///
/// Useful for subscriptions whose lifetime follows a scope or a field rather
/// than a tracked receiver.
#[must_use = "dropping a ScopedConnection disconnects it immediately"]
pub struct ScopedConnection {
    connection: Connection,
    armed: bool,
}

impl ScopedConnection {
    /// Guard `connection`.
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            armed: true,
        }
    }

    /// The guarded connection.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Give up the guard without disconnecting.
    pub fn release(mut self) -> Connection {
        self.armed = false;
        self.connection.clone()
    }
}

impl From<Connection> for ScopedConnection {
    fn from(connection: Connection) -> Self {
        Self::new(connection)
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        if self.armed {
            // Stale handles are fine here; the slot is gone either way.
            let _ = self.connection.disconnect();
        }
    }
}

impl fmt::Debug for ScopedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedConnection")
            .field("connection", &self.connection)
            .field("armed", &self.armed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Signal;
    use std::collections::HashSet;

    #[test]
    fn disconnect_is_reported_once() {
        let signal: Signal<()> = Signal::new();
        let connection = signal.connect(|| {});

        assert!(connection.is_connected());
        assert_eq!(connection.disconnect(), Ok(()));
        assert!(!connection.is_connected());
        assert_eq!(connection.disconnect(), Err(Error::NotConnected));
    }

    #[test]
    fn disconnect_after_signal_drop() {
        let signal: Signal<()> = Signal::new();
        let connection = signal.connect(|| {});
        drop(signal);

        assert!(!connection.is_connected());
        assert_eq!(connection.disconnect(), Err(Error::SignalDropped));
    }

    #[test]
    fn connections_are_distinct() {
        let signal: Signal<()> = Signal::new();
        let a = signal.connect(|| {});
        let b = signal.connect(|| {});

        let set: HashSet<_> = [a.clone(), b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn scoped_connection_disconnects_on_drop() {
        let signal: Signal<()> = Signal::new();
        {
            let _guard = signal.connect(|| {}).scoped();
            assert_eq!(signal.len(), 1);
        }
        assert!(signal.is_empty());
    }

    #[test]
    fn released_connection_stays_connected() {
        let signal: Signal<()> = Signal::new();
        let guard = ScopedConnection::from(signal.connect(|| {}));

        let connection = guard.release();

        assert!(connection.is_connected());
        assert_eq!(signal.len(), 1);
    }

    #[test]
    fn scoped_connection_outliving_signal_is_harmless() {
        let signal: Signal<()> = Signal::new();
        let guard = signal.connect(|| {}).scoped();
        drop(signal);
        assert!(!guard.connection().is_connected());
        drop(guard);
    }
}
