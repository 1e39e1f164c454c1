//! Keyring controller contract
//!
//! A [`KeyringController`] is a handle to one open connection to the keyring
//! service. Handles are produced by a [`KeyringControllerFactory`] and report
//! transport failures to the [`ConnectionErrorHandler`] registered at creation.
//!
//! Reply callbacks and error notifications are always delivered on the UI
//! thread and never re-entrantly from inside the call that triggered them.

use crate::Error;
use std::fmt;
use std::sync::Weak;

/// Identifier of a single keyring connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "keyring#{}", self.0)
    }
}

/// Reply callback for an auto-lock duration query
pub type AutoLockCallback = Box<dyn FnOnce(u32) + Send + 'static>;

/// Reply callback for a mutating request (`true` on success)
pub type CompletionCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Receives transport failures for a handle
pub trait ConnectionErrorHandler: Send + Sync {
    /// The connection behind a handle broke or the peer went away
    fn on_connection_error(&self, error: Error);
}

/// Handle to an open keyring service connection
pub trait KeyringController: Send + Sync {
    /// Connection id of this handle
    fn id(&self) -> ConnectionId;

    /// Ask for the current auto-lock duration. Single-shot, no timeout.
    fn get_auto_lock_minutes(&self, callback: AutoLockCallback);

    /// Change the auto-lock duration
    fn set_auto_lock_minutes(&self, minutes: u32, callback: CompletionCallback);

    /// Wipe the wallet keyrings and restore default policy
    fn reset(&self);

    /// Release the connection. Idempotent.
    fn close(&self);

    /// Whether `close` has been called
    fn is_closed(&self) -> bool;
}

/// Produces keyring handles
///
/// Implementations must not call `handler` from inside `keyring_controller`.
pub trait KeyringControllerFactory: Send + Sync {
    /// Open a new connection, reporting its failures to `handler`
    fn keyring_controller(
        &self,
        handler: Weak<dyn ConnectionErrorHandler>,
    ) -> Box<dyn KeyringController>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId(7).to_string(), "keyring#7");
        assert_eq!(
            Error::ConnectionLost(ConnectionId(3)).to_string(),
            "Connection lost: keyring#3"
        );
    }
}
