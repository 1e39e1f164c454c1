//! Mock keyring factory for testing
//!
//! Records every handle it hands out. Callbacks are parked until the test
//! completes them, and connection errors are raised on demand, mirroring the
//! asynchronous delivery of the real transport.

#![allow(missing_docs)]

use crate::controller::{
    AutoLockCallback, CompletionCallback, ConnectionErrorHandler, ConnectionId,
    KeyringController, KeyringControllerFactory,
};
use crate::Error;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Recorded state of one mock handle
pub struct MockControllerState {
    id: ConnectionId,
    handler: Weak<dyn ConnectionErrorHandler>,
    close_calls: AtomicUsize,
    get_calls: AtomicUsize,
    reset_calls: AtomicUsize,
    pending_gets: Mutex<Vec<AutoLockCallback>>,
    pending_sets: Mutex<Vec<(u32, CompletionCallback)>>,
}

impl MockControllerState {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Number of `close` invocations, including repeated ones
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.close_calls() > 0
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    pub fn pending_gets(&self) -> usize {
        self.pending_gets.lock().len()
    }

    /// Minutes requested by pending `set_auto_lock_minutes` calls
    pub fn pending_sets(&self) -> Vec<u32> {
        self.pending_sets.lock().iter().map(|(m, _)| *m).collect()
    }

    /// Answer the oldest pending query with `minutes`
    pub fn complete_get(&self, minutes: u32) -> bool {
        let callback = {
            let mut pending = self.pending_gets.lock();
            if pending.is_empty() {
                return false;
            }
            pending.remove(0)
        };
        callback(minutes);
        true
    }

    /// Answer the oldest pending update
    pub fn complete_set(&self, accepted: bool) -> bool {
        let callback = {
            let mut pending = self.pending_sets.lock();
            if pending.is_empty() {
                return false;
            }
            pending.remove(0).1
        };
        callback(accepted);
        true
    }

    /// Report a lost connection to the registered handler
    pub fn fail_connection(&self) {
        if let Some(handler) = self.handler.upgrade() {
            handler.on_connection_error(Error::ConnectionLost(self.id));
        }
    }
}

/// Mock handle backed by a shared [`MockControllerState`]
pub struct MockKeyringController {
    state: Arc<MockControllerState>,
}

impl KeyringController for MockKeyringController {
    fn id(&self) -> ConnectionId {
        self.state.id
    }

    fn get_auto_lock_minutes(&self, callback: AutoLockCallback) {
        self.state.get_calls.fetch_add(1, Ordering::SeqCst);
        self.state.pending_gets.lock().push(callback);
    }

    fn set_auto_lock_minutes(&self, minutes: u32, callback: CompletionCallback) {
        self.state.pending_sets.lock().push((minutes, callback));
    }

    fn reset(&self) {
        self.state.reset_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) {
        self.state.close_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }
}

/// Mock factory recording every handle it creates
pub struct MockKeyringFactory {
    next_id: AtomicU64,
    created: Mutex<Vec<Arc<MockControllerState>>>,
}

impl MockKeyringFactory {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Number of handles requested so far
    pub fn handles_requested(&self) -> usize {
        self.created.lock().len()
    }

    /// Every handle created, oldest first
    pub fn controllers(&self) -> Vec<Arc<MockControllerState>> {
        self.created.lock().clone()
    }

    /// Most recently created handle
    pub fn latest(&self) -> Option<Arc<MockControllerState>> {
        self.created.lock().last().cloned()
    }

    /// Handles not yet closed
    pub fn open_handles(&self) -> usize {
        self.created.lock().iter().filter(|c| !c.is_closed()).count()
    }
}

impl Default for MockKeyringFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringControllerFactory for MockKeyringFactory {
    fn keyring_controller(
        &self,
        handler: Weak<dyn ConnectionErrorHandler>,
    ) -> Box<dyn KeyringController> {
        let state = Arc::new(MockControllerState {
            id: ConnectionId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            handler,
            close_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
            pending_gets: Mutex::new(Vec::new()),
            pending_sets: Mutex::new(Vec::new()),
        });
        self.created.lock().push(Arc::clone(&state));
        Box::new(MockKeyringController { state })
    }
}
