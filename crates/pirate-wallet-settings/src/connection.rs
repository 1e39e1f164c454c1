//! Keyring connection lifecycle
//!
//! Holds at most one keyring handle for as long as the screen is visible.
//! A broken link is healed by closing the handle and immediately opening a
//! new one; there is no backoff and no retry cap.

use parking_lot::Mutex;
use pirate_keyring_ipc::{
    ConnectionErrorHandler, Error as KeyringError, KeyringController, KeyringControllerFactory,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Connection lifecycle manager for one screen
pub struct KeyringConnection {
    factory: Arc<dyn KeyringControllerFactory>,
    controller: Mutex<Option<Box<dyn KeyringController>>>,
    active: AtomicBool,
    session: AtomicU64,
    reconnects: AtomicU64,
    self_ref: Weak<KeyringConnection>,
}

impl KeyringConnection {
    /// Create a manager that obtains handles from `factory`
    pub fn new(factory: Arc<dyn KeyringControllerFactory>) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            factory,
            controller: Mutex::new(None),
            active: AtomicBool::new(false),
            session: AtomicU64::new(0),
            reconnects: AtomicU64::new(0),
            self_ref: self_ref.clone(),
        })
    }

    /// Acquire a handle unless one is already held
    pub fn ensure_connected(&self) {
        self.active.store(true, Ordering::SeqCst);
        self.connect_if_needed();
    }

    /// Release the handle; no reconnect happens until `ensure_connected`
    pub fn teardown(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.session.fetch_add(1, Ordering::SeqCst);

        let released = self.controller.lock().take();
        if let Some(controller) = released {
            controller.close();
            debug!("Keyring handle {} released on teardown", controller.id());
        }
    }

    /// Run `f` against the current handle, if any
    pub fn with_controller<R>(&self, f: impl FnOnce(&dyn KeyringController) -> R) -> Option<R> {
        let slot = self.controller.lock();
        slot.as_deref().map(|controller| f(controller))
    }

    /// Whether a handle is currently held
    pub fn is_connected(&self) -> bool {
        self.controller.lock().is_some()
    }

    /// Current view session; bumped by every teardown
    pub fn session(&self) -> u64 {
        self.session.load(Ordering::SeqCst)
    }

    /// Whether `session` is still live and the manager is active
    pub fn is_current_session(&self, session: u64) -> bool {
        self.active.load(Ordering::SeqCst) && self.session() == session
    }

    /// Number of reconnects triggered by connection errors
    pub fn reconnect_count(&self) -> u64 {
        self.reconnects.load(Ordering::SeqCst)
    }

    fn connect_if_needed(&self) {
        let mut slot = self.controller.lock();
        if slot.is_some() {
            return;
        }

        let handler: Weak<dyn ConnectionErrorHandler> = self.self_ref.clone();
        let controller = self.factory.keyring_controller(handler);
        debug!("Keyring handle {} acquired", controller.id());
        *slot = Some(controller);
    }
}

impl ConnectionErrorHandler for KeyringConnection {
    fn on_connection_error(&self, error: KeyringError) {
        let broken = {
            let mut slot = self.controller.lock();
            let stale = matches!(
                (slot.as_ref(), error.connection()),
                (Some(current), Some(id)) if current.id() != id
            );
            if stale {
                trace!("Ignoring report for a replaced keyring handle");
                return;
            }
            slot.take()
        };

        if let Some(controller) = broken {
            controller.close();
        }

        if !self.active.load(Ordering::SeqCst) {
            return;
        }

        self.reconnects.fetch_add(1, Ordering::SeqCst);
        trace!("Keyring handle replaced");
        self.connect_if_needed();
    }
}
