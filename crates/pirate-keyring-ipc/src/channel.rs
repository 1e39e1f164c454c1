//! Channel transport to the in-process keyring service
//!
//! Each handle owns the sending half of a connection. A watcher task waits
//! for the service to drop the receiving half and reports
//! [`Error::ConnectionLost`] to the handle's error handler, at most once and
//! never after a local `close`.

use crate::controller::{
    AutoLockCallback, CompletionCallback, ConnectionErrorHandler, ConnectionId,
    KeyringController, KeyringControllerFactory,
};
use crate::dispatch::UiDispatcher;
use crate::service::{KeyringService, Request};
use crate::Error;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, Notify};
use tracing::{debug, trace};

/// Factory opening channel connections to a [`KeyringService`]
pub struct ChannelKeyringFactory {
    service: Arc<KeyringService>,
    dispatcher: Arc<dyn UiDispatcher>,
}

impl ChannelKeyringFactory {
    /// Create a factory delivering replies through `dispatcher`
    pub fn new(service: Arc<KeyringService>, dispatcher: Arc<dyn UiDispatcher>) -> Self {
        Self {
            service,
            dispatcher,
        }
    }
}

impl KeyringControllerFactory for ChannelKeyringFactory {
    fn keyring_controller(
        &self,
        handler: Weak<dyn ConnectionErrorHandler>,
    ) -> Box<dyn KeyringController> {
        let (id, tx) = self.service.connect();
        Box::new(ChannelKeyringController::open(
            id,
            tx,
            handler,
            Arc::clone(&self.dispatcher),
            self.service.runtime().clone(),
        ))
    }
}

struct Shared {
    id: ConnectionId,
    closed: AtomicBool,
    reported: AtomicBool,
    close_signal: Notify,
    handler: Weak<dyn ConnectionErrorHandler>,
    dispatcher: Arc<dyn UiDispatcher>,
}

impl Shared {
    fn report_lost(&self) {
        if self.closed.load(Ordering::SeqCst) || self.reported.swap(true, Ordering::SeqCst) {
            return;
        }

        trace!("Keyring connection {} lost, notifying handler", self.id);
        let id = self.id;
        let handler = self.handler.clone();
        self.dispatcher.post(Box::new(move || {
            if let Some(handler) = handler.upgrade() {
                handler.on_connection_error(Error::ConnectionLost(id));
            }
        }));
    }
}

/// Handle to one channel connection
pub struct ChannelKeyringController {
    tx: Mutex<Option<mpsc::UnboundedSender<Request>>>,
    shared: Arc<Shared>,
    runtime: Handle,
}

impl ChannelKeyringController {
    fn open(
        id: ConnectionId,
        tx: mpsc::UnboundedSender<Request>,
        handler: Weak<dyn ConnectionErrorHandler>,
        dispatcher: Arc<dyn UiDispatcher>,
        runtime: Handle,
    ) -> Self {
        let shared = Arc::new(Shared {
            id,
            closed: AtomicBool::new(false),
            reported: AtomicBool::new(false),
            close_signal: Notify::new(),
            handler,
            dispatcher,
        });

        let watch_tx = tx.clone();
        let watcher = Arc::clone(&shared);
        runtime.spawn(async move {
            tokio::select! {
                _ = watch_tx.closed() => watcher.report_lost(),
                _ = watcher.close_signal.notified() => {}
            }
        });

        Self {
            tx: Mutex::new(Some(tx)),
            shared,
            runtime,
        }
    }

    fn send(&self, request: Request) -> bool {
        let sent = match self.tx.lock().as_ref() {
            Some(tx) => tx.send(request).is_ok(),
            None => return false,
        };
        if !sent {
            self.shared.report_lost();
        }
        sent
    }
}

impl KeyringController for ChannelKeyringController {
    fn id(&self) -> ConnectionId {
        self.shared.id
    }

    fn get_auto_lock_minutes(&self, callback: AutoLockCallback) {
        let (reply, rx) = oneshot::channel();
        if !self.send(Request::GetAutoLockMinutes { reply }) {
            return;
        }

        let dispatcher = Arc::clone(&self.shared.dispatcher);
        self.runtime.spawn(async move {
            if let Ok(minutes) = rx.await {
                dispatcher.post(Box::new(move || callback(minutes)));
            }
        });
    }

    fn set_auto_lock_minutes(&self, minutes: u32, callback: CompletionCallback) {
        let (reply, rx) = oneshot::channel();
        if !self.send(Request::SetAutoLockMinutes { minutes, reply }) {
            return;
        }

        let dispatcher = Arc::clone(&self.shared.dispatcher);
        self.runtime.spawn(async move {
            if let Ok(accepted) = rx.await {
                dispatcher.post(Box::new(move || callback(accepted)));
            }
        });
    }

    fn reset(&self) {
        self.send(Request::Reset);
    }

    fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.tx.lock().take();
        self.shared.close_signal.notify_one();
        debug!("Keyring connection {} released", self.shared.id);
    }

    fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

impl Drop for ChannelKeyringController {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyringServiceConfig;
    use crate::dispatch::UiLoop;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingHandler {
        errors: Mutex<Vec<Error>>,
    }

    impl ConnectionErrorHandler for CountingHandler {
        fn on_connection_error(&self, error: Error) {
            self.errors.lock().push(error);
        }
    }

    fn setup() -> (Arc<KeyringService>, Arc<UiLoop>, ChannelKeyringFactory) {
        let service =
            KeyringService::new(KeyringServiceConfig::default(), Handle::current()).unwrap();
        let ui = Arc::new(UiLoop::new());
        let factory = ChannelKeyringFactory::new(Arc::clone(&service), ui.clone());
        (service, ui, factory)
    }

    async fn next(ui: &UiLoop) {
        tokio::time::timeout(Duration::from_secs(5), ui.run_next())
            .await
            .expect("ui task within timeout");
    }

    #[tokio::test]
    async fn test_reply_delivered_through_ui_loop() {
        let (_service, ui, factory) = setup();
        let handler: Arc<dyn ConnectionErrorHandler> = Arc::new(CountingHandler::default());
        let controller = factory.keyring_controller(Arc::downgrade(&handler));

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_cb = Arc::clone(&seen);
        controller.get_auto_lock_minutes(Box::new(move |minutes| {
            seen_cb.store(minutes as usize, Ordering::SeqCst);
        }));

        // Nothing runs until the UI thread drains the loop.
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        next(&ui).await;
        assert_eq!(seen.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_service_crash_reports_connection_lost_once() {
        let (service, ui, factory) = setup();
        let handler = Arc::new(CountingHandler::default());
        let dyn_handler: Arc<dyn ConnectionErrorHandler> = handler.clone();
        let controller = factory.keyring_controller(Arc::downgrade(&dyn_handler));
        let id = controller.id();

        service.disconnect_all();
        next(&ui).await;

        assert_eq!(*handler.errors.lock(), vec![Error::ConnectionLost(id)]);

        // Sending on the dead connection must not report a second time.
        controller.reset();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ui.run_pending(), 0);
        assert_eq!(handler.errors.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_silent() {
        let (service, ui, factory) = setup();
        let handler = Arc::new(CountingHandler::default());
        let dyn_handler: Arc<dyn ConnectionErrorHandler> = handler.clone();
        let controller = factory.keyring_controller(Arc::downgrade(&dyn_handler));

        controller.close();
        controller.close();
        assert!(controller.is_closed());

        // Queries on a closed handle are dropped.
        controller.get_auto_lock_minutes(Box::new(|_| panic!("closed handle replied")));

        for _ in 0..50 {
            if service.live_connections() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(service.live_connections(), 0);
        assert_eq!(ui.run_pending(), 0);
        assert!(handler.errors.lock().is_empty());
    }

    #[tokio::test]
    async fn test_set_auto_lock_acknowledged() {
        let (service, ui, factory) = setup();
        let handler: Arc<dyn ConnectionErrorHandler> = Arc::new(CountingHandler::default());
        let controller = factory.keyring_controller(Arc::downgrade(&handler));

        let result = Arc::new(Mutex::new(None));
        let result_cb = Arc::clone(&result);
        controller.set_auto_lock_minutes(45, Box::new(move |ok| *result_cb.lock() = Some(ok)));
        next(&ui).await;

        assert_eq!(*result.lock(), Some(true));
        assert_eq!(service.auto_lock_minutes(), 45);
    }
}
