//! In-process keyring service
//!
//! Each connection is served by its own tokio task reading requests from an
//! unbounded channel. Dropping the task drops the receiver, which is how
//! clients observe a lost connection.

use crate::config::KeyringServiceConfig;
use crate::controller::ConnectionId;
use crate::Result;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, trace};

/// Request carried over a keyring connection
#[derive(Debug)]
pub(crate) enum Request {
    GetAutoLockMinutes {
        reply: oneshot::Sender<u32>,
    },
    SetAutoLockMinutes {
        minutes: u32,
        reply: oneshot::Sender<bool>,
    },
    Reset,
}

#[derive(Debug)]
struct ServiceState {
    auto_lock_minutes: u32,
    reset_count: u64,
}

/// Keyring service actor
pub struct KeyringService {
    config: KeyringServiceConfig,
    state: Arc<Mutex<ServiceState>>,
    generation: watch::Sender<u64>,
    next_connection: AtomicU64,
    live_connections: Arc<AtomicU64>,
    runtime: Handle,
}

impl KeyringService {
    /// Create a service whose connection tasks run on `runtime`
    pub fn new(config: KeyringServiceConfig, runtime: Handle) -> Result<Arc<Self>> {
        config.validate()?;
        let (generation, _) = watch::channel(0);
        info!(
            "Keyring service started (auto-lock {} min, range {}..={})",
            config.default_auto_lock_minutes,
            config.min_auto_lock_minutes,
            config.max_auto_lock_minutes
        );

        Ok(Arc::new(Self {
            state: Arc::new(Mutex::new(ServiceState {
                auto_lock_minutes: config.default_auto_lock_minutes,
                reset_count: 0,
            })),
            config,
            generation,
            next_connection: AtomicU64::new(1),
            live_connections: Arc::new(AtomicU64::new(0)),
            runtime,
        }))
    }

    /// Runtime serving this service's connections
    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Current auto-lock duration
    pub fn auto_lock_minutes(&self) -> u32 {
        self.state.lock().auto_lock_minutes
    }

    /// Number of resets processed
    pub fn reset_count(&self) -> u64 {
        self.state.lock().reset_count
    }

    /// Connections currently being served
    pub fn live_connections(&self) -> u64 {
        self.live_connections.load(Ordering::SeqCst)
    }

    /// Drop every live connection, as if the service process crashed
    pub fn disconnect_all(&self) {
        self.generation.send_modify(|g| *g += 1);
        info!("Keyring service dropped all connections");
    }

    /// Open a connection and start serving it
    pub(crate) fn connect(&self) -> (ConnectionId, mpsc::UnboundedSender<Request>) {
        let id = ConnectionId(self.next_connection.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = mpsc::unbounded_channel();

        let state = Arc::clone(&self.state);
        let config = self.config.clone();
        let generation = self.generation.subscribe();
        let started_at = *generation.borrow();
        let live = Arc::clone(&self.live_connections);

        live.fetch_add(1, Ordering::SeqCst);
        self.runtime.spawn(async move {
            serve_connection(id, started_at, state, config, rx, generation).await;
            live.fetch_sub(1, Ordering::SeqCst);
        });

        debug!("Keyring connection {} opened", id);
        (id, tx)
    }
}

async fn serve_connection(
    id: ConnectionId,
    started_at: u64,
    state: Arc<Mutex<ServiceState>>,
    config: KeyringServiceConfig,
    mut rx: mpsc::UnboundedReceiver<Request>,
    mut generation: watch::Receiver<u64>,
) {
    loop {
        tokio::select! {
            request = rx.recv() => match request {
                Some(request) => handle_request(id, &state, &config, request),
                None => break,
            },
            changed = generation.changed() => {
                if changed.is_err() || *generation.borrow() != started_at {
                    break;
                }
            }
        }
    }

    debug!("Keyring connection {} closed", id);
}

fn handle_request(
    id: ConnectionId,
    state: &Mutex<ServiceState>,
    config: &KeyringServiceConfig,
    request: Request,
) {
    match request {
        Request::GetAutoLockMinutes { reply } => {
            let minutes = state.lock().auto_lock_minutes;
            trace!("{}: get_auto_lock_minutes -> {}", id, minutes);
            let _ = reply.send(minutes);
        }
        Request::SetAutoLockMinutes { minutes, reply } => {
            let accepted = config.accepts(minutes);
            if accepted {
                state.lock().auto_lock_minutes = minutes;
            }
            trace!("{}: set_auto_lock_minutes({}) -> {}", id, minutes, accepted);
            let _ = reply.send(accepted);
        }
        Request::Reset => {
            let mut state = state.lock();
            state.auto_lock_minutes = config.default_auto_lock_minutes;
            state.reset_count += 1;
            info!("Wallet keyrings reset ({} total)", state.reset_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn query(tx: &mpsc::UnboundedSender<Request>) -> u32 {
        let (reply, rx) = oneshot::channel();
        tx.send(Request::GetAutoLockMinutes { reply }).unwrap();
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn test_default_auto_lock() {
        let service = KeyringService::new(KeyringServiceConfig::default(), Handle::current()).unwrap();
        let (_, tx) = service.connect();
        assert_eq!(query(&tx).await, 10);
    }

    #[tokio::test]
    async fn test_set_respects_bounds() {
        let service = KeyringService::new(KeyringServiceConfig::default(), Handle::current()).unwrap();
        let (_, tx) = service.connect();

        let (reply, rx) = oneshot::channel();
        tx.send(Request::SetAutoLockMinutes { minutes: 30, reply }).unwrap();
        assert!(rx.await.unwrap());
        assert_eq!(query(&tx).await, 30);

        let (reply, rx) = oneshot::channel();
        tx.send(Request::SetAutoLockMinutes { minutes: 0, reply }).unwrap();
        assert!(!rx.await.unwrap());
        assert_eq!(service.auto_lock_minutes(), 30);
    }

    #[tokio::test]
    async fn test_reset_restores_default() {
        let service = KeyringService::new(KeyringServiceConfig::default(), Handle::current()).unwrap();
        let (_, tx) = service.connect();

        let (reply, rx) = oneshot::channel();
        tx.send(Request::SetAutoLockMinutes { minutes: 60, reply }).unwrap();
        assert!(rx.await.unwrap());

        tx.send(Request::Reset).unwrap();
        assert_eq!(query(&tx).await, 10);
        assert_eq!(service.reset_count(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_all_drops_receivers() {
        let service = KeyringService::new(KeyringServiceConfig::default(), Handle::current()).unwrap();
        let (first, tx) = service.connect();
        let (second, _tx2) = service.connect();
        assert_ne!(first, second);

        // Make sure the connection task is running before the crash.
        assert_eq!(query(&tx).await, 10);

        service.disconnect_all();
        tx.closed().await;
        assert!(tx.is_closed());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let config = KeyringServiceConfig {
            default_auto_lock_minutes: 0,
            ..Default::default()
        };
        assert!(KeyringService::new(config, runtime.handle().clone()).is_err());
    }
}
