//! Wallet preferences screen
//!
//! Lifecycle hooks mirror the host's: create preferences, activity created,
//! resume, destroy view. All of them, and every reply callback, run on the
//! UI thread.

use crate::config::SettingsConfig;
use crate::connection::KeyringConnection;
use crate::plurals::MinutesFormatter;
use crate::view::{ListContainer, PreferenceHost, PreferenceSpec, SummaryPreference};
use parking_lot::Mutex;
use pirate_keyring_ipc::KeyringControllerFactory;
use std::sync::Arc;
use tracing::{debug, trace};

/// Auto-lock duration row
pub const PREF_WALLET_AUTOLOCK: &str = "pref_wallet_autolock";

/// Wallet reset row
pub const PREF_WALLET_RESET: &str = "pref_wallet_reset";

/// Rows inflated by the wallet preferences screen
pub const WALLET_PREFERENCES: [PreferenceSpec; 2] = [
    PreferenceSpec {
        key: PREF_WALLET_AUTOLOCK,
        title: "Auto-lock",
        order: 0,
    },
    PreferenceSpec {
        key: PREF_WALLET_RESET,
        title: "Reset wallet",
        order: 1,
    },
];

struct ScreenInner {
    connection: Arc<KeyringConnection>,
    formatter: MinutesFormatter,
    title: String,
    auto_lock: Mutex<Option<Arc<dyn SummaryPreference>>>,
    list: Mutex<Option<Arc<dyn ListContainer>>>,
}

impl ScreenInner {
    fn refresh(self: &Arc<Self>) {
        let session = self.connection.session();
        let screen = Arc::downgrade(self);

        self.connection.with_controller(|controller| {
            controller.get_auto_lock_minutes(Box::new(move |minutes| {
                if let Some(screen) = screen.upgrade() {
                    screen.show_auto_lock(session, minutes);
                }
            }));
        });
    }

    fn show_auto_lock(&self, session: u64, minutes: u32) {
        if !self.connection.is_current_session(session) {
            trace!("Dropping auto-lock reply for a torn down view");
            return;
        }
        let Some(preference) = self.auto_lock.lock().clone() else {
            return;
        };

        preference.set_summary(&self.formatter.format(minutes));

        // Rows outside the viewport pick up the new summary when rebound.
        let list = self.list.lock().clone();
        if let Some(list) = list {
            if let Some(row) = list.find_row_for_position(preference.order()) {
                row.invalidate();
            }
        }
    }
}

/// Settings screen showing the auto-lock duration and the reset option
pub struct WalletPreferencesScreen {
    inner: Arc<ScreenInner>,
}

impl WalletPreferencesScreen {
    /// Create a screen obtaining keyring handles from `factory`
    pub fn new(factory: Arc<dyn KeyringControllerFactory>, config: &SettingsConfig) -> Self {
        Self::with_formatter(
            factory,
            config.title.clone(),
            MinutesFormatter::new(config.locale()),
        )
    }

    /// Create a screen with an explicit title and formatter
    pub fn with_formatter(
        factory: Arc<dyn KeyringControllerFactory>,
        title: String,
        formatter: MinutesFormatter,
    ) -> Self {
        Self {
            inner: Arc::new(ScreenInner {
                connection: KeyringConnection::new(factory),
                formatter,
                title,
                auto_lock: Mutex::new(None),
                list: Mutex::new(None),
            }),
        }
    }

    /// Connection lifecycle manager backing this screen
    pub fn connection(&self) -> &Arc<KeyringConnection> {
        &self.inner.connection
    }

    /// Set the title and inflate the wallet rows
    pub fn on_create_preferences(&self, host: &dyn PreferenceHost) {
        host.set_title(&self.inner.title);
        host.add_preferences(&WALLET_PREFERENCES);
    }

    /// Bind the auto-lock row and list, then connect
    pub fn on_activity_created(&self, host: &dyn PreferenceHost) {
        let auto_lock = host.find_preference(PREF_WALLET_AUTOLOCK);
        if auto_lock.is_none() {
            debug!("Auto-lock preference {} not inflated", PREF_WALLET_AUTOLOCK);
        }
        *self.inner.auto_lock.lock() = auto_lock;
        *self.inner.list.lock() = Some(host.list_container());

        self.inner.connection.ensure_connected();
    }

    /// Screen came to the foreground
    pub fn on_resume(&self) {
        self.refresh();
    }

    /// Release the keyring handle and unbind views
    pub fn on_destroy_view(&self) {
        self.inner.connection.teardown();
        *self.inner.auto_lock.lock() = None;
        *self.inner.list.lock() = None;
    }

    /// Query the auto-lock duration and update its summary when it arrives
    pub fn refresh(&self) {
        self.inner.refresh();
    }

    /// User picked a new auto-lock duration
    pub fn on_auto_lock_selected(&self, minutes: u32) {
        let session = self.inner.connection.session();
        let screen = Arc::downgrade(&self.inner);

        self.inner.connection.with_controller(|controller| {
            controller.set_auto_lock_minutes(
                minutes,
                Box::new(move |accepted| {
                    let Some(screen) = screen.upgrade() else {
                        return;
                    };
                    if !accepted {
                        debug!("Auto-lock of {} minutes rejected", minutes);
                        return;
                    }
                    if screen.connection.is_current_session(session) {
                        screen.refresh();
                    }
                }),
            );
        });
    }

    /// User confirmed the wallet reset
    pub fn on_reset_confirmed(&self) {
        let sent = self
            .inner
            .connection
            .with_controller(|controller| controller.reset());
        if sent.is_some() {
            debug!("Wallet reset requested");
            self.inner.refresh();
        }
    }
}
