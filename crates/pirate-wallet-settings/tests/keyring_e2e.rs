//! End-to-end screen tests over the in-process keyring service

use pirate_keyring_ipc::{ChannelKeyringFactory, KeyringService, KeyringServiceConfig, UiLoop};
use pirate_wallet_settings::{
    InMemoryPreferenceHost, SettingsConfig, WalletPreferencesScreen, PREF_WALLET_AUTOLOCK,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

struct Harness {
    service: Arc<KeyringService>,
    ui: Arc<UiLoop>,
    host: InMemoryPreferenceHost,
    screen: WalletPreferencesScreen,
}

impl Harness {
    fn start() -> Self {
        let service = KeyringService::new(KeyringServiceConfig::default(), Handle::current())
            .expect("default config is valid");
        let ui = Arc::new(UiLoop::new());
        let factory = Arc::new(ChannelKeyringFactory::new(service.clone(), ui.clone()));
        let screen = WalletPreferencesScreen::new(factory, &SettingsConfig::default());
        let host = InMemoryPreferenceHost::new(4);

        screen.on_create_preferences(&host);
        screen.on_activity_created(&host);

        Self {
            service,
            ui,
            host,
            screen,
        }
    }

    async fn pump(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.ui.run_next())
            .await
            .expect("ui task within timeout");
    }

    fn summary(&self) -> Option<String> {
        self.host.preference(PREF_WALLET_AUTOLOCK).unwrap().summary()
    }
}

#[tokio::test]
async fn test_resume_shows_service_default() {
    let h = Harness::start();

    h.screen.on_resume();
    h.pump().await;

    assert_eq!(h.summary().as_deref(), Some("10 minutes"));
    assert_eq!(h.host.list().invalidations(0), 1);
}

#[tokio::test]
async fn test_service_crash_heals_silently() {
    let h = Harness::start();

    h.service.disconnect_all();
    // Connection-lost notification runs on the UI loop and reconnects.
    h.pump().await;
    assert_eq!(h.screen.connection().reconnect_count(), 1);
    assert!(h.screen.connection().is_connected());

    h.screen.on_resume();
    h.pump().await;
    assert_eq!(h.summary().as_deref(), Some("10 minutes"));
}

#[tokio::test]
async fn test_change_then_reset() {
    let h = Harness::start();

    h.screen.on_auto_lock_selected(1);
    h.pump().await; // set acknowledged, refresh issued
    h.pump().await; // refresh reply
    assert_eq!(h.summary().as_deref(), Some("1 minute"));
    assert_eq!(h.service.auto_lock_minutes(), 1);

    h.screen.on_reset_confirmed();
    h.pump().await;
    assert_eq!(h.summary().as_deref(), Some("10 minutes"));
    assert_eq!(h.service.reset_count(), 1);
}

#[tokio::test]
async fn test_teardown_releases_connection() {
    let h = Harness::start();
    h.screen.on_resume();
    h.screen.on_destroy_view();

    // The in-flight reply may still arrive; it must not touch the view.
    let _ = tokio::time::timeout(Duration::from_millis(100), h.ui.run_next()).await;
    assert_eq!(h.summary(), None);

    for _ in 0..50 {
        if h.service.live_connections() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(h.service.live_connections(), 0);
    assert_eq!(h.screen.connection().reconnect_count(), 0);
}
