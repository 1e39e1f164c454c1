//! CLI harness for the wallet preferences screen
//!
//! Runs the screen headless against the in-process keyring service to check:
//! - Auto-lock summary rendering per locale
//! - Auto-lock changes and wallet reset
//! - Silent reconnect after the service drops its connections

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pirate_keyring_ipc::{ChannelKeyringFactory, KeyringService, UiLoop};
use pirate_wallet_settings::{
    InMemoryPreferenceHost, SettingsConfig, WalletPreferencesScreen, PREF_WALLET_AUTOLOCK,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{info, warn};

const UI_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "settings-harness")]
#[command(about = "Pirate wallet settings screen harness", long_about = None)]
struct Cli {
    /// JSON settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Locale tag overriding the config (e.g. en-US, ru)
    #[arg(short, long, global = true)]
    locale: Option<String>,

    /// Rows visible in the preference list
    #[arg(long, global = true, default_value = "4")]
    visible_rows: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the screen and print the auto-lock summary
    Show,

    /// Change the auto-lock duration
    Set {
        /// New duration in minutes
        #[arg(short, long)]
        minutes: u32,
    },

    /// Reset the wallet and show the restored auto-lock summary
    Reset,

    /// Drop service connections and verify the screen heals
    ReconnectTest {
        /// Number of simulated service crashes
        #[arg(short, long, default_value = "3")]
        drops: u32,
    },
}

struct Session {
    service: Arc<KeyringService>,
    ui: Arc<UiLoop>,
    host: InMemoryPreferenceHost,
    screen: WalletPreferencesScreen,
}

impl Session {
    fn open(config: &SettingsConfig, visible_rows: usize) -> anyhow::Result<Self> {
        let service = KeyringService::new(config.keyring.clone(), Handle::current())?;
        let ui = Arc::new(UiLoop::new());
        let factory = Arc::new(ChannelKeyringFactory::new(service.clone(), ui.clone()));
        let screen = WalletPreferencesScreen::new(factory, config);
        let host = InMemoryPreferenceHost::new(visible_rows);

        screen.on_create_preferences(&host);
        screen.on_activity_created(&host);

        Ok(Self {
            service,
            ui,
            host,
            screen,
        })
    }

    async fn pump(&self) -> anyhow::Result<()> {
        tokio::time::timeout(UI_TIMEOUT, self.ui.run_next())
            .await
            .context("keyring service did not answer")?;
        Ok(())
    }

    fn summary(&self) -> String {
        self.host
            .preference(PREF_WALLET_AUTOLOCK)
            .and_then(|p| p.summary())
            .unwrap_or_else(|| "(none)".to_string())
    }

    fn print(&self) {
        println!("{}", self.host.title().unwrap_or_default());
        println!("  Auto-lock: {}", self.summary());
        println!("  Redraws:   {}", self.host.list().invalidations(0));
    }

    fn close(self) {
        self.screen.on_destroy_view();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SettingsConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SettingsConfig::default(),
    };
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    match cli.command {
        Commands::Show => run_show(&config, cli.visible_rows).await?,
        Commands::Set { minutes } => run_set(&config, cli.visible_rows, minutes).await?,
        Commands::Reset => run_reset(&config, cli.visible_rows).await?,
        Commands::ReconnectTest { drops } => {
            run_reconnect_test(&config, cli.visible_rows, drops).await?
        }
    }

    Ok(())
}

async fn run_show(config: &SettingsConfig, visible_rows: usize) -> anyhow::Result<()> {
    let session = Session::open(config, visible_rows)?;

    session.screen.on_resume();
    session.pump().await?;

    session.print();
    session.close();
    Ok(())
}

async fn run_set(config: &SettingsConfig, visible_rows: usize, minutes: u32) -> anyhow::Result<()> {
    let session = Session::open(config, visible_rows)?;
    session.screen.on_resume();
    session.pump().await?;
    let before = session.summary();

    session.screen.on_auto_lock_selected(minutes);
    session.pump().await?;

    if session.service.auto_lock_minutes() != minutes {
        warn!("Service rejected {} minutes", minutes);
        session.print();
        session.close();
        bail!(
            "auto-lock must be between {} and {} minutes",
            config.keyring.min_auto_lock_minutes,
            config.keyring.max_auto_lock_minutes
        );
    }

    session.pump().await?;
    info!("Auto-lock changed: {} -> {}", before, session.summary());
    session.print();
    session.close();
    Ok(())
}

async fn run_reset(config: &SettingsConfig, visible_rows: usize) -> anyhow::Result<()> {
    let session = Session::open(config, visible_rows)?;

    session.screen.on_reset_confirmed();
    session.pump().await?;

    info!("Wallet reset ({} total)", session.service.reset_count());
    session.print();
    session.close();
    Ok(())
}

async fn run_reconnect_test(
    config: &SettingsConfig,
    visible_rows: usize,
    drops: u32,
) -> anyhow::Result<()> {
    let session = Session::open(config, visible_rows)?;

    for round in 1..=drops {
        session.service.disconnect_all();
        session.pump().await?;

        session.screen.on_resume();
        session.pump().await?;
        info!(
            "Drop {}/{}: reconnects={} summary={}",
            round,
            drops,
            session.screen.connection().reconnect_count(),
            session.summary()
        );
    }

    let reconnects = session.screen.connection().reconnect_count();
    if reconnects != u64::from(drops) {
        bail!("expected {} reconnects, saw {}", drops, reconnects);
    }

    info!("✅ Screen healed after {} dropped connections", drops);
    session.print();
    session.close();
    Ok(())
}
