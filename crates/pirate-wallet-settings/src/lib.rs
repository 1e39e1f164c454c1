//! Wallet preferences screen
//!
//! Shows the wallet auto-lock duration and a reset option, backed by the
//! keyring service.
//!
//! ## Components
//!
//! - **Connection lifecycle**: [`KeyringConnection`] keeps at most one live
//!   keyring handle and reconnects immediately when the link breaks
//! - **Screen**: [`WalletPreferencesScreen`] refreshes the auto-lock summary
//!   and redraws only the row that is currently materialised
//! - **Plurals**: [`MinutesFormatter`] applies CLDR cardinal rules per locale
//! - **Views**: host/list/row contracts plus in-memory implementations

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod connection;
pub mod error;
pub mod memory;
pub mod plurals;
pub mod screen;
pub mod view;

pub use config::SettingsConfig;
pub use connection::KeyringConnection;
pub use error::{Error, Result};
pub use memory::{InMemoryPreferenceHost, MemoryPreference, VirtualizedList};
pub use plurals::{Locale, MinutesFormatter, PluralCategory};
pub use screen::{
    WalletPreferencesScreen, PREF_WALLET_AUTOLOCK, PREF_WALLET_RESET, WALLET_PREFERENCES,
};
pub use view::{ListContainer, PreferenceHost, PreferenceSpec, RowHandle, SummaryPreference};
