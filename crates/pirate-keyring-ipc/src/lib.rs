//! Keyring service IPC client
//!
//! Contract and transport for talking to the keyring service that owns
//! wallet key material and the auto-lock policy.
//!
//! - **Controller contract**: [`KeyringController`] handles produced by a
//!   [`KeyringControllerFactory`], with connection errors reported to a
//!   [`ConnectionErrorHandler`]
//! - **In-process service**: [`KeyringService`] actor, one tokio task per connection
//! - **Channel transport**: [`ChannelKeyringFactory`] with peer-drop detection
//! - **UI dispatch**: replies are delivered on the UI thread via [`UiDispatcher`]
//! - **Mocks**: [`MockKeyringFactory`] for driving callbacks by hand in tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod channel;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod mock;
pub mod service;

pub use channel::{ChannelKeyringController, ChannelKeyringFactory};
pub use config::{
    KeyringServiceConfig, DEFAULT_AUTO_LOCK_MINUTES, MAX_AUTO_LOCK_MINUTES, MIN_AUTO_LOCK_MINUTES,
};
pub use controller::{
    AutoLockCallback, CompletionCallback, ConnectionErrorHandler, ConnectionId,
    KeyringController, KeyringControllerFactory,
};
pub use dispatch::{UiDispatcher, UiLoop, UiTask};
pub use error::{Error, Result};
pub use mock::{MockControllerState, MockKeyringController, MockKeyringFactory};
pub use service::KeyringService;
