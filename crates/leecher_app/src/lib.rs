//! Leecher app layer: serialized search, download and connect commands over
//! the core entities, plus the preferences snapshot store.
mod commands;
pub mod logging;
mod preferences;
mod services;

pub use commands::{ConnectAction, ConnectCommand, DownloadCommand, SearchCommand};
pub use preferences::{
    Preferences, PreferencesField, PreferencesStore, LAST_DAYS_RANGE, PLAYER_EXTENSION,
};
pub use services::{
    ChannelDirectory, DownloadQueue, FileLocator, SearchExecutor, TokenAuthorizer,
};
