//! Collaborators the commands call out to. Implementations live with the
//! platform client, the search view and the downloader.

use std::path::Path;

use leecher_core::{DownloadJobParameters, SearchQuery};

/// Remote lookup of channel names.
pub trait ChannelDirectory {
    fn channel_exists(&self, channel: &str) -> bool;
}

pub trait SearchExecutor {
    fn perform_search(&self, query: SearchQuery);
}

/// Verifies and stores an access token. Returns `false` when the platform
/// rejects the token.
pub trait TokenAuthorizer {
    fn authorize(&self, access_token: &str) -> bool;
}

pub trait DownloadQueue {
    fn enqueue(&self, params: DownloadJobParameters);
}

/// Filesystem lookups needed by preference validation.
pub trait FileLocator {
    fn file_exists(&self, path: &Path) -> bool;
}
