use std::sync::{Mutex, MutexGuard, PoisonError};

use leecher_core::{
    classify_redirect, CallbackEndpoint, DownloadJobParameters, OAuthOutcome, SearchField,
    SearchMode, SearchQuery, SearchRequest, Validatable, ValidationErrors, EMPTY_TOKEN_CODE,
    UNSPECIFIED_DESCRIPTION,
};
use leecher_logging::{leecher_debug, leecher_error, leecher_info, leecher_warn};
use serde::Serialize;

use crate::services::{ChannelDirectory, DownloadQueue, SearchExecutor, TokenAuthorizer};

// Poisoning is ignored: guarded entities are re-validated before every dispatch.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the search request of one search view.
///
/// Executions are serialized by a dispatch lock held across
/// validate-then-dispatch. The request itself is only locked while it is read
/// or changed, never while a collaborator runs, so collaborators may call
/// [`SearchCommand::snapshot`]. Calling `execute` from a collaborator
/// deadlocks.
#[derive(Debug)]
pub struct SearchCommand {
    request: Mutex<SearchRequest>,
    dispatch: Mutex<()>,
}

impl SearchCommand {
    /// Starts from a copy of `last_used`, without its errors.
    pub fn new(last_used: &SearchRequest) -> Self {
        Self {
            request: Mutex::new(last_used.template()),
            dispatch: Mutex::new(()),
        }
    }

    pub fn edit<R>(&self, change: impl FnOnce(&mut SearchRequest) -> R) -> R {
        change(&mut lock(&self.request))
    }

    pub fn snapshot(&self) -> SearchRequest {
        lock(&self.request).clone()
    }

    pub fn errors(&self) -> ValidationErrors {
        lock(&self.request).errors().clone()
    }

    pub fn clear_urls(&self) {
        lock(&self.request).set_urls(String::new());
    }

    pub fn clear_ids(&self) {
        lock(&self.request).set_ids(String::new());
    }

    /// Validates the request, checks the channel with `directory`, and hands
    /// the query to `executor` only when no field has an error.
    pub fn execute(
        &self,
        directory: &dyn ChannelDirectory,
        executor: &dyn SearchExecutor,
    ) -> Result<SearchQuery, ValidationErrors> {
        let _dispatch = lock(&self.dispatch);

        let (mode, channel) = {
            let mut request = lock(&self.request);
            request.validate(None);
            (request.mode(), request.channel().trim().to_string())
        };

        let channel_missing = mode == SearchMode::Channel
            && !channel.is_empty()
            && !directory.channel_exists(&channel);

        // Edits made during the lookup went through the field setters, so the
        // error map below already reflects them.
        let query = {
            let mut request = lock(&self.request);
            if channel_missing {
                request.add_error(
                    SearchField::Channel,
                    "The specified channel does not exist on Twitch!",
                );
            }
            match request.current_query() {
                Some(query) => query,
                None => {
                    leecher_warn!(
                        "search refused, invalid fields: {:?}",
                        request.errors().fields().collect::<Vec<_>>()
                    );
                    return Err(request.errors().clone());
                }
            }
        };

        leecher_info!("dispatching search {:?}", mode);
        executor.perform_search(query.clone());
        Ok(query)
    }
}

/// Owns the parameters of one pending download.
///
/// Locking follows [`SearchCommand`]: the queue runs outside the parameter
/// lock but inside the dispatch lock.
#[derive(Debug)]
pub struct DownloadCommand {
    params: Mutex<DownloadJobParameters>,
    dispatch: Mutex<()>,
}

impl DownloadCommand {
    pub fn new(params: DownloadJobParameters) -> Self {
        Self {
            params: Mutex::new(params),
            dispatch: Mutex::new(()),
        }
    }

    pub fn edit<R>(&self, change: impl FnOnce(&mut DownloadJobParameters) -> R) -> R {
        change(&mut lock(&self.params))
    }

    pub fn snapshot(&self) -> DownloadJobParameters {
        lock(&self.params).clone()
    }

    pub fn execute(&self, queue: &dyn DownloadQueue) -> Result<(), ValidationErrors> {
        let _dispatch = lock(&self.dispatch);

        let job = {
            let mut params = lock(&self.params);
            params.validate(None);
            if params.has_errors() {
                leecher_warn!(
                    "download of {} refused, invalid fields: {:?}",
                    params.video().id(),
                    params.errors().fields().collect::<Vec<_>>()
                );
                return Err(params.errors().clone());
            }
            params.clone()
        };

        if let Some(quality) = job.quality() {
            leecher_info!(
                "queueing download of {} at {quality} ({})",
                job.video().id(),
                job.cropped_length_display()
            );
        }
        queue.enqueue(job);
        Ok(())
    }
}

/// What the authorization view must do after a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConnectAction {
    NavigateBack,
    ShowRevokeAuthorization,
    Notify(String),
    ShowError(String),
}

/// Handles navigations of the embedded authorization browser.
///
/// Navigations are handled one at a time; the authorizer must not navigate
/// the same command again while it runs.
#[derive(Debug, Default)]
pub struct ConnectCommand {
    endpoint: CallbackEndpoint,
    guard: Mutex<()>,
}

impl ConnectCommand {
    pub fn new(endpoint: CallbackEndpoint) -> Self {
        Self {
            endpoint,
            guard: Mutex::new(()),
        }
    }

    /// Maps one navigation to the actions the view performs, in order.
    ///
    /// Navigations outside the callback endpoint yield no actions.
    pub fn navigating(&self, uri: &str, authorizer: &dyn TokenAuthorizer) -> Vec<ConnectAction> {
        let _guard = lock(&self.guard);
        if !self.endpoint.matches(uri) {
            return Vec::new();
        }

        match classify_redirect(uri) {
            OAuthOutcome::Success { token } => {
                if authorizer.authorize(&token) {
                    leecher_info!("authorization succeeded");
                    vec![
                        ConnectAction::ShowRevokeAuthorization,
                        ConnectAction::Notify("Twitch authorization was successful!".to_string()),
                    ]
                } else {
                    leecher_error!("access token rejected by the platform");
                    vec![
                        ConnectAction::ShowError(
                            "The access token could not be verified! Authorization aborted!"
                                .to_string(),
                        ),
                        ConnectAction::NavigateBack,
                    ]
                }
            }
            OAuthOutcome::Cancelled => {
                leecher_info!("authorization cancelled by the user");
                vec![
                    ConnectAction::NavigateBack,
                    ConnectAction::Notify("Twitch authorization has been canceled.".to_string()),
                ]
            }
            OAuthOutcome::AuthError { code, description } => {
                leecher_error!("authorization failed: {code}");
                let message = if code == EMPTY_TOKEN_CODE {
                    "Twitch did not respond with an access token! Authorization aborted!"
                        .to_string()
                } else if description == UNSPECIFIED_DESCRIPTION {
                    "Unspecified error! Authorization aborted!".to_string()
                } else {
                    format!("Twitch returned the error:\n\n\"{description}\"\n\nAuthorization aborted!")
                };
                vec![ConnectAction::ShowError(message), ConnectAction::NavigateBack]
            }
            OAuthOutcome::NoResponse => {
                leecher_debug!("redirect without token or error");
                vec![
                    ConnectAction::ShowError(
                        "Twitch did not respond with an access token or an error! Authorization aborted!"
                            .to_string(),
                    ),
                    ConnectAction::NavigateBack,
                ]
            }
        }
    }

    pub fn cancel(&self) -> Vec<ConnectAction> {
        let _guard = lock(&self.guard);
        vec![ConnectAction::NavigateBack]
    }
}
