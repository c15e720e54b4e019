use leecher_logging::leecher_debug;
use serde::{Deserialize, Serialize};
use url::Url;

const ACCESS_TOKEN_MARKER: &str = "access_token=";

/// Code reported when the redirect carried an empty token.
pub const EMPTY_TOKEN_CODE: &str = "empty_token";

/// Description used when the platform sent an error without describing it.
pub const UNSPECIFIED_DESCRIPTION: &str = "unspecified";

/// Result of interpreting one navigation of the authorization browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OAuthOutcome {
    Success { token: String },
    Cancelled,
    AuthError { code: String, description: String },
    NoResponse,
}

/// Classifies an implicit-grant redirect URI.
///
/// A token in the fragment wins over everything else; otherwise the `error`
/// query parameter decides between cancellation and failure. Anything else,
/// including input that is not a URL at all, is `NoResponse`.
pub fn classify_redirect(uri: &str) -> OAuthOutcome {
    let outcome = classify(uri);
    match &outcome {
        OAuthOutcome::Success { .. } => leecher_debug!("redirect carried an access token"),
        other => leecher_debug!("redirect classified as {other:?}"),
    }
    outcome
}

fn classify(uri: &str) -> OAuthOutcome {
    if let Some(token) = fragment_token(uri) {
        if token.trim().is_empty() {
            return OAuthOutcome::AuthError {
                code: EMPTY_TOKEN_CODE.to_string(),
                description: "the access token in the redirect was empty".to_string(),
            };
        }
        return OAuthOutcome::Success {
            token: token.to_string(),
        };
    }

    let Ok(url) = Url::parse(uri.trim()) else {
        return OAuthOutcome::NoResponse;
    };

    let mut error = None;
    let mut description = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" if error.is_none() => error = Some(value.into_owned()),
            "error_description" if description.is_none() => description = Some(value.into_owned()),
            _ => {}
        }
    }

    match error {
        Some(code) if code.eq_ignore_ascii_case("access_denied") => OAuthOutcome::Cancelled,
        Some(code) => OAuthOutcome::AuthError {
            code,
            description: description
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| UNSPECIFIED_DESCRIPTION.to_string()),
        },
        None => OAuthOutcome::NoResponse,
    }
}

/// Text after `access_token=` in the fragment, up to the next `&`.
fn fragment_token(uri: &str) -> Option<&str> {
    let (_, fragment) = uri.split_once('#')?;
    let start = fragment.find(ACCESS_TOKEN_MARKER)? + ACCESS_TOKEN_MARKER.len();
    let rest = &fragment[start..];
    Some(rest.split('&').next().unwrap_or(rest))
}

/// Scheme and host of the application's registered redirect target.
///
/// Navigations elsewhere belong to the platform's login pages and must not be
/// classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackEndpoint {
    scheme: String,
    host: String,
}

impl CallbackEndpoint {
    /// Returns `None` when `base` has no host.
    pub fn parse(base: &str) -> Option<Self> {
        let url = Url::parse(base).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();
        Some(Self {
            scheme: url.scheme().to_ascii_lowercase(),
            host,
        })
    }

    pub fn matches(&self, uri: &str) -> bool {
        Url::parse(uri.trim()).is_ok_and(|url| {
            url.scheme().eq_ignore_ascii_case(&self.scheme)
                && url
                    .host_str()
                    .is_some_and(|host| host.eq_ignore_ascii_case(&self.host))
        })
    }
}

impl Default for CallbackEndpoint {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "www.tl.com".to_string(),
        }
    }
}
