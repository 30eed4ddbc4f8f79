//! OAuth tokens, their on-disk storage and the credential provider used by the client.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{AuthError, ClientError, error_body};
use crate::region::Endpoints;

/// Scope requested by the authorization flow.
pub const SCOPE: &str = "tasks:write tasks:read";

/// Refresh this many seconds before the recorded expiry.
const TOKEN_EXPIRY_BUFFER_SECONDS: i64 = 300;

/// Stored OAuth credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix seconds; `None` means the token does not expire on our side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl OAuthTokens {
    /// A token supplied out of band, e.g. through the environment.
    #[must_use]
    pub const fn fixed(access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: None,
        }
    }

    /// Whether the token expires within the refresh buffer of `now`.
    #[must_use]
    pub fn expires_soon(&self, now: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now + TOKEN_EXPIRY_BUFFER_SECONDS >= expires_at)
    }
}

impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_tokens(self, previous_refresh: Option<&str>, now: i64) -> OAuthTokens {
        OAuthTokens {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_owned)),
            expires_at: self.expires_in.map(|seconds| now + seconds),
        }
    }
}

/// Registered OAuth application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthApp {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
}

impl OAuthApp {
    fn credentials(&self) -> Result<(&str, &str), AuthError> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok((id, secret)),
            _ => Err(AuthError::MissingClientCredentials),
        }
    }
}

/// Read tokens from `path`; a missing file yields `None`.
///
/// # Errors
/// Fails when the file exists but cannot be read or parsed.
pub fn load_tokens(path: &Path) -> Result<Option<OAuthTokens>, AuthError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(AuthError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| AuthError::Format {
            path: path.to_path_buf(),
            source,
        })
}

/// Write tokens to `path`, creating parent directories.
///
/// # Errors
/// Fails when the directory or file cannot be written.
pub fn save_tokens(path: &Path, tokens: &OAuthTokens) -> Result<(), AuthError> {
    let io_err = |source| AuthError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let body = serde_json::to_string_pretty(tokens).map_err(|source| AuthError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, body).map_err(io_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
    }
    Ok(())
}

/// Extract the authorization code from a pasted redirect URL or a bare code.
///
/// # Errors
/// Fails when the URL carries no code or a `state` different from `expected_state`.
pub fn parse_callback(input: &str, expected_state: &str) -> Result<String, AuthError> {
    let input = input.trim();
    let Ok(url) = Url::parse(input) else {
        return if input.is_empty() {
            Err(AuthError::MissingCode)
        } else {
            Ok(input.to_owned())
        };
    };
    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }
    if state.as_deref() != Some(expected_state) {
        return Err(AuthError::StateMismatch);
    }
    code.filter(|code| !code.is_empty()).ok_or(AuthError::MissingCode)
}

fn now_unix() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Hands out valid access tokens, refreshing them on demand.
///
/// Tokens come from a fixed value (environment) when given, otherwise from the token
/// file. Refreshed tokens are written back to the token file.
#[derive(Debug)]
pub struct CredentialProvider {
    http: reqwest::Client,
    endpoints: Endpoints,
    app: OAuthApp,
    fixed: Option<OAuthTokens>,
    token_path: Option<PathBuf>,
    cache: Mutex<Option<OAuthTokens>>,
}

impl CredentialProvider {
    /// Create a provider; nothing is read until the first token request.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        endpoints: Endpoints,
        app: OAuthApp,
        fixed: Option<OAuthTokens>,
        token_path: Option<PathBuf>,
    ) -> Self {
        Self {
            http,
            endpoints,
            app,
            fixed,
            token_path,
            cache: Mutex::new(None),
        }
    }

    /// Return an access token valid for at least the refresh buffer.
    ///
    /// # Errors
    /// Fails with [`AuthError`] when no token is stored or a needed refresh fails.
    #[tracing::instrument(skip_all)]
    pub async fn get_valid_access_token(&self) -> Result<String, AuthError> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = self.load_initial()?;
        }
        let Some(tokens) = cache.as_ref() else {
            return Err(AuthError::MissingToken);
        };
        if !tokens.expires_soon(now_unix()) {
            return Ok(tokens.access_token.clone());
        }

        info!("access token expires soon, refreshing");
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or(AuthError::RefreshUnavailable)?;
        let refreshed = self.refresh(refresh_token).await?;
        self.persist(&refreshed);
        let access_token = refreshed.access_token.clone();
        *cache = Some(refreshed);
        Ok(access_token)
    }

    /// Drop the cached token after the provider rejected it.
    pub async fn invalidate(&self) {
        debug!("dropping cached access token");
        *self.cache.lock().await = None;
    }

    /// Build the URL the user opens to grant access.
    ///
    /// # Errors
    /// Fails when the client id is not configured.
    pub fn authorize_url(&self, state: &str) -> Result<Url, ClientError> {
        let client_id = self
            .app
            .client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(AuthError::MissingClientCredentials)?;
        let mut url = self.endpoints.oauth(&["authorize"])?;
        url.query_pairs_mut()
            .append_pair("scope", SCOPE)
            .append_pair("client_id", client_id)
            .append_pair("state", state)
            .append_pair("redirect_uri", &self.app.redirect_uri)
            .append_pair("response_type", "code");
        Ok(url)
    }

    /// Exchange an authorization code, store the tokens and cache them.
    ///
    /// # Errors
    /// Fails when the token endpoint rejects the code or the tokens cannot be saved.
    #[tracing::instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthTokens, AuthError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.app.redirect_uri.as_str()),
            ("scope", SCOPE),
        ];
        let tokens = self.token_request(&form, None).await?;
        if let Some(path) = &self.token_path {
            save_tokens(path, &tokens)?;
            info!(path = %path.display(), "stored access token");
        }
        *self.cache.lock().await = Some(tokens.clone());
        Ok(tokens)
    }

    fn load_initial(&self) -> Result<Option<OAuthTokens>, AuthError> {
        if let Some(fixed) = &self.fixed {
            return Ok(Some(fixed.clone()));
        }
        match &self.token_path {
            Some(path) => {
                let tokens = load_tokens(path)?;
                debug!(path = %path.display(), found = tokens.is_some(), "loaded token file");
                Ok(tokens)
            }
            None => Ok(None),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<OAuthTokens, AuthError> {
        let form = [("grant_type", "refresh_token"), ("refresh_token", refresh_token)];
        let tokens = self.token_request(&form, Some(refresh_token)).await?;
        info!("access token refreshed");
        Ok(tokens)
    }

    async fn token_request(
        &self,
        form: &[(&str, &str)],
        previous_refresh: Option<&str>,
    ) -> Result<OAuthTokens, AuthError> {
        let (client_id, client_secret) = self.app.credentials()?;
        let url = self
            .endpoints
            .oauth(&["token"])
            .map_err(|err| AuthError::OAuth {
                status: 0,
                message: err.to_string(),
            })?;
        let response = self
            .http
            .post(url)
            .basic_auth(client_id, Some(client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_body(response).await;
            return Err(AuthError::OAuth {
                status: status.as_u16(),
                message,
            });
        }
        let body: TokenResponse = response.json().await?;
        Ok(body.into_tokens(previous_refresh, now_unix()))
    }

    fn persist(&self, tokens: &OAuthTokens) {
        if self.fixed.is_some() {
            return;
        }
        if let Some(path) = &self.token_path
            && let Err(err) = save_tokens(path, tokens)
        {
            warn!("failed to persist refreshed token: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_uses_a_five_minute_buffer() {
        let tokens = OAuthTokens {
            access_token: "a".into(),
            refresh_token: None,
            expires_at: Some(1_000),
        };
        assert!(!tokens.expires_soon(699));
        assert!(tokens.expires_soon(700));
        assert!(!OAuthTokens::fixed("a".into(), None).expires_soon(i64::MAX - 1_000));
    }

    #[test]
    fn refresh_keeps_previous_refresh_token() {
        let response = TokenResponse {
            access_token: "new".into(),
            refresh_token: None,
            expires_in: Some(3_600),
        };
        let tokens = response.into_tokens(Some("old-refresh"), 100);
        assert_eq!(tokens.refresh_token.as_deref(), Some("old-refresh"));
        assert_eq!(tokens.expires_at, Some(3_700));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let tokens = OAuthTokens::fixed("secret-access".into(), Some("secret-refresh".into()));
        let rendered = format!("{tokens:?}");
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn callback_accepts_urls_and_bare_codes() {
        let code = parse_callback("http://localhost:8000/callback?code=xyz&state=s1", "s1")
            .unwrap_or_else(|err| panic!("callback: {err}"));
        assert_eq!(code, "xyz");
        assert!(matches!(
            parse_callback("http://localhost:8000/callback?code=xyz&state=other", "s1"),
            Err(AuthError::StateMismatch)
        ));
        assert_eq!(
            parse_callback(" raw-code ", "s1").unwrap_or_else(|err| panic!("bare: {err}")),
            "raw-code"
        );
        assert!(matches!(parse_callback("", "s1"), Err(AuthError::MissingCode)));
    }

    #[test]
    fn token_files_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let path = dir.path().join("nested").join("tokens.json");
        assert!(load_tokens(&path).unwrap_or_else(|err| panic!("load: {err}")).is_none());

        let tokens = OAuthTokens {
            access_token: "a".into(),
            refresh_token: Some("r".into()),
            expires_at: Some(42),
        };
        save_tokens(&path, &tokens).unwrap_or_else(|err| panic!("save: {err}"));
        assert_eq!(
            load_tokens(&path).unwrap_or_else(|err| panic!("load: {err}")),
            Some(tokens)
        );
    }
}
