//! The credential manager: load stored credentials or run the first-run flow.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::authorized::AuthorizedClient;
use crate::credentials::ClientCredentials;
use crate::error::{AuthStep, CredentialError, CredentialResult};
use crate::oauth::{normalize_code, OAuthClient, OAuthEndpoints, PkceFlow};
use crate::prompt::CodePrompt;
use crate::tokens::{TokenLoad, TokenStore};

/// Default timeout for token endpoint requests.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time an operator has to paste the authorization code.
const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(300);

/// States of one `load_or_authorize` invocation.
///
/// ```text
/// Start → CredentialsLoaded → TokenLoaded ─────────────────────────────────┐
///                           └→ AwaitingCode → TokenExchanged → TokenPersisted → Ready
/// ```
///
/// Any step may end in `Failed`. No state is entered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Start,
    CredentialsLoaded,
    TokenLoaded,
    AwaitingCode,
    TokenExchanged,
    TokenPersisted,
    Ready,
    Failed(AuthStep),
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::CredentialsLoaded => write!(f, "credentials loaded"),
            Self::TokenLoaded => write!(f, "token loaded"),
            Self::AwaitingCode => write!(f, "awaiting code"),
            Self::TokenExchanged => write!(f, "token exchanged"),
            Self::TokenPersisted => write!(f, "token persisted"),
            Self::Ready => write!(f, "ready"),
            Self::Failed(step) => write!(f, "failed during {}", step),
        }
    }
}

/// Produces an [`AuthorizedClient`] from a credentials file and a token file.
#[derive(Debug)]
pub struct CredentialManager {
    credentials_path: PathBuf,
    token_path: PathBuf,
    scopes: Vec<String>,
    endpoints: OAuthEndpoints,
    http_timeout: Duration,
    prompt_timeout: Option<Duration>,
    reauthorize: bool,
    history: Vec<AuthState>,
}

impl CredentialManager {
    /// Creates a manager for the given files and scopes.
    pub fn new(
        credentials_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            token_path: token_path.into(),
            scopes,
            endpoints: OAuthEndpoints::google(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            prompt_timeout: Some(DEFAULT_PROMPT_TIMEOUT),
            reauthorize: false,
            history: vec![AuthState::Start],
        }
    }

    /// Sets the OAuth endpoints (tests point these at a local server).
    pub fn with_endpoints(mut self, endpoints: OAuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Sets the timeout for token endpoint requests.
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Sets how long to wait for the operator. `None` waits forever.
    pub fn with_prompt_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.prompt_timeout = timeout;
        self
    }

    /// Ignores a stored token and always runs the interactive flow.
    ///
    /// The stored file is only replaced once the new code has been exchanged.
    pub fn with_reauthorize(mut self, reauthorize: bool) -> Self {
        self.reauthorize = reauthorize;
        self
    }

    /// Returns the current state.
    pub fn state(&self) -> AuthState {
        self.history.last().copied().unwrap_or(AuthState::Start)
    }

    /// Returns every state entered so far, in order.
    pub fn history(&self) -> &[AuthState] {
        &self.history
    }

    /// Returns the token file path.
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Returns the requested scopes.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Loads stored credentials, or authorizes interactively if there are none.
    ///
    /// Any failure aborts the invocation; nothing is retried. A stored token
    /// file is only ever replaced after a successful code exchange. Each call
    /// starts a fresh history.
    pub async fn load_or_authorize<P>(&mut self, prompt: &mut P) -> CredentialResult<AuthorizedClient>
    where
        P: CodePrompt + ?Sized,
    {
        self.history = vec![AuthState::Start];
        match self.run(prompt).await {
            Ok(client) => Ok(client),
            Err(e) => {
                warn!("authorization failed: {}", e);
                self.enter(AuthState::Failed(e.step()));
                Err(e)
            }
        }
    }

    async fn run<P>(&mut self, prompt: &mut P) -> CredentialResult<AuthorizedClient>
    where
        P: CodePrompt + ?Sized,
    {
        if self.scopes.is_empty() {
            return Err(CredentialError::config("at least one OAuth scope is required"));
        }

        let credentials = ClientCredentials::from_file(&self.credentials_path)?;
        self.enter(AuthState::CredentialsLoaded);

        let oauth = OAuthClient::new(credentials, self.endpoints.clone(), self.http_timeout)?;
        let store = TokenStore::new(&self.token_path);

        match store.load()? {
            TokenLoad::Loaded(_) if self.reauthorize => {
                info!(
                    "re-authorizing; {} is kept until a new token is issued",
                    self.token_path.display()
                );
            }
            TokenLoad::Loaded(record) => {
                self.enter(AuthState::TokenLoaded);
                if !record.has_scopes(&self.scopes) {
                    warn!(
                        "stored token does not cover all requested scopes; \
                         delete {} or run `classcord auth --force` to re-authorize",
                        self.token_path.display()
                    );
                }
                self.enter(AuthState::Ready);
                return Ok(AuthorizedClient::new(record, oauth, store));
            }
            TokenLoad::Missing => {
                info!("no stored token, starting authorization");
            }
            TokenLoad::Invalid(reason) => {
                warn!(
                    "ignoring invalid token file {}: {}",
                    self.token_path.display(),
                    reason
                );
            }
        }

        let pkce = PkceFlow::new();
        let url = oauth.authorization_url(&self.scopes, &pkce);
        self.enter(AuthState::AwaitingCode);

        prompt.present(&url).map_err(|e| {
            CredentialError::authorization(format!("failed to show authorization URL: {}", e))
                .with_source(e)
        })?;
        let code = wait_for_code(prompt, self.prompt_timeout).await?;

        let record = oauth.exchange_code(&code, &pkce.verifier, &self.scopes).await?;
        self.enter(AuthState::TokenExchanged);

        store.save(&record)?;
        self.enter(AuthState::TokenPersisted);

        self.enter(AuthState::Ready);
        Ok(AuthorizedClient::new(record, oauth, store))
    }

    fn enter(&mut self, state: AuthState) {
        debug!("credential manager: {} -> {}", self.state(), state);
        self.history.push(state);
    }
}

/// Reads one code from the operator, bounded by `timeout`.
async fn wait_for_code<P>(prompt: &mut P, timeout: Option<Duration>) -> CredentialResult<String>
where
    P: CodePrompt + ?Sized,
{
    let read = match timeout {
        Some(limit) => tokio::time::timeout(limit, prompt.read_code())
            .await
            .map_err(|_| {
                CredentialError::authorization(format!(
                    "timed out after {}s waiting for the authorization code",
                    limit.as_secs()
                ))
            })?,
        None => prompt.read_code().await,
    };

    let line = read
        .map_err(|e| {
            CredentialError::authorization(format!("failed to read authorization code: {}", e))
                .with_source(e)
        })?
        .ok_or_else(|| {
            CredentialError::authorization("input closed before an authorization code was entered")
        })?;

    normalize_code(&line)
        .ok_or_else(|| CredentialError::authorization("no authorization code was entered"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manager_starts_at_start() {
        let manager = CredentialManager::new("c.json", "t.json", vec!["s".to_string()]);
        assert_eq!(manager.state(), AuthState::Start);
        assert_eq!(manager.history(), &[AuthState::Start]);
    }

    #[test]
    fn state_display() {
        assert_eq!(AuthState::AwaitingCode.to_string(), "awaiting code");
        assert_eq!(
            AuthState::Failed(AuthStep::TokenExchange).to_string(),
            "failed during token exchange"
        );
    }
}
