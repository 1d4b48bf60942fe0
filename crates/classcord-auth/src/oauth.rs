//! OAuth 2.0 authorization code flow for Google APIs.
//!
//! The operator opens the authorization URL, grants access and pastes the
//! code Google shows them back into the terminal. A PKCE challenge binds the
//! code to this process, so a leaked code is useless on its own.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::credentials::ClientCredentials;
use crate::error::{CredentialError, CredentialResult};
use crate::tokens::TokenRecord;

/// Google OAuth endpoints.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// The PKCE code verifier length (in bytes, before base64 encoding).
const CODE_VERIFIER_LENGTH: usize = 32;

/// Authorization and token endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    /// Where the operator grants consent.
    pub auth_url: String,
    /// Where codes and refresh tokens are exchanged.
    pub token_url: String,
}

impl OAuthEndpoints {
    /// Creates endpoints with custom URLs.
    pub fn new(auth_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            token_url: token_url.into(),
        }
    }

    /// Google's production endpoints.
    pub fn google() -> Self {
        Self::new(GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL)
    }
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self::google()
    }
}

/// OAuth client bound to one set of client credentials.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    credentials: ClientCredentials,
    endpoints: OAuthEndpoints,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a new OAuth client.
    pub fn new(
        credentials: ClientCredentials,
        endpoints: OAuthEndpoints,
        timeout: Duration,
    ) -> CredentialResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("classcord/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                CredentialError::config(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            credentials,
            endpoints,
            http_client,
        })
    }

    /// Returns the client credentials.
    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Builds the URL the operator must visit to grant access.
    pub fn authorization_url(&self, scopes: &[String], pkce: &PkceFlow) -> String {
        let scope = scopes.join(" ");

        format!(
            "{}?access_type=offline&scope={}&response_type=code&client_id={}&\
            redirect_uri={}&code_challenge={}&code_challenge_method=S256&prompt=consent",
            self.endpoints.auth_url,
            urlencoding::encode(&scope),
            urlencoding::encode(&self.credentials.client_id),
            urlencoding::encode(&self.credentials.redirect_uri),
            urlencoding::encode(&pkce.challenge),
        )
    }

    /// Exchanges a one-time authorization code for a token record.
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        scopes: &[String],
    ) -> CredentialResult<TokenRecord> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
        ];

        debug!("exchanging authorization code at {}", self.endpoints.token_url);
        let response = self
            .post_token_request(&params)
            .await
            .map_err(CredentialError::token_exchange)?;

        let refresh_token = response.refresh_token.clone().ok_or_else(|| {
            CredentialError::token_exchange("token response did not include a refresh_token")
        })?;

        let record = response
            .into_record(refresh_token, scopes)
            .map_err(CredentialError::token_exchange)?;

        info!("obtained tokens from authorization code");
        Ok(record)
    }

    /// Obtains a new access token from the record's refresh token.
    ///
    /// Google usually omits the refresh token from a refresh response; the
    /// existing one is kept in that case.
    pub async fn refresh(&self, current: &TokenRecord) -> CredentialResult<TokenRecord> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", current.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .post_token_request(&params)
            .await
            .map_err(CredentialError::refresh)?;

        let refresh_token = response
            .refresh_token
            .clone()
            .unwrap_or_else(|| current.refresh_token.clone());
        let scopes: Vec<String> = current.scopes().map(String::from).collect();

        let record = response
            .into_record(refresh_token, &scopes)
            .map_err(CredentialError::refresh)?;

        info!("refreshed access token");
        Ok(record)
    }

    /// Posts a form to the token endpoint and decodes the success body.
    ///
    /// Errors are returned as messages so each caller can attach its own step.
    async fn post_token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, String> {
        let response = self
            .http_client
            .post(&self.endpoints.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| format!("token request failed: {}", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read token response: {}", e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| e.describe())
                .unwrap_or(body);
            return Err(format!("token endpoint rejected the request ({}): {}", status, detail));
        }

        serde_json::from_str(&body).map_err(|e| format!("invalid token response: {}", e))
    }
}

/// Normalizes what the operator pasted into a bare authorization code.
///
/// Accepts the code itself, a percent-encoded code, or the full redirect URL
/// with a `code` query parameter.
pub fn normalize_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(url) = url::Url::parse(input)
        && url.has_host()
    {
        return url
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .filter(|c| !c.is_empty());
    }

    if input.contains('%')
        && let Ok(decoded) = urlencoding::decode(input)
    {
        return Some(decoded.into_owned());
    }

    Some(input.to_string())
}

/// PKCE verifier and challenge (RFC 7636).
#[derive(Debug)]
pub struct PkceFlow {
    /// The code verifier (high-entropy random string).
    pub verifier: String,
    /// The code challenge (SHA-256 of the verifier, base64url encoded).
    pub challenge: String,
}

impl PkceFlow {
    /// Creates a flow with a fresh random verifier.
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let bytes: Vec<u8> = (0..CODE_VERIFIER_LENGTH).map(|_| rng.random()).collect();
        Self::from_verifier(URL_SAFE_NO_PAD.encode(&bytes))
    }

    /// Creates a flow from a known verifier.
    pub fn from_verifier(verifier: impl Into<String>) -> Self {
        let verifier = verifier.into();
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Success response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_record(
        self,
        refresh_token: String,
        requested_scopes: &[String],
    ) -> Result<TokenRecord, String> {
        let expires_in = self
            .expires_in
            .ok_or_else(|| "token response did not include expires_in".to_string())?;

        let record = TokenRecord::new(
            self.access_token,
            refresh_token,
            expires_in,
            self.scope.unwrap_or_else(|| requested_scopes.join(" ")),
            self.token_type.unwrap_or_else(|| "Bearer".to_string()),
        );
        record.validate()?;
        Ok(record)
    }
}

/// Error response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenErrorResponse {
    fn describe(&self) -> String {
        match self.error_description {
            Some(ref desc) => format!("{}: {}", self.error, desc),
            None => self.error.clone(),
        }
    }
}
