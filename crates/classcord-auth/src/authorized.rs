//! The authorized client handle handed to API callers.

use std::fmt;

use tracing::debug;

use crate::credentials::ClientCredentials;
use crate::error::CredentialResult;
use crate::oauth::OAuthClient;
use crate::tokens::{TokenRecord, TokenStore};

/// A handle that can authenticate requests on behalf of the token owner.
///
/// Holds the current [`TokenRecord`]. When the access token expires,
/// [`access_token`](Self::access_token) refreshes it and writes the new
/// record back to the token file.
pub struct AuthorizedClient {
    token: TokenRecord,
    oauth: OAuthClient,
    store: TokenStore,
}

impl AuthorizedClient {
    /// Wraps an existing token record.
    pub fn new(token: TokenRecord, oauth: OAuthClient, store: TokenStore) -> Self {
        Self {
            token,
            oauth,
            store,
        }
    }

    /// Returns the current token record.
    pub fn token(&self) -> &TokenRecord {
        &self.token
    }

    /// Returns the client credentials this handle was authorized with.
    pub fn credentials(&self) -> &ClientCredentials {
        self.oauth.credentials()
    }

    /// Returns true if the access token needs a refresh before use.
    pub fn is_expired(&self) -> bool {
        self.token.is_expired()
    }

    /// Returns a bearer token, refreshing it first if it has expired.
    pub async fn access_token(&mut self) -> CredentialResult<String> {
        if self.token.is_expired() {
            debug!("access token expired at {}, refreshing", self.token.expiry);
            self.refresh().await?;
        }
        Ok(self.token.access_token.clone())
    }

    /// Refreshes the access token unconditionally and persists the result.
    ///
    /// The in-memory record is replaced only after the new one is on disk.
    pub async fn refresh(&mut self) -> CredentialResult<()> {
        let refreshed = self.oauth.refresh(&self.token).await?;
        self.store.save(&refreshed)?;
        self.token = refreshed;
        Ok(())
    }
}

impl fmt::Debug for AuthorizedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedClient")
            .field("token", &self.token)
            .field("store", &self.store.path())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::oauth::OAuthEndpoints;
    use crate::tokens::TokenLoad;

    fn oauth(token_url: &str) -> OAuthClient {
        OAuthClient::new(
            ClientCredentials::new("c1", "s1", "urn:ietf:wg:oauth:2.0:oob"),
            OAuthEndpoints::new("https://accounts.example.com/auth", token_url),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn fresh_token_is_returned_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let token = TokenRecord::new("a1", "r1", 3600, "s", "Bearer");

        // Port 9 (discard) is never contacted for a fresh token.
        let mut client = AuthorizedClient::new(token, oauth("http://127.0.0.1:9/token"), store);
        assert_eq!(client.access_token().await.unwrap(), "a1");
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_persisted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"a2","expires_in":3599,"scope":"s","token_type":"Bearer"}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let expired = TokenRecord::new("a1", "r1", -60, "s", "Bearer");
        let mut client = AuthorizedClient::new(
            expired,
            oauth(&format!("{}/token", server.url())),
            store.clone(),
        );

        assert_eq!(client.access_token().await.unwrap(), "a2");
        // A second call uses the refreshed token.
        assert_eq!(client.access_token().await.unwrap(), "a2");
        mock.assert_async().await;

        match store.load().unwrap() {
            TokenLoad::Loaded(saved) => assert_eq!(&saved, client.token()),
            other => panic!("expected saved token, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_refresh_keeps_old_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let expired = TokenRecord::new("a1", "r1", -60, "s", "Bearer");
        let mut client = AuthorizedClient::new(
            expired.clone(),
            oauth(&format!("{}/token", server.url())),
            store.clone(),
        );

        let err = client.access_token().await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(client.token(), &expired);
        assert!(matches!(store.load().unwrap(), TokenLoad::Missing));
    }
}
