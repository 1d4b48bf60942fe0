//! OAuth 2.0 credential and token lifecycle for Google APIs.
//!
//! The entry point is [`CredentialManager::load_or_authorize`]:
//!
//! 1. Client credentials are read from a Google Cloud Console JSON file
//! 2. A previously stored token is reused if the token file holds a complete record
//! 3. Otherwise the operator is shown an authorization URL and asked for the code
//! 4. The code is exchanged for an access/refresh token pair
//! 5. The new token is written to the token file (full overwrite)
//!
//! The result is an [`AuthorizedClient`], which hands out bearer tokens and
//! refreshes them when they expire.
//!
//! # Example
//!
//! ```ignore
//! use classcord_auth::{ConsolePrompt, CredentialManager};
//!
//! let mut manager = CredentialManager::new(
//!     "credentials.json",
//!     "token.json",
//!     vec!["https://www.googleapis.com/auth/classroom.courses.readonly".into()],
//! );
//! let mut client = manager.load_or_authorize(&mut ConsolePrompt::new()).await?;
//! let bearer = client.access_token().await?;
//! ```

mod authorized;
mod credentials;
pub mod error;
mod manager;
mod oauth;
mod prompt;
mod tokens;

pub use authorized::AuthorizedClient;
pub use credentials::ClientCredentials;
pub use error::{AuthStep, CredentialError, CredentialErrorCode, CredentialResult};
pub use manager::{AuthState, CredentialManager};
pub use oauth::{normalize_code, OAuthClient, OAuthEndpoints, PkceFlow};
pub use prompt::{CodePrompt, ConsolePrompt};
pub use tokens::{TokenLoad, TokenRecord, TokenStore};
