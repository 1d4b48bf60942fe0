//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod courses;
pub mod forward;

use classcord_auth::{AuthorizedClient, ConsolePrompt};
use classcord_classroom::ClassroomClient;

use crate::config::{ClientConfig, GoogleSettings};
use crate::error::ClientResult;

/// Runs the credential lifecycle with a console prompt.
pub async fn authorize(google: &GoogleSettings) -> ClientResult<AuthorizedClient> {
    let mut manager = google.credential_manager();
    let mut prompt = ConsolePrompt::new().with_open_browser(google.open_browser);
    Ok(manager.load_or_authorize(&mut prompt).await?)
}

/// Authorizes and builds a Classroom client from the configuration.
pub async fn classroom_client(config: &ClientConfig) -> ClientResult<ClassroomClient> {
    let auth = authorize(&config.google).await?;
    Ok(ClassroomClient::new(auth, config.classroom.to_client_config())?)
}
