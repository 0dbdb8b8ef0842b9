//! Authentication command handlers for OAuth flow.
//!
//! This module implements the CLI commands for:
//! - `expenses auth` - Initial OAuth consent flow
//! - `expenses auth --verify` - Verify and refresh authentication

use crate::api::TokenProvider;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::{anyhow, Context};

/// Handles the `expenses auth` command - runs the OAuth consent flow
///
/// This is the ONLY command that asks the user for OAuth consent.
///
/// This guides the user through setting up Google Sheets authentication:
/// 1. Loads client_secret.json from the secrets directory
/// 2. Prints the consent URL and waits for the browser to redirect back
/// 3. Saves tokens to token.json with required scopes
///
/// # Errors
/// Returns an error if the store is not a Google Sheet, if the OAuth flow fails or if
/// client_secret.json is missing
pub async fn auth(config: &Config) -> Result<Out<()>> {
    require_google(config)?;
    TokenProvider::initialize(&config.client_secret_path(), &config.token_path())
        .await
        .pub_result(ErrorType::Auth)?;
    Ok("Authorization complete".into())
}

/// Handles the `expenses auth --verify` command - verifies authentication
///
/// This command NEVER starts an interactive OAuth flow. It only verifies that the existing
/// tokens are usable by refreshing the access token.
///
/// If the token is missing, invalid, or has the wrong scopes, this command will fail with an error
/// message telling the user to run `expenses auth`.
pub async fn auth_verify(config: &Config) -> Result<Out<()>> {
    require_google(config)?;
    let mut token_provider =
        TokenProvider::load(&config.client_secret_path(), &config.token_path())
            .await
            .context(
                "Unable to use the existing tokens found in the token JSON file. \n\n\
                You should run 'expenses auth' (without the --verify flag).",
            )
            .pub_result(ErrorType::Auth)?;
    token_provider
        .refresh()
        .await
        .context("Unable to refresh the token")
        .pub_result(ErrorType::Auth)?;
    Ok("Your OAuth token is valid!".into())
}

fn require_google(config: &Config) -> Result<()> {
    if config.is_google() {
        return Ok(());
    }
    Err(anyhow!(
        "This home directory stores transactions in CSV files, which need no authorization"
    ))
    .pub_result(ErrorType::Auth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_auth_needs_google_store() {
        let env = TestEnv::new().await;
        let e = auth_verify(&env.config()).await.unwrap_err();
        assert!(format!("{e:#}").contains("CSV files"));
    }
}
