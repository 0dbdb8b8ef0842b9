//! Google OAuth 2.0 for the Sheets API.
//!
//! `TokenProvider::initialize` runs the consent flow: it prints the Google consent URL, receives
//! the authorization code on a loopback callback server and saves the tokens to `token.json`.
//! `TokenProvider::load` uses the saved tokens and refreshes the access token when it expires. It
//! never opens a consent flow.

use crate::api::files::{File, SecretFile, TokenFile};
use crate::api::OAUTH_SCOPES;
use crate::Result;
use anyhow::{anyhow, bail, ensure, Context};
use chrono::{DateTime, Utc};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type OauthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Access tokens without an expiry are treated as lasting this long.
const DEFAULT_EXPIRY: Duration = Duration::from_secs(3600);

/// Provides a valid access token for the Sheets API, refreshing it when needed.
#[derive(Debug, Clone)]
pub(crate) struct TokenProvider {
    secret: SecretFile,
    token: File<TokenFile>,
    http: reqwest::Client,
}

impl TokenProvider {
    /// Runs the OAuth consent flow and saves the resulting tokens to `token_path`.
    pub(crate) async fn initialize(client_secret_path: &Path, token_path: &Path) -> Result<Self> {
        let secret = SecretFile::load(client_secret_path).await?;
        let http = http_client()?;

        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .context("Unable to start the local OAuth callback server")?;
        let port = listener
            .local_addr()
            .context("Unable to get the OAuth callback server address")?
            .port();
        let redirect = format!("{}:{port}", secret.redirect_base());
        let client = oauth_client(&secret, Some(&redirect))?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(OAUTH_SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        info!("Open this URL in your browser to authorize access to your sheet:\n\n{auth_url}\n");
        info!("Waiting for the authorization callback on {redirect}");

        let code = receive_code(listener, csrf_state.secret()).await?;
        debug!("Received authorization code, exchanging it for tokens");

        let response = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http)
            .await
            .map_err(|e| anyhow!("{e}"))
            .context("Unable to exchange the authorization code for tokens")?;

        let refresh_token = response
            .refresh_token()
            .map(|t| t.secret().clone())
            .context("Google did not return a refresh token")?;
        let scopes = match response.scopes() {
            Some(scopes) => scopes.iter().map(|s| s.to_string()).collect(),
            None => OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
        };
        let token = TokenFile::new(
            scopes,
            response.access_token().secret().clone(),
            refresh_token,
            expires_at(response.expires_in()),
        );
        token.validate_scopes()?;

        let token = File::new(token_path, token);
        token.save().await?;
        info!("Authorization successful, tokens saved to {}", token_path.display());

        Ok(Self {
            secret,
            token,
            http,
        })
    }

    /// Loads the saved tokens. Fails if they are missing or lack the required scopes.
    pub(crate) async fn load(client_secret_path: &Path, token_path: &Path) -> Result<Self> {
        let secret = SecretFile::load(client_secret_path).await?;
        let token: File<TokenFile> = File::load(token_path)
            .await
            .context("Unable to load the OAuth token, run 'expenses auth' first")?;
        token.data().validate_scopes()?;
        Ok(Self {
            secret,
            token,
            http: http_client()?,
        })
    }

    /// The current access token, which may be expired.
    pub(crate) fn token(&self) -> &str {
        self.token.data().access_token()
    }

    /// Returns an access token, refreshing it first if it has expired.
    pub(crate) async fn token_with_refresh(&mut self) -> Result<&str> {
        if self.token.data().is_expired() {
            self.refresh().await?;
        }
        Ok(self.token())
    }

    /// Exchanges the refresh token for a new access token and saves it.
    pub(crate) async fn refresh(&mut self) -> Result<()> {
        debug!("Refreshing the OAuth access token");
        let client = oauth_client(&self.secret, None)?;
        let refresh_token = RefreshToken::new(self.token.data().refresh_token().to_string());
        let response = client
            .exchange_refresh_token(&refresh_token)
            .request_async(&self.http)
            .await
            .map_err(|e| anyhow!("{e}"))
            .context("Unable to refresh the OAuth access token, try running 'expenses auth'")?;

        self.token.data_mut().update(
            response.access_token().secret().clone(),
            expires_at(response.expires_in()),
            response.refresh_token().map(|t| t.secret().clone()),
        );
        self.token.save().await?;
        debug!("Access token valid until {}", self.token.data().expires_at());
        Ok(())
    }
}

fn oauth_client(secret: &SecretFile, redirect: Option<&str>) -> Result<OauthClient> {
    let client = BasicClient::new(ClientId::new(secret.client_id().to_string()))
        .set_client_secret(ClientSecret::new(secret.client_secret().to_string()))
        .set_auth_uri(AuthUrl::new(secret.auth_uri().to_string()).context("Invalid auth_uri")?)
        .set_token_uri(
            TokenUrl::new(secret.token_uri().to_string()).context("Invalid token_uri")?,
        );
    Ok(match redirect {
        Some(redirect) => client.set_redirect_uri(
            RedirectUrl::new(redirect.to_string()).context("Invalid redirect URI")?,
        ),
        None => client,
    })
}

/// The OAuth token endpoint must not be followed through redirects.
fn http_client() -> Result<reqwest::Client> {
    reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Unable to build the HTTP client")
}

fn expires_at(expires_in: Option<Duration>) -> DateTime<Utc> {
    let expires_in = expires_in.unwrap_or(DEFAULT_EXPIRY);
    Utc::now() + chrono::Duration::from_std(expires_in).unwrap_or(chrono::Duration::hours(1))
}

/// Serves connections on `listener` until one of them carries the OAuth redirect, then returns
/// the authorization code. Other requests, such as a browser asking for `/favicon.ico`, are
/// answered and ignored.
async fn receive_code(listener: TcpListener, expected_state: &str) -> Result<String> {
    loop {
        let (stream, _) = listener
            .accept()
            .await
            .context("OAuth callback server failed to accept a connection")?;

        let (tx, mut rx) = mpsc::unbounded_channel::<HashMap<String, String>>();
        let service = service_fn(move |req: Request<Incoming>| {
            let tx = tx.clone();
            async move {
                let params = query_params(req.uri().query());
                let body = if params.contains_key("code") {
                    "Authorization received. You can close this window and return to the terminal."
                } else if params.contains_key("error") {
                    "Authorization failed. Return to the terminal for details."
                } else {
                    "Waiting for authorization."
                };
                let _ = tx.send(params);
                Ok::<_, Infallible>(Response::new(body.to_string()))
            }
        });

        if let Err(e) = http1::Builder::new()
            .keep_alive(false)
            .serve_connection(TokioIo::new(stream), service)
            .await
        {
            warn!("OAuth callback connection error: {e}");
        }

        while let Ok(params) = rx.try_recv() {
            if let Some(error) = params.get("error") {
                bail!("Authorization was not granted: {error}");
            }
            if let Some(code) = params.get("code") {
                let state = params.get("state").map(String::as_str).unwrap_or_default();
                ensure!(
                    state == expected_state,
                    "The OAuth callback state did not match, refusing the authorization code"
                );
                return Ok(code.clone());
            }
        }
    }
}

fn query_params(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
