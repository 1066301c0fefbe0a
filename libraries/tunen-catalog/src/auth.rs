//! Authorization against the catalog's accounts service.
//!
//! Two flows are supported:
//! - **Implicit grant**: open [`AuthorizeRequest::url`] in a browser and pull
//!   the token out of the redirect with [`capture_access_token`].
//! - **Authorization code**: exchange the `code` from the redirect at the
//!   token endpoint ([`TokenEndpoint::exchange_code`]), which also yields a
//!   refresh token usable by [`TokenEndpoint`] as a `CredentialRefresher`.

use crate::client::{read_json, send_error};
use crate::error::{CatalogError, Result};
use crate::types::{TokenResponse, DEFAULT_ACCOUNTS_BASE};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use tracing::{debug, info};
use tunen_core::{Credential, CredentialRefresher};
use url::{form_urlencoded, Url};

/// Scopes needed to read the profile and manage playlists.
pub const DEFAULT_SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "playlist-read-private",
    "playlist-modify-public",
    "playlist-modify-private",
];

/// Grant type requested from the authorize endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Token returned in the redirect fragment
    Token,
    /// Code returned in the redirect query, exchanged server-side
    Code,
}

impl ResponseType {
    fn as_str(self) -> &'static str {
        match self {
            ResponseType::Token => "token",
            ResponseType::Code => "code",
        }
    }
}

/// Parameters of the browser authorization request.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub response_type: ResponseType,
}

impl AuthorizeRequest {
    /// Implicit-grant request with the default scopes.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect(),
            response_type: ResponseType::Token,
        }
    }

    /// Switch to the authorization-code flow.
    #[must_use]
    pub fn with_code_flow(mut self) -> Self {
        self.response_type = ResponseType::Code;
        self
    }

    /// URL to open in the browser, against the default accounts service.
    pub fn url(&self) -> Result<Url> {
        self.url_for(DEFAULT_ACCOUNTS_BASE)
    }

    /// URL to open in the browser, against `accounts_base`.
    pub fn url_for(&self, accounts_base: &str) -> Result<Url> {
        let base = format!("{}/authorize", accounts_base.trim_end_matches('/'));
        let scope = self.scopes.join(" ");
        Url::parse_with_params(
            &base,
            &[
                ("response_type", self.response_type.as_str()),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|e| CatalogError::InvalidUrl(e.to_string()))
    }
}

/// Extract the access token from a redirect URL.
///
/// Only URLs starting with `redirect_uri` are considered. The token is the
/// first `access_token` parameter of the fragment or, failing that, the query.
pub fn capture_access_token(redirect_uri: &str, url: &str) -> Option<String> {
    if !url.starts_with(redirect_uri) {
        return None;
    }
    param_value(url, "access_token")
}

/// Extract a full credential (token plus expiry when present) from a redirect URL.
pub fn capture_credential(redirect_uri: &str, url: &str) -> Option<Credential> {
    let access_token = capture_access_token(redirect_uri, url)?;
    let expires_at = param_value(url, "expires_in")
        .and_then(|v| v.parse::<u64>().ok())
        .map(|secs| Utc::now() + Duration::seconds(secs.min(MAX_EXPIRES_IN_SECS) as i64));

    Some(Credential {
        access_token,
        refresh_token: None,
        expires_at,
    })
}

/// Extract the authorization code from a code-flow redirect URL.
pub fn capture_code(redirect_uri: &str, url: &str) -> Option<String> {
    if !url.starts_with(redirect_uri) {
        return None;
    }
    param_value(url, "code")
}

/// Decoded, non-empty value of `name` in the fragment, then the query.
fn param_value(url: &str, name: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let value = [url.fragment(), url.query()]
        .into_iter()
        .flatten()
        .find_map(|params| {
            form_urlencoded::parse(params.as_bytes())
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        })
        .filter(|value| !value.is_empty());
    value
}

/// Accounts token endpoint, for code exchange and refresh.
#[derive(Clone)]
pub struct TokenEndpoint {
    http: Client,
    accounts_base: String,
    client_id: String,
    client_secret: Option<String>,
}

impl TokenEndpoint {
    pub fn new(
        http: Client,
        accounts_base: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            http,
            accounts_base: accounts_base.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret,
        }
    }

    /// Exchange an authorization code for a credential.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Credential> {
        debug!("Exchanging authorization code");
        let token = self
            .request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .await?;

        info!("Authorization code exchanged");
        Ok(to_credential(token, None))
    }

    /// Exchange a refresh token for a new credential.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Credential> {
        debug!("Refreshing access token");
        let token = self
            .request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        debug!("Token refresh successful");
        // The endpoint may omit the refresh token, in which case the old one stays valid
        Ok(to_credential(token, Some(refresh_token)))
    }

    async fn request(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let url = format!("{}/api/token", self.accounts_base);

        let mut form: Vec<(&str, &str)> = params.to_vec();
        let mut request = self.http.post(&url);
        match &self.client_secret {
            Some(secret) => request = request.basic_auth(&self.client_id, Some(secret)),
            None => form.push(("client_id", self.client_id.as_str())),
        }

        let response = request.form(&form).send().await.map_err(send_error)?;

        read_json(response, "token response")
            .await
            .map_err(|e| match e {
                CatalogError::ServerError { message, .. } | CatalogError::Unauthorized(message) => {
                    CatalogError::TokenRequestFailed(message)
                }
                other => other,
            })
    }
}

/// Upper bound on token lifetimes we are willing to trust (one year).
const MAX_EXPIRES_IN_SECS: u64 = 365 * 24 * 60 * 60;

fn to_credential(token: TokenResponse, previous_refresh: Option<&str>) -> Credential {
    let expires_in = token.expires_in.min(MAX_EXPIRES_IN_SECS);
    Credential {
        access_token: token.access_token,
        refresh_token: token
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string)),
        expires_at: Some(Utc::now() + Duration::seconds(expires_in as i64)),
    }
}

#[async_trait]
impl CredentialRefresher for TokenEndpoint {
    async fn refresh(&self, current: &Credential) -> tunen_core::Result<Credential> {
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or(tunen_core::TuneError::AuthRequired)?;
        Ok(self.refresh_token(refresh_token).await?)
    }
}
