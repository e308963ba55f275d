//! SOTA database API client: login, upload, logout.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    http::{HttpRequest, HttpResponse, RequestBody, ReqwestTransport, Transport},
    record::{Activation, Chase},
    upload::UploadData,
};

/// Base URL of the SOTA SSO OpenID Connect realm.
pub const SOTA_OIDC_URL_BASE: &str =
    "https://sso.sota.org.uk/auth/realms/SOTA/protocol/openid-connect";
/// Base URL of the SOTA database API.
pub const SOTA_API_URL_BASE: &str = "https://api-db2.sota.org.uk";

/// Client construction parameters.
///
/// `client_id`, `username`, and `password` are required; empty values fail
/// construction with [`Error::InvalidConfiguration`] before any network
/// activity. The base URLs default to the production SOTA endpoints and only
/// need overriding for testing.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// SOTA API client identifier.
    pub client_id: String,
    /// SOTA database username.
    pub username: String,
    /// SOTA database password.
    pub password: String,
    /// Authentication endpoint base, no trailing slash.
    pub auth_base: String,
    /// Upload API endpoint base, no trailing slash.
    pub api_base: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            username: String::new(),
            password: String::new(),
            auth_base: SOTA_OIDC_URL_BASE.to_string(),
            api_base: SOTA_API_URL_BASE.to_string(),
        }
    }
}

impl ClientConfig {
    fn validate(&self) -> Result<()> {
        for (value, name) in [
            (&self.client_id, "client_id"),
            (&self.username, "username"),
            (&self.password, "password"),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidConfiguration(name));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// An authenticated upload session against the SOTA database.
///
/// Construction performs the password-grant login; a `Client` value is
/// therefore always authenticated. Dropping the client posts a best-effort
/// logout. The session holds unsynchronized mutable state, so concurrent use
/// must be serialized by the caller.
pub struct Client {
    client_id: String,
    auth_base: String,
    api_base: String,
    transport: Box<dyn Transport>,
    access_token: String,
    refresh_token: String,
    data: UploadData,
    logged_out: bool,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("client_id", &self.client_id)
            .field("auth_base", &self.auth_base)
            .field("api_base", &self.api_base)
            .field("access_token", &self.access_token)
            .field("refresh_token", &self.refresh_token)
            .field("data", &self.data)
            .field("logged_out", &self.logged_out)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Logs in over HTTPS and returns an authenticated session.
    pub fn login(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Self::login_with(config, Box::new(transport))
    }

    /// Logs in through a caller-supplied transport. This is the test seam;
    /// production code uses [`Client::login`].
    pub fn login_with(config: ClientConfig, mut transport: Box<dyn Transport>) -> Result<Self> {
        config.validate()?;

        let request = HttpRequest {
            url: format!("{}/token", config.auth_base),
            bearer: None,
            body: RequestBody::Form(vec![
                ("client_id", config.client_id.clone()),
                ("grant_type", "password".to_string()),
                ("username", config.username.clone()),
                ("password", config.password.clone()),
            ]),
        };
        let response = transport.post(&request)?;
        debug!(status = response.status, "token endpoint responded");

        let tokens = classify_token_response(&response)?;
        Ok(Self {
            client_id: config.client_id,
            auth_base: config.auth_base,
            api_base: config.api_base,
            transport,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            data: UploadData::new(),
            logged_out: false,
        })
    }

    /// Adds an activation to the pending upload.
    pub fn add_activation(&mut self, activation: Activation) {
        self.data.add_activation(activation);
    }

    /// Adds a chase to the pending upload.
    pub fn add_chase(&mut self, chase: Chase) {
        self.data.add_chase(chase);
    }

    /// The records pending upload.
    pub fn pending(&self) -> &UploadData {
        &self.data
    }

    /// Uploads the pending activations and chases.
    ///
    /// The pending records are kept on both success and failure; whether to
    /// re-issue after an error is the caller's decision. No retry is
    /// performed.
    pub fn upload(&mut self) -> Result<()> {
        let payload = serde_json::to_value(self.data.payload())
            .map_err(|err| Error::Server(format!("failed to encode upload payload: {err}")))?;
        let request = HttpRequest {
            url: format!("{}/uploads", self.api_base),
            bearer: Some(self.access_token.clone()),
            body: RequestBody::Json(payload),
        };
        let response = self.transport.post(&request)?;
        debug!(status = response.status, "upload endpoint responded");

        match response.status {
            200 => Ok(()),
            401 | 403 => Err(Error::AccessDenied(response.body)),
            _ => Err(Error::Server(response.body)),
        }
    }

    /// Logs out of the SOTA API and consumes the session.
    ///
    /// Best-effort: a failed logout is logged and swallowed, since the
    /// session is being destroyed either way. Callers who never call this get
    /// the same attempt from `Drop`.
    pub fn logout(mut self) {
        self.try_logout();
    }

    fn try_logout(&mut self) {
        if self.logged_out {
            return;
        }
        self.logged_out = true;
        if let Err(err) = self.post_logout() {
            warn!("logout failed: {err}");
        }
    }

    fn post_logout(&mut self) -> Result<()> {
        let request = HttpRequest {
            url: format!("{}/logout", self.auth_base),
            bearer: Some(self.access_token.clone()),
            body: RequestBody::Form(vec![
                ("client_id", self.client_id.clone()),
                ("refresh_token", self.refresh_token.clone()),
            ]),
        };
        let response = self.transport.post(&request)?;
        if response.status >= 400 {
            return Err(Error::Server(response.body));
        }
        Ok(())
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.try_logout();
    }
}

fn classify_token_response(response: &HttpResponse) -> Result<TokenResponse> {
    if !response.is_json() {
        return Err(Error::Server(format!(
            "unexpected content type {:?} received from server",
            response.content_type.as_deref().unwrap_or("<none>")
        )));
    }

    if response.status == 200 {
        return serde_json::from_str(&response.body)
            .map_err(|err| Error::Server(format!("unparseable token response: {err}")));
    }

    let Ok(api_error) = serde_json::from_str::<ApiError>(&response.body) else {
        return Err(Error::Server(response.body.clone()));
    };
    if response.status == 401 {
        if api_error.error == "invalid_client" {
            Err(Error::InvalidClientId(api_error.error_description))
        } else {
            Err(Error::AccessDenied(api_error.error_description))
        }
    } else {
        Err(Error::Server(format!(
            "({}) {}",
            api_error.error, api_error.error_description
        )))
    }
}
