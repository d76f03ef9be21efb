//! `HashiCorp` Vault client.
//!
//! Talks to the Vault HTTP API using the KV secrets engine (version 1 or 2)
//! and the userpass auth method.
//!
//! Secrets are stored as objects with a single `value` field:
//!
//! - KV v1: `{mount}/{path}` holding `{"value": "..."}`
//! - KV v2: `{mount}/data/{path}` holding `{"data": {"value": "..."}}`

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{Credentials, SecretStore};
use crate::core::config::{Config, KvVersion};
use crate::core::constants::VALUE_FIELD;
use crate::core::types::{SecretPath, SecretValue, SessionToken};
use crate::error::StoreError;

const TOKEN_HEADER: &str = "X-Vault-Token";

#[derive(Debug, Deserialize)]
struct SecretResponse {
    data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    auth: Option<AuthInfo>,
}

#[derive(Debug, Deserialize)]
struct AuthInfo {
    client_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

/// Vault HTTP client.
///
/// Holds at most one session token. Requests that need a token fail with
/// `StoreError::Unauthorized` without touching the network when none is set.
pub struct VaultClient {
    http: Client,
    config: Config,
    token: Option<SessionToken>,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("address", &self.config.address)
            .field("mount", &self.config.mount)
            .field("token", &self.token)
            .finish()
    }
}

impl VaultClient {
    /// Create a client for the server described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Transport` if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to create client: {}", e)))?;

        Ok(Self {
            http,
            config,
            token: None,
        })
    }

    /// Use `token` for subsequent requests without validating it.
    pub fn set_token(&mut self, token: SessionToken) {
        self.token = if token.is_empty() { None } else { Some(token) };
    }

    /// The current session token, if any.
    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Change the userpass password of `username`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PermissionDenied` if the session may not update
    /// the account, or other store errors.
    pub fn set_password(&self, username: &str, password: &str) -> Result<(), StoreError> {
        let api_path = format!("auth/userpass/users/{}", username);
        let request = self
            .authorized(self.http.post(self.url(&api_path)))?
            .json(&json!({ "password": password }));
        let response = self.send("POST", &api_path, request)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(StoreError::Unauthorized),
            StatusCode::FORBIDDEN => Err(StoreError::PermissionDenied { path: api_path }),
            status => Err(unexpected(status, response)),
        }
    }

    fn url(&self, api_path: &str) -> String {
        format!(
            "{}/v1/{}",
            self.config.address.trim_end_matches('/'),
            api_path
        )
    }

    fn secret_api_path(&self, path: &SecretPath) -> String {
        let mount = self.config.mount.trim_matches('/');
        let path = path.as_str().trim_start_matches('/');
        match self.config.kv_version {
            KvVersion::V1 => format!("{}/{}", mount, path),
            KvVersion::V2 => format!("{}/data/{}", mount, path),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, StoreError> {
        let token = self.token.as_ref().ok_or(StoreError::Unauthorized)?;
        Ok(request.header(TOKEN_HEADER, token.expose()))
    }

    fn send(
        &self,
        method: &str,
        api_path: &str,
        request: RequestBuilder,
    ) -> Result<Response, StoreError> {
        let response = request.send().map_err(|e| self.transport(e))?;
        debug!(
            method,
            path = api_path,
            status = response.status().as_u16(),
            "vault request"
        );
        Ok(response)
    }

    fn transport(&self, error: reqwest::Error) -> StoreError {
        if error.is_timeout() {
            StoreError::Transport(format!(
                "request to {} timed out after {}s",
                self.config.address,
                self.config.timeout.as_secs()
            ))
        } else {
            StoreError::Transport(error.to_string())
        }
    }

    fn extract_value(
        &self,
        path: &SecretPath,
        data: Option<Map<String, Value>>,
    ) -> Result<SecretValue, StoreError> {
        let not_found = || StoreError::NotFound {
            path: path.to_string(),
        };

        let data = data.ok_or_else(not_found)?;
        let fields = match self.config.kv_version {
            KvVersion::V1 => Some(&data),
            KvVersion::V2 => data.get("data").and_then(Value::as_object),
        };

        match fields.and_then(|f| f.get(VALUE_FIELD)) {
            Some(Value::String(value)) => Ok(SecretValue::new(value.as_str())),
            Some(_) => Err(StoreError::InvalidResponse(format!(
                "field '{}' of {} is not a string",
                VALUE_FIELD, path
            ))),
            None => Err(not_found()),
        }
    }

    fn lookup_self(&self, token: &SessionToken) -> Result<(), StoreError> {
        let api_path = "auth/token/lookup-self";
        let request = self
            .http
            .get(self.url(api_path))
            .header(TOKEN_HEADER, token.expose());
        let response = self.send("GET", api_path, request)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(StoreError::InvalidCredentials)
            }
            status => Err(unexpected(status, response)),
        }
    }

    fn login(&self, username: &str, password: &str) -> Result<SessionToken, StoreError> {
        let api_path = format!("auth/userpass/login/{}", username);
        let request = self
            .http
            .post(self.url(&api_path))
            .json(&json!({ "password": password }));
        let response = self.send("POST", &api_path, request)?;

        match response.status() {
            status if status.is_success() => {
                let body: LoginResponse = response
                    .json()
                    .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
                body.auth
                    .map(|auth| SessionToken::new(auth.client_token))
                    .filter(|token| !token.is_empty())
                    .ok_or_else(|| {
                        StoreError::InvalidResponse("login response carried no token".to_string())
                    })
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(StoreError::InvalidCredentials)
            }
            status => Err(unexpected(status, response)),
        }
    }
}

impl SecretStore for VaultClient {
    fn read(&self, path: &SecretPath) -> Result<SecretValue, StoreError> {
        let api_path = self.secret_api_path(path);
        let request = self.authorized(self.http.get(self.url(&api_path)))?;
        let response = self.send("GET", &api_path, request)?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::Unauthorized),
            status if status.is_success() => {
                let body: SecretResponse = response
                    .json()
                    .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
                self.extract_value(path, body.data)
            }
            status => Err(unexpected(status, response)),
        }
    }

    fn write(&self, path: &SecretPath, value: &str) -> Result<(), StoreError> {
        let api_path = self.secret_api_path(path);
        let body = match self.config.kv_version {
            KvVersion::V1 => json!({ "value": value }),
            KvVersion::V2 => json!({ "data": { "value": value } }),
        };
        let request = self
            .authorized(self.http.post(self.url(&api_path)))?
            .json(&body);
        let response = self.send("POST", &api_path, request)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(StoreError::Unauthorized),
            StatusCode::FORBIDDEN => Err(StoreError::PermissionDenied {
                path: path.to_string(),
            }),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
            status => Err(unexpected(status, response)),
        }
    }

    fn authenticate(&mut self, credentials: &Credentials) -> Result<SessionToken, StoreError> {
        let token = match credentials {
            Credentials::UserPass { username, password } => self.login(username, password)?,
            Credentials::Token(token) => {
                if token.is_empty() {
                    return Err(StoreError::InvalidCredentials);
                }
                self.lookup_self(token)?;
                token.clone()
            }
        };

        self.token = Some(token.clone());
        Ok(token)
    }

    fn has_session(&self) -> bool {
        self.token.is_some()
    }
}

fn unexpected(status: StatusCode, response: Response) -> StoreError {
    let errors = response
        .json::<ErrorResponse>()
        .unwrap_or_default()
        .errors;
    if errors.is_empty() {
        StoreError::InvalidResponse(format!("status {}", status.as_u16()))
    } else {
        StoreError::InvalidResponse(format!("status {}: {}", status.as_u16(), errors.join("; ")))
    }
}
