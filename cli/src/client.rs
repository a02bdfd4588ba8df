use crate::error::{AuthError, StorageError};
use crate::interceptor::RequestAuthenticator;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::storage::TokenStore;
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

/// The remote calls a session needs, plus the local token checks.
///
/// `AuthClient` is the real thing. The seam exists so the session state
/// machine can be driven by anything that speaks this contract.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Creates an account. The returned token is persisted before this returns.
    async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, AuthError>;
    /// Exchanges credentials for a token, persisted before this returns.
    async fn login(&self, data: &LoginRequest) -> Result<AuthResponse, AuthError>;
    /// Fetches the user the stored token belongs to.
    async fn get_current_user(&self) -> Result<User, AuthError>;
    /// Forgets the stored token. Local only.
    fn logout(&self) -> Result<(), StorageError>;
    /// True iff a token is stored. Expiry and signature are not checked.
    fn is_authenticated(&self) -> bool;
}

/// HTTP client for the `{api_url}/auth` endpoints.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    authenticator: RequestAuthenticator,
}

impl AuthClient {
    /// Points the client at `{api_url}/auth`.
    /// Trailing slashes are trimmed so `http://host/api/` and `http://host/api`
    /// both work. People paste URLs from browsers, they'll have slashes.
    pub fn new(api_url: &str, tokens: TokenStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/auth", api_url.trim_end_matches('/')),
            authenticator: RequestAuthenticator::new(tokens.clone()),
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Builds the request, runs it through the authenticator, sends it and
    /// decodes a 2xx body. Anything else becomes `AuthError::Api` carrying
    /// whatever message the server put in the body.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, AuthError> {
        let mut request = builder.build()?;
        self.authenticator.authenticate(&mut request);
        log::debug!("{} {}", request.method(), request.url());

        let response = self.http.execute(request).await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            log::debug!("auth api answered {status}: {text}");
            return Err(AuthError::Api {
                status,
                detail: extract_detail(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| AuthError::Decode(format!("{e}: {text}")))
    }

    /// Stores the token from a successful login or signup.
    /// If this fails the whole call fails. Reporting a login that won't
    /// survive the next command would just confuse people.
    fn persist(&self, response: &AuthResponse) -> Result<(), AuthError> {
        self.tokens.set(&response.access_token)?;
        Ok(())
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, AuthError> {
        let response: AuthResponse = self
            .send(self.http.post(self.endpoint("/register")).json(data))
            .await?;
        self.persist(&response)?;
        log::info!("registered as {}", response.user.username);
        Ok(response)
    }

    async fn login(&self, data: &LoginRequest) -> Result<AuthResponse, AuthError> {
        let response: AuthResponse = self
            .send(self.http.post(self.endpoint("/login")).json(data))
            .await?;
        self.persist(&response)?;
        log::info!("logged in as {}", response.user.username);
        Ok(response)
    }

    async fn get_current_user(&self) -> Result<User, AuthError> {
        self.send(self.http.get(self.endpoint("/user"))).await
    }

    fn logout(&self) -> Result<(), StorageError> {
        self.tokens.remove()
    }

    fn is_authenticated(&self) -> bool {
        self.tokens.is_present()
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Understands `{"detail": "..."}`, validation lists of the form
/// `{"detail": [{"msg": "..."}, ...]}`, and `error`/`message` strings.
/// Non-JSON bodies yield nothing.
pub fn extract_detail(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;

    let from_detail = match &json["detail"] {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item["msg"].as_str())
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    };

    from_detail
        .or_else(|| json["error"].as_str().map(str::to_string))
        .or_else(|| json["message"].as_str().map(str::to_string))
        .filter(|msg| !msg.trim().is_empty())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
