use crate::storage::TokenStore;
use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderValue};

/// Paths that issue tokens. They are never decorated.
const UNDECORATED_SUFFIXES: [&str; 2] = ["/auth/login", "/auth/register"];

/// Attaches the stored token to outgoing requests as a bearer credential.
///
/// Runs once per request, right before it is sent. There is no retry and no
/// refresh on 401; an expired token simply yields the server's error.
#[derive(Clone)]
pub struct RequestAuthenticator {
    tokens: TokenStore,
}

impl RequestAuthenticator {
    pub fn new(tokens: TokenStore) -> Self {
        Self { tokens }
    }

    pub fn authenticate(&self, request: &mut Request) {
        if issues_token(request) {
            return;
        }
        let Some(token) = self.tokens.get() else {
            return;
        };

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            // A token with control characters can't go on the wire; send the
            // request bare and let the server reject it.
            Err(_) => log::warn!("stored token is not a valid header value, skipping"),
        }
    }
}

fn issues_token(request: &Request) -> bool {
    let path = request.url().path().trim_end_matches('/');
    UNDECORATED_SUFFIXES
        .iter()
        .any(|suffix| path.ends_with(suffix))
}

#[cfg(test)]
#[path = "interceptor_test.rs"]
mod tests;
