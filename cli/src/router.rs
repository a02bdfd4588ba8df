use crate::client::AuthApi;
use std::fmt;
use std::sync::Arc;
use url::Url;

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Query parameter the guard uses to remember where the user was headed.
pub const RETURN_URL_PARAM: &str = "returnUrl";

const WILDCARD: &str = "**";

/// Upper bound on redirects followed for a single navigation.
const MAX_REDIRECTS: usize = 8;

/// A path plus query parameters, e.g. `/auth/login?returnUrl=/dashboard`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Location {
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            query: Vec::new(),
        }
    }

    /// Parses a path with an optional query string. Percent-escapes in the
    /// query are decoded. Unparseable input is kept verbatim as the path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let parsed = Url::parse("http://member.local/").and_then(|base| base.join(raw));
        match parsed {
            Ok(url) => Self {
                path: normalize_path(url.path()),
                query: url
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            },
            Err(_) => Self::new(raw),
        }
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.query.retain(|(k, _)| k != key);
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{}={}", escape_query(key), escape_query(value))?;
        }
        Ok(())
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        ROOT_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Escapes a query component. `/`, `:` and `@` stay literal so a return
/// path reads as a path.
fn escape_query(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' | b':'
            | b'@' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Outcome of the guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Location),
}

/// Gates protected routes on token presence.
///
/// No network round-trip: a stored token is trusted until the server says
/// otherwise.
#[derive(Clone)]
pub struct RouteGuard {
    api: Arc<dyn AuthApi>,
}

impl RouteGuard {
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        Self { api }
    }

    pub fn check(&self, requested: &Location) -> GuardDecision {
        if self.api.is_authenticated() {
            return GuardDecision::Allow;
        }
        GuardDecision::Redirect(
            Location::new(LOGIN_PATH).with_param(RETURN_URL_PARAM, &requested.to_string()),
        )
    }
}

/// Screens the router can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Redirect(&'static str),
    Public(View),
    Guarded(View),
}

/// One row of the route table. `**` matches any path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub pattern: &'static str,
    pub target: Target,
}

impl Route {
    pub const fn new(pattern: &'static str, target: Target) -> Self {
        Self { pattern, target }
    }

    fn matches(&self, path: &str) -> bool {
        self.pattern == WILDCARD || self.pattern == path
    }
}

/// The application's route table, first match wins.
pub fn default_routes() -> Vec<Route> {
    vec![
        Route::new(ROOT_PATH, Target::Redirect(DASHBOARD_PATH)),
        Route::new(LOGIN_PATH, Target::Public(View::Login)),
        Route::new(REGISTER_PATH, Target::Public(View::Register)),
        Route::new(DASHBOARD_PATH, Target::Guarded(View::Dashboard)),
        Route::new(WILDCARD, Target::Redirect(DASHBOARD_PATH)),
    ]
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route matches {0}")]
    NotFound(String),
    #[error("too many redirects while resolving {0}")]
    RedirectLoop(String),
}

/// Where a navigation ends up: the view to show and the location it was
/// reached at (query included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub view: View,
    pub location: Location,
}

pub struct Router {
    routes: Vec<Route>,
    guard: RouteGuard,
}

impl Router {
    pub fn new(guard: RouteGuard) -> Self {
        Self::with_routes(default_routes(), guard)
    }

    pub fn with_routes(routes: Vec<Route>, guard: RouteGuard) -> Self {
        Self { routes, guard }
    }

    /// Follows redirects and guard decisions until a view is reached.
    pub fn resolve(&self, requested: Location) -> Result<Resolved, RouteError> {
        let origin = requested.to_string();
        let mut location = requested;

        for _ in 0..=MAX_REDIRECTS {
            let route = self
                .routes
                .iter()
                .find(|r| r.matches(location.path()))
                .ok_or_else(|| RouteError::NotFound(location.to_string()))?;

            match route.target {
                Target::Redirect(to) => {
                    log::debug!("redirect {} -> {to}", location);
                    location = Location::new(to);
                }
                Target::Public(view) => return Ok(Resolved { view, location }),
                Target::Guarded(view) => match self.guard.check(&location) {
                    GuardDecision::Allow => return Ok(Resolved { view, location }),
                    GuardDecision::Redirect(to) => {
                        log::debug!("guard rejected {location}, sending to {to}");
                        location = to;
                    }
                },
            }
        }

        Err(RouteError::RedirectLoop(origin))
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
