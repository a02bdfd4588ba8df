use crate::client::AuthApi;
use crate::error::AuthError;
use crate::models::{LoginRequest, RegisterRequest, User};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Where the session currently is.
///
/// ```text
/// Idle ──op──▶ Loading ──ok──▶ Authenticated
///               │  ▲                │
///              err └──────op────────┤
///               ▼                   │
///             Failed ──clear_error──▶ Idle ◀──logout── (any)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Authenticated(User),
    Failed(String),
}

impl SessionStatus {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionStatus::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionStatus::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Login,
    Register,
    LoadCurrentUser,
}

impl Operation {
    fn fallback_message(self) -> &'static str {
        match self {
            Operation::Login => "Login failed",
            Operation::Register => "Registration failed",
            Operation::LoadCurrentUser => "Failed to load user information",
        }
    }
}

enum Event {
    Begin,
    Settle {
        ticket: u64,
        outcome: SessionStatus,
    },
    Reset,
    ClearError,
}

/// The client-side session: who is logged in, whether a call is in flight,
/// and what the last failure said.
///
/// Every change goes through [`SessionState::apply`], which replaces the
/// whole status under the channel's write lock. Observers never see a
/// half-written state.
///
/// Each operation takes a ticket when it starts. Starting another operation
/// or logging out invalidates older tickets. The call behind a stale ticket is
/// dropped at its next await point, so a superseded login never gets to store
/// its token. The most recently started operation decides the final state.
pub struct SessionState {
    api: Arc<dyn AuthApi>,
    status: watch::Sender<SessionStatus>,
    generation: watch::Sender<u64>,
}

impl SessionState {
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        let (status, _) = watch::channel(SessionStatus::Idle);
        Self {
            api,
            status,
            generation: watch::Sender::new(0),
        }
    }

    /// Snapshot of the current status.
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Receives every status the session publishes from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Whether a token is stored. Doesn't ask the server, so this is cheap
    /// enough for the route guard to call on every navigation.
    pub fn is_authenticated(&self) -> bool {
        self.api.is_authenticated()
    }

    /// Logs in and, on success, stores the token and the user.
    /// Failures end up in `Failed` with the server's message if it sent one.
    pub async fn login(&self, request: LoginRequest) {
        let call = async { self.api.login(&request).await.map(|res| res.user) };
        self.run(Operation::Login, call).await;
    }

    pub async fn register(&self, request: RegisterRequest) {
        let call = async { self.api.register(&request).await.map(|res| res.user) };
        self.run(Operation::Register, call).await;
    }

    /// Asks the server who the stored token belongs to.
    /// The dashboard calls this on every visit, which is how an expired
    /// token gets noticed.
    pub async fn load_current_user(&self) {
        self.run(Operation::LoadCurrentUser, self.api.get_current_user())
            .await;
    }

    /// Drops the token and returns to Idle. Any call still in flight is
    /// cancelled before it can answer.
    pub fn logout(&self) {
        if let Err(e) = self.api.logout() {
            log::warn!("could not remove stored token: {e}");
        }
        self.apply(Event::Reset);
    }

    /// Dismisses a failure. Does nothing (and notifies nobody) unless the
    /// session is currently `Failed`.
    pub fn clear_error(&self) {
        self.apply(Event::ClearError);
    }

    /// Publishes Loading, then drives `call` until it answers or a newer
    /// operation (or logout) takes over. A taken-over call is dropped
    /// unfinished and leaves the status alone.
    async fn run<F>(&self, op: Operation, call: F)
    where
        F: Future<Output = Result<User, AuthError>>,
    {
        let ticket = self.begin();
        let taken_over = superseded(self.generation.subscribe(), ticket);

        let outcome = tokio::select! {
            biased;
            _ = taken_over => {
                log::debug!("{op:?} superseded, abandoning ticket {ticket}");
                return;
            }
            outcome = call => outcome,
        };
        self.settle(ticket, op, outcome);
    }

    fn begin(&self) -> u64 {
        // Begin always yields a ticket.
        self.apply(Event::Begin).unwrap_or_default()
    }

    fn settle(&self, ticket: u64, op: Operation, outcome: Result<User, AuthError>) {
        let next = match outcome {
            Ok(user) => SessionStatus::Authenticated(user),
            Err(e) => {
                log::warn!("{op:?} failed: {e}");
                let message = e.detail().unwrap_or(op.fallback_message());
                SessionStatus::Failed(message.to_string())
            }
        };
        self.apply(Event::Settle {
            ticket,
            outcome: next,
        });
    }

    /// The single place the status is written. Returns the new ticket for
    /// `Event::Begin`.
    fn apply(&self, event: Event) -> Option<u64> {
        let mut issued = None;
        self.status.send_if_modified(|status| match event {
            Event::Begin => {
                issued = Some(self.bump());
                *status = SessionStatus::Loading;
                true
            }
            Event::Settle { ticket, outcome } => {
                if *self.generation.borrow() != ticket {
                    log::debug!("dropping stale completion for ticket {ticket}");
                    return false;
                }
                *status = outcome;
                true
            }
            Event::Reset => {
                self.bump();
                *status = SessionStatus::Idle;
                true
            }
            Event::ClearError => {
                if status.error().is_none() {
                    return false;
                }
                *status = SessionStatus::Idle;
                true
            }
        });
        issued
    }

    /// Invalidates every outstanding ticket and wakes the calls holding them.
    fn bump(&self) -> u64 {
        let mut next = 0;
        self.generation.send_modify(|current| {
            *current += 1;
            next = *current;
        });
        next
    }
}

/// Resolves once `ticket` stops being the current generation.
async fn superseded(mut generation: watch::Receiver<u64>, ticket: u64) {
    let _ = generation.wait_for(|current| *current != ticket).await;
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
