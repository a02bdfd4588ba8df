use crate::logger::Logger;
use crate::router::{Location, Router, View};
use crate::session::{SessionState, SessionStatus};
use crate::views;
use anyhow::Result;
use std::sync::Arc;

/// Wires the session and router together and drives navigation between
/// screens.
pub struct App {
    session: Arc<SessionState>,
    router: Router,
}

impl App {
    pub fn new(session: Arc<SessionState>, router: Router) -> Self {
        Self { session, router }
    }

    /// Navigates from `start` until a screen asks to quit.
    pub async fn run(&self, start: Location) -> Result<()> {
        let mut next = Some(start);

        while let Some(requested) = next {
            let resolved = self.router.resolve(requested)?;
            log::debug!("showing {:?} at {}", resolved.view, resolved.location);

            next = match resolved.view {
                View::Login => views::login::show(&self.session, &resolved.location).await?,
                View::Register => views::register::show(&self.session).await?,
                View::Dashboard => views::dashboard::show(&self.session).await?,
            };
        }

        Ok(())
    }

    /// Non-interactive summary for `member status`.
    pub async fn status(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            Logger::info("Not signed in. Run `member login`.");
            return Ok(());
        }

        self.session.load_current_user().await;
        match self.session.status() {
            SessionStatus::Authenticated(user) => {
                Logger::success(format!(
                    "Signed in as {} ({})",
                    Logger::highlight(&user.username),
                    user.email
                ));
            }
            SessionStatus::Failed(message) => {
                Logger::warn(format!("A token is stored, but the server rejected it: {message}"));
            }
            SessionStatus::Idle | SessionStatus::Loading => {}
        }
        Ok(())
    }

    pub fn logout(&self) {
        self.session.logout();
        Logger::success("Logged out.");
    }
}
