use super::{answered, with_spinner};
use crate::logger::Logger;
use crate::models::User;
use crate::router::{LOGIN_PATH, Location};
use crate::session::{SessionState, SessionStatus};
use anyhow::Result;
use comfy_table::Table;
use inquire::Select;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Refresh,
    Logout,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Refresh => "Refresh",
            Action::Logout => "Log out",
            Action::Quit => "Quit",
        })
    }
}

/// The protected landing screen. Fetches the current user on entry and on
/// every refresh.
pub async fn show(session: &SessionState) -> Result<Option<Location>> {
    Logger::header("Dashboard");

    loop {
        with_spinner("Loading your profile...", session.load_current_user()).await;

        match session.status() {
            SessionStatus::Authenticated(user) => {
                Logger::info(format!("Hello, {}!", Logger::highlight(&user.username)));
                println!("{}", profile_table(&user));
            }
            SessionStatus::Failed(message) => Logger::error(message),
            SessionStatus::Idle | SessionStatus::Loading => {}
        }

        let options = vec![Action::Refresh, Action::Logout, Action::Quit];
        match answered(Select::new("What next?", options).prompt())? {
            Some(Action::Refresh) => continue,
            Some(Action::Logout) => {
                session.logout();
                Logger::success("Logged out.");
                return Ok(Some(Location::new(LOGIN_PATH)));
            }
            Some(Action::Quit) | None => return Ok(None),
        }
    }
}

pub fn profile_table(user: &User) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["ID".to_string(), user.id.to_string()]);
    table.add_row(vec!["Username".to_string(), user.username.clone()]);
    table.add_row(vec!["Email".to_string(), user.email.clone()]);
    table.add_row(vec![
        "Status".to_string(),
        (if user.is_login { "Signed in" } else { "Signed out" }).to_string(),
    ]);
    table.add_row(vec![
        "Member since".to_string(),
        user.created_time.format("%Y-%m-%d %H:%M UTC").to_string(),
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn profile_table_lists_account_fields() {
        let user = User {
            id: 42,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            is_login: true,
            created_time: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        };

        let rendered = profile_table(&user).to_string();

        assert!(rendered.contains("42"));
        assert!(rendered.contains("ada@example.com"));
        assert!(rendered.contains("Signed in"));
        assert!(rendered.contains("2025-01-02 03:04 UTC"));
    }
}
