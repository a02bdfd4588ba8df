use super::{answered, report, validation, with_spinner};
use crate::forms::{self, LoginForm};
use crate::logger::Logger;
use crate::router::{DASHBOARD_PATH, Location, REGISTER_PATH, RETURN_URL_PARAM};
use crate::session::{SessionState, SessionStatus};
use anyhow::Result;
use inquire::{Password, PasswordDisplayMode, Select, Text};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterFailure {
    TryAgain,
    CreateAccount,
    Quit,
}

impl fmt::Display for AfterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AfterFailure::TryAgain => "Try again",
            AfterFailure::CreateAccount => "Create an account",
            AfterFailure::Quit => "Quit",
        })
    }
}

/// Where to go once signed in: the `returnUrl` the guard attached, or the
/// dashboard. Only in-app paths are honoured.
pub fn destination(location: &Location) -> Location {
    location
        .param(RETURN_URL_PARAM)
        .filter(|url| url.starts_with('/') && !url.starts_with("//"))
        .map(Location::parse)
        .unwrap_or_else(|| Location::new(DASHBOARD_PATH))
}

/// The sign-in screen.
pub async fn show(session: &SessionState, location: &Location) -> Result<Option<Location>> {
    Logger::header("Sign in");
    Logger::info(Logger::dim("No account yet? Run `member register`."));
    let target = destination(location);

    loop {
        let Some(form) = prompt()? else {
            return Ok(None);
        };
        let request = match form.validate() {
            Ok(request) => request,
            Err(errors) => {
                report(&errors);
                continue;
            }
        };

        with_spinner("Signing in...", session.login(request)).await;

        match session.status() {
            SessionStatus::Authenticated(user) => {
                Logger::success(format!(
                    "Signed in as {}!",
                    Logger::highlight(&user.username)
                ));
                return Ok(Some(target));
            }
            SessionStatus::Failed(message) => {
                Logger::error(message);
                let options = vec![
                    AfterFailure::TryAgain,
                    AfterFailure::CreateAccount,
                    AfterFailure::Quit,
                ];
                let choice = answered(Select::new("What now?", options).prompt())?;
                session.clear_error();
                match choice {
                    Some(AfterFailure::TryAgain) => continue,
                    Some(AfterFailure::CreateAccount) => {
                        return Ok(Some(Location::new(REGISTER_PATH)));
                    }
                    Some(AfterFailure::Quit) | None => return Ok(None),
                }
            }
            // Superseded by another operation before ours landed.
            SessionStatus::Idle | SessionStatus::Loading => continue,
        }
    }
}

fn prompt() -> Result<Option<LoginForm>> {
    let Some(email) = answered(
        Text::new("Email:")
            .with_validator(|input: &str| Ok(validation(forms::check_email(input))))
            .prompt(),
    )?
    else {
        return Ok(None);
    };

    let Some(password) = answered(
        Password::new("Password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .with_validator(|input: &str| Ok(validation(forms::check_password(input))))
            .prompt(),
    )?
    else {
        return Ok(None);
    };

    Ok(Some(LoginForm { email, password }))
}
