use super::{answered, report, validation, with_spinner};
use crate::forms::{self, RegisterForm};
use crate::logger::Logger;
use crate::router::{DASHBOARD_PATH, LOGIN_PATH, Location};
use crate::session::{SessionState, SessionStatus};
use anyhow::Result;
use inquire::{Password, PasswordDisplayMode, Select, Text};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterFailure {
    TryAgain,
    SignIn,
    Quit,
}

impl fmt::Display for AfterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AfterFailure::TryAgain => "Try again",
            AfterFailure::SignIn => "I already have an account",
            AfterFailure::Quit => "Quit",
        })
    }
}

/// The sign-up screen. A new account is signed in right away and lands on
/// the dashboard.
pub async fn show(session: &SessionState) -> Result<Option<Location>> {
    Logger::header("Create an account");

    let mut form = RegisterForm::default();
    loop {
        let Some(filled) = prompt(form)? else {
            return Ok(None);
        };
        form = filled;

        let request = match form.validate() {
            Ok(request) => request,
            Err(errors) => {
                report(&errors);
                // Keep what was typed except the passwords.
                form.password.clear();
                form.confirm_password.clear();
                continue;
            }
        };

        with_spinner("Creating your account...", session.register(request)).await;

        match session.status() {
            SessionStatus::Authenticated(user) => {
                Logger::success(format!(
                    "Welcome aboard, {}!",
                    Logger::highlight(&user.username)
                ));
                return Ok(Some(Location::new(DASHBOARD_PATH)));
            }
            SessionStatus::Failed(message) => {
                Logger::error(message);
                let options = vec![AfterFailure::TryAgain, AfterFailure::SignIn, AfterFailure::Quit];
                let choice = answered(Select::new("What now?", options).prompt())?;
                session.clear_error();
                match choice {
                    Some(AfterFailure::TryAgain) => {
                        form.password.clear();
                        form.confirm_password.clear();
                        continue;
                    }
                    Some(AfterFailure::SignIn) => return Ok(Some(Location::new(LOGIN_PATH))),
                    Some(AfterFailure::Quit) | None => return Ok(None),
                }
            }
            SessionStatus::Idle | SessionStatus::Loading => continue,
        }
    }
}

/// Asks for every field, offering earlier answers as defaults.
fn prompt(previous: RegisterForm) -> Result<Option<RegisterForm>> {
    let Some(username) = answered(
        Text::new("Username:")
            .with_initial_value(&previous.username)
            .with_validator(|input: &str| Ok(validation(forms::check_username(input))))
            .prompt(),
    )?
    else {
        return Ok(None);
    };

    let Some(email) = answered(
        Text::new("Email:")
            .with_initial_value(&previous.email)
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

    // Asked separately so a mismatch is reported by the form, like any other
    // field error.
    let Some(confirm_password) = answered(
        Password::new("Confirm password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt(),
    )?
    else {
        return Ok(None);
    };

    Ok(Some(RegisterForm {
        username,
        email,
        password,
        confirm_password,
    }))
}
