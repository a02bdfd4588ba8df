use crate::models::{LoginRequest, RegisterRequest};
use regex::Regex;
use std::sync::OnceLock;

pub const PASSWORD_MIN_LEN: usize = 6;
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;

/// Why a form field was rejected before anything went over the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Checks an email address: required, then well-formed.
pub fn check_email(input: &str) -> Result<(), FieldError> {
    let email = input.trim();
    if email.is_empty() {
        return Err(FieldError::Required("Email"));
    }

    // Same shape browsers accept for <input type="email">.
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
        )
        .unwrap()
    });

    if !re.is_match(email) {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

pub fn check_password(input: &str) -> Result<(), FieldError> {
    if input.is_empty() {
        return Err(FieldError::Required("Password"));
    }
    if input.chars().count() < PASSWORD_MIN_LEN {
        return Err(FieldError::TooShort {
            field: "Password",
            min: PASSWORD_MIN_LEN,
        });
    }
    Ok(())
}

pub fn check_username(input: &str) -> Result<(), FieldError> {
    let len = input.chars().count();
    if len == 0 {
        return Err(FieldError::Required("Username"));
    }
    if len < USERNAME_MIN_LEN {
        return Err(FieldError::TooShort {
            field: "Username",
            min: USERNAME_MIN_LEN,
        });
    }
    if len > USERNAME_MAX_LEN {
        return Err(FieldError::TooLong {
            field: "Username",
            max: USERNAME_MAX_LEN,
        });
    }
    Ok(())
}

/// Raw input of the sign-in screen.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Turns the form into a request, or lists every field that is wrong.
    pub fn validate(&self) -> Result<LoginRequest, Vec<FieldError>> {
        let errors: Vec<FieldError> = [check_email(&self.email), check_password(&self.password)]
            .into_iter()
            .filter_map(Result::err)
            .collect();

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

/// Raw input of the sign-up screen. `confirm_password` never leaves the client.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, Vec<FieldError>> {
        let mut errors: Vec<FieldError> = [
            check_username(&self.username),
            check_email(&self.email),
            check_password(&self.password),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if self.confirm_password.is_empty() {
            errors.push(FieldError::Required("Confirm password"));
        } else if self.confirm_password != self.password {
            errors.push(FieldError::PasswordMismatch);
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(RegisterRequest {
            username: self.username.clone(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
