//! Interactive screens. Each one takes the session it drives as a parameter,
//! runs until the user leaves, and returns where to go next (`None` quits).

pub mod dashboard;
pub mod login;
pub mod register;

use crate::forms::FieldError;
use crate::logger::Logger;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::InquireError;
use inquire::validator::Validation;
use std::future::Future;
use std::time::Duration;

/// Runs a session operation with a spinner up until it settles.
pub(crate) async fn with_spinner<F: Future<Output = ()>>(msg: &str, op: F) {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));

    op.await;
    pb.finish_and_clear();
}

/// Maps Esc / Ctrl-C to `None` so a screen can quit cleanly.
pub(crate) fn answered<T>(result: Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Adapts a field check to an inquire validation result.
pub(crate) fn validation(check: Result<(), FieldError>) -> Validation {
    match check {
        Ok(()) => Validation::Valid,
        Err(e) => Validation::Invalid(e.to_string().into()),
    }
}

pub(crate) fn report(errors: &[FieldError]) {
    for error in errors {
        Logger::error(error);
    }
}
