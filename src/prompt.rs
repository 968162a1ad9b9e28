//! Typed confirmation for destructive multi-key operations.

use crate::error::ApiError;
use std::io::ErrorKind;

/// Text the user must type to confirm a destructive operation.
pub const CONFIRM_WORD: &str = "DELETE";

/// Asks whether a set of keys may be deleted.
pub trait ConfirmPrompt {
    /// Returns `Ok(true)` only when the user typed [`CONFIRM_WORD`].
    fn confirm_delete(&self, action: &str, targets: &[String]) -> Result<bool, ApiError>;
}

/// Interactive prompt on the terminal (stderr).
pub struct TerminalPrompt;

impl ConfirmPrompt for TerminalPrompt {
    fn confirm_delete(&self, action: &str, targets: &[String]) -> Result<bool, ApiError> {
        use dialoguer::Input;

        eprintln!("{} will delete {} file(s):", action, targets.len());
        for target in targets {
            eprintln!("  {}", target);
        }

        let answer: String = Input::new()
            .with_prompt(format!("Type {} to confirm", CONFIRM_WORD))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| match e {
                dialoguer::Error::IO(io) if io.kind() == ErrorKind::Interrupted => {
                    ApiError::Interrupted
                }
                other => ApiError::IoError(std::io::Error::new(
                    ErrorKind::Other,
                    format!("Failed to get user input: {}", other),
                )),
            })?;
        Ok(answer.trim() == CONFIRM_WORD)
    }
}

/// Confirm unless `assume_yes`; a refusal becomes [`ApiError::Aborted`].
pub fn require_confirmation(
    prompt: &dyn ConfirmPrompt,
    assume_yes: bool,
    action: &str,
    targets: &[String],
) -> Result<(), ApiError> {
    if assume_yes {
        return Ok(());
    }
    if prompt.confirm_delete(action, targets)? {
        Ok(())
    } else {
        Err(ApiError::Aborted(format!(
            "{} aborted: confirmation text did not match {}",
            action, CONFIRM_WORD
        )))
    }
}
