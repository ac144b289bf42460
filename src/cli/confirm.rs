//! Confirmation gate for destructive commands

use std::io::IsTerminal;
use std::sync::Arc;

use dialoguer::Confirm;

use super::context::{Context, GlobalOptions};
use crate::error::AppError;

pub trait Prompter: Send + Sync {
    /// Whether a human can answer a prompt
    fn is_interactive(&self) -> bool;

    /// Ask a yes/no question, blocking until it is answered.
    ///
    /// # Errors
    /// Fails if the terminal can't be read.
    fn confirm(&self, prompt: &str) -> Result<bool, AppError>;
}

pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal() && console::Term::stderr().is_term()
    }

    fn confirm(&self, prompt: &str) -> Result<bool, AppError> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }
}

/// Ask the user to confirm, unless `--yes` was given.
///
/// A prompt that nobody can answer fails straight away instead of hanging.
///
/// # Errors
/// [`AppError::NotATerminal`] when stdin is not interactive, or
/// [`AppError::Cancelled`] if the context is cancelled while waiting.
pub async fn confirm(
    ctx: &Context,
    options: &GlobalOptions,
    prompt: &str,
) -> Result<bool, AppError> {
    if options.yes {
        return Ok(true);
    }
    if !ctx.prompter.is_interactive() {
        return Err(AppError::NotATerminal);
    }

    let prompter = Arc::clone(&ctx.prompter);
    let prompt = prompt.to_string();
    let answer = tokio::task::spawn_blocking(move || prompter.confirm(&prompt));

    tokio::select! {
        () = ctx.cancel.cancelled() => Err(AppError::Cancelled),
        joined = answer => joined.map_err(|e| AppError::Error(e.to_string()))?,
    }
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test::{harness_with, text_options, ScriptedPrompter, StubClient};

    #[tokio::test]
    async fn yes_skips_the_prompt() {
        // Arrange
        let prompter = Arc::new(ScriptedPrompter::new(false, false));
        let h = harness_with(StubClient::new(), prompter.clone());
        let options = GlobalOptions {
            yes: true,
            ..text_options()
        };

        // Act
        let confirmed = confirm(&h.ctx, &options, "Delete?").await.unwrap();

        // Assert
        assert!(confirmed);
        assert!(prompter.prompts().is_empty());
    }

    #[tokio::test]
    async fn non_interactive_fails_fast() {
        let h = harness_with(StubClient::new(), Arc::new(ScriptedPrompter::new(false, true)));

        let err = confirm(&h.ctx, &text_options(), "Delete?").await.unwrap_err();

        assert!(matches!(err, AppError::NotATerminal));
    }

    #[tokio::test]
    async fn interactive_answer_is_returned() {
        // Arrange
        let prompter = Arc::new(ScriptedPrompter::new(true, false));
        let h = harness_with(StubClient::new(), prompter.clone());

        // Act
        let confirmed = confirm(&h.ctx, &text_options(), "Delete wh_1?").await.unwrap();

        // Assert
        assert!(!confirmed);
        assert_eq!(prompter.prompts(), vec!["Delete wh_1?".to_string()]);
    }
}
