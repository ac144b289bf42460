//! Execution context
//!
//! A [`Context`] is built once per process and shared by every command run in
//! it, including commands re-entered through the routers. Everything that
//! depends on the command line lives in the per-run [`Invocation`].

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;

use super::confirm::Prompter;
use super::flags::FlagSet;
use super::output::{Output, OutputFormat};
use crate::client::ApiClient;
use crate::configuration::Settings;
use crate::error::AppError;

pub struct Context {
    pub client: Arc<dyn ApiClient>,
    pub output: Output,
    pub prompter: Arc<dyn Prompter>,
    pub settings: Arc<Settings>,
    pub cancel: CancellationToken,
}

impl Context {
    #[must_use]
    pub fn new(
        client: Arc<dyn ApiClient>,
        output: Output,
        prompter: Arc<dyn Prompter>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            client,
            output,
            prompter,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Run `fut` unless the context is cancelled first.
    ///
    /// # Errors
    /// Returns [`AppError::Cancelled`] on cancellation, or the future's own error.
    pub async fn cancellable<T, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(AppError::Cancelled),
            result = fut => result,
        }
    }
}

/// Global options of one invocation, resolved once after parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalOptions {
    pub format: OutputFormat,
    pub query: Option<String>,
    pub yes: bool,
    pub agent: bool,
    pub color: bool,
}

impl GlobalOptions {
    /// Combine the global flags with configuration. Flags the user set win;
    /// agent mode defaults to JSON output without colour.
    ///
    /// # Errors
    /// Fails on an unknown output format.
    pub fn resolve(globals: &FlagSet, settings: &Settings) -> Result<Self, AppError> {
        let agent = globals.get_bool("agent") || settings.agent_mode;

        let format = if globals.was_set_via_canonical_or_alias("output") {
            let raw = globals.get_string("output").unwrap_or_default();
            parse_format(raw).map_err(|reason| AppError::InvalidFlag {
                name: "output".to_string(),
                value: raw.to_string(),
                reason,
            })?
        } else if agent {
            OutputFormat::Json
        } else {
            parse_format(&settings.output.format).map_err(|reason| {
                AppError::Error(format!("output.format in configuration: {reason}"))
            })?
        };

        let query = globals
            .get_string("query")
            .filter(|q| !q.trim().is_empty())
            .map(ToString::to_string);

        Ok(Self {
            format,
            query,
            yes: globals.get_bool("yes"),
            agent,
            color: settings.output.color && !agent && !globals.get_bool("no-color"),
        })
    }
}

fn parse_format(raw: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_str(&raw.trim().to_lowercase()).map_err(|_| {
        let known: Vec<String> = OutputFormat::iter().map(|f| f.to_string()).collect();
        format!("expected one of {}", known.join(", "))
    })
}

/// One parsed command line, handed to the command that runs it
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Sub-command names from the root, e.g. `["transfers", "list"]`
    pub path: Vec<String>,
    pub flags: FlagSet,
    pub globals: FlagSet,
    /// Positional arguments in declaration order
    pub args: Vec<String>,
    pub options: GlobalOptions,
}

impl Invocation {
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

// -- Tests ---------------------------------------------------------------------
