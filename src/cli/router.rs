//! Verb-first shorthands
//!
//! `pay list transfers`, `pay create payout` and `pay delete webhook wh_1`
//! are rewritten onto the canonical `pay <group> <verb>` commands and run
//! again from the top, so the canonical command validates everything.
//! Only global flags the user actually typed are carried over.

use std::sync::Arc;

use async_trait::async_trait;
use strum_macros::Display;

use super::context::{Context, Invocation};
use super::flags::FlagSet;
use super::ids::ResourceKind;
use super::tree::{CommandHandler, CommandNode, Positional};
use super::BIN_NAME;
use crate::error::AppError;

const KNOWN_NOUNS: &str =
    "accounts, transfers, payouts, beneficiaries, cards, cardholders, invoices, subscriptions, webhooks, reports";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Verb {
    List,
    Create,
    Delete,
}

impl Verb {
    fn about(self) -> &'static str {
        match self {
            Verb::List => "List any resource, e.g. `pay list transfers`",
            Verb::Create => "Create any resource, e.g. `pay create payout --data ...`",
            Verb::Delete => "Delete a resource, e.g. `pay delete webhook wh_123`",
        }
    }
}

/// Map the many spellings of a resource onto its kind
#[must_use]
pub fn parse_noun(word: &str) -> Option<ResourceKind> {
    match word.trim().to_lowercase().as_str() {
        "account" | "accounts" | "acc" => Some(ResourceKind::Account),
        "transfer" | "transfers" | "tfr" | "payout" | "payouts" | "payment" | "payments" => {
            Some(ResourceKind::Transfer)
        }
        "beneficiary" | "beneficiaries" | "ben" | "recipient" | "recipients" => {
            Some(ResourceKind::Beneficiary)
        }
        "card" | "cards" => Some(ResourceKind::Card),
        "cardholder" | "cardholders" | "card-holder" | "card-holders" => {
            Some(ResourceKind::Cardholder)
        }
        "invoice" | "invoices" | "inv" => Some(ResourceKind::Invoice),
        "subscription" | "subscriptions" | "sub" | "subs" => Some(ResourceKind::Subscription),
        "webhook" | "webhooks" | "wh" | "hook" | "hooks" => Some(ResourceKind::Webhook),
        "report" | "reports" | "rpt" => Some(ResourceKind::Report),
        _ => None,
    }
}

#[must_use]
pub fn supports(kind: ResourceKind, verb: Verb) -> bool {
    match verb {
        Verb::List => true,
        Verb::Create => kind != ResourceKind::Account,
        Verb::Delete => matches!(kind, ResourceKind::Beneficiary | ResourceKind::Webhook),
    }
}

/// The global flags to pass on to a re-dispatched command: exactly those the
/// user set, plus `--agent` when agent mode comes from the environment.
#[must_use]
pub fn forwarded_args(globals: &FlagSet, agent_env: bool) -> Vec<String> {
    let mut args = globals.explicit_args();
    if agent_env && !globals.was_set_via_canonical_or_alias("agent") {
        args.push("--agent".to_string());
    }
    args
}

/// The canonical command line for `verb noun rest…`
///
/// # Errors
/// [`AppError::UnknownNoun`] or [`AppError::UnsupportedVerb`].
pub fn rewrite(
    verb: Verb,
    noun: &str,
    rest: &[String],
    globals: &FlagSet,
    agent_env: bool,
) -> Result<Vec<String>, AppError> {
    let kind = parse_noun(noun).ok_or_else(|| AppError::UnknownNoun {
        noun: noun.to_string(),
        known: KNOWN_NOUNS.to_string(),
    })?;
    if !supports(kind, verb) {
        return Err(AppError::UnsupportedVerb {
            verb: verb.to_string(),
            noun: noun.to_string(),
        });
    }

    let verb = verb.to_string();
    let mut argv: Vec<String> = std::iter::once(BIN_NAME)
        .chain(kind.command_path().iter().copied())
        .chain(std::iter::once(verb.as_str()))
        .map(ToString::to_string)
        .collect();
    argv.extend(forwarded_args(globals, agent_env));
    argv.extend_from_slice(rest);
    Ok(argv)
}

#[must_use]
pub fn command(verb: Verb) -> CommandNode {
    let name = match verb {
        Verb::List => "list",
        Verb::Create => "create",
        Verb::Delete => "delete",
    };
    CommandNode::leaf(name, verb.about(), Arc::new(RouterCommand { verb })).positionals(&[
        Positional::required("noun", "Resource name, singular or plural"),
        Positional::trailing("args", "Passed on to the resource command"),
    ])
}

struct RouterCommand {
    verb: Verb,
}

#[async_trait]
impl CommandHandler for RouterCommand {
    async fn run(&self, ctx: &Context, inv: &Invocation) -> Result<(), AppError> {
        let noun = inv.arg(0).unwrap_or_default();
        let argv = rewrite(
            self.verb,
            noun,
            &inv.args[1..],
            &inv.globals,
            ctx.settings.agent_mode,
        )?;
        tracing::debug!(?argv, "re-dispatching {}", self.verb);
        super::run(ctx, argv).await
    }
}

// -- Tests ---------------------------------------------------------------------
