//! The `pay` command tree
//!
//! One module per resource group, each built from the generic builders, plus
//! the routers that rewrite shorthand invocations onto them.

use chrono::{DateTime, Utc};

use super::dispatch;
use super::flags::{Flag, FlagSet};
use super::router::{self, Verb};
use super::tree::CommandNode;
use super::BIN_NAME;
use crate::error::AppError;

pub mod accounts;
pub mod api;
pub mod beneficiaries;
pub mod billing;
pub mod cards;
pub mod reports;
pub mod transfers;
pub mod webhooks;

/// Shown by every `get` in text mode, even when empty
pub const CORE_FIELDS: &[&str] = &["id", "status"];

/// Flags accepted at any depth of the tree
///
/// # Errors
/// Only on a registry conflict, which is a bug in this function.
pub fn global_flags() -> Result<FlagSet, AppError> {
    let mut flags = FlagSet::new();
    flags.add(Flag::string("output", "", "Output format: text, json or jsonl").short('o'))?;
    flags.register_alias("output", "format")?;
    flags.add(Flag::string(
        "query",
        "",
        "Select part of the JSON output, e.g. `.items[0].id`",
    ))?;
    flags.register_alias("query", "jq")?;
    flags.add(Flag::bool("yes", "Skip confirmation prompts").short('y'))?;
    flags.register_alias("yes", "force")?;
    flags.add(Flag::bool(
        "agent",
        "Agent mode: JSON output without colour (also PAY_AGENT_MODE)",
    ))?;
    flags.add(Flag::bool("no-color", "Disable coloured output"))?;
    Ok(flags)
}

/// Build the whole command tree.
///
/// # Errors
/// A construction error if any command is misconfigured.
pub fn build_tree() -> Result<CommandNode, AppError> {
    Ok(
        CommandNode::group(BIN_NAME, "Command-line client for the payments API")
            .flags(global_flags()?)
            .child(accounts::command()?)
            .child(transfers::command()?)
            .child(beneficiaries::command()?)
            .child(cards::cards_command()?)
            .child(cards::cardholders_command()?)
            .child(billing::command()?)
            .child(webhooks::command()?)
            .child(reports::command()?)
            .child(router::command(Verb::List))
            .child(router::command(Verb::Create))
            .child(router::command(Verb::Delete))
            .child(dispatch::get_command())
            .child(dispatch::cancel_command())
            .child(api::command()?),
    )
}

fn date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(String::new, |d| d.format("%Y-%m-%d %H:%M").to_string())
}

fn day(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(String::new, |d| d.format("%Y-%m-%d").to_string())
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_builds_and_passes_clap_validation() {
        let tree = build_tree().unwrap();

        tree.to_clap(true).debug_assert();
    }

    #[test]
    fn dates_render_in_utc() {
        let value = "2024-06-11T09:31:12Z".parse::<DateTime<Utc>>().ok();

        assert_eq!(date(value), "2024-06-11 09:31");
        assert_eq!(day(None), "");
    }
}
