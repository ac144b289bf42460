//! `pay accounts`

use super::{date, CORE_FIELDS};
use crate::cli::builder::{
    build_get_command, build_list_command, GetConfig, GetRequest, ListConfig, ListRequest,
};
use crate::cli::output::ColumnType;
use crate::cli::tree::{BoxFuture, CommandNode};
use crate::client::Api;
use crate::error::AppError;
use crate::model::{Account, ListResult};

/// # Errors
/// A construction error if a command is misconfigured.
pub fn command() -> Result<CommandNode, AppError> {
    Ok(CommandNode::group("accounts", "Accounts held with the provider")
        .aliases(&["account"])
        .child(build_list_command(ListConfig {
            name: "list",
            about: "List accounts",
            aliases: &["ls"],
            headers: &["ID", "NAME", "CURRENCY", "STATUS", "NUMBER"],
            column_types: Some(&[
                ColumnType::Id,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Status,
                ColumnType::Text,
            ]),
            row,
            empty_message: "No accounts found.",
            positionals: &[],
            flags: None,
            normalize_limit: true,
            fetch: list,
        })?)
        .child(build_get_command(GetConfig {
            name: "get",
            about: "Show one account",
            aliases: &["show"],
            parents: &[],
            fetch: get,
            describe,
            core_fields: CORE_FIELDS,
        })?))
}

fn list<'a>(
    api: Api<'a>,
    req: ListRequest<'a>,
) -> BoxFuture<'a, Result<ListResult<Account>, AppError>> {
    Box::pin(async move { api.accounts(req.options).await })
}

fn get<'a>(api: Api<'a>, req: GetRequest<'a>) -> BoxFuture<'a, Result<Account, AppError>> {
    Box::pin(async move { api.account(&req.id).await })
}

fn row(account: &Account) -> Vec<String> {
    vec![
        account.id.clone(),
        account.name.clone(),
        account.currency.clone(),
        account.status.clone(),
        account.account_number.clone(),
    ]
}

pub(crate) fn describe(account: &Account) -> Vec<(&'static str, String)> {
    vec![
        ("id", account.id.clone()),
        ("name", account.name.clone()),
        ("currency", account.currency.clone()),
        ("status", account.status.clone()),
        ("account number", account.account_number.clone()),
        ("created", date(account.created_at)),
    ]
}
