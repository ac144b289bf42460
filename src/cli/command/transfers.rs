//! `pay transfers`: payouts to beneficiaries

use super::{date, CORE_FIELDS};
use crate::cli::builder::{
    build_get_command, build_list_command, build_payload_command, normalize_id, GetConfig,
    GetRequest, ListConfig, ListRequest, PayloadConfig, PayloadRequest,
};
use crate::cli::flags::{Flag, FlagSet};
use crate::cli::output::ColumnType;
use crate::cli::payload::PayloadMode;
use crate::cli::tree::{BoxFuture, CommandNode, Positional};
use crate::client::Api;
use crate::error::AppError;
use crate::model::{format_money, ListResult, Transfer};

const ID: Positional = Positional::required("id", "Transfer id");

/// # Errors
/// A construction error if a command is misconfigured.
pub fn command() -> Result<CommandNode, AppError> {
    Ok(CommandNode::group("transfers", "Payouts to beneficiaries")
        .aliases(&["transfer", "payouts", "payout"])
        .child(build_list_command(ListConfig {
            name: "list",
            about: "List transfers, newest first",
            aliases: &["ls"],
            headers: &["ID", "AMOUNT", "STATUS", "REFERENCE", "CREATED"],
            column_types: Some(&[
                ColumnType::Id,
                ColumnType::Amount,
                ColumnType::Status,
                ColumnType::Text,
                ColumnType::Date,
            ]),
            row,
            empty_message: "No transfers found.",
            positionals: &[],
            flags: Some(filters),
            normalize_limit: true,
            fetch: list,
        })?)
        .child(build_get_command(GetConfig {
            name: "get",
            about: "Show one transfer",
            aliases: &["show"],
            parents: &[],
            fetch: get,
            describe,
            core_fields: CORE_FIELDS,
        })?)
        .child(build_payload_command(PayloadConfig {
            name: "create",
            about: "Create a transfer from a JSON payload",
            aliases: &["new"],
            positionals: &[],
            mode: PayloadMode::Required,
            confirm: None,
            run: Some(create),
            success_message: Some(|t: &Transfer, _: &[String]| {
                format!(
                    "Created transfer {} for {}",
                    t.id,
                    format_money(t.amount, &t.currency)
                )
            }),
        })?)
        .child(build_payload_command(PayloadConfig {
            name: "cancel",
            about: "Cancel a transfer that has not been paid out",
            aliases: &[],
            positionals: &[ID],
            mode: PayloadMode::Optional,
            confirm: Some(|args: &[String]| format!("Cancel transfer {}?", args[0])),
            run: Some(cancel),
            success_message: Some(|t: &Transfer, _: &[String]| {
                format!("Cancelled transfer {}", t.id)
            }),
        })?))
}

fn filters(flags: &mut FlagSet) -> Result<(), AppError> {
    flags.add(Flag::string("status", "", "Only transfers with this status"))?;
    flags.add(Flag::string("from-date", "", "Created on or after (YYYY-MM-DD)"))?;
    flags.register_alias("from-date", "since")?;
    flags.add(Flag::string("to-date", "", "Created before (YYYY-MM-DD)"))?;
    flags.register_alias("to-date", "until")?;
    Ok(())
}

fn list<'a>(
    api: Api<'a>,
    req: ListRequest<'a>,
) -> BoxFuture<'a, Result<ListResult<Transfer>, AppError>> {
    Box::pin(async move {
        let filters = req
            .inv
            .flags
            .query_pairs(&["status", "from-date", "to-date"]);
        api.transfers(req.options, filters).await
    })
}

fn get<'a>(api: Api<'a>, req: GetRequest<'a>) -> BoxFuture<'a, Result<Transfer, AppError>> {
    Box::pin(async move { api.transfer(&req.id).await })
}

fn create<'a>(api: Api<'a>, req: PayloadRequest<'a>) -> BoxFuture<'a, Result<Transfer, AppError>> {
    Box::pin(async move {
        let payload = req.payload.ok_or(AppError::PayloadMissing)?;
        api.create_transfer(&payload).await
    })
}

fn cancel<'a>(api: Api<'a>, req: PayloadRequest<'a>) -> BoxFuture<'a, Result<Transfer, AppError>> {
    Box::pin(async move {
        api.cancel_transfer(&normalize_id(&req.args[0]), req.payload.as_ref())
            .await
    })
}

fn row(transfer: &Transfer) -> Vec<String> {
    vec![
        transfer.id.clone(),
        format_money(transfer.amount, &transfer.currency),
        transfer.status.clone(),
        transfer.reference.clone(),
        date(transfer.created_at),
    ]
}

pub(crate) fn describe(transfer: &Transfer) -> Vec<(&'static str, String)> {
    vec![
        ("id", transfer.id.clone()),
        ("amount", format_money(transfer.amount, &transfer.currency)),
        ("status", transfer.status.clone()),
        ("reference", transfer.reference.clone()),
        ("from account", transfer.source_account_id.clone()),
        ("beneficiary", transfer.beneficiary_id.clone()),
        ("created", date(transfer.created_at)),
    ]
}

// -- Tests ---------------------------------------------------------------------
