//! `pay beneficiaries`

use serde_json::Value;

use super::{date, CORE_FIELDS};
use crate::cli::builder::{
    build_get_command, build_list_command, build_payload_command, normalize_id, GetConfig,
    GetRequest, ListConfig, ListRequest, PayloadConfig, PayloadRequest,
};
use crate::cli::payload::PayloadMode;
use crate::cli::tree::{BoxFuture, CommandNode, Positional};
use crate::client::Api;
use crate::error::AppError;
use crate::model::{Beneficiary, ListResult};

const ID: Positional = Positional::required("id", "Beneficiary id");

/// # Errors
/// A construction error if a command is misconfigured.
pub fn command() -> Result<CommandNode, AppError> {
    Ok(
        CommandNode::group("beneficiaries", "People and businesses you pay")
            .aliases(&["beneficiary", "recipients"])
            .child(build_list_command(ListConfig {
                name: "list",
                about: "List beneficiaries",
                aliases: &["ls"],
                headers: &["ID", "NAME", "COUNTRY", "CURRENCY", "ACCOUNT"],
                column_types: None,
                row,
                empty_message: "No beneficiaries found.",
                positionals: &[],
                flags: None,
                normalize_limit: true,
                fetch: list,
            })?)
            .child(build_get_command(GetConfig {
                name: "get",
                about: "Show one beneficiary",
                aliases: &["show"],
                parents: &[],
                fetch: get,
                describe,
                core_fields: CORE_FIELDS,
            })?)
            .child(build_payload_command(PayloadConfig {
                name: "create",
                about: "Add a beneficiary from a JSON payload",
                aliases: &["new"],
                positionals: &[],
                mode: PayloadMode::Required,
                confirm: None,
                run: Some(create),
                success_message: Some(|b: &Beneficiary, _: &[String]| {
                    format!("Added beneficiary {} ({})", b.name, b.id)
                }),
            })?)
            .child(build_payload_command(PayloadConfig {
                name: "delete",
                about: "Remove a beneficiary",
                aliases: &["rm"],
                positionals: &[ID],
                mode: PayloadMode::None,
                confirm: Some(|args: &[String]| format!("Delete beneficiary {}?", args[0])),
                run: Some(delete),
                success_message: Some(|_: &Value, args: &[String]| {
                    format!("Deleted beneficiary {}", args[0])
                }),
            })?),
    )
}

fn list<'a>(
    api: Api<'a>,
    req: ListRequest<'a>,
) -> BoxFuture<'a, Result<ListResult<Beneficiary>, AppError>> {
    Box::pin(async move { api.beneficiaries(req.options).await })
}

fn get<'a>(api: Api<'a>, req: GetRequest<'a>) -> BoxFuture<'a, Result<Beneficiary, AppError>> {
    Box::pin(async move { api.beneficiary(&req.id).await })
}

fn create<'a>(
    api: Api<'a>,
    req: PayloadRequest<'a>,
) -> BoxFuture<'a, Result<Beneficiary, AppError>> {
    Box::pin(async move {
        let payload = req.payload.ok_or(AppError::PayloadMissing)?;
        api.create_beneficiary(&payload).await
    })
}

fn delete<'a>(api: Api<'a>, req: PayloadRequest<'a>) -> BoxFuture<'a, Result<Value, AppError>> {
    Box::pin(async move { api.delete_beneficiary(&normalize_id(&req.args[0])).await })
}

fn row(beneficiary: &Beneficiary) -> Vec<String> {
    vec![
        beneficiary.id.clone(),
        beneficiary.name.clone(),
        beneficiary.bank_country.clone(),
        beneficiary.currency.clone(),
        beneficiary.account_number.clone(),
    ]
}

pub(crate) fn describe(beneficiary: &Beneficiary) -> Vec<(&'static str, String)> {
    vec![
        ("id", beneficiary.id.clone()),
        ("name", beneficiary.name.clone()),
        ("bank country", beneficiary.bank_country.clone()),
        ("currency", beneficiary.currency.clone()),
        ("account number", beneficiary.account_number.clone()),
        ("created", date(beneficiary.created_at)),
    ]
}
