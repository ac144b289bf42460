//! `pay webhooks`

use serde_json::Value;

use super::{date, CORE_FIELDS};
use crate::cli::builder::{
    build_get_command, build_list_command, build_payload_command, normalize_id, GetConfig,
    GetRequest, ListConfig, ListRequest, PayloadConfig, PayloadRequest,
};
use crate::cli::output::ColumnType;
use crate::cli::payload::PayloadMode;
use crate::cli::tree::{BoxFuture, CommandNode, Positional};
use crate::client::Api;
use crate::error::AppError;
use crate::model::{ListResult, Webhook};

const ID: Positional = Positional::required("id", "Webhook id");

/// # Errors
/// A construction error if a command is misconfigured.
pub fn command() -> Result<CommandNode, AppError> {
    Ok(CommandNode::group("webhooks", "Event delivery endpoints")
        .aliases(&["webhook"])
        .child(build_list_command(ListConfig {
            name: "list",
            about: "List webhook endpoints",
            aliases: &["ls"],
            headers: &["ID", "URL", "EVENTS", "STATUS"],
            column_types: Some(&[
                ColumnType::Id,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Status,
            ]),
            row,
            empty_message: "No webhooks found.",
            positionals: &[],
            flags: None,
            normalize_limit: true,
            fetch: list,
        })?)
        .child(build_get_command(GetConfig {
            name: "get",
            about: "Show one webhook endpoint",
            aliases: &["show"],
            parents: &[],
            fetch: get,
            describe,
            core_fields: CORE_FIELDS,
        })?)
        .child(build_payload_command(PayloadConfig {
            name: "create",
            about: "Register a webhook endpoint from a JSON payload",
            aliases: &["new"],
            positionals: &[],
            mode: PayloadMode::Required,
            confirm: None,
            run: Some(create),
            success_message: Some(|w: &Webhook, _: &[String]| {
                format!("Created webhook {} for {}", w.id, w.url)
            }),
        })?)
        .child(build_payload_command(PayloadConfig {
            name: "delete",
            about: "Remove a webhook endpoint",
            aliases: &["rm"],
            positionals: &[ID],
            mode: PayloadMode::None,
            confirm: Some(|args: &[String]| format!("Delete webhook {}?", args[0])),
            run: Some(delete),
            success_message: Some(|_: &Value, args: &[String]| {
                format!("Deleted webhook {}", args[0])
            }),
        })?))
}

fn list<'a>(
    api: Api<'a>,
    req: ListRequest<'a>,
) -> BoxFuture<'a, Result<ListResult<Webhook>, AppError>> {
    Box::pin(async move { api.webhooks(req.options).await })
}

fn get<'a>(api: Api<'a>, req: GetRequest<'a>) -> BoxFuture<'a, Result<Webhook, AppError>> {
    Box::pin(async move { api.webhook(&req.id).await })
}

fn create<'a>(api: Api<'a>, req: PayloadRequest<'a>) -> BoxFuture<'a, Result<Webhook, AppError>> {
    Box::pin(async move {
        let payload = req.payload.ok_or(AppError::PayloadMissing)?;
        api.create_webhook(&payload).await
    })
}

fn delete<'a>(api: Api<'a>, req: PayloadRequest<'a>) -> BoxFuture<'a, Result<Value, AppError>> {
    Box::pin(async move { api.delete_webhook(&normalize_id(&req.args[0])).await })
}

fn row(webhook: &Webhook) -> Vec<String> {
    vec![
        webhook.id.clone(),
        webhook.url.clone(),
        webhook.events.join(","),
        webhook.status.clone(),
    ]
}

pub(crate) fn describe(webhook: &Webhook) -> Vec<(&'static str, String)> {
    vec![
        ("id", webhook.id.clone()),
        ("url", webhook.url.clone()),
        ("events", webhook.events.join(", ")),
        ("status", webhook.status.clone()),
        ("created", date(webhook.created_at)),
    ]
}

// -- Tests ---------------------------------------------------------------------
