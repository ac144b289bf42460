//! `pay billing`: invoices, subscriptions and their items

use super::{date, day, CORE_FIELDS};
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
use crate::model::{
    format_money, Invoice, InvoiceItem, ListResult, Subscription, SubscriptionItem,
};

const INVOICE: Positional = Positional::required("invoice", "Invoice id");
const SUBSCRIPTION: Positional = Positional::required("subscription", "Subscription id");
const INVOICE_ID: Positional = Positional::required("id", "Invoice id");
const SUBSCRIPTION_ID: Positional = Positional::required("id", "Subscription id");

/// # Errors
/// A construction error if a command is misconfigured.
pub fn command() -> Result<CommandNode, AppError> {
    Ok(CommandNode::group("billing", "Invoices and subscriptions")
        .child(invoices()?)
        .child(subscriptions()?))
}

fn invoices() -> Result<CommandNode, AppError> {
    Ok(CommandNode::group("invoices", "Invoices")
        .aliases(&["invoice"])
        .child(build_list_command(ListConfig {
            name: "list",
            about: "List invoices",
            aliases: &["ls"],
            headers: &["ID", "CUSTOMER", "AMOUNT DUE", "STATUS", "DUE"],
            column_types: Some(&[
                ColumnType::Id,
                ColumnType::Text,
                ColumnType::Amount,
                ColumnType::Status,
                ColumnType::Date,
            ]),
            row: invoice_row,
            empty_message: "No invoices found.",
            positionals: &[],
            flags: Some(billing_filters),
            normalize_limit: true,
            fetch: list_invoices,
        })?)
        .child(build_get_command(GetConfig {
            name: "get",
            about: "Show one invoice",
            aliases: &["show"],
            parents: &[],
            fetch: get_invoice,
            describe: describe_invoice,
            core_fields: CORE_FIELDS,
        })?)
        .child(build_payload_command(PayloadConfig {
            name: "create",
            about: "Create an invoice from a JSON payload",
            aliases: &["new"],
            positionals: &[],
            mode: PayloadMode::Required,
            confirm: None,
            run: Some(create_invoice),
            success_message: Some(|i: &Invoice, _: &[String]| {
                format!(
                    "Created invoice {} for {}",
                    i.id,
                    format_money(i.amount_due, &i.currency)
                )
            }),
        })?)
        .child(build_payload_command(PayloadConfig {
            name: "cancel",
            about: "Void an open invoice",
            aliases: &["void"],
            positionals: &[INVOICE_ID],
            mode: PayloadMode::Optional,
            confirm: Some(|args: &[String]| format!("Void invoice {}?", args[0])),
            run: Some(cancel_invoice),
            success_message: Some(|i: &Invoice, _: &[String]| format!("Voided invoice {}", i.id)),
        })?)
        .child(
            CommandNode::group("items", "Line items of an invoice")
                .aliases(&["item"])
                .child(build_list_command(ListConfig {
                    name: "list",
                    about: "List the items of an invoice",
                    aliases: &["ls"],
                    headers: &["ID", "DESCRIPTION", "QTY", "UNIT AMOUNT"],
                    column_types: Some(&[
                        ColumnType::Id,
                        ColumnType::Text,
                        ColumnType::Text,
                        ColumnType::Amount,
                    ]),
                    row: invoice_item_row,
                    empty_message: "No items on this invoice.",
                    positionals: &[INVOICE],
                    flags: None,
                    normalize_limit: true,
                    fetch: list_invoice_items,
                })?)
                .child(build_get_command(GetConfig {
                    name: "get",
                    about: "Show one invoice item",
                    aliases: &["show"],
                    parents: &[INVOICE],
                    fetch: get_invoice_item,
                    describe: describe_invoice_item,
                    core_fields: &["id"],
                })?),
        ))
}

fn subscriptions() -> Result<CommandNode, AppError> {
    Ok(CommandNode::group("subscriptions", "Recurring subscriptions")
        .aliases(&["subscription", "subs"])
        .child(build_list_command(ListConfig {
            name: "list",
            about: "List subscriptions",
            aliases: &["ls"],
            headers: &["ID", "CUSTOMER", "PLAN", "STATUS", "PERIOD END"],
            column_types: Some(&[
                ColumnType::Id,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Status,
                ColumnType::Date,
            ]),
            row: subscription_row,
            empty_message: "No subscriptions found.",
            positionals: &[],
            flags: Some(billing_filters),
            normalize_limit: true,
            fetch: list_subscriptions,
        })?)
        .child(build_get_command(GetConfig {
            name: "get",
            about: "Show one subscription",
            aliases: &["show"],
            parents: &[],
            fetch: get_subscription,
            describe: describe_subscription,
            core_fields: CORE_FIELDS,
        })?)
        .child(build_payload_command(PayloadConfig {
            name: "create",
            about: "Start a subscription from a JSON payload",
            aliases: &["new"],
            positionals: &[],
            mode: PayloadMode::Required,
            confirm: None,
            run: Some(create_subscription),
            success_message: Some(|s: &Subscription, _: &[String]| {
                format!("Started subscription {} on {}", s.id, s.plan)
            }),
        })?)
        .child(build_payload_command(PayloadConfig {
            name: "cancel",
            about: "Cancel a subscription",
            aliases: &[],
            positionals: &[SUBSCRIPTION_ID],
            mode: PayloadMode::Optional,
            confirm: Some(|args: &[String]| format!("Cancel subscription {}?", args[0])),
            run: Some(cancel_subscription),
            success_message: Some(|s: &Subscription, _: &[String]| {
                format!("Cancelled subscription {}", s.id)
            }),
        })?)
        .child(
            CommandNode::group("items", "Items of a subscription")
                .aliases(&["item"])
                .child(build_list_command(ListConfig {
                    name: "list",
                    about: "List the items of a subscription",
                    aliases: &["ls"],
                    headers: &["ID", "PRICE", "QTY"],
                    column_types: None,
                    row: subscription_item_row,
                    empty_message: "No items on this subscription.",
                    positionals: &[SUBSCRIPTION],
                    flags: None,
                    normalize_limit: true,
                    fetch: list_subscription_items,
                })?)
                .child(build_get_command(GetConfig {
                    name: "get",
                    about: "Show one subscription item",
                    aliases: &["show"],
                    parents: &[SUBSCRIPTION],
                    fetch: get_subscription_item,
                    describe: describe_subscription_item,
                    core_fields: &["id"],
                })?),
        ))
}

fn billing_filters(flags: &mut FlagSet) -> Result<(), AppError> {
    flags.add(Flag::string("status", "", "Only records with this status"))?;
    flags.add(Flag::string("customer", "", "Only records of this customer"))?;
    flags.register_alias("customer", "customer-id")
}

fn billing_query(req: &ListRequest<'_>) -> Vec<(String, String)> {
    req.inv
        .flags
        .query_pairs(&["status", "customer"])
        .into_iter()
        .map(|(key, value)| match key.as_str() {
            "customer" => ("customer_id".to_string(), value),
            _ => (key, value),
        })
        .collect()
}

// The parent id is the first positional of an items command
fn parent(req: &ListRequest<'_>) -> Result<String, AppError> {
    req.inv
        .arg(0)
        .map(normalize_id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Error("a parent id is required".to_string()))
}

fn list_invoices<'a>(
    api: Api<'a>,
    req: ListRequest<'a>,
) -> BoxFuture<'a, Result<ListResult<Invoice>, AppError>> {
    Box::pin(async move { api.invoices(req.options, billing_query(&req)).await })
}

fn get_invoice<'a>(api: Api<'a>, req: GetRequest<'a>) -> BoxFuture<'a, Result<Invoice, AppError>> {
    Box::pin(async move { api.invoice(&req.id).await })
}

fn create_invoice<'a>(
    api: Api<'a>,
    req: PayloadRequest<'a>,
) -> BoxFuture<'a, Result<Invoice, AppError>> {
    Box::pin(async move {
        let payload = req.payload.ok_or(AppError::PayloadMissing)?;
        api.create_invoice(&payload).await
    })
}

fn cancel_invoice<'a>(
    api: Api<'a>,
    req: PayloadRequest<'a>,
) -> BoxFuture<'a, Result<Invoice, AppError>> {
    Box::pin(async move {
        api.cancel_invoice(&normalize_id(&req.args[0]), req.payload.as_ref())
            .await
    })
}

fn list_invoice_items<'a>(
    api: Api<'a>,
    req: ListRequest<'a>,
) -> BoxFuture<'a, Result<ListResult<InvoiceItem>, AppError>> {
    Box::pin(async move {
        let invoice = parent(&req)?;
        api.invoice_items(&invoice, req.options).await
    })
}

fn get_invoice_item<'a>(
    api: Api<'a>,
    req: GetRequest<'a>,
) -> BoxFuture<'a, Result<InvoiceItem, AppError>> {
    Box::pin(async move { api.invoice_item(&req.parents[0], &req.id).await })
}

fn list_subscriptions<'a>(
    api: Api<'a>,
    req: ListRequest<'a>,
) -> BoxFuture<'a, Result<ListResult<Subscription>, AppError>> {
    Box::pin(async move { api.subscriptions(req.options, billing_query(&req)).await })
}

fn get_subscription<'a>(
    api: Api<'a>,
    req: GetRequest<'a>,
) -> BoxFuture<'a, Result<Subscription, AppError>> {
    Box::pin(async move { api.subscription(&req.id).await })
}

fn create_subscription<'a>(
    api: Api<'a>,
    req: PayloadRequest<'a>,
) -> BoxFuture<'a, Result<Subscription, AppError>> {
    Box::pin(async move {
        let payload = req.payload.ok_or(AppError::PayloadMissing)?;
        api.create_subscription(&payload).await
    })
}

fn cancel_subscription<'a>(
    api: Api<'a>,
    req: PayloadRequest<'a>,
) -> BoxFuture<'a, Result<Subscription, AppError>> {
    Box::pin(async move {
        api.cancel_subscription(&normalize_id(&req.args[0]), req.payload.as_ref())
            .await
    })
}

fn list_subscription_items<'a>(
    api: Api<'a>,
    req: ListRequest<'a>,
) -> BoxFuture<'a, Result<ListResult<SubscriptionItem>, AppError>> {
    Box::pin(async move {
        let subscription = parent(&req)?;
        api.subscription_items(&subscription, req.options).await
    })
}

fn get_subscription_item<'a>(
    api: Api<'a>,
    req: GetRequest<'a>,
) -> BoxFuture<'a, Result<SubscriptionItem, AppError>> {
    Box::pin(async move { api.subscription_item(&req.parents[0], &req.id).await })
}

fn invoice_row(invoice: &Invoice) -> Vec<String> {
    vec![
        invoice.id.clone(),
        invoice.customer_id.clone(),
        format_money(invoice.amount_due, &invoice.currency),
        invoice.status.clone(),
        invoice.due_date.clone().unwrap_or_default(),
    ]
}

fn invoice_item_row(item: &InvoiceItem) -> Vec<String> {
    vec![
        item.id.clone(),
        item.description.clone(),
        item.quantity.to_string(),
        format_money(item.unit_amount, &item.currency),
    ]
}

fn subscription_row(subscription: &Subscription) -> Vec<String> {
    vec![
        subscription.id.clone(),
        subscription.customer_id.clone(),
        subscription.plan.clone(),
        subscription.status.clone(),
        day(subscription.current_period_end),
    ]
}

fn subscription_item_row(item: &SubscriptionItem) -> Vec<String> {
    vec![item.id.clone(), item.price_id.clone(), item.quantity.to_string()]
}

pub(crate) fn describe_invoice(invoice: &Invoice) -> Vec<(&'static str, String)> {
    vec![
        ("id", invoice.id.clone()),
        ("customer", invoice.customer_id.clone()),
        ("amount due", format_money(invoice.amount_due, &invoice.currency)),
        ("status", invoice.status.clone()),
        ("due", invoice.due_date.clone().unwrap_or_default()),
        ("created", date(invoice.created_at)),
    ]
}

pub(crate) fn describe_invoice_item(item: &InvoiceItem) -> Vec<(&'static str, String)> {
    vec![
        ("id", item.id.clone()),
        ("invoice", item.invoice_id.clone()),
        ("description", item.description.clone()),
        ("quantity", item.quantity.to_string()),
        ("unit amount", format_money(item.unit_amount, &item.currency)),
    ]
}

pub(crate) fn describe_subscription(subscription: &Subscription) -> Vec<(&'static str, String)> {
    vec![
        ("id", subscription.id.clone()),
        ("customer", subscription.customer_id.clone()),
        ("plan", subscription.plan.clone()),
        ("status", subscription.status.clone()),
        ("period end", day(subscription.current_period_end)),
    ]
}

pub(crate) fn describe_subscription_item(item: &SubscriptionItem) -> Vec<(&'static str, String)> {
    vec![
        ("id", item.id.clone()),
        ("subscription", item.subscription_id.clone()),
        ("price", item.price_id.clone()),
        ("quantity", item.quantity.to_string()),
    ]
}

// -- Tests ---------------------------------------------------------------------
