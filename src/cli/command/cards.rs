//! `pay cards` and `pay cardholders`

use super::{date, CORE_FIELDS};
use crate::cli::builder::{
    build_get_command, build_list_command, build_payload_command, GetConfig, GetRequest,
    ListConfig, ListRequest, PayloadConfig, PayloadRequest,
};
use crate::cli::flags::{Flag, FlagSet};
use crate::cli::output::ColumnType;
use crate::cli::payload::PayloadMode;
use crate::cli::tree::{BoxFuture, CommandNode};
use crate::client::Api;
use crate::error::AppError;
use crate::model::{Card, Cardholder, ListResult};

/// # Errors
/// A construction error if a command is misconfigured.
pub fn cards_command() -> Result<CommandNode, AppError> {
    Ok(CommandNode::group("cards", "Issued cards")
        .aliases(&["card"])
        .child(build_list_command(ListConfig {
            name: "list",
            about: "List cards",
            aliases: &["ls"],
            headers: &["ID", "CARDHOLDER", "BRAND", "LAST4", "STATUS"],
            column_types: Some(&[
                ColumnType::Id,
                ColumnType::Id,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Status,
            ]),
            row: card_row,
            empty_message: "No cards found.",
            positionals: &[],
            flags: Some(card_filters),
            normalize_limit: true,
            fetch: list_cards,
        })?)
        .child(build_get_command(GetConfig {
            name: "get",
            about: "Show one card",
            aliases: &["show"],
            parents: &[],
            fetch: get_card,
            describe: describe_card,
            core_fields: CORE_FIELDS,
        })?)
        .child(build_payload_command(PayloadConfig {
            name: "create",
            about: "Issue a card from a JSON payload",
            aliases: &["new"],
            positionals: &[],
            mode: PayloadMode::Required,
            confirm: None,
            run: Some(create_card),
            success_message: Some(|c: &Card, _: &[String]| {
                format!("Issued {} card {} ending {}", c.brand, c.id, c.last4)
            }),
        })?))
}

/// # Errors
/// A construction error if a command is misconfigured.
pub fn cardholders_command() -> Result<CommandNode, AppError> {
    Ok(CommandNode::group("cardholders", "People cards are issued to")
        .aliases(&["cardholder"])
        .child(build_list_command(ListConfig {
            name: "list",
            about: "List cardholders",
            aliases: &["ls"],
            headers: &["ID", "NAME", "EMAIL", "STATUS"],
            column_types: Some(&[
                ColumnType::Id,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Status,
            ]),
            row: cardholder_row,
            empty_message: "No cardholders found.",
            positionals: &[],
            flags: None,
            normalize_limit: true,
            fetch: list_cardholders,
        })?)
        .child(build_get_command(GetConfig {
            name: "get",
            about: "Show one cardholder",
            aliases: &["show"],
            parents: &[],
            fetch: get_cardholder,
            describe: describe_cardholder,
            core_fields: CORE_FIELDS,
        })?)
        .child(build_payload_command(PayloadConfig {
            name: "create",
            about: "Add a cardholder from a JSON payload",
            aliases: &["new"],
            positionals: &[],
            mode: PayloadMode::Required,
            confirm: None,
            run: Some(create_cardholder),
            success_message: Some(|c: &Cardholder, _: &[String]| {
                format!("Added cardholder {} ({})", c.name, c.id)
            }),
        })?))
}

fn card_filters(flags: &mut FlagSet) -> Result<(), AppError> {
    flags.add(Flag::string("cardholder", "", "Only cards issued to this cardholder"))?;
    flags.register_alias("cardholder", "cardholder-id")?;
    flags.add(Flag::string("status", "", "Only cards with this status"))?;
    Ok(())
}

fn list_cards<'a>(
    api: Api<'a>,
    req: ListRequest<'a>,
) -> BoxFuture<'a, Result<ListResult<Card>, AppError>> {
    Box::pin(async move {
        let mut filters = req.inv.flags.query_pairs(&["status"]);
        if let Some(holder) = req
            .inv
            .flags
            .get_string("cardholder")
            .filter(|_| req.inv.flags.was_set_via_canonical_or_alias("cardholder"))
        {
            filters.push(("cardholder_id".to_string(), holder.to_string()));
        }
        api.cards(req.options, filters).await
    })
}

fn get_card<'a>(api: Api<'a>, req: GetRequest<'a>) -> BoxFuture<'a, Result<Card, AppError>> {
    Box::pin(async move { api.card(&req.id).await })
}

fn create_card<'a>(api: Api<'a>, req: PayloadRequest<'a>) -> BoxFuture<'a, Result<Card, AppError>> {
    Box::pin(async move {
        let payload = req.payload.ok_or(AppError::PayloadMissing)?;
        api.create_card(&payload).await
    })
}

fn list_cardholders<'a>(
    api: Api<'a>,
    req: ListRequest<'a>,
) -> BoxFuture<'a, Result<ListResult<Cardholder>, AppError>> {
    Box::pin(async move { api.cardholders(req.options).await })
}

fn get_cardholder<'a>(
    api: Api<'a>,
    req: GetRequest<'a>,
) -> BoxFuture<'a, Result<Cardholder, AppError>> {
    Box::pin(async move { api.cardholder(&req.id).await })
}

fn create_cardholder<'a>(
    api: Api<'a>,
    req: PayloadRequest<'a>,
) -> BoxFuture<'a, Result<Cardholder, AppError>> {
    Box::pin(async move {
        let payload = req.payload.ok_or(AppError::PayloadMissing)?;
        api.create_cardholder(&payload).await
    })
}

fn card_row(card: &Card) -> Vec<String> {
    vec![
        card.id.clone(),
        card.cardholder_id.clone(),
        card.brand.clone(),
        card.last4.clone(),
        card.status.clone(),
    ]
}

fn cardholder_row(holder: &Cardholder) -> Vec<String> {
    vec![
        holder.id.clone(),
        holder.name.clone(),
        holder.email.clone(),
        holder.status.clone(),
    ]
}

pub(crate) fn describe_card(card: &Card) -> Vec<(&'static str, String)> {
    vec![
        ("id", card.id.clone()),
        ("cardholder", card.cardholder_id.clone()),
        ("brand", card.brand.clone()),
        ("last 4", card.last4.clone()),
        ("status", card.status.clone()),
        ("created", date(card.created_at)),
    ]
}

pub(crate) fn describe_cardholder(holder: &Cardholder) -> Vec<(&'static str, String)> {
    vec![
        ("id", holder.id.clone()),
        ("name", holder.name.clone()),
        ("email", holder.email.clone()),
        ("status", holder.status.clone()),
        ("created", date(holder.created_at)),
    ]
}
