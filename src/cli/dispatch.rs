//! Commands addressed by id alone
//!
//! `pay get <id>` works out the resource type from the id and fetches it;
//! `pay cancel <id>` re-runs as the owning group's `cancel` command.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::command::{
    accounts, beneficiaries, billing, cards, reports, transfers, webhooks, CORE_FIELDS,
};
use super::context::{Context, Invocation};
use super::ids::{cancelable_prefixes, CompositeKind, ResourceId, ResourceKind};
use super::router::forwarded_args;
use super::tree::{CommandHandler, CommandNode, Positional};
use super::{builder::kv_pairs, BIN_NAME};
use crate::client::{Api, ApiClient};
use crate::error::AppError;
use crate::model::{
    Account, Beneficiary, Card, Cardholder, Invoice, InvoiceItem, Report, Subscription,
    SubscriptionItem, Transfer, Webhook,
};

/// Any resource `pay get` can return
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    Account(Account),
    Transfer(Transfer),
    Beneficiary(Beneficiary),
    Card(Card),
    Cardholder(Cardholder),
    Invoice(Invoice),
    InvoiceItem(InvoiceItem),
    Subscription(Subscription),
    SubscriptionItem(SubscriptionItem),
    Webhook(Webhook),
    Report(Report),
}

impl Resource {
    #[must_use]
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        match self {
            Resource::Account(v) => accounts::describe(v),
            Resource::Transfer(v) => transfers::describe(v),
            Resource::Beneficiary(v) => beneficiaries::describe(v),
            Resource::Card(v) => cards::describe_card(v),
            Resource::Cardholder(v) => cards::describe_cardholder(v),
            Resource::Invoice(v) => billing::describe_invoice(v),
            Resource::InvoiceItem(v) => billing::describe_invoice_item(v),
            Resource::Subscription(v) => billing::describe_subscription(v),
            Resource::SubscriptionItem(v) => billing::describe_subscription_item(v),
            Resource::Webhook(v) => webhooks::describe(v),
            Resource::Report(v) => reports::describe(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub resource: Resource,
    /// The canonical command for the same lookup
    pub command: String,
}

/// Fetch whatever `raw` identifies.
///
/// # Errors
/// Identifier errors before any request, otherwise the API's error.
#[tracing::instrument(name = "Dispatch by id", skip(client))]
pub async fn dispatch(client: &dyn ApiClient, raw: &str) -> Result<Dispatched, AppError> {
    let id = ResourceId::parse(raw)?;
    let command = id.command("get");
    let api = Api::new(client);

    let resource = match &id {
        ResourceId::Simple { kind, id } => match kind {
            ResourceKind::Account => Resource::Account(api.account(id).await?),
            ResourceKind::Transfer => Resource::Transfer(api.transfer(id).await?),
            ResourceKind::Beneficiary => Resource::Beneficiary(api.beneficiary(id).await?),
            ResourceKind::Card => Resource::Card(api.card(id).await?),
            ResourceKind::Cardholder => Resource::Cardholder(api.cardholder(id).await?),
            ResourceKind::Invoice => Resource::Invoice(api.invoice(id).await?),
            ResourceKind::Subscription => Resource::Subscription(api.subscription(id).await?),
            ResourceKind::Webhook => Resource::Webhook(api.webhook(id).await?),
            ResourceKind::Report => Resource::Report(api.report(id).await?),
        },
        ResourceId::Composite {
            kind,
            parent,
            child,
        } => match kind {
            CompositeKind::InvoiceItem => {
                Resource::InvoiceItem(api.invoice_item(parent, child).await?)
            }
            CompositeKind::SubscriptionItem => {
                Resource::SubscriptionItem(api.subscription_item(parent, child).await?)
            }
        },
    };

    Ok(Dispatched { resource, command })
}

#[must_use]
pub fn get_command() -> CommandNode {
    CommandNode::leaf("get", "Show any resource by its id", Arc::new(GetById)).positionals(&[
        Positional::required("id", "e.g. tfr_123, or inv_1:item_2 for an invoice item"),
    ])
}

#[must_use]
pub fn cancel_command() -> CommandNode {
    CommandNode::leaf(
        "cancel",
        "Cancel a transfer, invoice or subscription by its id",
        Arc::new(CancelById),
    )
    .positionals(&[
        Positional::required("id", "Transfer, invoice or subscription id"),
        Positional::trailing("args", "Passed on to the cancel command"),
    ])
}

struct GetById;

#[async_trait]
impl CommandHandler for GetById {
    async fn run(&self, ctx: &Context, inv: &Invocation) -> Result<(), AppError> {
        let raw = inv.arg(0).unwrap_or_default();
        let dispatched = ctx
            .cancellable(dispatch(ctx.client.as_ref(), raw))
            .await?;

        let options = &inv.options;
        if ctx.output.is_structured(options) {
            return ctx.output.render_raw(options, &dispatched.resource);
        }
        let pairs = kv_pairs(dispatched.resource.describe(), CORE_FIELDS);
        ctx.output.render_kv(options, &pairs)?;
        ctx.output
            .hint(options, &format!("Canonical command: {}", dispatched.command))
    }
}

struct CancelById;

#[async_trait]
impl CommandHandler for CancelById {
    async fn run(&self, ctx: &Context, inv: &Invocation) -> Result<(), AppError> {
        let raw = inv.arg(0).unwrap_or_default();
        let argv = cancel_argv(raw, &inv.args[1..], inv, ctx.settings.agent_mode)?;
        tracing::debug!(?argv, "re-dispatching cancel");
        super::run(ctx, argv).await
    }
}

fn cancel_argv(
    raw: &str,
    rest: &[String],
    inv: &Invocation,
    agent_env: bool,
) -> Result<Vec<String>, AppError> {
    let not_cancelable = || AppError::NotCancelable {
        id: raw.to_string(),
        supported: cancelable_prefixes(),
    };

    let (kind, id) = match ResourceId::parse(raw) {
        Ok(ResourceId::Simple { kind, id }) if kind.is_cancelable() => (kind, id),
        Ok(_) => return Err(not_cancelable()),
        Err(AppError::UnknownId { .. }) => return Err(not_cancelable()),
        Err(e) => return Err(e),
    };

    let mut argv: Vec<String> = std::iter::once(BIN_NAME)
        .chain(kind.command_path().iter().copied())
        .chain(["cancel"])
        .map(ToString::to_string)
        .collect();
    argv.push(id);
    argv.extend(forwarded_args(&inv.globals, agent_env));
    argv.extend_from_slice(rest);
    Ok(argv)
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::cli;
    use crate::tests::test::{argv, harness, harness_with, ScriptedPrompter, StubClient};

    fn client() -> StubClient {
        StubClient::new()
            .respond(
                Method::GET,
                "billing/invoices/inv_1/items/item_2",
                json!({"id": "item_2", "invoice_id": "inv_1", "quantity": 1}),
            )
            .respond(
                Method::GET,
                "cardholders/card_holder_xyz",
                json!({"id": "card_holder_xyz", "name": "Ada", "status": "active"}),
            )
            .respond(
                Method::POST,
                "transfers/tfr_1/cancel",
                json!({"id": "tfr_1", "status": "cancelled"}),
            )
    }

    #[tokio::test]
    async fn composite_id_reaches_the_invoice_item() {
        // Arrange
        let h = harness(client());

        // Act
        let dispatched = dispatch(h.client.as_ref(), "inv_1:item_2").await.unwrap();

        // Assert
        assert_eq!(dispatched.command, "pay billing invoices items get inv_1 item_2");
        assert!(matches!(dispatched.resource, Resource::InvoiceItem(ref i) if i.id == "item_2"));
    }

    #[tokio::test]
    async fn cardholder_prefix_beats_card_prefix() {
        let h = harness(client());

        let dispatched = dispatch(h.client.as_ref(), "card_holder_xyz").await.unwrap();

        assert!(matches!(dispatched.resource, Resource::Cardholder(_)));
        assert_eq!(h.client.calls()[0].path, "cardholders/card_holder_xyz");
    }

    #[tokio::test]
    async fn unknown_id_makes_no_request() {
        let h = harness(client());

        let err = dispatch(h.client.as_ref(), "zzz_1").await.unwrap_err();

        assert!(matches!(err, AppError::UnknownId { .. }));
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn get_prints_fields_and_canonical_command() {
        // Arrange
        let h = harness(client());

        // Act
        cli::run(&h.ctx, argv(&["get", "card_holder_xyz"]))
            .await
            .unwrap();

        // Assert
        assert_eq!(h.out.contents(), "id:      card_holder_xyz\nname:    Ada\nstatus:  active\n");
        assert_eq!(
            h.err.contents(),
            "Canonical command: pay cardholders get card_holder_xyz\n"
        );
    }

    #[tokio::test]
    async fn get_in_json_mode_prints_only_the_resource() {
        let h = harness(client());

        cli::run(&h.ctx, argv(&["get", "inv_1:item_2", "--output", "json"]))
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&h.out.contents()).unwrap();
        assert_eq!(value["invoice_id"], "inv_1");
        assert_eq!(h.err.contents(), "");
    }

    #[tokio::test]
    async fn cancel_is_rewritten_to_the_group_command() {
        // Arrange
        let h = harness(client());

        // Act
        cli::run(&h.ctx, argv(&["--yes", "cancel", "tfr_1"]))
            .await
            .unwrap();

        // Assert
        let calls = h.client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].path, "transfers/tfr_1/cancel");
        assert_eq!(h.err.contents(), "✓ Cancelled transfer tfr_1\n");
    }

    #[tokio::test]
    async fn cancel_forwards_trailing_args_to_the_payload() {
        let prompter = Arc::new(ScriptedPrompter::new(true, true));
        let h = harness_with(client(), prompter.clone());

        cli::run(
            &h.ctx,
            argv(&["cancel", "tfr_1", "--data", r#"{"reason": "duplicate"}"#]),
        )
        .await
        .unwrap();

        assert_eq!(prompter.prompts(), vec!["Cancel transfer tfr_1?".to_string()]);
        assert_eq!(
            h.client.calls()[0].body,
            Some(json!({"reason": "duplicate"}))
        );
    }

    #[tokio::test]
    async fn only_cancelable_kinds_are_accepted() {
        let h = harness(client());

        let webhook = cli::run(&h.ctx, argv(&["cancel", "wh_1"])).await.unwrap_err();
        let composite = cli::run(&h.ctx, argv(&["cancel", "inv_1:item_2"])).await.unwrap_err();

        assert!(matches!(webhook, AppError::NotCancelable { ref supported, .. } if supported == "tfr_, inv_, sub_"));
        assert!(matches!(composite, AppError::NotCancelable { .. }));
        assert!(h.client.calls().is_empty());
    }
}
