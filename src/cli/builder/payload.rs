//! Payload command builder: create, cancel, delete and friends

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::payload_flags;
use crate::cli::confirm::confirm;
use crate::cli::context::{Context, Invocation};
use crate::cli::flags::FlagSet;
use crate::cli::payload::{load_payload, Payload, PayloadMode};
use crate::cli::tree::{BoxFuture, CommandHandler, CommandNode, Positional};
use crate::client::Api;
use crate::error::AppError;

pub struct PayloadRequest<'a> {
    /// Positional arguments in declaration order
    pub args: &'a [String],
    pub payload: Option<Payload>,
    pub inv: &'a Invocation,
}

pub type PayloadRun<R> =
    for<'a> fn(Api<'a>, PayloadRequest<'a>) -> BoxFuture<'a, Result<R, AppError>>;

pub struct PayloadConfig<R> {
    pub name: &'static str,
    pub about: &'static str,
    pub aliases: &'static [&'static str],
    pub positionals: &'static [Positional],
    pub mode: PayloadMode,
    /// Builds the confirmation prompt; commands without one never prompt
    pub confirm: Option<fn(&[String]) -> String>,
    pub run: Option<PayloadRun<R>>,
    pub success_message: Option<fn(&R, &[String]) -> String>,
}

/// Build a command that sends a payload (or none) and reports the result.
///
/// # Errors
/// A construction error when `run` is missing.
pub fn build_payload_command<R>(config: PayloadConfig<R>) -> Result<CommandNode, AppError>
where
    R: Serialize + Send + Sync + 'static,
{
    let run = config.run.ok_or_else(|| {
        AppError::Construction(format!("`{}` has no run function", config.name))
    })?;

    let flags = match config.mode {
        PayloadMode::None => FlagSet::new(),
        PayloadMode::Required | PayloadMode::Optional => payload_flags()?,
    };

    let (name, about, aliases, positionals) =
        (config.name, config.about, config.aliases, config.positionals);

    Ok(
        CommandNode::leaf(name, about, Arc::new(PayloadCommand { config, run }))
            .aliases(aliases)
            .flags(flags)
            .positionals(positionals),
    )
}

struct PayloadCommand<R> {
    config: PayloadConfig<R>,
    run: PayloadRun<R>,
}

#[async_trait]
impl<R> CommandHandler for PayloadCommand<R>
where
    R: Serialize + Send + Sync + 'static,
{
    async fn run(&self, ctx: &Context, inv: &Invocation) -> Result<(), AppError> {
        let options = &inv.options;

        // A bad payload fails before anyone is asked to confirm
        let payload = load_payload(ctx, &inv.flags, self.config.mode).await?;

        if let Some(prompt) = self.config.confirm {
            if !confirm(ctx, options, &prompt(&inv.args)).await? {
                return ctx.output.info("Aborted.");
            }
        }

        let request = PayloadRequest {
            args: &inv.args,
            payload,
            inv,
        };
        let api = Api::new(ctx.client.as_ref());
        let result = ctx.cancellable((self.run)(api, request)).await?;

        if ctx.output.is_structured(options) {
            return ctx.output.render_raw(options, &result);
        }
        let message = self
            .config
            .success_message
            .map_or_else(|| "Done.".to_string(), |f| f(&result, &inv.args));
        ctx.output.success(options, &message)
    }
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::{json, Value};

    use super::*;
    use crate::cli::command::global_flags;
    use crate::tests::test::{argv, harness, harness_with, ScriptedPrompter, StubClient};

    const ID: Positional = Positional::required("id", "Webhook id");

    fn delete<'a>(api: Api<'a>, req: PayloadRequest<'a>) -> BoxFuture<'a, Result<Value, AppError>> {
        Box::pin(async move { api.delete_webhook(&req.args[0]).await })
    }

    fn create<'a>(api: Api<'a>, req: PayloadRequest<'a>) -> BoxFuture<'a, Result<Value, AppError>> {
        Box::pin(async move {
            let body = req.payload.map(Value::Object);
            api.client().post("webhooks", body.as_ref()).await
        })
    }

    fn delete_config() -> PayloadConfig<Value> {
        PayloadConfig {
            name: "delete",
            about: "Delete a webhook",
            aliases: &[],
            positionals: &[ID],
            mode: PayloadMode::None,
            confirm: Some(|args: &[String]| format!("Delete webhook {}?", args[0])),
            run: Some(delete),
            success_message: Some(|_: &Value, args: &[String]| format!("Deleted webhook {}", args[0])),
        }
    }

    fn create_config() -> PayloadConfig<Value> {
        PayloadConfig {
            name: "create",
            about: "Create a webhook",
            aliases: &[],
            positionals: &[],
            mode: PayloadMode::Required,
            confirm: None,
            run: Some(create),
            success_message: None,
        }
    }

    fn tree(config: PayloadConfig<Value>) -> CommandNode {
        CommandNode::group("pay", "test")
            .flags(global_flags().unwrap())
            .child(
                CommandNode::group("webhooks", "Webhooks")
                    .child(build_payload_command(config).unwrap()),
            )
    }

    fn client() -> StubClient {
        StubClient::new()
            .respond(Method::DELETE, "webhooks/wh_1", json!({"id": "wh_1", "deleted": true}))
            .respond(Method::POST, "webhooks", json!({"id": "wh_2"}))
    }

    #[test]
    fn missing_run_fails_construction() {
        let config = PayloadConfig {
            run: None,
            ..delete_config()
        };

        let err = build_payload_command(config).err().unwrap();

        assert!(matches!(err, AppError::Construction(_)));
    }

    #[tokio::test]
    async fn declined_confirmation_makes_no_call() {
        // Arrange
        let prompter = Arc::new(ScriptedPrompter::new(true, false));
        let h = harness_with(client(), prompter.clone());

        // Act
        tree(delete_config())
            .execute(&h.ctx, argv(&["webhooks", "delete", "wh_1"]))
            .await
            .unwrap();

        // Assert
        assert_eq!(prompter.prompts(), vec!["Delete webhook wh_1?".to_string()]);
        assert!(h.client.calls().is_empty());
        assert_eq!(h.err.contents(), "Aborted.\n");
    }

    #[tokio::test]
    async fn yes_runs_without_prompting_and_reports_success() {
        let h = harness(client());

        tree(delete_config())
            .execute(&h.ctx, argv(&["webhooks", "delete", "wh_1", "--force"]))
            .await
            .unwrap();

        assert_eq!(h.client.calls()[0].method, Method::DELETE);
        assert_eq!(h.out.contents(), "");
        assert_eq!(h.err.contents(), "✓ Deleted webhook wh_1\n");
    }

    #[tokio::test]
    async fn structured_mode_emits_the_result() {
        let h = harness(client());

        tree(create_config())
            .execute(
                &h.ctx,
                argv(&["webhooks", "create", "--data", r#"{"url": "https://a.test"}"#, "--output", "jsonl"]),
            )
            .await
            .unwrap();

        assert_eq!(h.out.contents(), "{\"id\":\"wh_2\"}\n");
        assert_eq!(h.client.calls()[0].body, Some(json!({"url": "https://a.test"})));
    }

    #[tokio::test]
    async fn required_payload_is_checked_before_any_call() {
        let h = harness(client());

        let err = tree(create_config())
            .execute(&h.ctx, argv(&["webhooks", "create"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PayloadMissing));
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn commands_without_payload_have_no_payload_flags() {
        let h = harness(client());

        let err = tree(delete_config())
            .execute(&h.ctx, argv(&["webhooks", "delete", "wh_1", "--data", "{}"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Usage(_)));
    }
}
