//! `pay api <METHOD> <PATH>`: raw requests for endpoints without a command

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::cli::builder::payload_flags;
use crate::cli::context::{Context, Invocation};
use crate::cli::flags::Flag;
use crate::cli::payload::{load_payload, PayloadMode};
use crate::cli::tree::{CommandHandler, CommandNode, Positional};
use crate::error::AppError;

/// # Errors
/// A construction error if the flags clash.
pub fn command() -> Result<CommandNode, AppError> {
    let mut flags = payload_flags()?;
    flags.add(Flag::string(
        "param",
        "",
        "Query string as key=value pairs separated by `&`",
    ))?;

    Ok(CommandNode::leaf(
        "api",
        "Send a request to any API path and print the JSON response",
        Arc::new(RawRequest),
    )
    .flags(flags)
    .positionals(&[
        Positional::required("method", "HTTP method, e.g. GET or POST"),
        Positional::required("path", "Path relative to the API base URL"),
    ]))
}

struct RawRequest;

#[async_trait]
impl CommandHandler for RawRequest {
    async fn run(&self, ctx: &Context, inv: &Invocation) -> Result<(), AppError> {
        let raw_method = inv.arg(0).unwrap_or_default();
        let method = Method::from_bytes(raw_method.to_uppercase().as_bytes()).map_err(|_| {
            AppError::Error(format!("{raw_method:?} is not an HTTP method"))
        })?;
        let path = inv.arg(1).unwrap_or_default();
        let query = parse_params(inv.flags.get_string("param").unwrap_or_default());

        let payload = load_payload(ctx, &inv.flags, PayloadMode::Optional).await?;
        let body = payload.map(Value::Object);

        tracing::info!(%method, path, "raw API request");
        let response = ctx
            .cancellable(ctx.client.send(method, path, &query, body.as_ref()))
            .await?;

        ctx.output.render_raw(&inv.options, &response)
    }
}

fn parse_params(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cli;
    use crate::tests::test::{argv, harness, StubClient};

    #[test]
    fn params_split_into_pairs() {
        assert_eq!(
            parse_params("status=paid&expand"),
            vec![
                ("status".to_string(), "paid".to_string()),
                ("expand".to_string(), String::new())
            ]
        );
    }

    #[tokio::test]
    async fn raw_response_is_printed_as_json() {
        // Arrange
        let h = harness(StubClient::new().respond(
            Method::POST,
            "fx/quotes",
            json!({"rate": 1.1712}),
        ));

        // Act
        cli::run(
            &h.ctx,
            argv(&["api", "post", "fx/quotes", "--data", r#"{"from": "GBP", "to": "EUR"}"#]),
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(h.out.contents(), "{\n  \"rate\": 1.1712\n}\n");
        assert_eq!(h.client.calls()[0].body, Some(json!({"from": "GBP", "to": "EUR"})));
    }
}
