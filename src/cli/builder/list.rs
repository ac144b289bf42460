//! List command builder

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::cli::context::{Context, Invocation};
use crate::cli::flags::{Flag, FlagSet};
use crate::cli::output::ColumnType;
use crate::cli::tree::{BoxFuture, CommandHandler, CommandNode, Positional};
use crate::client::Api;
use crate::configuration::DEFAULT_PAGE_SIZE;
use crate::error::AppError;
use crate::model::{ListOptions, ListResult};

/// What a list command's fetch function gets to work with
pub struct ListRequest<'a> {
    pub options: ListOptions,
    pub inv: &'a Invocation,
}

pub type ListFetch<T> =
    for<'a> fn(Api<'a>, ListRequest<'a>) -> BoxFuture<'a, Result<ListResult<T>, AppError>>;

pub struct ListConfig<T> {
    pub name: &'static str,
    pub about: &'static str,
    pub aliases: &'static [&'static str],
    pub headers: &'static [&'static str],
    /// One entry per header when present
    pub column_types: Option<&'static [ColumnType]>,
    pub row: fn(&T) -> Vec<String>,
    pub empty_message: &'static str,
    pub positionals: &'static [Positional],
    /// Registers resource-specific filters
    pub flags: Option<fn(&mut FlagSet) -> Result<(), AppError>>,
    /// Clamp `--limit` into the range the API accepts
    pub normalize_limit: bool,
    pub fetch: ListFetch<T>,
}

/// Build a `list` command from its configuration.
///
/// # Errors
/// A construction error when `column_types` and `headers` disagree in length,
/// or when the flag hook registers a clashing flag.
pub fn build_list_command<T>(config: ListConfig<T>) -> Result<CommandNode, AppError>
where
    T: Serialize + Send + Sync + 'static,
{
    if let Some(types) = config.column_types {
        if types.len() != config.headers.len() {
            return Err(AppError::Construction(format!(
                "`{}`: {} column types for {} headers",
                config.name,
                types.len(),
                config.headers.len()
            )));
        }
    }

    let mut flags = FlagSet::new();
    flags.add(Flag::int("page", 0, "Page to fetch, starting at 0"))?;
    flags.add(Flag::int(
        "limit",
        DEFAULT_PAGE_SIZE,
        "Results per page (output.page_size in configuration)",
    ))?;
    flags.register_alias("limit", "page-size")?;
    if let Some(hook) = config.flags {
        hook(&mut flags)?;
    }

    let (name, about, aliases, positionals) =
        (config.name, config.about, config.aliases, config.positionals);

    Ok(CommandNode::leaf(name, about, Arc::new(ListCommand { config }))
        .aliases(aliases)
        .flags(flags)
        .positionals(positionals))
}

struct ListCommand<T> {
    config: ListConfig<T>,
}

impl<T> ListCommand<T> {
    fn options(&self, ctx: &Context, inv: &Invocation) -> Result<ListOptions, AppError> {
        let raw_page = inv.flags.get_int("page").unwrap_or(0);
        let page = u32::try_from(raw_page).map_err(|_| AppError::InvalidFlag {
            name: "page".to_string(),
            value: raw_page.to_string(),
            reason: if raw_page < 0 {
                "must be 0 or greater".to_string()
            } else {
                format!("must be at most {}", u32::MAX)
            },
        })?;

        let limit = if inv.flags.was_set_via_canonical_or_alias("limit") {
            inv.flags.get_int("limit").unwrap_or(DEFAULT_PAGE_SIZE)
        } else {
            ctx.settings.output.page_size
        };

        let options = ListOptions { page, limit };
        Ok(if self.config.normalize_limit {
            options.normalized()
        } else {
            options
        })
    }
}

#[async_trait]
impl<T> CommandHandler for ListCommand<T>
where
    T: Serialize + Send + Sync + 'static,
{
    async fn run(&self, ctx: &Context, inv: &Invocation) -> Result<(), AppError> {
        let list_options = self.options(ctx, inv)?;
        let api = Api::new(ctx.client.as_ref());
        let request = ListRequest {
            options: list_options,
            inv,
        };
        let result = ctx.cancellable((self.config.fetch)(api, request)).await?;

        let options = &inv.options;
        let structured = ctx.output.is_structured(options);

        // An empty page says nothing about further pages
        if result.items.is_empty() {
            return if structured {
                ctx.output.render_raw(options, &result)
            } else {
                ctx.output.line(self.config.empty_message)
            };
        }

        if structured {
            return ctx.output.render_items(options, &result.items);
        }

        let rows: Vec<Vec<String>> = result.items.iter().map(self.config.row).collect();
        ctx.output
            .render_list(options, self.config.headers, self.config.column_types, &rows)?;

        // The last addressable page has no next page to point at
        if let Some(next) = list_options.page.checked_add(1).filter(|_| result.has_more) {
            ctx.output
                .hint(options, &format!("More results available: use --page {next}"))?;
        }
        Ok(())
    }
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::cli::command::global_flags;
    use crate::model::Webhook;
    use crate::tests::test::{argv, harness, StubClient};

    fn fetch<'a>(
        api: Api<'a>,
        req: ListRequest<'a>,
    ) -> BoxFuture<'a, Result<ListResult<Webhook>, AppError>> {
        Box::pin(async move { api.webhooks(req.options).await })
    }

    fn config() -> ListConfig<Webhook> {
        ListConfig {
            name: "list",
            about: "List webhooks",
            aliases: &["ls"],
            headers: &["ID", "URL"],
            column_types: Some(&[ColumnType::Id, ColumnType::Text]),
            row: |w: &Webhook| vec![w.id.clone(), w.url.clone()],
            empty_message: "No webhooks found.",
            positionals: &[],
            flags: None,
            normalize_limit: true,
            fetch,
        }
    }

    fn tree(config: ListConfig<Webhook>) -> CommandNode {
        CommandNode::group("pay", "test")
            .flags(global_flags().unwrap())
            .child(
                CommandNode::group("webhooks", "Webhooks")
                    .child(build_list_command(config).unwrap()),
            )
    }

    fn page(items: serde_json::Value, has_more: bool) -> StubClient {
        StubClient::new().respond(
            Method::GET,
            "webhooks",
            json!({"items": items, "has_more": has_more}),
        )
    }

    #[test]
    fn mismatched_column_types_fail_construction() {
        let config = ListConfig {
            column_types: Some(&[ColumnType::Id]),
            ..config()
        };

        let err = build_list_command(config).err().unwrap();

        assert!(matches!(err, AppError::Construction(_)));
    }

    #[tokio::test]
    async fn empty_page_prints_message_even_with_more_pages() {
        // Arrange
        let h = harness(page(json!([]), true));

        // Act
        tree(config())
            .execute(&h.ctx, argv(&["webhooks", "list"]))
            .await
            .unwrap();

        // Assert
        assert_eq!(h.out.contents(), "No webhooks found.\n");
        assert_eq!(h.err.contents(), "");
    }

    #[tokio::test]
    async fn empty_page_is_emitted_verbatim_when_structured() {
        let h = harness(page(json!([]), true));

        tree(config())
            .execute(&h.ctx, argv(&["--output", "json", "webhooks", "list"]))
            .await
            .unwrap();

        let emitted: serde_json::Value = serde_json::from_str(&h.out.contents()).unwrap();
        assert_eq!(emitted, json!({"items": [], "has_more": true}));
    }

    #[tokio::test]
    async fn has_more_hint_goes_to_stderr_only() {
        // Arrange
        let h = harness(page(json!([{"id": "wh_1", "url": "https://a.test"}]), true));

        // Act
        tree(config())
            .execute(&h.ctx, argv(&["webhooks", "list", "--page", "2"]))
            .await
            .unwrap();

        // Assert
        assert_eq!(h.out.contents(), "ID    URL\nwh_1  https://a.test\n");
        assert_eq!(h.err.contents(), "More results available: use --page 3\n");
    }

    #[tokio::test]
    async fn jsonl_writes_one_line_per_item_without_hint() {
        let h = harness(page(json!([{"id": "wh_1"}, {"id": "wh_2"}]), true));

        tree(config())
            .execute(&h.ctx, argv(&["webhooks", "list", "--output=jsonl", "--query", ".id"]))
            .await
            .unwrap();

        assert_eq!(h.out.contents(), "\"wh_1\"\n\"wh_2\"\n");
        assert_eq!(h.err.contents(), "");
    }

    #[tokio::test]
    async fn listing_is_idempotent() {
        // Arrange
        let h = harness(page(json!([{"id": "wh_1", "url": "https://a.test"}]), false));
        let tree = tree(config());

        // Act
        tree.execute(&h.ctx, argv(&["webhooks", "list"])).await.unwrap();
        let first = h.out.contents();
        tree.execute(&h.ctx, argv(&["webhooks", "list"])).await.unwrap();
        let both = h.out.contents();

        // Assert
        assert_eq!(both, format!("{first}{first}"));
        let calls = h.client.calls();
        assert_eq!(calls[0], calls[1]);
    }

    #[tokio::test]
    async fn limit_is_clamped_and_defaults_to_configuration() {
        // Arrange
        let h = harness(page(json!([]), false));
        let tree = tree(config());

        // Act
        tree.execute(&h.ctx, argv(&["webhooks", "list"])).await.unwrap();
        tree.execute(&h.ctx, argv(&["webhooks", "list", "--page-size", "1000"]))
            .await
            .unwrap();

        // Assert
        let calls = h.client.calls();
        assert!(calls[0].query.contains(&("limit".to_string(), DEFAULT_PAGE_SIZE.to_string())));
        assert!(calls[1].query.contains(&("limit".to_string(), "100".to_string())));
    }

    #[tokio::test]
    async fn negative_page_is_rejected() {
        let h = harness(page(json!([]), false));

        let err = tree(config())
            .execute(&h.ctx, argv(&["webhooks", "list", "--page=-1"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidFlag { ref name, .. } if name == "page"));
        assert!(err.to_string().ends_with("must be 0 or greater"));
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn last_addressable_page_gets_no_hint() {
        // Arrange
        let h = harness(page(json!([{"id": "wh_1", "url": "https://a.test"}]), true));

        // Act
        tree(config())
            .execute(&h.ctx, argv(&["webhooks", "list", "--page", "4294967295"]))
            .await
            .unwrap();

        // Assert
        assert_eq!(h.out.contents(), "ID    URL\nwh_1  https://a.test\n");
        assert_eq!(h.err.contents(), "");
        assert!(h.client.calls()[0]
            .query
            .contains(&("page".to_string(), "4294967295".to_string())));
    }

    #[tokio::test]
    async fn page_beyond_range_says_so() {
        let h = harness(page(json!([]), false));

        let err = tree(config())
            .execute(&h.ctx, argv(&["webhooks", "list", "--page", "4294967296"]))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid value \"4294967296\" for --page: must be at most 4294967295"
        );
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let h = harness(StubClient::new());

        let err = tree(config())
            .execute(&h.ctx, argv(&["webhooks", "list"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Api(_)));
        assert_eq!(h.out.contents(), "");
    }
}
