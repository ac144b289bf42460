//! Get command builder

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::cli::context::{Context, Invocation};
use crate::cli::tree::{BoxFuture, CommandHandler, CommandNode, Positional};
use crate::client::Api;
use crate::error::AppError;

pub struct GetRequest<'a> {
    pub id: String,
    /// Parent ids, in declaration order
    pub parents: Vec<String>,
    pub inv: &'a Invocation,
}

pub type GetFetch<T> = for<'a> fn(Api<'a>, GetRequest<'a>) -> BoxFuture<'a, Result<T, AppError>>;

pub struct GetConfig<T> {
    pub name: &'static str,
    pub about: &'static str,
    pub aliases: &'static [&'static str],
    /// Positionals that come before the id, e.g. the invoice of an invoice item
    pub parents: &'static [Positional],
    pub fetch: GetFetch<T>,
    pub describe: fn(&T) -> Vec<(&'static str, String)>,
    /// Fields shown in text mode even when empty
    pub core_fields: &'static [&'static str],
}

/// Build a `get` command from its configuration.
///
/// # Errors
/// Infallible today; returns `Result` like the other builders.
pub fn build_get_command<T>(config: GetConfig<T>) -> Result<CommandNode, AppError>
where
    T: Serialize + Send + Sync + 'static,
{
    let (name, about, aliases, parents) =
        (config.name, config.about, config.aliases, config.parents);

    Ok(CommandNode::leaf(name, about, Arc::new(GetCommand { config }))
        .aliases(aliases)
        .positionals(parents)
        .positionals(&[Positional::required("id", "Identifier, or a link to the resource")]))
}

/// Reduce a pasted identifier to the bare id: a full link or path keeps its
/// last segment, and any query string or fragment is dropped.
#[must_use]
pub fn normalize_id(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(url) = Url::parse(raw) {
        if url.has_host() {
            return url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .unwrap_or_default()
                .to_string();
        }
    }

    let end = raw.find(|c: char| c == '?' || c == '#').unwrap_or(raw.len());
    raw[..end]
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Drop empty values, except for `core` fields
#[must_use]
pub fn kv_pairs(
    pairs: Vec<(&'static str, String)>,
    core: &[&str],
) -> Vec<(&'static str, String)> {
    pairs
        .into_iter()
        .filter(|(key, value)| !value.is_empty() || core.contains(key))
        .collect()
}

struct GetCommand<T> {
    config: GetConfig<T>,
}

#[async_trait]
impl<T> CommandHandler for GetCommand<T>
where
    T: Serialize + Send + Sync + 'static,
{
    async fn run(&self, ctx: &Context, inv: &Invocation) -> Result<(), AppError> {
        let mut ids = Vec::with_capacity(inv.args.len());
        for raw in &inv.args {
            let id = normalize_id(raw);
            if id.is_empty() {
                return Err(AppError::Error(format!("{raw:?} is not a valid id")));
            }
            ids.push(id);
        }
        let id = ids
            .pop()
            .ok_or_else(|| AppError::Error("an id is required".to_string()))?;

        let request = GetRequest {
            id,
            parents: ids,
            inv,
        };
        let api = Api::new(ctx.client.as_ref());
        let value = ctx.cancellable((self.config.fetch)(api, request)).await?;

        let options = &inv.options;
        if ctx.output.is_structured(options) {
            return ctx.output.render_raw(options, &value);
        }
        let pairs = kv_pairs((self.config.describe)(&value), self.config.core_fields);
        ctx.output.render_kv(options, &pairs)
    }
}

// -- Tests ---------------------------------------------------------------------
