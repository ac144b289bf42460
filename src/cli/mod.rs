//! Payments API Command Line Interface

pub mod builder;
pub mod command;
pub mod confirm;
pub mod context;
pub mod dispatch;
pub mod flags;
pub mod ids;
pub mod output;
pub mod payload;
pub mod router;
pub mod tree;

use std::ffi::OsString;

use context::Context;
use tree::BoxFuture;

use crate::error::AppError;

pub const BIN_NAME: &str = "pay";

/// Parse `argv` (binary name first) and run the command it selects.
///
/// The tree is rebuilt on every call, so a router re-entering here with a
/// rewritten command line gets fresh flag state.
///
/// # Errors
/// Whatever parsing or the selected command fails with.
pub fn run<'a, I, T>(ctx: &'a Context, argv: I) -> BoxFuture<'a, Result<(), AppError>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    Box::pin(async move {
        let tree = command::build_tree()?;
        tree.execute(ctx, argv).await
    })
}
