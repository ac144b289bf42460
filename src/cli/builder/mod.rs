//! Generic command builders
//!
//! Resource commands are not written by hand: each one is a [`ListConfig`],
//! [`GetConfig`] or [`PayloadConfig`] value turned into a wired
//! [`CommandNode`](super::tree::CommandNode). The builders own flag
//! registration, output mode handling and confirmation, so every resource
//! behaves the same way.

mod get;
mod list;
mod payload;

pub use get::{build_get_command, kv_pairs, normalize_id, GetConfig, GetFetch, GetRequest};
pub use list::{build_list_command, ListConfig, ListFetch, ListRequest};
pub use payload::{build_payload_command, PayloadConfig, PayloadRequest, PayloadRun};

use super::flags::{Flag, FlagSet};
use crate::error::AppError;

/// `--data` and `--from-file` (alias `--file`)
///
/// # Errors
/// Only on a registry conflict, which is a bug in this function.
pub fn payload_flags() -> Result<FlagSet, AppError> {
    let mut flags = FlagSet::new();
    flags.add(Flag::string("data", "", "Request body as inline JSON"))?;
    flags.add(Flag::string(
        "from-file",
        "",
        "Read the request body from a JSON file, or `-` for stdin",
    ))?;
    flags.register_alias("from-file", "file")?;
    Ok(flags)
}
