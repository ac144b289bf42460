//! Request payloads from `--data` or `--from-file`

use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::context::Context;
use super::flags::FlagSet;
use crate::error::{AppError, ResultExt};

/// Largest payload accepted from `--data`, a file or stdin
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

pub type Payload = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    /// Exactly one of `--data` / `--from-file`
    Required,
    /// At most one of them
    Optional,
    /// The command takes no payload flags
    None,
}

/// Parse a JSON object, keeping numbers as their exact digits.
///
/// # Errors
/// [`AppError::PayloadTooLarge`], [`AppError::InvalidJson`] or
/// [`AppError::PayloadNotObject`].
pub fn parse_payload(bytes: &[u8]) -> Result<Payload, AppError> {
    if bytes.len() > MAX_PAYLOAD_BYTES {
        return Err(AppError::PayloadTooLarge {
            limit: MAX_PAYLOAD_BYTES,
        });
    }
    match serde_json::from_slice::<Value>(bytes).map_err(AppError::InvalidJson)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::PayloadNotObject),
    }
}

/// Read the payload selected by the command's flags.
///
/// # Errors
/// Payload errors as [`parse_payload`], [`AppError::PayloadConflict`] when
/// both flags are given, [`AppError::PayloadMissing`] when a required payload
/// is absent, or a read error naming the file.
pub async fn load_payload(
    ctx: &Context,
    flags: &FlagSet,
    mode: PayloadMode,
) -> Result<Option<Payload>, AppError> {
    if mode == PayloadMode::None {
        return Ok(None);
    }

    let data = flags.was_set_via_canonical_or_alias("data");
    let file = flags.was_set_via_canonical_or_alias("from-file");

    match (data, file) {
        (true, true) => Err(AppError::PayloadConflict),
        (false, false) if mode == PayloadMode::Required => Err(AppError::PayloadMissing),
        (false, false) => Ok(None),
        (true, false) => {
            let data = flags.get_string("data").unwrap_or_default();
            parse_payload(data.as_bytes()).map(Some)
        }
        (false, true) => {
            let source = flags.get_string("from-file").unwrap_or_default();
            let bytes = ctx.cancellable(read_source(source)).await?;
            parse_payload(&bytes).map(Some)
        }
    }
}

// `-` is stdin
async fn read_source(source: &str) -> Result<Vec<u8>, AppError> {
    if source == "-" {
        return read_limited(tokio::io::stdin()).await;
    }
    let file = tokio::fs::File::open(source)
        .await
        .context(|| format!("opening {source}"))?;
    read_limited(file).await
}

// Reads one byte past the limit so an oversized input is detected without
// buffering all of it
async fn read_limited<R: AsyncRead + Unpin>(reader: R) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    reader
        .take(MAX_PAYLOAD_BYTES as u64 + 1)
        .read_to_end(&mut buf)
        .await?;
    if buf.len() > MAX_PAYLOAD_BYTES {
        return Err(AppError::PayloadTooLarge {
            limit: MAX_PAYLOAD_BYTES,
        });
    }
    Ok(buf)
}

// -- Tests ---------------------------------------------------------------------
