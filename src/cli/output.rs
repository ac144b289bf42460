//! Output rendering
//!
//! Data goes to stdout: tables and key/value listings in text mode, JSON in
//! structured mode. Hints, informational and success messages go to stderr so
//! that piped structured output stays clean.

use std::io::Write;
use std::sync::{Arc, Mutex};

use colored::Colorize;
use console::measure_text_width;
use serde::Serialize;
use serde_json::Value;
use strum_macros::{Display, EnumIter, EnumString};

use super::context::GlobalOptions;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

/// How a table column is coloured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Id,
    Text,
    Amount,
    Status,
    Date,
}

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

#[derive(Clone)]
pub struct Output {
    out: Sink,
    err: Sink,
}

impl Output {
    #[must_use]
    pub fn new(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
            err: Arc::new(Mutex::new(Box::new(err))),
        }
    }

    #[must_use]
    pub fn stdio() -> Self {
        Self::new(std::io::stdout(), std::io::stderr())
    }

    #[must_use]
    pub fn is_structured(&self, options: &GlobalOptions) -> bool {
        options.format != OutputFormat::Text
    }

    /// Emit a single value as JSON, after the query filter.
    ///
    /// # Errors
    /// Fails if the value can't be serialised, the query is malformed or
    /// stdout can't be written.
    pub fn render_raw<S: Serialize + ?Sized>(
        &self,
        options: &GlobalOptions,
        value: &S,
    ) -> Result<(), AppError> {
        let value = filter(serde_json::to_value(value)?, options)?;
        let text = match options.format {
            OutputFormat::Jsonl => serde_json::to_string(&value)?,
            OutputFormat::Json | OutputFormat::Text => serde_json::to_string_pretty(&value)?,
        };
        self.line(&text)
    }

    /// Emit a sequence of values. `jsonl` writes one compact line per item,
    /// with the query applied to each item.
    ///
    /// # Errors
    /// As [`Output::render_raw`].
    pub fn render_items<S: Serialize>(
        &self,
        options: &GlobalOptions,
        items: &[S],
    ) -> Result<(), AppError> {
        if options.format != OutputFormat::Jsonl {
            return self.render_raw(options, items);
        }
        for item in items {
            let value = filter(serde_json::to_value(item)?, options)?;
            self.line(&serde_json::to_string(&value)?)?;
        }
        Ok(())
    }

    /// Render rows as an aligned table.
    ///
    /// # Errors
    /// Fails if stdout can't be written.
    pub fn render_list(
        &self,
        options: &GlobalOptions,
        headers: &[&str],
        column_types: Option<&[ColumnType]>,
        rows: &[Vec<String>],
    ) -> Result<(), AppError> {
        self.line(&table(headers, column_types, rows, options.color))
    }

    /// Render an ordered key/value listing.
    ///
    /// # Errors
    /// Fails if stdout can't be written.
    pub fn render_kv(
        &self,
        options: &GlobalOptions,
        pairs: &[(&str, String)],
    ) -> Result<(), AppError> {
        let width = pairs
            .iter()
            .map(|(k, _)| measure_text_width(k))
            .max()
            .unwrap_or(0);

        let lines: Vec<String> = pairs
            .iter()
            .map(|(key, value)| {
                let padded = format!("{key}:{}", " ".repeat(width - measure_text_width(key)));
                if options.color {
                    format!("{}  {value}", padded.bold())
                } else {
                    format!("{padded}  {value}")
                }
            })
            .collect();
        self.line(&lines.join("\n"))
    }

    /// Write a line of data to stdout.
    ///
    /// # Errors
    /// Fails if stdout can't be written.
    pub fn line(&self, text: &str) -> Result<(), AppError> {
        write_line(&self.out, text)
    }

    /// Write an informational message to stderr.
    ///
    /// # Errors
    /// Fails if stderr can't be written.
    pub fn info(&self, text: &str) -> Result<(), AppError> {
        write_line(&self.err, text)
    }

    /// Write a "there is more" style hint to stderr.
    ///
    /// # Errors
    /// Fails if stderr can't be written.
    pub fn hint(&self, options: &GlobalOptions, text: &str) -> Result<(), AppError> {
        if options.color {
            write_line(&self.err, &text.dimmed().to_string())
        } else {
            write_line(&self.err, text)
        }
    }

    /// Report a completed operation on stderr.
    ///
    /// # Errors
    /// Fails if stderr can't be written.
    pub fn success(&self, options: &GlobalOptions, text: &str) -> Result<(), AppError> {
        if options.color {
            write_line(&self.err, &format!("{} {text}", "✓".green()))
        } else {
            write_line(&self.err, &format!("✓ {text}"))
        }
    }
}

fn write_line(sink: &Sink, text: &str) -> Result<(), AppError> {
    let mut writer = sink
        .lock()
        .map_err(|_| AppError::Error("output stream lock poisoned".to_string()))?;
    writeln!(writer, "{text}")?;
    writer.flush()?;
    Ok(())
}

fn filter(value: Value, options: &GlobalOptions) -> Result<Value, AppError> {
    match options.query.as_deref() {
        Some(expr) => apply_query(value, expr),
        None => Ok(value),
    }
}

/// Select part of a JSON value with a dotted path such as `.items[0].id`.
/// Missing keys and out-of-range indices yield `null`.
///
/// # Errors
/// Fails if the expression is malformed.
pub fn apply_query(value: Value, expr: &str) -> Result<Value, AppError> {
    let invalid = |reason: &str| AppError::InvalidFlag {
        name: "query".to_string(),
        value: expr.to_string(),
        reason: reason.to_string(),
    };

    let mut current = value;
    let mut rest = expr.trim();

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('[') {
            let end = after.find(']').ok_or_else(|| invalid("unclosed '['"))?;
            let index: usize = after[..end]
                .trim()
                .parse()
                .map_err(|_| invalid("index must be a number"))?;
            current = match current {
                Value::Array(mut items) if index < items.len() => items.swap_remove(index),
                _ => Value::Null,
            };
            rest = &after[end + 1..];
        } else if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(|c: char| c == '.' || c == '[').unwrap_or(after.len());
            let key = &after[..end];
            if !key.is_empty() {
                current = match current {
                    Value::Object(mut map) => map.remove(key).unwrap_or(Value::Null),
                    _ => Value::Null,
                };
            }
            rest = &after[end..];
        } else {
            return Err(invalid("expected '.' or '['"));
        }
    }

    Ok(current)
}

fn table(
    headers: &[&str],
    column_types: Option<&[ColumnType]>,
    rows: &[Vec<String>],
    color: bool,
) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| measure_text_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(measure_text_width(cell));
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);

    let header: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let padded = pad(h, widths[i]);
            if color {
                padded.bold().to_string()
            } else {
                padded
            }
        })
        .collect();
    lines.push(header.join("  ").trim_end().to_string());

    for row in rows {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = row.get(i).map_or("", String::as_str);
                let padded = pad(cell, *width);
                match column_types.and_then(|types| types.get(i)) {
                    Some(column) if color => colorize(&padded, *column),
                    _ => padded,
                }
            })
            .collect();
        lines.push(cells.join("  ").trim_end().to_string());
    }

    lines.join("\n")
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(measure_text_width(text));
    format!("{text}{}", " ".repeat(fill))
}

fn colorize(cell: &str, column: ColumnType) -> String {
    match column {
        ColumnType::Id => cell.cyan().to_string(),
        ColumnType::Amount => cell.bold().to_string(),
        ColumnType::Date => cell.dimmed().to_string(),
        ColumnType::Text => cell.to_string(),
        ColumnType::Status => match cell.trim().to_lowercase().as_str() {
            "active" | "paid" | "completed" | "succeeded" | "enabled" => cell.green().to_string(),
            "failed" | "cancelled" | "canceled" | "void" | "disabled" | "frozen" => {
                cell.red().to_string()
            }
            _ => cell.yellow().to_string(),
        },
    }
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tests::test::{text_options, SharedBuf};

    #[test]
    fn table_aligns_columns() {
        let rows = vec![
            vec!["tfr_1".to_string(), "£1.00".to_string()],
            vec!["tfr_22".to_string(), "£100.00".to_string()],
        ];

        let rendered = table(&["ID", "AMOUNT"], None, &rows, false);

        assert_eq!(
            rendered,
            "ID      AMOUNT\ntfr_1   £1.00\ntfr_22  £100.00"
        );
    }

    #[test]
    fn query_selects_nested_fields() {
        let value = json!({"items": [{"id": "tfr_1"}, {"id": "tfr_2"}]});

        let selected = apply_query(value, ".items[1].id").unwrap();

        assert_eq!(selected, json!("tfr_2"));
    }

    #[test]
    fn query_on_missing_key_is_null() {
        let selected = apply_query(json!({"a": 1}), ".b.c").unwrap();

        assert_eq!(selected, Value::Null);
    }

    #[test]
    fn malformed_query_is_a_flag_error() {
        let err = apply_query(json!([1]), "[x]").unwrap_err();

        assert!(matches!(err, AppError::InvalidFlag { name, .. } if name == "query"));
    }

    #[test]
    fn kv_pads_keys() {
        // Arrange
        let out = SharedBuf::default();
        let output = Output::new(out.clone(), SharedBuf::default());

        // Act
        output
            .render_kv(
                &text_options(),
                &[("id", "tfr_1".to_string()), ("status", "paid".to_string())],
            )
            .unwrap();

        // Assert
        assert_eq!(out.contents(), "id:      tfr_1\nstatus:  paid\n");
    }

    #[test]
    fn hints_go_to_stderr() {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let output = Output::new(out.clone(), err.clone());

        output.hint(&text_options(), "more").unwrap();

        assert_eq!(out.contents(), "");
        assert_eq!(err.contents(), "more\n");
    }
}
