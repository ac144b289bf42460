//! `pay reports`

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
use crate::model::{ListResult, Report};

/// # Errors
/// A construction error if a command is misconfigured.
pub fn command() -> Result<CommandNode, AppError> {
    Ok(CommandNode::group("reports", "Statements and reconciliation reports")
        .aliases(&["report"])
        .child(build_list_command(ListConfig {
            name: "list",
            about: "List the reports of an account",
            aliases: &["ls"],
            headers: &["ID", "TYPE", "STATUS", "CREATED"],
            column_types: Some(&[
                ColumnType::Id,
                ColumnType::Text,
                ColumnType::Status,
                ColumnType::Date,
            ]),
            row,
            empty_message: "No reports found.",
            positionals: &[],
            flags: Some(account_flag),
            normalize_limit: true,
            fetch: list,
        })?)
        .child(build_get_command(GetConfig {
            name: "get",
            about: "Show one report",
            aliases: &["show"],
            parents: &[],
            fetch: get,
            describe,
            core_fields: CORE_FIELDS,
        })?)
        .child(build_payload_command(PayloadConfig {
            name: "create",
            about: "Request a report from a JSON payload",
            aliases: &["new"],
            positionals: &[],
            mode: PayloadMode::Required,
            confirm: None,
            run: Some(create),
            success_message: Some(|r: &Report, _: &[String]| {
                format!("Requested {} report {} ({})", r.report_type, r.id, r.status)
            }),
        })?))
}

fn account_flag(flags: &mut FlagSet) -> Result<(), AppError> {
    flags.add(Flag::string("account", "", "Account to report on").required())?;
    flags.register_alias("account", "account-id")
}

fn list<'a>(
    api: Api<'a>,
    req: ListRequest<'a>,
) -> BoxFuture<'a, Result<ListResult<Report>, AppError>> {
    Box::pin(async move {
        let account = req.inv.flags.get_string("account").unwrap_or_default();
        api.reports(account, req.options).await
    })
}

fn get<'a>(api: Api<'a>, req: GetRequest<'a>) -> BoxFuture<'a, Result<Report, AppError>> {
    Box::pin(async move { api.report(&req.id).await })
}

fn create<'a>(api: Api<'a>, req: PayloadRequest<'a>) -> BoxFuture<'a, Result<Report, AppError>> {
    Box::pin(async move {
        let payload = req.payload.ok_or(AppError::PayloadMissing)?;
        api.create_report(&payload).await
    })
}

fn row(report: &Report) -> Vec<String> {
    vec![
        report.id.clone(),
        report.report_type.clone(),
        report.status.clone(),
        date(report.created_at),
    ]
}

pub(crate) fn describe(report: &Report) -> Vec<(&'static str, String)> {
    vec![
        ("id", report.id.clone()),
        ("type", report.report_type.clone()),
        ("account", report.account_id.clone()),
        ("status", report.status.clone()),
        ("download", report.download_url.clone().unwrap_or_default()),
        ("created", date(report.created_at)),
    ]
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use crate::cli;
    use crate::error::AppError;
    use crate::tests::test::{argv, harness, StubClient};

    fn client() -> StubClient {
        StubClient::new().respond(
            Method::GET,
            "reports",
            json!({"items": [{"id": "rpt_1", "type": "statement", "status": "ready"}]}),
        )
    }

    #[tokio::test]
    async fn account_alias_satisfies_required_flag() {
        // Arrange
        let h = harness(client());

        // Act
        cli::run(&h.ctx, argv(&["reports", "list", "--account-id", "acc_1"]))
            .await
            .unwrap();

        // Assert
        let query = &h.client.calls()[0].query;
        assert!(query.contains(&("account_id".to_string(), "acc_1".to_string())));
        assert!(h.out.contents().starts_with("ID     TYPE       STATUS"));
    }

    #[tokio::test]
    async fn canonical_and_alias_spellings_are_equivalent() {
        let canonical = harness(client());
        let alias = harness(client());

        cli::run(&canonical.ctx, argv(&["reports", "list", "--account", "acc_1"]))
            .await
            .unwrap();
        cli::run(&alias.ctx, argv(&["reports", "list", "--account-id", "acc_1"]))
            .await
            .unwrap();

        assert_eq!(canonical.client.calls(), alias.client.calls());
        assert_eq!(canonical.out.contents(), alias.out.contents());
    }

    #[tokio::test]
    async fn missing_account_is_a_usage_error() {
        let h = harness(client());

        let err = cli::run(&h.ctx, argv(&["reports", "list"]))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Required flag --account (or --account-id) not set");
        assert_eq!(err.exit_code(), 2);
        assert!(h.client.calls().is_empty());
    }
}
