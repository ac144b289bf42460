use std::process::ExitCode;
use std::sync::Arc;

use colored::Colorize;
use pay_cli::cli::{self, confirm::DialoguerPrompter, context::Context, output::Output};
use pay_cli::client::HttpClient;
use pay_cli::configuration::get_configuration;
use pay_cli::error::AppError;
use pay_cli::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Usage(e)) => {
            // clap formats help requests and parse errors itself
            let _ = e.print();
            exit_code(e.exit_code())
        }
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            exit_code(e.exit_code())
        }
    }
}

async fn run() -> Result<(), AppError> {
    let settings = get_configuration()?;

    let subscriber = get_subscriber("pay".into(), settings.log_level.clone(), std::io::stderr);
    init_subscriber(subscriber)?;

    if !console::colors_enabled_stderr() {
        colored::control::set_override(false);
    }

    let client = HttpClient::new(&settings.api)?;
    let ctx = Context::new(
        Arc::new(client),
        Output::stdio(),
        Arc::new(DialoguerPrompter),
        Arc::new(settings),
    );

    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, cancelling");
            cancel.cancel();
        }
    });

    cli::run(&ctx, std::env::args_os()).await
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
