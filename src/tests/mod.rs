#[cfg(test)]
pub mod test {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use once_cell::sync::Lazy;
    use reqwest::Method;
    use serde_json::Value;

    use crate::cli::confirm::Prompter;
    use crate::cli::context::{Context, GlobalOptions};
    use crate::cli::output::{Output, OutputFormat};
    use crate::cli::BIN_NAME;
    use crate::client::{ApiClient, ErrorJson};
    use crate::configuration::Settings;
    use crate::error::AppError;
    use crate::telemetry::{get_subscriber, init_subscriber};

    // Ensure that the `tracing` stack is only initialised once using `once_cell`
    static TRACING: Lazy<()> = Lazy::new(|| {
        let default_filter_level = "info".to_string();
        let subscriber_name = "test".to_string();
        // The sink is part of the subscriber's type, hence the two branches
        if std::env::var("TEST_LOG").is_ok() {
            let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
            init_subscriber(subscriber).expect("Failed to initialise test tracing");
        } else {
            let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
            init_subscriber(subscriber).expect("Failed to initialise test tracing");
        };
    });

    /// In-memory writer whose contents can be read after the fact
    #[derive(Clone, Default)]
    pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Call {
        pub method: Method,
        pub path: String,
        pub query: Vec<(String, String)>,
        pub body: Option<Value>,
    }

    /// Canned responses keyed on method and path; every request is recorded.
    #[derive(Default)]
    pub struct StubClient {
        routes: Vec<(Method, String, Value)>,
        calls: Mutex<Vec<Call>>,
    }

    impl StubClient {
        pub fn new() -> Self {
            Lazy::force(&TRACING);
            Self::default()
        }

        pub fn respond(mut self, method: Method, path: &str, value: Value) -> Self {
            self.routes.push((method, path.to_string(), value));
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ApiClient for StubClient {
        fn base_url(&self) -> &str {
            "https://stub.invalid/v1/"
        }

        async fn send(
            &self,
            method: Method,
            path: &str,
            query: &[(String, String)],
            body: Option<&Value>,
        ) -> Result<Value, AppError> {
            self.calls.lock().unwrap().push(Call {
                method: method.clone(),
                path: path.to_string(),
                query: query.to_vec(),
                body: body.cloned(),
            });

            self.routes
                .iter()
                .find(|(m, p, _)| *m == method && p == path)
                .map(|(_, _, value)| value.clone())
                .ok_or_else(|| {
                    ErrorJson {
                        code: "not_found".to_string(),
                        message: format!("no stub for {method} {path}"),
                    }
                    .into()
                })
        }
    }

    /// Answers every prompt the same way and remembers what was asked
    pub struct ScriptedPrompter {
        interactive: bool,
        answer: bool,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedPrompter {
        pub fn new(interactive: bool, answer: bool) -> Self {
            Self {
                interactive,
                answer,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn is_interactive(&self) -> bool {
            self.interactive
        }

        fn confirm(&self, prompt: &str) -> Result<bool, AppError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.answer)
        }
    }

    pub struct Harness {
        pub ctx: Context,
        pub out: SharedBuf,
        pub err: SharedBuf,
        pub client: Arc<StubClient>,
    }

    /// Context over `client` with captured output and no terminal
    pub fn harness(client: StubClient) -> Harness {
        harness_with(client, Arc::new(ScriptedPrompter::new(false, false)))
    }

    pub fn harness_with(client: StubClient, prompter: Arc<dyn Prompter>) -> Harness {
        harness_full(client, prompter, test_settings())
    }

    pub fn harness_full(
        client: StubClient,
        prompter: Arc<dyn Prompter>,
        settings: Settings,
    ) -> Harness {
        let client = Arc::new(client);
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let ctx = Context::new(
            client.clone(),
            Output::new(out.clone(), err.clone()),
            prompter,
            Arc::new(settings),
        );
        Harness {
            ctx,
            out,
            err,
            client,
        }
    }

    /// Default settings without colour, so output can be compared verbatim
    pub fn test_settings() -> Settings {
        let mut settings = Settings::default();
        settings.output.color = false;
        settings
    }

    pub fn text_options() -> GlobalOptions {
        GlobalOptions {
            format: OutputFormat::Text,
            query: None,
            yes: false,
            agent: false,
            color: false,
        }
    }

    /// Command line with the binary name in front
    pub fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once(BIN_NAME)
            .chain(args.iter().copied())
            .map(ToString::to_string)
            .collect()
    }
}
