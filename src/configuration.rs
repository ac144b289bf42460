use secrecy::SecretString;
use serde::Deserialize;

use crate::error::AppError as Error;

pub const DEFAULT_BASE_URL: &str = "https://api.example-payments.com/v1/";
pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub output: OutputSettings,
    /// Set by `PAY_AGENT_MODE` when the CLI is driven by an automated agent
    pub agent_mode: bool,
    pub log_level: String,
}

/// Structure for representing how the API is reached
#[derive(Debug, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct OutputSettings {
    pub format: String,
    pub page_size: i64,
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                api_key: None,
                timeout_secs: 30,
            },
            output: OutputSettings {
                format: "text".to_string(),
                page_size: DEFAULT_PAGE_SIZE,
                color: true,
            },
            agent_mode: false,
            log_level: "warn".to_string(),
        }
    }
}

/// Get the configuration from defaults, the configuration file and the environment
///
/// The file is `configuration.yaml` in the working directory unless `PAY_CONFIG`
/// names another one. `PAY_` variables override both, with `__` separating
/// nested keys (`PAY_API__API_KEY`).
///
/// # Errors
/// Will return errors if the config can't be read or deserialised.
pub fn get_configuration() -> Result<Settings, Error> {
    let path = std::env::var("PAY_CONFIG").unwrap_or_else(|_| "configuration.yaml".to_string());

    let settings = config::Config::builder()
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("api.timeout_secs", 30)?
        .set_default("output.format", "text")?
        .set_default("output.page_size", DEFAULT_PAGE_SIZE)?
        .set_default("output.color", true)?
        .set_default("agent_mode", false)?
        .set_default("log_level", "warn")?
        .add_source(config::File::new(&path, config::FileFormat::Yaml).required(false))
        .add_source(
            config::Environment::with_prefix("PAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize::<Settings>()?)
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_text_output() {
        let settings = Settings::default();

        assert_eq!(settings.output.format, "text");
        assert_eq!(settings.output.page_size, DEFAULT_PAGE_SIZE);
        assert!(settings.api.api_key.is_none());
        assert!(!settings.agent_mode);
    }
}
