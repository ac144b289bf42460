//! Webhook endpoints registered for event delivery

use serde_json::Value;

use super::Api;
use crate::cli::payload::Payload;
use crate::error::AppError as Error;
use crate::model::{ListOptions, ListResult, Webhook};

impl Api<'_> {
    /// # Errors
    /// Will return errors if authentication fails or the API cannot be reached.
    #[tracing::instrument(name = "List webhooks", skip(self))]
    pub async fn webhooks(&self, options: ListOptions) -> Result<ListResult<Webhook>, Error> {
        self.list("webhooks", options, Vec::new()).await
    }

    /// # Errors
    /// Will return errors if the webhook does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Get webhook", skip(self))]
    pub async fn webhook(&self, id: &str) -> Result<Webhook, Error> {
        self.fetch(&format!("webhooks/{id}")).await
    }

    /// # Errors
    /// Will return the API's validation error if the payload is rejected.
    #[tracing::instrument(name = "Create webhook", skip(self, payload))]
    pub async fn create_webhook(&self, payload: &Payload) -> Result<Webhook, Error> {
        self.create("webhooks", Some(payload)).await
    }

    /// # Errors
    /// Will return errors if the webhook does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Delete webhook", skip(self))]
    pub async fn delete_webhook(&self, id: &str) -> Result<Value, Error> {
        self.remove(&format!("webhooks/{id}")).await
    }
}
