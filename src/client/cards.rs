//! Issued cards and their cardholders

use super::Api;
use crate::cli::payload::Payload;
use crate::error::AppError as Error;
use crate::model::{Card, Cardholder, ListOptions, ListResult};

impl Api<'_> {
    /// # Errors
    /// Will return errors if authentication fails or the API cannot be reached.
    #[tracing::instrument(name = "List cards", skip(self))]
    pub async fn cards(
        &self,
        options: ListOptions,
        filters: Vec<(String, String)>,
    ) -> Result<ListResult<Card>, Error> {
        self.list("cards", options, filters).await
    }

    /// # Errors
    /// Will return errors if the card does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Get card", skip(self))]
    pub async fn card(&self, id: &str) -> Result<Card, Error> {
        self.fetch(&format!("cards/{id}")).await
    }

    /// # Errors
    /// Will return the API's validation error if the payload is rejected.
    #[tracing::instrument(name = "Create card", skip(self, payload))]
    pub async fn create_card(&self, payload: &Payload) -> Result<Card, Error> {
        self.create("cards", Some(payload)).await
    }

    /// # Errors
    /// Will return errors if authentication fails or the API cannot be reached.
    #[tracing::instrument(name = "List cardholders", skip(self))]
    pub async fn cardholders(&self, options: ListOptions) -> Result<ListResult<Cardholder>, Error> {
        self.list("cardholders", options, Vec::new()).await
    }

    /// # Errors
    /// Will return errors if the cardholder does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Get cardholder", skip(self))]
    pub async fn cardholder(&self, id: &str) -> Result<Cardholder, Error> {
        self.fetch(&format!("cardholders/{id}")).await
    }

    /// # Errors
    /// Will return the API's validation error if the payload is rejected.
    #[tracing::instrument(name = "Create cardholder", skip(self, payload))]
    pub async fn create_cardholder(&self, payload: &Payload) -> Result<Cardholder, Error> {
        self.create("cardholders", Some(payload)).await
    }
}
