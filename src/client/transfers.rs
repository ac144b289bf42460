//! Transfers (payouts) between accounts and beneficiaries

use super::Api;
use crate::cli::payload::Payload;
use crate::error::AppError as Error;
use crate::model::{ListOptions, ListResult, Transfer};

impl Api<'_> {
    /// List transfers, optionally filtered by status and creation date
    ///
    /// # Errors
    /// Will return errors if authentication fails or the API cannot be reached.
    #[tracing::instrument(name = "List transfers", skip(self))]
    pub async fn transfers(
        &self,
        options: ListOptions,
        filters: Vec<(String, String)>,
    ) -> Result<ListResult<Transfer>, Error> {
        self.list("transfers", options, filters).await
    }

    /// # Errors
    /// Will return errors if the transfer does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Get transfer", skip(self))]
    pub async fn transfer(&self, id: &str) -> Result<Transfer, Error> {
        self.fetch(&format!("transfers/{id}")).await
    }

    /// # Errors
    /// Will return the API's validation error if the payload is rejected.
    #[tracing::instrument(name = "Create transfer", skip(self, payload))]
    pub async fn create_transfer(&self, payload: &Payload) -> Result<Transfer, Error> {
        self.create("transfers", Some(payload)).await
    }

    /// Cancel a transfer that has not been paid out yet. The payload, when
    /// given, carries e.g. a cancellation reason.
    ///
    /// # Errors
    /// Will return errors if the transfer can no longer be cancelled.
    #[tracing::instrument(name = "Cancel transfer", skip(self, payload))]
    pub async fn cancel_transfer(
        &self,
        id: &str,
        payload: Option<&Payload>,
    ) -> Result<Transfer, Error> {
        self.create(&format!("transfers/{id}/cancel"), payload).await
    }
}

// -- Tests ---------------------------------------------------------------------
