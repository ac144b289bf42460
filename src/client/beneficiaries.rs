//! Beneficiaries that transfers can be paid out to

use serde_json::Value;

use super::Api;
use crate::cli::payload::Payload;
use crate::error::AppError as Error;
use crate::model::{Beneficiary, ListOptions, ListResult};

impl Api<'_> {
    /// # Errors
    /// Will return errors if authentication fails or the API cannot be reached.
    #[tracing::instrument(name = "List beneficiaries", skip(self))]
    pub async fn beneficiaries(&self, options: ListOptions) -> Result<ListResult<Beneficiary>, Error> {
        self.list("beneficiaries", options, Vec::new()).await
    }

    /// # Errors
    /// Will return errors if the beneficiary does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Get beneficiary", skip(self))]
    pub async fn beneficiary(&self, id: &str) -> Result<Beneficiary, Error> {
        self.fetch(&format!("beneficiaries/{id}")).await
    }

    /// # Errors
    /// Will return the API's validation error if the payload is rejected.
    #[tracing::instrument(name = "Create beneficiary", skip(self, payload))]
    pub async fn create_beneficiary(&self, payload: &Payload) -> Result<Beneficiary, Error> {
        self.create("beneficiaries", Some(payload)).await
    }

    /// # Errors
    /// Will return errors if the beneficiary does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Delete beneficiary", skip(self))]
    pub async fn delete_beneficiary(&self, id: &str) -> Result<Value, Error> {
        self.remove(&format!("beneficiaries/{id}")).await
    }
}
