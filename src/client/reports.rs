//! Account reports (statements, reconciliations)

use super::Api;
use crate::cli::payload::Payload;
use crate::error::AppError as Error;
use crate::model::{ListOptions, ListResult, Report};

impl Api<'_> {
    /// List the reports generated for one account
    ///
    /// # Errors
    /// Will return errors if authentication fails or the API cannot be reached.
    #[tracing::instrument(name = "List reports", skip(self))]
    pub async fn reports(
        &self,
        account_id: &str,
        options: ListOptions,
    ) -> Result<ListResult<Report>, Error> {
        let filters = vec![("account_id".to_string(), account_id.to_string())];
        self.list("reports", options, filters).await
    }

    /// # Errors
    /// Will return errors if the report does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Get report", skip(self))]
    pub async fn report(&self, id: &str) -> Result<Report, Error> {
        self.fetch(&format!("reports/{id}")).await
    }

    /// Request a new report. Reports are generated asynchronously; the result
    /// is usually still pending.
    ///
    /// # Errors
    /// Will return the API's validation error if the payload is rejected.
    #[tracing::instrument(name = "Create report", skip(self, payload))]
    pub async fn create_report(&self, payload: &Payload) -> Result<Report, Error> {
        self.create("reports", Some(payload)).await
    }
}
