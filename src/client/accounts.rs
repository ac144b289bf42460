//! Accounts held with the payments provider

use super::Api;
use crate::error::AppError as Error;
use crate::model::{Account, ListOptions, ListResult};

impl Api<'_> {
    /// List accounts
    ///
    /// # Errors
    /// Will return errors if authentication fails or the API cannot be reached.
    #[tracing::instrument(name = "List accounts", skip(self))]
    pub async fn accounts(&self, options: ListOptions) -> Result<ListResult<Account>, Error> {
        self.list("accounts", options, Vec::new()).await
    }

    /// Get one account
    ///
    /// # Errors
    /// Will return errors if the account does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Get account", skip(self))]
    pub async fn account(&self, id: &str) -> Result<Account, Error> {
        self.fetch(&format!("accounts/{id}")).await
    }
}

// -- Tests ---------------------------------------------------------------------
