//! Billing: invoices, subscriptions and their line items

use super::Api;
use crate::cli::payload::Payload;
use crate::error::AppError as Error;
use crate::model::{Invoice, InvoiceItem, ListOptions, ListResult, Subscription, SubscriptionItem};

impl Api<'_> {
    /// # Errors
    /// Will return errors if authentication fails or the API cannot be reached.
    #[tracing::instrument(name = "List invoices", skip(self))]
    pub async fn invoices(
        &self,
        options: ListOptions,
        filters: Vec<(String, String)>,
    ) -> Result<ListResult<Invoice>, Error> {
        self.list("billing/invoices", options, filters).await
    }

    /// # Errors
    /// Will return errors if the invoice does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Get invoice", skip(self))]
    pub async fn invoice(&self, id: &str) -> Result<Invoice, Error> {
        self.fetch(&format!("billing/invoices/{id}")).await
    }

    /// # Errors
    /// Will return the API's validation error if the payload is rejected.
    #[tracing::instrument(name = "Create invoice", skip(self, payload))]
    pub async fn create_invoice(&self, payload: &Payload) -> Result<Invoice, Error> {
        self.create("billing/invoices", Some(payload)).await
    }

    /// Void an open invoice
    ///
    /// # Errors
    /// Will return errors if the invoice is already paid or void.
    #[tracing::instrument(name = "Cancel invoice", skip(self, payload))]
    pub async fn cancel_invoice(
        &self,
        id: &str,
        payload: Option<&Payload>,
    ) -> Result<Invoice, Error> {
        self.create(&format!("billing/invoices/{id}/cancel"), payload)
            .await
    }

    /// # Errors
    /// Will return errors if the invoice does not exist or the API cannot be reached.
    #[tracing::instrument(name = "List invoice items", skip(self))]
    pub async fn invoice_items(
        &self,
        invoice_id: &str,
        options: ListOptions,
    ) -> Result<ListResult<InvoiceItem>, Error> {
        self.list(&format!("billing/invoices/{invoice_id}/items"), options, Vec::new())
            .await
    }

    /// # Errors
    /// Will return errors if the item does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Get invoice item", skip(self))]
    pub async fn invoice_item(&self, invoice_id: &str, id: &str) -> Result<InvoiceItem, Error> {
        self.fetch(&format!("billing/invoices/{invoice_id}/items/{id}"))
            .await
    }

    /// # Errors
    /// Will return errors if authentication fails or the API cannot be reached.
    #[tracing::instrument(name = "List subscriptions", skip(self))]
    pub async fn subscriptions(
        &self,
        options: ListOptions,
        filters: Vec<(String, String)>,
    ) -> Result<ListResult<Subscription>, Error> {
        self.list("billing/subscriptions", options, filters).await
    }

    /// # Errors
    /// Will return errors if the subscription does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Get subscription", skip(self))]
    pub async fn subscription(&self, id: &str) -> Result<Subscription, Error> {
        self.fetch(&format!("billing/subscriptions/{id}")).await
    }

    /// # Errors
    /// Will return the API's validation error if the payload is rejected.
    #[tracing::instrument(name = "Create subscription", skip(self, payload))]
    pub async fn create_subscription(&self, payload: &Payload) -> Result<Subscription, Error> {
        self.create("billing/subscriptions", Some(payload)).await
    }

    /// # Errors
    /// Will return errors if the subscription is already cancelled.
    #[tracing::instrument(name = "Cancel subscription", skip(self, payload))]
    pub async fn cancel_subscription(
        &self,
        id: &str,
        payload: Option<&Payload>,
    ) -> Result<Subscription, Error> {
        self.create(&format!("billing/subscriptions/{id}/cancel"), payload)
            .await
    }

    /// # Errors
    /// Will return errors if the subscription does not exist or the API cannot be reached.
    #[tracing::instrument(name = "List subscription items", skip(self))]
    pub async fn subscription_items(
        &self,
        subscription_id: &str,
        options: ListOptions,
    ) -> Result<ListResult<SubscriptionItem>, Error> {
        self.list(
            &format!("billing/subscriptions/{subscription_id}/items"),
            options,
            Vec::new(),
        )
        .await
    }

    /// # Errors
    /// Will return errors if the item does not exist or the API cannot be reached.
    #[tracing::instrument(name = "Get subscription item", skip(self))]
    pub async fn subscription_item(
        &self,
        subscription_id: &str,
        id: &str,
    ) -> Result<SubscriptionItem, Error> {
        self.fetch(&format!("billing/subscriptions/{subscription_id}/items/{id}"))
            .await
    }
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use crate::client::Api;
    use crate::tests::test::StubClient;

    #[tokio::test]
    async fn invoice_item_is_fetched_under_its_invoice() {
        // Arrange
        let client = StubClient::new().respond(
            Method::GET,
            "billing/invoices/inv_1/items/item_2",
            json!({"id": "item_2", "invoice_id": "inv_1", "quantity": 3}),
        );

        // Act
        let item = Api::new(&client).invoice_item("inv_1", "item_2").await.unwrap();

        // Assert
        assert_eq!(item.invoice_id, "inv_1");
        assert_eq!(item.quantity, 3);
    }
}
