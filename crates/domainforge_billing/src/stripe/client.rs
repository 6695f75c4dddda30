//! Stripe REST client.

use super::{StripeCheckoutSession, StripeErrorBody, StripeList, StripeSubscription};
use async_trait::async_trait;
use domainforge_core::{CheckoutParams, CheckoutSession, GatewaySubscription};
use domainforge_error::{
    BillingError, BillingErrorKind, DomainforgeResult, JsonError, NotConfiguredError, Upstream,
};
use domainforge_interface::PaymentGateway;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument};

/// Stripe API base URL.
pub const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

type Form = Vec<(String, String)>;

/// Form-encoded Stripe API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    base_url: String,
}

impl StripeClient {
    /// Create a client from `STRIPE_SECRET_KEY`.
    ///
    /// # Errors
    ///
    /// Returns a not-configured error when the variable is unset or empty.
    pub fn new() -> DomainforgeResult<Self> {
        match std::env::var("STRIPE_SECRET_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::with_secret_key(key)),
            _ => Err(NotConfiguredError::new("Stripe not configured"))?,
        }
    }

    /// Create a client with an explicit secret key.
    pub fn with_secret_key(secret_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            secret_key: secret_key.into(),
            base_url: STRIPE_API_BASE.to_string(),
        }
    }

    /// Replace the HTTP client (e.g. one with a request timeout).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Replace the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Form fields for a checkout session.
    pub fn checkout_form(params: &CheckoutParams) -> Vec<(String, String)> {
        let mut form: Form = vec![
            ("mode".into(), "subscription".into()),
            ("line_items[0][price]".into(), params.price_id.clone()),
            ("line_items[0][quantity]".into(), "1".into()),
            ("success_url".into(), params.success_url.clone()),
            ("cancel_url".into(), params.cancel_url.clone()),
            ("metadata[tier]".into(), params.tier.clone()),
        ];
        if let Some(user_id) = &params.user_id {
            form.push(("metadata[userId]".into(), user_id.clone()));
        }
        if let Some(customer) = &params.customer_id {
            form.push(("customer".into(), customer.clone()));
        } else if let Some(email) = &params.customer_email {
            form.push(("customer_email".into(), email.clone()));
        }
        form
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> DomainforgeResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.secret_key)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, path, "Stripe request failed");
                BillingError::new(BillingErrorKind::Api(e.to_string()))
            })?;
        Self::decode(response).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, form: &Form) -> DomainforgeResult<T> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, path, "Stripe request failed");
                BillingError::new(BillingErrorKind::Api(e.to_string()))
            })?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> DomainforgeResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BillingError::new(BillingErrorKind::Api(e.to_string())))?;

        if !status.is_success() {
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            error!(status = status.as_u16(), %message, "Stripe returned error");
            Err(BillingError::new(BillingErrorKind::Api(message)))?
        }

        let payload = std::any::type_name::<T>()
            .split('<')
            .next()
            .and_then(|path| path.rsplit("::").next())
            .unwrap_or("response");
        serde_json::from_str(&body)
            .map_err(|e| JsonError::new(Upstream::Stripe, payload, e.to_string()).into())
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    #[instrument(skip(self, params), fields(tier = %params.tier))]
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> DomainforgeResult<CheckoutSession> {
        let session: StripeCheckoutSession = self
            .post("checkout/sessions", &Self::checkout_form(params))
            .await?;
        debug!(session_id = %session.id, "Created checkout session");
        Ok(session.into())
    }

    #[instrument(skip(self))]
    async fn retrieve_subscription(&self, id: &str) -> DomainforgeResult<GatewaySubscription> {
        let sub: StripeSubscription = self.get(&format!("subscriptions/{}", id), &[]).await?;
        Ok(sub.into())
    }

    #[instrument(skip(self))]
    async fn set_cancel_at_period_end(
        &self,
        id: &str,
        cancel: bool,
    ) -> DomainforgeResult<GatewaySubscription> {
        let form: Form = vec![("cancel_at_period_end".into(), cancel.to_string())];
        let sub: StripeSubscription = self.post(&format!("subscriptions/{}", id), &form).await?;
        Ok(sub.into())
    }

    #[instrument(skip(self))]
    async fn change_price(
        &self,
        id: &str,
        item_id: &str,
        price_id: &str,
    ) -> DomainforgeResult<GatewaySubscription> {
        let form: Form = vec![
            ("items[0][id]".into(), item_id.to_string()),
            ("items[0][price]".into(), price_id.to_string()),
            ("proration_behavior".into(), "always_invoice".into()),
        ];
        let sub: StripeSubscription = self.post(&format!("subscriptions/{}", id), &form).await?;
        Ok(sub.into())
    }

    async fn subscription_object(&self, id: &str) -> DomainforgeResult<Value> {
        self.get(&format!("subscriptions/{}", id), &[]).await
    }

    async fn upcoming_invoice(&self, customer_id: &str) -> DomainforgeResult<Value> {
        self.get("invoices/upcoming", &[("customer", customer_id)]).await
    }

    async fn payment_methods(&self, customer_id: &str) -> DomainforgeResult<Vec<Value>> {
        let list: StripeList<Value> = self
            .get(
                &format!("customers/{}/payment_methods", customer_id),
                &[("type", "card")],
            )
            .await?;
        Ok(list.data)
    }
}
