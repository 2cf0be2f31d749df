use crate::{config::RazorpayConfig, errors::AppError};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct RazorpayService {
    client: Client,
    config: RazorpayConfig,
}

// ─── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    /// Minor currency unit (paise for INR)
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayErrorBody,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorBody {
    description: String,
}

impl RazorpayService {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    /// Create a gateway order the client-side checkout will pay against
    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<RazorpayOrder, AppError> {
        let url = format!("{}/v1/orders", self.config.base_url);

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&CreateOrderRequest {
                amount,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = resp
                .json::<RazorpayErrorResponse>()
                .await
                .map(|e| e.error.description)
                .unwrap_or_else(|_| format!("order creation failed with status {status}"));
            return Err(AppError::Gateway(message));
        }

        resp.json()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))
    }

    /// Check the checkout callback signature against this account's secret
    pub fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), AppError> {
        verify_signature(order_id, payment_id, signature, &self.config.key_secret)
    }
}

/// Hex HMAC-SHA256 of `"{order_id}|{payment_id}"` keyed with the API secret.
pub fn expected_signature(order_id: &str, payment_id: &str, secret: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

pub fn verify_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> Result<(), AppError> {
    if expected_signature(order_id, payment_id, secret)? == signature {
        Ok(())
    } else {
        Err(AppError::VerificationFailed)
    }
}
