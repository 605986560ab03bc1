//! Outbound signed redirect form.

use common::PaymentToken;
use domain::Money;
use serde::Serialize;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::signing::{SIGNED_FIELD_NAMES, canonical_string, sign};

/// The field set posted to the gateway's redirect form endpoint.
///
/// `signed_field_names` declares, in order, which fields the signature
/// covers; the gateway re-joins those fields into the canonical string
/// and checks the HMAC on its side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectForm {
    /// Where the browser form should be posted.
    pub form_url: String,
    pub amount: String,
    pub tax_amount: String,
    pub total_amount: String,
    pub transaction_uuid: String,
    pub product_code: String,
    pub product_service_charge: String,
    pub product_delivery_charge: String,
    pub success_url: String,
    pub failure_url: String,
    pub signed_field_names: String,
    pub signature: String,
}

impl RedirectForm {
    /// Builds the signed redirect payload for an order total and its
    /// payment correlation token.
    ///
    /// Tax, service and delivery charges are fixed at zero; the order
    /// total is the full charged amount.
    pub fn build(
        config: &GatewayConfig,
        total_amount: Money,
        token: &PaymentToken,
    ) -> Result<Self, GatewayError> {
        let amount = total_amount.amount_string();
        let transaction_uuid = token.to_string();
        let canonical = canonical_string(&amount, &transaction_uuid, &config.merchant_code);
        let signature = sign(&config.secret_key, &canonical)?;

        Ok(Self {
            form_url: config.form_url.clone(),
            amount: amount.clone(),
            tax_amount: "0".to_string(),
            total_amount: amount,
            transaction_uuid,
            product_code: config.merchant_code.clone(),
            product_service_charge: "0".to_string(),
            product_delivery_charge: "0".to_string(),
            success_url: config.success_url.clone(),
            failure_url: config.failure_url.clone(),
            signed_field_names: SIGNED_FIELD_NAMES.to_string(),
            signature,
        })
    }
}
