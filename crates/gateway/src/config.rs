//! Gateway configuration loaded from environment variables.

use std::time::Duration;

/// Payment gateway configuration with test-environment defaults.
///
/// Reads from environment variables:
/// - `GATEWAY_MERCHANT_CODE` — merchant/product code (default: `"EPAYTEST"`)
/// - `GATEWAY_SECRET_KEY` — shared HMAC secret
/// - `GATEWAY_FORM_URL` — redirect form post target
/// - `GATEWAY_STATUS_URL` — transaction-status endpoint
/// - `GATEWAY_SUCCESS_URL` — where the gateway sends the shopper on success
/// - `GATEWAY_FAILURE_URL` — where the gateway sends the shopper on failure
/// - `GATEWAY_TIMEOUT_SECS` — status probe timeout (default: 10)
/// - `GATEWAY_TRUST_CALLBACK_ON_OUTAGE` — whether a signed COMPLETE
///   callback may be trusted when the status endpoint is unreachable
///   (default: true). This is the availability-over-certainty policy
///   knob; set to `false` to reject payments that cannot be
///   authoritatively verified.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub merchant_code: String,
    pub secret_key: String,
    pub form_url: String,
    pub status_url: String,
    pub success_url: String,
    pub failure_url: String,
    pub request_timeout: Duration,
    pub trust_callback_on_outage: bool,
}

impl GatewayConfig {
    /// Loads configuration from environment variables, falling back to
    /// the gateway's public test environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            merchant_code: std::env::var("GATEWAY_MERCHANT_CODE")
                .unwrap_or(defaults.merchant_code),
            secret_key: std::env::var("GATEWAY_SECRET_KEY").unwrap_or(defaults.secret_key),
            form_url: std::env::var("GATEWAY_FORM_URL").unwrap_or(defaults.form_url),
            status_url: std::env::var("GATEWAY_STATUS_URL").unwrap_or(defaults.status_url),
            success_url: std::env::var("GATEWAY_SUCCESS_URL").unwrap_or(defaults.success_url),
            failure_url: std::env::var("GATEWAY_FAILURE_URL").unwrap_or(defaults.failure_url),
            request_timeout: std::env::var("GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            trust_callback_on_outage: std::env::var("GATEWAY_TRUST_CALLBACK_ON_OUTAGE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.trust_callback_on_outage),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            merchant_code: "EPAYTEST".to_string(),
            secret_key: "8gBm/:&EnhH.1/q".to_string(),
            form_url: "https://rc-epay.esewa.com.np/api/epay/main/v2/form".to_string(),
            status_url: "https://rc-epay.esewa.com.np/api/epay/transaction/status/".to_string(),
            success_url: "http://localhost:3000/payments/callback/success".to_string(),
            failure_url: "http://localhost:3000/payments/callback/failure".to_string(),
            request_timeout: Duration::from_secs(10),
            trust_callback_on_outage: true,
        }
    }
}
