//! Authoritative transaction-status probe.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::timeout;

use crate::config::GatewayConfig;
use crate::error::StatusError;
use crate::signing::{canonical_string, sign};

/// The gateway's answer to a status query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusReport {
    /// Transaction status as reported by the gateway.
    pub status: String,
    /// The gateway's reference for the transaction, when echoed back.
    #[serde(default)]
    pub ref_id: Option<String>,
}

impl StatusReport {
    /// Creates a report with the given status string.
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ref_id: None,
        }
    }

    /// True if the gateway reports the transaction as completed.
    pub fn is_complete(&self) -> bool {
        self.status.eq_ignore_ascii_case("COMPLETE")
    }
}

/// Queries the gateway's transaction-status endpoint.
#[async_trait]
pub trait StatusClient: Send + Sync {
    /// Asks the gateway for the current status of the transaction
    /// identified by the payment token and amount.
    async fn transaction_status(
        &self,
        transaction_uuid: &str,
        total_amount: &str,
    ) -> Result<StatusReport, StatusError>;
}

/// Real HTTP status client.
///
/// Sends a GET with the merchant code, amount and token as query
/// parameters and a fresh HMAC signature in the `Signature` header.
/// The whole request is bounded by the configured timeout; transport
/// failures surface as recoverable [`StatusError`] variants.
#[derive(Clone)]
pub struct HttpStatusClient {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpStatusClient {
    /// Creates a status client for the configured gateway.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl StatusClient for HttpStatusClient {
    async fn transaction_status(
        &self,
        transaction_uuid: &str,
        total_amount: &str,
    ) -> Result<StatusReport, StatusError> {
        let canonical = canonical_string(total_amount, transaction_uuid, &self.config.merchant_code);
        let signature = sign(&self.config.secret_key, &canonical)
            .map_err(|e| StatusError::Signing(e.to_string()))?;

        let request = self
            .client
            .get(&self.config.status_url)
            .query(&[
                ("product_code", self.config.merchant_code.as_str()),
                ("total_amount", total_amount),
                ("transaction_uuid", transaction_uuid),
            ])
            .header("Signature", signature)
            .send();

        let response = timeout(self.config.request_timeout, request)
            .await
            .map_err(|_| StatusError::Timedout)?
            .map_err(|e| StatusError::Unreachable(e.to_string()))?;

        let http_status = response.status();
        if !http_status.is_success() {
            return Err(StatusError::Http(http_status.as_u16()));
        }

        response
            .json::<StatusReport>()
            .await
            .map_err(|e| StatusError::Malformed(e.to_string()))
    }
}

#[derive(Debug, Default)]
struct ScriptedState {
    responses: VecDeque<Result<StatusReport, StatusError>>,
    calls: u32,
}

/// Scripted status client for tests.
///
/// Responses are served in push order; once the script runs dry every
/// further call reports `COMPLETE`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStatusClient {
    state: Arc<RwLock<ScriptedState>>,
}

impl ScriptedStatusClient {
    /// Creates a scripted client with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a status report.
    pub fn push_report(&self, report: StatusReport) {
        self.state.write().unwrap().responses.push_back(Ok(report));
    }

    /// Queues a probe failure.
    pub fn push_error(&self, error: StatusError) {
        self.state.write().unwrap().responses.push_back(Err(error));
    }

    /// Returns how many probes have been made.
    pub fn call_count(&self) -> u32 {
        self.state.read().unwrap().calls
    }
}

#[async_trait]
impl StatusClient for ScriptedStatusClient {
    async fn transaction_status(
        &self,
        _transaction_uuid: &str,
        _total_amount: &str,
    ) -> Result<StatusReport, StatusError> {
        let mut state = self.state.write().unwrap();
        state.calls += 1;
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(StatusReport::with_status("COMPLETE")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_complete_ignores_case() {
        assert!(StatusReport::with_status("COMPLETE").is_complete());
        assert!(StatusReport::with_status("complete").is_complete());
        assert!(!StatusReport::with_status("PENDING").is_complete());
        assert!(!StatusReport::with_status("").is_complete());
    }

    #[tokio::test]
    async fn test_scripted_client_serves_in_order() {
        let client = ScriptedStatusClient::new();
        client.push_report(StatusReport::with_status("PENDING"));
        client.push_error(StatusError::Timedout);

        assert_eq!(
            client.transaction_status("t", "1.00").await.unwrap().status,
            "PENDING"
        );
        assert!(matches!(
            client.transaction_status("t", "1.00").await,
            Err(StatusError::Timedout)
        ));
        // Script exhausted: defaults to COMPLETE.
        assert!(
            client
                .transaction_status("t", "1.00")
                .await
                .unwrap()
                .is_complete()
        );
        assert_eq!(client.call_count(), 3);
    }

    #[test]
    fn test_transport_classification() {
        assert!(StatusError::Timedout.is_transport());
        assert!(StatusError::Unreachable("refused".to_string()).is_transport());
        assert!(!StatusError::Http(500).is_transport());
        assert!(!StatusError::Malformed("not json".to_string()).is_transport());
    }
}
