//! Payment reconciliation: drives order status from gateway callbacks.

use std::collections::HashMap;

use common::{OrderId, PaymentToken};
use domain::{Money, Order, Shopper};
use gateway::{CallbackData, GatewayConfig, StatusClient, decode_callback};
use serde::Serialize;
use store::{MarketStore, StoreTx};

use crate::error::ReconcileError;

/// Why a success callback was rejected instead of confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// A signed envelope arrived but its status was not `COMPLETE`.
    NotComplete,
    /// The callback carried no verifiable signature (flat form); an
    /// unauthenticated claim of payment never confirms an order.
    UnverifiedCallback,
    /// The gateway's status endpoint answered with a non-complete
    /// status, or with something other than a well-formed report.
    GatewayDenied,
    /// The status probe failed at the transport level and the
    /// configured policy forbids trusting the callback alone.
    Unverifiable,
    /// The order was already canceled when the callback arrived.
    AlreadyCanceled,
}

/// The result of reconciling a success callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The payment checked out: the order moved to `accepted` and the
    /// shopper's cart was cleared. `degraded` is true when the status
    /// probe was unreachable and the callback was trusted by policy.
    Confirmed { order_id: OrderId, degraded: bool },

    /// A duplicate delivery of an already-reconciled callback; nothing
    /// changed, and that is success.
    AlreadyConfirmed { order_id: OrderId },

    /// The payment could not be trusted; a still-pending order was
    /// canceled, the cart left untouched.
    Rejected {
        order_id: OrderId,
        reason: RejectReason,
    },
}

/// The result of a failure-callback (abandonment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AbandonOutcome {
    /// The referenced pending order was canceled.
    Canceled { order_id: OrderId },
    /// Nothing to do: no token, no matching order, or the order had
    /// already left `pending`.
    Acknowledged,
}

/// Reconciles gateway callbacks against stored orders.
///
/// Decoding and signature failures propagate as errors with no state
/// change; every decision that does touch an order re-reads it inside
/// the mutating transaction, so a duplicate callback observes the
/// first one's write and no-ops.
pub struct Reconciler<S, C> {
    store: S,
    status: C,
    config: GatewayConfig,
}

impl<S: MarketStore, C: StatusClient> Reconciler<S, C> {
    /// Creates a reconciler over the given store and status client.
    pub fn new(store: S, status: C, config: GatewayConfig) -> Self {
        Self {
            store,
            status,
            config,
        }
    }

    /// Handles a success callback.
    #[tracing::instrument(skip(self, params))]
    pub async fn confirm(
        &self,
        shopper: &Shopper,
        params: &HashMap<String, String>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let data = decode_callback(&self.config.secret_key, params)?;
        let order = self.locate(shopper, &data.transaction_uuid).await?;
        self.check_amount(&data, &order)?;

        let outcome = match self.decide(&data).await {
            Decision::Confirm { degraded } => self.apply_confirmation(shopper, &order, degraded).await?,
            Decision::Reject(reason) => self.apply_rejection(&order, reason).await?,
        };

        let label = match outcome {
            ReconcileOutcome::Confirmed { .. } => "confirmed",
            ReconcileOutcome::AlreadyConfirmed { .. } => "already_confirmed",
            ReconcileOutcome::Rejected { .. } => "rejected",
        };
        metrics::counter!("payment_callbacks_total", "outcome" => label).increment(1);
        Ok(outcome)
    }

    /// Handles a failure callback: cancels the referenced order if it
    /// is still pending, otherwise acknowledges and does nothing. An
    /// unknown or absent token is acknowledged too; this endpoint must
    /// not serve as an oracle for guessing tokens.
    #[tracing::instrument(skip(self))]
    pub async fn abandon(
        &self,
        shopper: &Shopper,
        token: Option<&str>,
    ) -> Result<AbandonOutcome, ReconcileError> {
        let Some(raw) = token else {
            return Ok(AbandonOutcome::Acknowledged);
        };
        let Ok(token) = raw.parse::<PaymentToken>() else {
            return Ok(AbandonOutcome::Acknowledged);
        };

        let mut orders = self
            .store
            .orders_by_payment_token(shopper.id(), &token)
            .await?;
        let order = match orders.len() {
            0 => return Ok(AbandonOutcome::Acknowledged),
            1 => orders.remove(0),
            _ => {
                return Err(ReconcileError::AmbiguousOrder {
                    token: raw.to_string(),
                });
            }
        };

        let mut tx = self.store.begin().await?;
        let current = tx
            .order_for_update(order.id)
            .await?
            .ok_or(ReconcileError::OrderNotFound {
                token: raw.to_string(),
            })?;
        if !current.status.can_cancel() {
            return Ok(AbandonOutcome::Acknowledged);
        }
        tx.set_order_status(order.id, domain::OrderStatus::Canceled)
            .await?;
        tx.commit().await?;
        tracing::info!(order_id = %order.id, "payment abandoned, order canceled");
        Ok(AbandonOutcome::Canceled { order_id: order.id })
    }

    /// Finds the single order of this shopper carrying the callback's
    /// token. Zero matches and more than one match are both errors;
    /// the token column is unique, so two rows mean corrupted records
    /// that must never be resolved by picking one.
    async fn locate(&self, shopper: &Shopper, raw_token: &str) -> Result<Order, ReconcileError> {
        let not_found = || ReconcileError::OrderNotFound {
            token: raw_token.to_string(),
        };
        let token = raw_token.parse::<PaymentToken>().map_err(|_| not_found())?;
        let mut orders = self
            .store
            .orders_by_payment_token(shopper.id(), &token)
            .await?;
        match orders.len() {
            0 => Err(not_found()),
            1 => Ok(orders.remove(0)),
            _ => Err(ReconcileError::AmbiguousOrder {
                token: raw_token.to_string(),
            }),
        }
    }

    /// Compares the callback's claimed amount with the stored total,
    /// exactly. "200", "200.0" and "200.00" all equal a 20000-cent
    /// total; anything else is a mismatch and a tampering signal.
    fn check_amount(&self, data: &CallbackData, order: &Order) -> Result<(), ReconcileError> {
        let claimed = Money::parse_amount(&data.total_amount)
            .map_err(|_| ReconcileError::MalformedAmount(data.total_amount.clone()))?;
        if claimed != order.total_amount {
            tracing::warn!(
                order_id = %order.id,
                claimed = %data.total_amount,
                expected = %order.total_amount,
                "callback amount mismatch"
            );
            return Err(ReconcileError::AmountMismatch {
                claimed: data.total_amount.clone(),
                expected: order.total_amount.amount_string(),
            });
        }
        Ok(())
    }

    /// Decides confirm-or-reject for an amount-checked callback.
    ///
    /// Only a signed envelope reporting `COMPLETE` can confirm, and
    /// even then the gateway's status endpoint is asked for the
    /// authoritative answer. A transport failure of that probe falls
    /// back to trusting the callback only when configuration allows
    /// it, at degraded confidence.
    async fn decide(&self, data: &CallbackData) -> Decision {
        if !data.signature_verified {
            tracing::warn!(
                token = %data.transaction_uuid,
                "unverified callback cannot confirm a payment"
            );
            return Decision::Reject(RejectReason::UnverifiedCallback);
        }
        if !data.is_signed_complete() {
            return Decision::Reject(RejectReason::NotComplete);
        }

        match self
            .status
            .transaction_status(&data.transaction_uuid, &data.total_amount)
            .await
        {
            Ok(report) if report.is_complete() => Decision::Confirm { degraded: false },
            Ok(report) => {
                tracing::warn!(
                    token = %data.transaction_uuid,
                    status = %report.status,
                    "gateway denies completion"
                );
                Decision::Reject(RejectReason::GatewayDenied)
            }
            Err(error) if error.is_transport() => {
                if self.config.trust_callback_on_outage {
                    tracing::warn!(
                        token = %data.transaction_uuid,
                        %error,
                        "status probe unreachable, trusting signed callback"
                    );
                    metrics::counter!("payment_callbacks_degraded_total").increment(1);
                    Decision::Confirm { degraded: true }
                } else {
                    Decision::Reject(RejectReason::Unverifiable)
                }
            }
            Err(error) => {
                tracing::warn!(token = %data.transaction_uuid, %error, "status probe failed");
                Decision::Reject(RejectReason::GatewayDenied)
            }
        }
    }

    /// Applies a confirmation with a current-status guard: only a
    /// pending order transitions; anything already past pending is a
    /// duplicate delivery and no-ops.
    async fn apply_confirmation(
        &self,
        shopper: &Shopper,
        order: &Order,
        degraded: bool,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let mut tx = self.store.begin().await?;
        let current = tx.order_for_update(order.id).await?.ok_or_else(|| {
            ReconcileError::OrderNotFound {
                token: order
                    .payment_token
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
            }
        })?;

        match current.status {
            s if s.can_accept() => {
                tx.set_order_status(order.id, domain::OrderStatus::Accepted)
                    .await?;
                tx.clear_cart(shopper.id()).await?;
                tx.commit().await?;
                tracing::info!(order_id = %order.id, degraded, "payment confirmed");
                Ok(ReconcileOutcome::Confirmed {
                    order_id: order.id,
                    degraded,
                })
            }
            domain::OrderStatus::Canceled => Ok(ReconcileOutcome::Rejected {
                order_id: order.id,
                reason: RejectReason::AlreadyCanceled,
            }),
            _ => Ok(ReconcileOutcome::AlreadyConfirmed { order_id: order.id }),
        }
    }

    /// Applies a rejection: a still-pending order is canceled; an
    /// order in any other state is left exactly as it is. The cart is
    /// never touched on this path.
    async fn apply_rejection(
        &self,
        order: &Order,
        reason: RejectReason,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let mut tx = self.store.begin().await?;
        if let Some(current) = tx.order_for_update(order.id).await?
            && current.status.can_cancel()
        {
            tx.set_order_status(order.id, domain::OrderStatus::Canceled)
                .await?;
            tx.commit().await?;
            tracing::warn!(order_id = %order.id, ?reason, "payment rejected, order canceled");
        }
        Ok(ReconcileOutcome::Rejected {
            order_id: order.id,
            reason,
        })
    }
}

enum Decision {
    Confirm { degraded: bool },
    Reject(RejectReason),
}
