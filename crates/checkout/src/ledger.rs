//! Inventory ledger: atomic stock decrements with a floor at zero.
//!
//! Every decrement runs against a product row claimed for update inside
//! the caller's transaction, so two concurrent checkouts of the same
//! product serialize and the second one sees the first one's write.
//! A decrement that would take stock below zero fails the whole
//! transaction instead of clamping.

use common::ProductId;
use store::StoreTx;

use crate::error::CheckoutError;

/// Decrements a product's stock by `quantity` inside the transaction.
///
/// Fails with [`CheckoutError::InsufficientStock`] when fewer than
/// `quantity` units remain, leaving the stock count untouched. The
/// caller is expected to abandon the transaction on error, which rolls
/// back any earlier decrements of the same order.
pub async fn decrement<T: StoreTx>(
    tx: &mut T,
    product_id: ProductId,
    quantity: u32,
) -> Result<(), CheckoutError> {
    let product = tx
        .product_for_update(product_id)
        .await?
        .ok_or(CheckoutError::ProductNotFound(product_id))?;

    let remaining =
        product
            .stock
            .checked_sub(quantity)
            .ok_or_else(|| CheckoutError::InsufficientStock {
                product: product_id,
                name: product.name.clone(),
                requested: quantity,
                available: product.stock,
            })?;

    tx.set_product_stock(product_id, remaining).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;
    use domain::{Money, Product};
    use store::{InMemoryStore, MarketStore};

    async fn seeded_store(stock: u32) -> (InMemoryStore, ProductId) {
        let store = InMemoryStore::new();
        let id = ProductId::new();
        let product = Product::new(id, UserId::new(), "Widget", Money::from_cents(1000), stock);
        store.upsert_product(&product).await.unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn test_decrement_reduces_stock() {
        let (store, id) = seeded_store(5).await;
        let mut tx = store.begin().await.unwrap();
        decrement(&mut tx, id, 3).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.product(id).await.unwrap().unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_decrement_to_exactly_zero() {
        let (store, id) = seeded_store(3).await;
        let mut tx = store.begin().await.unwrap();
        decrement(&mut tx, id, 3).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.product(id).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_decrement_below_zero_is_rejected() {
        let (store, id) = seeded_store(1).await;
        let mut tx = store.begin().await.unwrap();
        let err = decrement(&mut tx, id, 5).await.unwrap_err();
        drop(tx);

        assert!(matches!(
            err,
            CheckoutError::InsufficientStock {
                requested: 5,
                available: 1,
                ..
            }
        ));
        // The uncommitted transaction left the stock count alone.
        assert_eq!(store.product(id).await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_decrement_unknown_product() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        assert!(matches!(
            decrement(&mut tx, ProductId::new(), 1).await,
            Err(CheckoutError::ProductNotFound(_))
        ));
    }
}
