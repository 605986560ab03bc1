//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{PaymentToken, ProductId, UserId};
use domain::{CartEntry, Money, Order, OrderLineItem, OrderStatus, Product};
use sqlx::PgPool;
use store::{MarketStore, PostgresStore, StoreError, StoreTx};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_market_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE cart_entries, order_line_items, orders, products")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn test_product(vendor: UserId, stock: u32) -> Product {
    Product::new(
        ProductId::new(),
        vendor,
        "Widget",
        Money::from_cents(10000),
        stock,
    )
}

#[tokio::test]
async fn product_roundtrip_with_discount() {
    let store = get_test_store().await;
    let product = test_product(UserId::new(), 7).with_discount(Money::from_cents(7500));

    store.upsert_product(&product).await.unwrap();

    let loaded = store.product(product.id).await.unwrap().unwrap();
    assert_eq!(loaded, product);
    assert_eq!(loaded.effective_price().cents(), 7500);
}

#[tokio::test]
async fn order_roundtrip_preserves_status_and_token() {
    let store = get_test_store().await;
    let token = PaymentToken::new();
    let order = Order::new(UserId::new(), Money::from_cents(20000), Some(token));

    let mut tx = store.begin().await.unwrap();
    tx.insert_order(&order).await.unwrap();
    tx.commit().await.unwrap();

    let loaded = store.order(order.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, OrderStatus::Pending);
    assert_eq!(loaded.payment_token, Some(token));
    assert_eq!(loaded.total_amount.cents(), 20000);
}

#[tokio::test]
async fn rolled_back_transaction_is_invisible() {
    let store = get_test_store().await;
    let product = test_product(UserId::new(), 5);
    store.upsert_product(&product).await.unwrap();

    let order = Order::new(UserId::new(), Money::from_cents(10000), None);
    {
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&order).await.unwrap();
        tx.insert_line_item(&OrderLineItem {
            order_id: order.id,
            product_id: product.id,
            quantity: 1,
            unit_price: Money::from_cents(10000),
        })
        .await
        .unwrap();
        tx.set_product_stock(product.id, 4).await.unwrap();
        // dropped without commit
    }

    assert!(store.order(order.id).await.unwrap().is_none());
    assert!(store.line_items(order.id).await.unwrap().is_empty());
    assert_eq!(store.product(product.id).await.unwrap().unwrap().stock, 5);
}

#[tokio::test]
async fn duplicate_payment_token_is_rejected() {
    let store = get_test_store().await;
    let token = PaymentToken::new();
    let user = UserId::new();

    let mut tx = store.begin().await.unwrap();
    tx.insert_order(&Order::new(user, Money::from_cents(100), Some(token)))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let result = tx
        .insert_order(&Order::new(user, Money::from_cents(200), Some(token)))
        .await;
    assert!(matches!(result, Err(StoreError::DuplicatePaymentToken)));
}

#[tokio::test]
async fn orders_by_payment_token_is_user_scoped() {
    let store = get_test_store().await;
    let token = PaymentToken::new();
    let owner = UserId::new();

    let order = Order::new(owner, Money::from_cents(5000), Some(token));
    let mut tx = store.begin().await.unwrap();
    tx.insert_order(&order).await.unwrap();
    tx.commit().await.unwrap();

    let found = store.orders_by_payment_token(owner, &token).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, order.id);

    let other = store
        .orders_by_payment_token(UserId::new(), &token)
        .await
        .unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn cart_entries_upsert_and_clear() {
    let store = get_test_store().await;
    let user = UserId::new();
    let product = test_product(UserId::new(), 5);
    store.upsert_product(&product).await.unwrap();

    store
        .put_cart_entry(&CartEntry {
            user,
            product: product.id,
            quantity: 1,
        })
        .await
        .unwrap();
    store
        .put_cart_entry(&CartEntry {
            user,
            product: product.id,
            quantity: 4,
        })
        .await
        .unwrap();

    let entries = store.cart_entries(user).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].quantity, 4);

    let mut tx = store.begin().await.unwrap();
    tx.clear_cart(user).await.unwrap();
    tx.commit().await.unwrap();

    assert!(store.cart_entries(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn vendor_supplies_order_joins_through_products() {
    let store = get_test_store().await;
    let vendor = UserId::new();
    let product = test_product(vendor, 5);
    store.upsert_product(&product).await.unwrap();

    let order = Order::new(UserId::new(), Money::from_cents(10000), None);
    let mut tx = store.begin().await.unwrap();
    tx.insert_order(&order).await.unwrap();
    tx.insert_line_item(&OrderLineItem {
        order_id: order.id,
        product_id: product.id,
        quantity: 1,
        unit_price: Money::from_cents(10000),
    })
    .await
    .unwrap();
    tx.commit().await.unwrap();

    assert!(store.vendor_supplies_order(order.id, vendor).await.unwrap());
    assert!(
        !store
            .vendor_supplies_order(order.id, UserId::new())
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn status_update_roundtrip() {
    let store = get_test_store().await;
    let order = Order::new(UserId::new(), Money::from_cents(100), None);

    let mut tx = store.begin().await.unwrap();
    tx.insert_order(&order).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let current = tx.order_for_update(order.id).await.unwrap().unwrap();
    assert!(current.status.can_accept());
    tx.set_order_status(order.id, OrderStatus::Accepted)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let loaded = store.order(order.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, OrderStatus::Accepted);
}
