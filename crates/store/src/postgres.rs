use async_trait::async_trait;
use common::{OrderId, PaymentToken, ProductId, UserId};
use domain::{CartEntry, Money, Order, OrderLineItem, OrderStatus, Product};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{MarketStore, StoreTx};

/// PostgreSQL-backed store implementation.
///
/// Transactional reads of product and order rows use `FOR UPDATE`, so
/// two checkouts racing on the same product serialize on the row lock
/// and the later one sees the earlier decrement before its floor check.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

fn row_to_product(row: PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
        vendor: UserId::from_uuid(row.try_get::<Uuid, _>("vendor_id")?),
        name: row.try_get("name")?,
        price: Money::from_cents(row.try_get("price_cents")?),
        discount_price: row
            .try_get::<Option<i64>, _>("discount_price_cents")?
            .map(Money::from_cents),
        stock: stock_from_db(row.try_get("stock")?)?,
    })
}

fn row_to_order(row: PgRow) -> Result<Order> {
    let status: String = row.try_get("status")?;
    Ok(Order {
        id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
        user: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
        total_amount: Money::from_cents(row.try_get("total_cents")?),
        status: status.parse::<OrderStatus>().map_err(StoreError::Decode)?,
        created_at: row.try_get("created_at")?,
        payment_token: row
            .try_get::<Option<Uuid>, _>("payment_token")?
            .map(PaymentToken::from_uuid),
    })
}

fn row_to_line_item(row: PgRow) -> Result<OrderLineItem> {
    Ok(OrderLineItem {
        order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
        product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
        quantity: quantity_from_db(row.try_get("quantity")?)?,
        unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
    })
}

fn stock_from_db(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::Decode(format!("negative stock: {value}")))
}

fn quantity_from_db(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::Decode(format!("invalid quantity: {value}")))
}

#[async_trait]
impl MarketStore for PostgresStore {
    type Tx = PostgresTx;

    async fn begin(&self) -> Result<PostgresTx> {
        Ok(PostgresTx {
            tx: self.pool.begin().await?,
        })
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, vendor_id, name, price_cents, discount_price_cents, stock \
             FROM products WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_product).transpose()
    }

    async fn upsert_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, vendor_id, name, price_cents, discount_price_cents, stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                vendor_id = EXCLUDED.vendor_id,
                name = EXCLUDED.name,
                price_cents = EXCLUDED.price_cents,
                discount_price_cents = EXCLUDED.discount_price_cents,
                stock = EXCLUDED.stock
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.vendor.as_uuid())
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(product.discount_price.map(|m| m.cents()))
        .bind(product.stock as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn cart_entries(&self, user: UserId) -> Result<Vec<CartEntry>> {
        let rows = sqlx::query(
            "SELECT user_id, product_id, quantity FROM cart_entries WHERE user_id = $1",
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CartEntry {
                    user: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
                    product: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
                    quantity: quantity_from_db(row.try_get("quantity")?)?,
                })
            })
            .collect()
    }

    async fn put_cart_entry(&self, entry: &CartEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cart_entries (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
            "#,
        )
        .bind(entry.user.as_uuid())
        .bind(entry.product.as_uuid())
        .bind(entry.quantity as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            "SELECT id, user_id, total_cents, status, created_at, payment_token \
             FROM orders WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_order).transpose()
    }

    async fn line_items(&self, order: OrderId) -> Result<Vec<OrderLineItem>> {
        let rows = sqlx::query(
            "SELECT order_id, product_id, quantity, unit_price_cents \
             FROM order_line_items WHERE order_id = $1",
        )
        .bind(order.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_line_item).collect()
    }

    async fn orders_by_payment_token(
        &self,
        user: UserId,
        token: &PaymentToken,
    ) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT id, user_id, total_cents, status, created_at, payment_token \
             FROM orders WHERE payment_token = $1 AND user_id = $2",
        )
        .bind(token.as_uuid())
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_order).collect()
    }

    async fn vendor_supplies_order(&self, order: OrderId, vendor: UserId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM order_line_items li
                JOIN products p ON p.id = li.product_id
                WHERE li.order_id = $1 AND p.vendor_id = $2
            )
            "#,
        )
        .bind(order.as_uuid())
        .bind(vendor.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

/// An open transaction against a [`PostgresStore`].
pub struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PostgresTx {
    async fn product_for_update(&mut self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, vendor_id, name, price_cents, discount_price_cents, stock \
             FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(row_to_product).transpose()
    }

    async fn set_product_stock(&mut self, id: ProductId, stock: u32) -> Result<()> {
        let result = sqlx::query("UPDATE products SET stock = $1 WHERE id = $2")
            .bind(stock as i64)
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ProductMissing(id));
        }
        Ok(())
    }

    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, total_cents, status, created_at, payment_token)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user.as_uuid())
        .bind(order.total_amount.cents())
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.payment_token.map(|t| t.as_uuid()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_payment_token_key")
            {
                return StoreError::DuplicatePaymentToken;
            }
            StoreError::Database(e)
        })?;
        Ok(())
    }

    async fn insert_line_item(&mut self, item: &OrderLineItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_line_items (order_id, product_id, quantity, unit_price_cents)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(item.order_id.as_uuid())
        .bind(item.product_id.as_uuid())
        .bind(item.quantity as i64)
        .bind(item.unit_price.cents())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn order_for_update(&mut self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            "SELECT id, user_id, total_cents, status, created_at, payment_token \
             FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(row_to_order).transpose()
    }

    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<()> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OrderMissing(id));
        }
        Ok(())
    }

    async fn clear_cart(&mut self, user: UserId) -> Result<()> {
        sqlx::query("DELETE FROM cart_entries WHERE user_id = $1")
            .bind(user.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
