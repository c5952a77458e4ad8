//! Order Repository
//!
//! Order creation decrements product stock inside one transaction with an
//! atomic conditional UPDATE, so concurrent orders can never oversell
//! (the CHECK constraint on product.quantity backstops it).

use super::{RepoError, RepoResult};
use shared::models::{
    Customer, DeliveryWay, Order, OrderCreate, OrderDetail, OrderStatus, OrderUpdate,
    PaymentStatus, Product,
};
use sqlx::SqlitePool;

const ORDER_SELECT: &str = "SELECT id, product_id, customer_id, agreement_id, quantity, price, delivery_way, payment_status, payment_intent_id, paid_at, status, completed_at, created_at, updated_at FROM orders";

const ORDER_DETAIL_SELECT: &str = "SELECT o.id, o.product_id, o.customer_id, o.agreement_id, o.quantity, o.price, o.delivery_way, o.payment_status, o.payment_intent_id, o.paid_at, o.status, o.completed_at, o.created_at, o.updated_at, p.name as p_name, p.description as p_description, p.price as p_price, p.images as p_images, p.quantity as p_quantity, p.created_at as p_created_at, p.updated_at as p_updated_at, c.name as c_name, c.street as c_street, c.city as c_city, c.state as c_state, c.zip as c_zip, c.phone as c_phone, c.contact_person as c_contact_person, c.created_at as c_created_at, c.updated_at as c_updated_at FROM orders o JOIN product p ON o.product_id = p.id JOIN customer c ON o.customer_id = c.id";

/// Flat row for the detail JOIN; product/customer columns are aliased.
#[derive(sqlx::FromRow)]
struct OrderDetailRow {
    id: i64,
    product_id: i64,
    customer_id: i64,
    agreement_id: Option<i64>,
    quantity: i64,
    price: f64,
    delivery_way: Option<DeliveryWay>,
    payment_status: PaymentStatus,
    payment_intent_id: Option<String>,
    paid_at: Option<i64>,
    status: OrderStatus,
    completed_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
    p_name: String,
    p_description: Option<String>,
    p_price: f64,
    p_images: sqlx::types::Json<Vec<String>>,
    p_quantity: i64,
    p_created_at: i64,
    p_updated_at: i64,
    c_name: String,
    c_street: Option<String>,
    c_city: Option<String>,
    c_state: Option<String>,
    c_zip: Option<i64>,
    c_phone: Option<String>,
    c_contact_person: Option<String>,
    c_created_at: i64,
    c_updated_at: i64,
}

impl From<OrderDetailRow> for OrderDetail {
    fn from(row: OrderDetailRow) -> Self {
        OrderDetail {
            order: Order {
                id: row.id,
                product_id: row.product_id,
                customer_id: row.customer_id,
                agreement_id: row.agreement_id,
                quantity: row.quantity,
                price: row.price,
                delivery_way: row.delivery_way,
                payment_status: row.payment_status,
                payment_intent_id: row.payment_intent_id,
                paid_at: row.paid_at,
                status: row.status,
                completed_at: row.completed_at,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            product: Product {
                id: row.product_id,
                name: row.p_name,
                description: row.p_description,
                price: row.p_price,
                images: row.p_images.0,
                quantity: row.p_quantity,
                created_at: row.p_created_at,
                updated_at: row.p_updated_at,
            },
            customer: Customer {
                id: row.customer_id,
                name: row.c_name,
                street: row.c_street,
                city: row.c_city,
                state: row.c_state,
                zip: row.c_zip,
                phone: row.c_phone,
                contact_person: row.c_contact_person,
                created_at: row.c_created_at,
                updated_at: row.c_updated_at,
            },
        }
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<OrderDetail>> {
    let sql = format!("{ORDER_DETAIL_SELECT} ORDER BY o.created_at DESC");
    let rows = sqlx::query_as::<_, OrderDetailRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(OrderDetail::from).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderDetail>> {
    let sql = format!("{ORDER_DETAIL_SELECT} WHERE o.id = ?");
    let row = sqlx::query_as::<_, OrderDetailRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(OrderDetail::from))
}

pub async fn find_order_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Create an order and decrement the product's stock in one transaction.
///
/// The decrement is a conditional UPDATE guarded by `quantity >= ?`, so
/// two concurrent orders for the last items serialize on the row and the
/// loser gets the insufficient-stock error, never negative stock.
pub async fn create(pool: &SqlitePool, data: OrderCreate) -> RepoResult<OrderDetail> {
    if data.quantity <= 0 {
        return Err(RepoError::Validation(
            "Amount can't be less or equal to zero".into(),
        ));
    }

    let mut tx = pool.begin().await?;

    let product_price = sqlx::query_scalar::<_, f64>("SELECT price FROM product WHERE id = ?")
        .bind(data.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", data.product_id)))?;

    sqlx::query_scalar::<_, i64>("SELECT id FROM customer WHERE id = ?")
        .bind(data.customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {} not found", data.customer_id)))?;

    let now = shared::util::now_millis();

    let decremented = sqlx::query(
        "UPDATE product SET quantity = quantity - ?1, updated_at = ?2 WHERE id = ?3 AND quantity >= ?1",
    )
    .bind(data.quantity)
    .bind(now)
    .bind(data.product_id)
    .execute(&mut *tx)
    .await?;
    if decremented.rows_affected() == 0 {
        return Err(RepoError::Validation(
            "Amount of products is less than in order".into(),
        ));
    }

    let price = match data.price {
        Some(price) => price,
        None => product_price * data.quantity as f64,
    };
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO orders (id, product_id, customer_id, agreement_id, quantity, price, delivery_way, payment_status, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'pending', 'pending', ?8, ?8)",
    )
    .bind(id)
    .bind(data.product_id)
    .bind(data.customer_id)
    .bind(data.agreement_id)
    .bind(data.quantity)
    .bind(price)
    .bind(data.delivery_way)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

/// Partial update. Status changes are checked against the lifecycle;
/// the transition into `completed` stamps `completed_at`.
pub async fn update(pool: &SqlitePool, id: i64, data: OrderUpdate) -> RepoResult<OrderDetail> {
    let existing = find_order_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?;

    let now = shared::util::now_millis();
    let mut completed_at = existing.completed_at;
    if let Some(next) = data.status {
        if !existing.status.can_transition_to(next) {
            return Err(RepoError::Validation(format!(
                "Invalid status transition from {} to {}",
                existing.status, next
            )));
        }
        if next == OrderStatus::Completed && existing.status != OrderStatus::Completed {
            completed_at = Some(now);
        }
    }

    sqlx::query(
        "UPDATE orders SET quantity = COALESCE(?1, quantity), price = COALESCE(?2, price), delivery_way = COALESCE(?3, delivery_way), payment_status = COALESCE(?4, payment_status), payment_intent_id = COALESCE(?5, payment_intent_id), paid_at = COALESCE(?6, paid_at), status = COALESCE(?7, status), completed_at = COALESCE(?8, completed_at), updated_at = ?9 WHERE id = ?10",
    )
    .bind(data.quantity)
    .bind(data.price)
    .bind(data.delivery_way)
    .bind(data.payment_status)
    .bind(&data.payment_intent_id)
    .bind(data.paid_at)
    .bind(data.status)
    .bind(completed_at)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

/// Stamp a successful payment on the order.
pub async fn mark_paid(pool: &SqlitePool, id: i64, payment_intent_id: &str) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = 'paid', payment_intent_id = ?1, paid_at = ?2, updated_at = ?2 WHERE id = ?3",
    )
    .bind(payment_intent_id)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    find_order_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

/// Record a failed payment attempt.
pub async fn mark_payment_failed(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE orders SET payment_status = 'failed', updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete an order and return the removed row. Stock is not restored;
/// cancellation is a status change, deletion is bookkeeping cleanup.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<Order> {
    let existing = find_order_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?;
    sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(existing)
}
