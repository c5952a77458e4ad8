//! Statistics Repository
//!
//! Dashboard totals computed by SQL at call time, nothing cached.

use super::RepoResult;
use sqlx::SqlitePool;

/// Raw dashboard totals.
#[derive(Debug, Clone, Copy)]
pub struct Totals {
    pub products: i64,
    pub customers: i64,
    pub orders: i64,
    pub orders_price: f64,
}

pub async fn totals(pool: &SqlitePool) -> RepoResult<Totals> {
    let products = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product")
        .fetch_one(pool)
        .await?;
    let customers = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customer")
        .fetch_one(pool)
        .await?;
    let orders = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;
    let orders_price =
        sqlx::query_scalar::<_, f64>("SELECT COALESCE(SUM(price), 0.0) FROM orders")
        .fetch_one(pool)
        .await?;
    Ok(Totals {
        products,
        customers,
        orders,
        orders_price,
    })
}
