//! Product Repository
//!
//! Products carry an authoritative stock count (`quantity`) and an ordered
//! list of delivery options. Stock is only decremented through the order
//! transaction (see the order repository); this module covers catalog CRUD.

use std::collections::HashMap;

use super::{RepoError, RepoResult};
use shared::models::{
    DeliveryOption, DeliveryOptionCreate, DeliveryWay, Product, ProductCreate, ProductDetail,
    ProductUpdate,
};
use sqlx::SqlitePool;

const PRODUCT_SELECT: &str = "SELECT id, name, description, price, images, quantity, created_at, updated_at FROM product";

// `type` is a keyword-ish column name, aliased onto the model field
const OPTION_SELECT: &str = "SELECT id, product_id, type as option_type, price, period, sort_order FROM delivery_option";

const DUPLICATE_NAME: &str = "Product with this name already exist";
const DUPLICATE_EMPTY: &str =
    "There is already an empty product. Fill it or delete to create a new one";
const NEGATIVE_QUANTITY: &str = "Quantity can't be less than zero";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    // Out-of-stock products sink to the end, the rest newest first
    let sql = format!("{PRODUCT_SELECT} ORDER BY quantity = 0, created_at DESC");
    let rows = sqlx::query_as::<_, Product>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("{PRODUCT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Product>> {
    let sql = format!("{PRODUCT_SELECT} WHERE name = ? LIMIT 1");
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_options(pool: &SqlitePool, product_id: i64) -> RepoResult<Vec<DeliveryOption>> {
    let sql = format!("{OPTION_SELECT} WHERE product_id = ? ORDER BY sort_order");
    let rows = sqlx::query_as::<_, DeliveryOption>(&sql)
        .bind(product_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<ProductDetail>> {
    let Some(product) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let delivery_options = find_options(pool, id).await?;
    Ok(Some(ProductDetail {
        product,
        delivery_options,
    }))
}

/// List products with their delivery options embedded (two queries,
/// grouped in memory).
pub async fn find_all_detailed(pool: &SqlitePool) -> RepoResult<Vec<ProductDetail>> {
    let products = find_all(pool).await?;
    let sql = format!("{OPTION_SELECT} ORDER BY product_id, sort_order");
    let options = sqlx::query_as::<_, DeliveryOption>(&sql)
        .fetch_all(pool)
        .await?;

    let mut grouped: HashMap<i64, Vec<DeliveryOption>> = HashMap::new();
    for option in options {
        grouped.entry(option.product_id).or_default().push(option);
    }
    Ok(products
        .into_iter()
        .map(|product| ProductDetail {
            delivery_options: grouped.remove(&product.id).unwrap_or_default(),
            product,
        })
        .collect())
}

/// Create a product. Names are strictly unique; a second unnamed draft
/// product is rejected with its own message.
pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<ProductDetail> {
    if data.quantity < 0 {
        return Err(RepoError::Validation(NEGATIVE_QUANTITY.into()));
    }
    if find_by_name(pool, &data.name).await?.is_some() {
        if data.name.is_empty() {
            return Err(RepoError::Duplicate(DUPLICATE_EMPTY.into()));
        }
        return Err(RepoError::Duplicate(DUPLICATE_NAME.into()));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO product (id, name, description, price, images, quantity, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(sqlx::types::Json(&data.images))
    .bind(data.quantity)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        err if err.is_duplicate() => RepoError::Duplicate(DUPLICATE_NAME.into()),
        err => err,
    })?;
    find_detail(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

/// Partial update. Renaming onto another product's name is rejected;
/// renaming onto the current name is allowed.
pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<ProductDetail> {
    if let Some(quantity) = data.quantity
        && quantity < 0
    {
        return Err(RepoError::Validation(NEGATIVE_QUANTITY.into()));
    }
    if let Some(new_name) = &data.name
        && let Some(existing) = find_by_name(pool, new_name).await?
        && existing.id != id
    {
        return Err(RepoError::Duplicate(DUPLICATE_NAME.into()));
    }

    let now = shared::util::now_millis();
    let images = data.images.map(sqlx::types::Json);
    let rows = sqlx::query(
        "UPDATE product SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), images = COALESCE(?4, images), quantity = COALESCE(?5, quantity), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(images)
    .bind(data.quantity)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        err if err.is_duplicate() => RepoError::Duplicate(DUPLICATE_NAME.into()),
        err => err,
    })?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    find_detail(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Delete a product and return the removed row (options included).
/// Dependent orders go away through ON DELETE CASCADE.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<ProductDetail> {
    let existing = find_detail(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))?;
    sqlx::query("DELETE FROM product WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(existing)
}

/// Append a delivery option at the end of the product's list.
pub async fn add_option(
    pool: &SqlitePool,
    product_id: i64,
    data: DeliveryOptionCreate,
) -> RepoResult<ProductDetail> {
    if find_by_id(pool, product_id).await?.is_none() {
        return Err(RepoError::NotFound(format!(
            "Product {product_id} not found"
        )));
    }

    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO delivery_option (id, product_id, type, price, period, sort_order) VALUES (?1, ?2, ?3, ?4, ?5, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM delivery_option WHERE product_id = ?2))",
    )
    .bind(id)
    .bind(product_id)
    .bind(data.option_type)
    .bind(data.price)
    .bind(&data.period)
    .execute(pool)
    .await?;
    find_detail(pool, product_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to add delivery option".into()))
}

/// Remove every option of the given type from the product. Removing a
/// type the product does not carry is a no-op.
pub async fn remove_options(
    pool: &SqlitePool,
    product_id: i64,
    option_type: DeliveryWay,
) -> RepoResult<ProductDetail> {
    if find_by_id(pool, product_id).await?.is_none() {
        return Err(RepoError::NotFound(format!(
            "Product {product_id} not found"
        )));
    }

    sqlx::query("DELETE FROM delivery_option WHERE product_id = ? AND type = ?")
        .bind(product_id)
        .bind(option_type)
        .execute(pool)
        .await?;
    find_detail(pool, product_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to remove delivery options".into()))
}
