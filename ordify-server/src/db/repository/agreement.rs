//! Agreement Repository
//!
//! Issuance is a transactional check-and-insert: stale flagged rows are
//! deactivated first, then the active-agreement check runs, and the
//! partial unique index on agreement(customer_id) WHERE is_active = 1
//! backstops concurrent issuers.

use super::{RepoError, RepoResult};
use shared::models::{
    Agreement, AgreementCreate, AgreementDetail, AgreementUpdate, Customer, LegalEntity,
    LegalEntityCreate,
};
use sqlx::SqlitePool;

const ACTIVE_EXISTS: &str = "Customer already has an active agreement";

const AGREEMENT_SELECT: &str = "SELECT id, customer_id, legal_entity_id, client_token, is_active, created_at, ends_at FROM agreement";

const AGREEMENT_DETAIL_SELECT: &str = "SELECT a.id, a.customer_id, a.legal_entity_id, a.client_token, a.is_active, a.created_at, a.ends_at, c.name as c_name, c.street as c_street, c.city as c_city, c.state as c_state, c.zip as c_zip, c.phone as c_phone, c.contact_person as c_contact_person, c.created_at as c_created_at, c.updated_at as c_updated_at, le.name as le_name, le.street as le_street, le.city as le_city, le.state as le_state, le.zip as le_zip, le.registration_number as le_registration_number, le.director_name as le_director_name, le.bank_name as le_bank_name, le.bank_iban as le_bank_iban, le.created_at as le_created_at FROM agreement a JOIN customer c ON a.customer_id = c.id LEFT JOIN legal_entity le ON a.legal_entity_id = le.id";

/// Flat row for the detail JOIN; the legal entity side is nullable.
#[derive(sqlx::FromRow)]
struct AgreementDetailRow {
    id: i64,
    customer_id: i64,
    legal_entity_id: Option<i64>,
    client_token: String,
    is_active: bool,
    created_at: i64,
    ends_at: i64,
    c_name: String,
    c_street: Option<String>,
    c_city: Option<String>,
    c_state: Option<String>,
    c_zip: Option<i64>,
    c_phone: Option<String>,
    c_contact_person: Option<String>,
    c_created_at: i64,
    c_updated_at: i64,
    le_name: Option<String>,
    le_street: Option<String>,
    le_city: Option<String>,
    le_state: Option<String>,
    le_zip: Option<String>,
    le_registration_number: Option<String>,
    le_director_name: Option<String>,
    le_bank_name: Option<String>,
    le_bank_iban: Option<String>,
    le_created_at: Option<i64>,
}

impl From<AgreementDetailRow> for AgreementDetail {
    fn from(row: AgreementDetailRow) -> Self {
        let legal_entity = match (row.legal_entity_id, row.le_name) {
            (Some(id), Some(name)) => Some(LegalEntity {
                id,
                name,
                street: row.le_street,
                city: row.le_city,
                state: row.le_state,
                zip: row.le_zip,
                registration_number: row.le_registration_number,
                director_name: row.le_director_name,
                bank_name: row.le_bank_name,
                bank_iban: row.le_bank_iban,
                created_at: row.le_created_at.unwrap_or_default(),
            }),
            _ => None,
        };
        AgreementDetail {
            agreement: Agreement {
                id: row.id,
                customer_id: row.customer_id,
                legal_entity_id: row.legal_entity_id,
                client_token: row.client_token,
                is_active: row.is_active,
                created_at: row.created_at,
                ends_at: row.ends_at,
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
            legal_entity,
        }
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<AgreementDetail>> {
    let sql = format!("{AGREEMENT_DETAIL_SELECT} ORDER BY a.created_at DESC");
    let rows = sqlx::query_as::<_, AgreementDetailRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(AgreementDetail::from).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AgreementDetail>> {
    let sql = format!("{AGREEMENT_DETAIL_SELECT} WHERE a.id = ?");
    let row = sqlx::query_as::<_, AgreementDetailRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(AgreementDetail::from))
}

pub async fn find_agreement_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Agreement>> {
    let sql = format!("{AGREEMENT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Agreement>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// The customer's active agreement (flagged active and not yet ended).
pub async fn find_active_by_customer(
    pool: &SqlitePool,
    customer_id: i64,
) -> RepoResult<Option<Agreement>> {
    let now = shared::util::now_millis();
    let sql = format!("{AGREEMENT_SELECT} WHERE customer_id = ?1 AND is_active = 1 AND ends_at >= ?2 LIMIT 1");
    let row = sqlx::query_as::<_, Agreement>(&sql)
        .bind(customer_id)
        .bind(now)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Token lookup regardless of validity.
pub async fn find_by_token(pool: &SqlitePool, token: &str) -> RepoResult<Option<Agreement>> {
    let sql = format!("{AGREEMENT_SELECT} WHERE client_token = ? LIMIT 1");
    let row = sqlx::query_as::<_, Agreement>(&sql)
        .bind(token)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Token lookup that only matches currently valid agreements. Pure read,
/// never errors on an unknown token.
pub async fn find_valid_by_token(pool: &SqlitePool, token: &str) -> RepoResult<Option<Agreement>> {
    let now = shared::util::now_millis();
    let sql =
        format!("{AGREEMENT_SELECT} WHERE client_token = ?1 AND is_active = 1 AND ends_at >= ?2 LIMIT 1");
    let row = sqlx::query_as::<_, Agreement>(&sql)
        .bind(token)
        .bind(now)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Issue a new agreement for the customer.
pub async fn issue(pool: &SqlitePool, data: AgreementCreate) -> RepoResult<Agreement> {
    let mut tx = pool.begin().await?;

    sqlx::query_scalar::<_, i64>("SELECT id FROM customer WHERE id = ?")
        .bind(data.customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::NotFound("Customer not found".into()))?;

    let now = shared::util::now_millis();

    // Expired agreements can still be flagged active; clear them so the
    // partial unique index only guards genuinely active rows.
    sqlx::query(
        "UPDATE agreement SET is_active = 0 WHERE customer_id = ?1 AND is_active = 1 AND ends_at < ?2",
    )
    .bind(data.customer_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let active = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM agreement WHERE customer_id = ?1 AND is_active = 1 AND ends_at >= ?2 LIMIT 1",
    )
    .bind(data.customer_id)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;
    if active.is_some() {
        return Err(RepoError::Duplicate(ACTIVE_EXISTS.into()));
    }

    let legal_entity_id = match &data.legal_entity {
        Some(entity) => Some(insert_legal_entity(&mut tx, entity, now).await?),
        None => None,
    };

    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO agreement (id, customer_id, legal_entity_id, client_token, is_active, created_at, ends_at) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
    )
    .bind(id)
    .bind(data.customer_id)
    .bind(legal_entity_id)
    .bind(&data.client_token)
    .bind(now)
    .bind(data.ends_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| match RepoError::from(e) {
        err if err.is_duplicate() => RepoError::Duplicate(ACTIVE_EXISTS.into()),
        err => err,
    })?;

    tx.commit().await?;

    find_agreement_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create agreement".into()))
}

async fn insert_legal_entity(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    data: &LegalEntityCreate,
    now: i64,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO legal_entity (id, name, street, city, state, zip, registration_number, director_name, bank_name, bank_iban, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.street)
    .bind(&data.city)
    .bind(&data.state)
    .bind(&data.zip)
    .bind(&data.registration_number)
    .bind(&data.director_name)
    .bind(&data.bank_name)
    .bind(&data.bank_iban)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(id)
}

/// Partial update of ends_at / is_active. Reactivating a row while the
/// customer holds another active agreement trips the unique index.
pub async fn update(pool: &SqlitePool, id: i64, data: AgreementUpdate) -> RepoResult<Agreement> {
    let rows = sqlx::query(
        "UPDATE agreement SET ends_at = COALESCE(?1, ends_at), is_active = COALESCE(?2, is_active) WHERE id = ?3",
    )
    .bind(data.ends_at)
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        err if err.is_duplicate() => RepoError::Duplicate(ACTIVE_EXISTS.into()),
        err => err,
    })?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Agreement not found".into()));
    }
    find_agreement_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Agreement not found".into()))
}

pub async fn deactivate(pool: &SqlitePool, id: i64) -> RepoResult<Agreement> {
    let rows = sqlx::query("UPDATE agreement SET is_active = 0 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Agreement not found".into()));
    }
    find_agreement_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Agreement not found".into()))
}

/// Reactivate with a new end date. Rejected when the customer acquired
/// another active agreement in the meantime.
pub async fn renew(pool: &SqlitePool, id: i64, ends_at: i64) -> RepoResult<Agreement> {
    let rows = sqlx::query("UPDATE agreement SET is_active = 1, ends_at = ?1 WHERE id = ?2")
        .bind(ends_at)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            err if err.is_duplicate() => RepoError::Duplicate(ACTIVE_EXISTS.into()),
            err => err,
        })?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Agreement not found".into()));
    }
    find_agreement_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Agreement not found".into()))
}

/// Delete an agreement and return the removed row. Orders keep a nulled
/// reference through ON DELETE SET NULL.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<Agreement> {
    let existing = find_agreement_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Agreement not found".into()))?;
    sqlx::query("DELETE FROM agreement WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(existing)
}
