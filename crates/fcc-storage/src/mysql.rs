use async_trait::async_trait;
use fcc_core::error::{Result, StorageError};
use fcc_core::registry::{ReadRegistry, Registry, UrlMapping};
use fcc_core::shortcode::ShortCode;
use jiff::Timestamp;
use sqlx::{MySql, MySqlPool, Row, Transaction};
use tracing::{debug, trace};

const SCHEMA: &str = include_str!("../ddl/mysql/url_mappings.sql");
const SEQUENCE_NAME: &str = "short_code";

/// MySQL implementation of the registry contract.
///
/// Mappings live in `url_mappings` with a primary key on `short_code` and a
/// unique key on `original_url`. Allocation locks the `short_code` row of
/// `url_sequences` for the duration of a transaction, so concurrent
/// allocators queue on that row while plain lookups are unaffected.
#[derive(Debug, Clone)]
pub struct MySqlRegistry {
    pool: MySqlPool,
}

impl MySqlRegistry {
    /// Creates a registry from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a registry by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the tables and seeds the sequence row if they are missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("url registry schema is ready");
        Ok(())
    }

    async fn allocate_in(
        tx: &mut Transaction<'static, MySql>,
        original_url: &str,
    ) -> Result<UrlMapping> {
        let sequence: Option<u64> = sqlx::query_scalar(
            r#"
            SELECT value
            FROM url_sequences
            WHERE name = ?
            FOR UPDATE
            "#,
        )
        .bind(SEQUENCE_NAME)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(sequence) = sequence else {
            return Err(StorageError::InvalidData(format!(
                "sequence row '{}' is missing",
                SEQUENCE_NAME
            )));
        };

        // Rows inserted with explicit codes may sit above the sequence.
        let max_code = select_max_code(&mut **tx).await?;
        let current = match max_code {
            Some(code) if code.get() > sequence => Some(code),
            _ if sequence == 0 => None,
            _ => Some(ShortCode::new(sequence)),
        };
        let code = ShortCode::next_after(current)
            .ok_or_else(|| StorageError::InvalidData("short code space exhausted".to_string()))?;

        let mapping = UrlMapping::new(original_url, code);
        insert_mapping(&mut **tx, &mapping).await?;

        sqlx::query(
            r#"
            UPDATE url_sequences
            SET value = ?
            WHERE name = ?
            "#,
        )
        .bind(code.get())
        .bind(SEQUENCE_NAME)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(mapping)
    }
}

fn now_unix_seconds() -> i64 {
    Timestamp::now().as_second()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn mapping_from_row(row: &sqlx::mysql::MySqlRow) -> Result<UrlMapping> {
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let short_code: u64 = row.try_get("short_code").map_err(map_sqlx_error)?;
    Ok(UrlMapping::new(original_url, ShortCode::new(short_code)))
}

async fn select_max_code<'e, E>(executor: E) -> Result<Option<ShortCode>>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let max: Option<u64> = sqlx::query_scalar(
        r#"
        SELECT CAST(MAX(short_code) AS UNSIGNED)
        FROM url_mappings
        "#,
    )
    .fetch_one(executor)
    .await
    .map_err(map_sqlx_error)?;

    Ok(max.map(ShortCode::new))
}

async fn insert_mapping<'e, E>(executor: E, mapping: &UrlMapping) -> Result<()>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO url_mappings (short_code, original_url, created_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(mapping.short_code.get())
    .bind(mapping.original_url.as_str())
    .bind(now_unix_seconds())
    .execute(executor)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => Err(StorageError::DuplicateKey(format!(
            "{} -> {}",
            mapping.short_code, mapping.original_url
        ))),
        Err(err) => Err(map_sqlx_error(err)),
    }
}

#[async_trait]
impl ReadRegistry for MySqlRegistry {
    async fn find_by_original(&self, original_url: &str) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(
            r#"
            SELECT short_code, original_url
            FROM url_mappings
            WHERE original_url = ?
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(mapping_from_row).transpose()
    }

    async fn find_by_code(&self, code: ShortCode) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(
            r#"
            SELECT short_code, original_url
            FROM url_mappings
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(mapping_from_row).transpose()
    }

    async fn max_code(&self) -> Result<Option<ShortCode>> {
        select_max_code(&self.pool).await
    }
}

#[async_trait]
impl Registry for MySqlRegistry {
    async fn insert(&self, mapping: UrlMapping) -> Result<UrlMapping> {
        insert_mapping(&self.pool, &mapping).await?;
        Ok(mapping)
    }

    async fn allocate(&self, original_url: &str) -> Result<UrlMapping> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Dropping `tx` on error rolls the transaction back.
        let mapping = Self::allocate_in(&mut tx, original_url).await?;
        tx.commit().await.map_err(map_sqlx_error)?;

        trace!(code = %mapping.short_code, url = %original_url, "allocated short code");
        Ok(mapping)
    }
}
