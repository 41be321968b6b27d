use std::{fmt, time};

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::SubscriptionRecord;
use crate::utils::error_chain_fmt;

/// Subscription store error
#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("Failed to upsert the subscription record")]
    Database(#[from] sqlx::Error),
    #[error("The subscription store did not answer within {0:?}")]
    Timeout(time::Duration),
}

impl fmt::Debug for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Insert a subscription record, or overwrite the one stored under the same email
///
/// The record id is generated on first insert and kept on overwrite.
#[tracing::instrument(
    name = "Saving subscription record in the database",
    skip(record, db_pool),
    fields(subscriber_email = %record.email)
)]
pub async fn upsert_subscription(
    record: &SubscriptionRecord,
    db_pool: &PgPool,
    timeout: time::Duration,
) -> Result<(), StoreError> {
    let query = sqlx::query(
        r"
        INSERT INTO subscriptions (id, email, source, subscribed_at, is_active, converted_to_account)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET
            source = EXCLUDED.source,
            subscribed_at = EXCLUDED.subscribed_at,
            is_active = EXCLUDED.is_active,
            converted_to_account = EXCLUDED.converted_to_account
        ",
    )
    .bind(Uuid::new_v4())
    .bind(record.email.as_ref())
    .bind(record.source)
    .bind(record.subscribed_at)
    .bind(record.is_active)
    .bind(record.converted_to_account);

    tokio::time::timeout(timeout, query.execute(db_pool))
        .await
        .map_err(|_| StoreError::Timeout(timeout))??;
    Ok(())
}
