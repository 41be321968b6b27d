use std::{fmt, time};

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use sqlx::PgPool;
use tracing::field::display;
use tracing::Span;

use crate::domain::{SubscriberEmail, SubscriptionRecord};
use crate::subscription_store::upsert_subscription;
use crate::utils::error_chain_fmt;
use crate::webhook_client::WebhookClient;

/// Upper bound for a single write to the subscription store
#[derive(Debug, Clone, Copy)]
pub struct StoreTimeout(pub time::Duration);

/// Acknowledgment body
#[derive(serde::Serialize)]
struct SubscribeResponse {
    success: bool,
}

/// Error body
#[derive(serde::Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

/// Subscribe error type
#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("Email is required")]
    EmailRequired,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::EmailRequired => StatusCode::BAD_REQUEST,
            Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // The cause of an unexpected error stays in the logs
        let error = match self {
            Self::EmailRequired => "Email is required",
            Self::UnexpectedError(_) => "Failed to subscribe",
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse { error })
    }
}

/// Subscribe handler
///
/// Once the email is validated the request is always acknowledged: failures of
/// the subscription store or of the automation webhook are logged and swallowed.
#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(body, db_pool, webhook_client, store_timeout),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn subscribe(
    body: web::Bytes,
    db_pool: web::Data<PgPool>,
    webhook_client: web::Data<WebhookClient>,
    store_timeout: web::Data<StoreTimeout>,
) -> Result<HttpResponse, SubscribeError> {
    // Parse and validate the request
    let raw_email = extract_email(&body)?;
    let email = SubscriberEmail::parse(&raw_email).map_err(|_| SubscribeError::EmailRequired)?;
    Span::current().record("subscriber_email", display(&email));

    // Write to the subscription store
    let record = SubscriptionRecord::new(email);
    let stored = match upsert_subscription(&record, &db_pool, store_timeout.0).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to save the subscription record"
            );
            false
        }
    };

    // Notify the automation webhook with the email as it was submitted
    let notified = match webhook_client.notify(&raw_email).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to notify the automation webhook"
            );
            false
        }
    };

    tracing::info!(stored, notified, "Subscription acknowledged");
    Ok(HttpResponse::Ok().json(SubscribeResponse { success: true }))
}

/// Extract the submitted email from a JSON request body
///
/// A body that is not JSON at all, or is JSON `null`, is an unexpected error. Any
/// other JSON value without a string `email` field means the email is missing.
fn extract_email(body: &[u8]) -> Result<String, SubscribeError> {
    let body: serde_json::Value =
        serde_json::from_slice(body).context("Failed to parse the request body as JSON")?;
    if body.is_null() {
        return Err(anyhow::anyhow!("The request body is JSON null").into());
    }
    body.get("email")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or(SubscribeError::EmailRequired)
}
