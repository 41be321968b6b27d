use chrono::{DateTime, Utc};

use crate::domain::SubscriberEmail;

/// Acquisition channel tag for signups coming from the landing page
pub const SUBSCRIPTION_SOURCE: &str = "coming_soon";

/// Subscription record, keyed by normalized email
#[derive(Debug, Clone)]
pub struct SubscriptionRecord {
    pub email: SubscriberEmail,
    pub source: &'static str,
    pub subscribed_at: DateTime<Utc>,
    pub is_active: bool,
    pub converted_to_account: bool,
}

impl SubscriptionRecord {
    /// Create a fresh record stamped with the moment of intake
    pub fn new(email: SubscriberEmail) -> Self {
        Self {
            email,
            source: SUBSCRIPTION_SOURCE,
            subscribed_at: Utc::now(),
            is_active: true,
            converted_to_account: false,
        }
    }
}
