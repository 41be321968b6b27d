mod subscriber_email;
mod subscription_record;

pub use subscriber_email::SubscriberEmail;
pub use subscription_record::{SubscriptionRecord, SUBSCRIPTION_SOURCE};
