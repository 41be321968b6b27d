use std::fmt;

/// Subscriber email in its canonical form: trimmed and lowercased
///
/// No format check is performed, any non-empty input is accepted. Input made
/// only of whitespace normalizes to the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Parse and normalize a subscriber email
    pub fn parse(email: &str) -> Result<Self, String> {
        if email.is_empty() {
            Err("Email is required".to_string())
        } else {
            Ok(Self(email.trim().to_lowercase()))
        }
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
