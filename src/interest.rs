//! Waitlist interest submissions from the landing page
//!
//! Submissions are validated and logged; nothing is stored.

use crate::error::ApiError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

const MAX_EMAIL_LEN: usize = 254;

/// Body of `POST /api/interest`
#[derive(Debug, Clone, Deserialize)]
pub struct InterestSubmission {
    pub email: String,
    #[serde(default)]
    pub product: Option<String>,
    /// Campaign parameters, passed through as sent
    #[serde(default)]
    pub utm: Option<serde_json::Value>,
    /// Client clock, UNIX milliseconds
    #[serde(default)]
    pub ts: Option<i64>,
}

/// Accepted submission as logged
#[derive(Debug, Clone)]
pub struct InterestRecord {
    pub email: String,
    pub product: Option<String>,
    pub utm: Option<serde_json::Value>,
    pub client_ts: Option<DateTime<Utc>>,
    pub received_at: DateTime<Utc>,
}

pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN {
        return false;
    }
    match EMAIL_PATTERN.as_ref() {
        Some(pattern) => pattern.is_match(email),
        None => false,
    }
}

impl InterestSubmission {
    /// Validate and stamp with the receive time
    pub fn accept(self, received_at: DateTime<Utc>) -> Result<InterestRecord, ApiError> {
        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(ApiError::BadRequest("Invalid email".to_string()));
        }

        Ok(InterestRecord {
            email,
            product: self.product.filter(|p| !p.trim().is_empty()),
            utm: self.utm,
            client_ts: self.ts.and_then(DateTime::<Utc>::from_timestamp_millis),
            received_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(email: &str) -> InterestSubmission {
        InterestSubmission {
            email: email.to_string(),
            product: Some("price-audit".to_string()),
            utm: None,
            ts: Some(1_700_000_000_000),
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("someone@example.com"));
        assert!(is_valid_email("a.b+tag@sub.example.co.kr"));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("has space@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_accept_trims_and_stamps() {
        let now = Utc::now();
        let record = submission("  someone@example.com ").accept(now).unwrap();
        assert_eq!(record.email, "someone@example.com");
        assert_eq!(record.received_at, now);
        assert_eq!(record.client_ts.map(|t| t.timestamp_millis()), Some(1_700_000_000_000));
    }

    #[test]
    fn test_accept_rejects_bad_email() {
        let err = submission("nope").accept(Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid email");
    }

    #[test]
    fn test_blank_product_dropped() {
        let mut s = submission("someone@example.com");
        s.product = Some("   ".to_string());
        assert!(s.accept(Utc::now()).unwrap().product.is_none());
    }
}
