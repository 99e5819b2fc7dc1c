//! Account limits model.

use serde::Serialize;

use crate::client::XplentyClient;
use crate::error::{Result, XplentyError};
use crate::mapper::{FieldDecl, FieldKind, Record, Schema};

use super::Resource;

/// Field layout of the `limits` object in a rate limit status payload.
pub static ACCOUNT_LIMITS_SCHEMA: Schema = Schema {
    model: "AccountLimits",
    fields: &[
        FieldDecl::new("limit", FieldKind::Int),
        FieldDecl::new("remaining", FieldKind::Int),
    ],
    primary_keys: &[],
};

/// API request allowance of the account.
///
/// Has no natural identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountLimits {
    /// Requests allowed per window.
    pub limit: Option<i64>,
    /// Requests left in the current window.
    pub remaining: Option<i64>,
}

impl Resource for AccountLimits {
    fn schema() -> &'static Schema {
        &ACCOUNT_LIMITS_SCHEMA
    }

    fn from_record(mut r: Record) -> Self {
        Self {
            limit: r.take("limit").into_int(),
            remaining: r.take("remaining").into_int(),
        }
    }

    fn identity(&self) -> Option<String> {
        None
    }
}

impl AccountLimits {
    /// Fetch the account's current rate limit status.
    ///
    /// # Errors
    ///
    /// Returns [`XplentyError::UnexpectedPayload`] if the response has no
    /// `limits` object, or the request error.
    #[tracing::instrument(skip(client))]
    pub async fn fetch(client: &XplentyClient) -> Result<Self> {
        let value = client.get("rate_limit_status").await?;
        let limits = value.get("limits").ok_or(XplentyError::UnexpectedPayload {
            model: "AccountLimits",
            expected: "an object with a `limits` field",
        })?;
        AccountLimits::from_raw(limits, Some(client))
    }

    /// Check if the allowance is used up.
    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_some_and(|r| r <= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_limits_from_raw() {
        let limits = AccountLimits::from_raw(&json!({"limit": 5000, "remaining": "0"}), None).unwrap();
        assert_eq!(limits.limit, Some(5000));
        assert_eq!(limits.remaining, Some(0));
        assert!(limits.is_exhausted());
    }

    #[test]
    fn test_limits_have_no_identity() {
        let limits = AccountLimits::from_raw(&json!({}), None).unwrap();
        assert_eq!(limits.identity(), None);
        assert_eq!(limits.to_string(), "<AccountLimits>");
        assert!(!limits.is_exhausted());
    }
}
