//! Remote licence validation.
//!
//! The licence is a client-side gate only; nothing here is a security
//! boundary. A key is considered valid only when the licensing service
//! answers HTTP 200 with `{"valid": true}`.

use crate::Result;
use std::future::Future;

/// Outcome of a remote licence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseStatus {
    Valid,
    /// The service rejected the key; the string is its reason, if any.
    Invalid(String),
}

impl LicenseStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, LicenseStatus::Valid)
    }
}

/// Validates an opaque licence key against a licensing provider.
///
/// Transport failures are returned as `Err`; a definitive rejection is
/// `Ok(LicenseStatus::Invalid(_))`.
pub trait LicenseValidator: Send + Sync {
    fn validate(&self, license_key: &str) -> impl Future<Output = Result<LicenseStatus>> + Send;
}

impl<V: LicenseValidator + ?Sized> LicenseValidator for std::sync::Arc<V> {
    fn validate(&self, license_key: &str) -> impl Future<Output = Result<LicenseStatus>> + Send {
        (**self).validate(license_key)
    }
}

#[cfg(feature = "http")]
pub use http::HttpLicenseValidator;

#[cfg(feature = "http")]
mod http {
    use super::{LicenseStatus, LicenseValidator};
    use crate::{Error, Result};
    use serde::Deserialize;
    use std::time::Duration;

    #[derive(Debug, Deserialize)]
    struct ValidateResponse {
        #[serde(default)]
        valid: bool,
        #[serde(default)]
        error: Option<String>,
    }

    /// Validates keys with a `POST license_key=<key>` against a Lemon
    /// Squeezy style `licenses/validate` endpoint.
    #[derive(Debug, Clone)]
    pub struct HttpLicenseValidator {
        client: reqwest::Client,
        endpoint: String,
    }

    impl HttpLicenseValidator {
        /// `timeout_ms` of `None` leaves the request unbounded.
        pub fn new(endpoint: impl Into<String>, timeout_ms: Option<u64>) -> Result<Self> {
            let mut builder = reqwest::Client::builder()
                .user_agent(concat!("jobpost-export/", env!("CARGO_PKG_VERSION")));
            if let Some(ms) = timeout_ms {
                builder = builder.timeout(Duration::from_millis(ms));
            }
            let client = builder.build().map_err(|e| {
                Error::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;
            Ok(Self {
                client,
                endpoint: endpoint.into(),
            })
        }
    }

    impl LicenseValidator for HttpLicenseValidator {
        async fn validate(&self, license_key: &str) -> Result<LicenseStatus> {
            let res = self
                .client
                .post(&self.endpoint)
                .header("Accept", "application/json")
                .form(&[("license_key", license_key)])
                .send()
                .await?;

            let status = res.status();
            if status != reqwest::StatusCode::OK {
                log::debug!("licence endpoint answered {}", status);
                return Ok(LicenseStatus::Invalid(format!("HTTP {}", status.as_u16())));
            }

            let body: ValidateResponse = res
                .json()
                .await
                .map_err(|e| Error::License(format!("malformed response: {}", e)))?;

            if body.valid && body.error.is_none() {
                Ok(LicenseStatus::Valid)
            } else {
                Ok(LicenseStatus::Invalid(
                    body.error.unwrap_or_else(|| "license not valid".to_string()),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_validity() {
        assert!(LicenseStatus::Valid.is_valid());
        assert!(!LicenseStatus::Invalid("expired".into()).is_valid());
    }
}
