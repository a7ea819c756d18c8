//! Knowledge-service backends
//!
//! A [`KnowledgeService`] answers a scope card with a [`CanonExtract`]. The
//! pipeline bounds every query with a timeout and recovers from any
//! [`ServiceFailure`] through the offline fallback, so implementations only
//! need to classify their failures.

use crate::error::ServiceFailure;
use async_trait::async_trait;
use sf_model::{CanonExtract, ScopeCard};
use std::time::Duration;

/// Source of externally cited canon
#[async_trait]
pub trait KnowledgeService: Send + Sync {
    /// Backend identifier, used in logs and canon origin
    fn name(&self) -> &str;

    /// Ask the backend for canon covering `scope`
    async fn query(&self, scope: &ScopeCard) -> Result<CanonExtract, ServiceFailure>;
}

/// Knowledge service that never answers; every run takes the offline path
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

#[async_trait]
impl KnowledgeService for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn query(&self, _scope: &ScopeCard) -> Result<CanonExtract, ServiceFailure> {
        Err(ServiceFailure::Unreachable("no knowledge service configured".to_string()))
    }
}

/// JSON-over-HTTP knowledge backend
///
/// POSTs the scope card to `endpoint` and expects a [`CanonExtract`] body.
#[derive(Debug, Clone)]
pub struct HttpKnowledgeService {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    request_timeout: Option<Duration>,
}

impl HttpKnowledgeService {
    /// Create backend for `endpoint`
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token: None,
            request_timeout: None,
        }
    }

    /// With bearer token
    #[inline]
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// With per-request transport timeout, independent of the pipeline bound
    ///
    /// # Errors
    /// Returns [`ServiceFailure::Unreachable`] when the HTTP client cannot be built.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self, ServiceFailure> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceFailure::Unreachable(e.to_string()))?;
        self.request_timeout = Some(timeout);
        Ok(self)
    }

    /// Target URL
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, error: &reqwest::Error) -> ServiceFailure {
        if error.is_timeout() {
            let after_ms = self
                .request_timeout
                .map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
            ServiceFailure::Timeout { after_ms }
        } else if error.is_decode() {
            ServiceFailure::Malformed(error.to_string())
        } else {
            ServiceFailure::Unreachable(error.to_string())
        }
    }
}

#[async_trait]
impl KnowledgeService for HttpKnowledgeService {
    fn name(&self) -> &str {
        &self.endpoint
    }

    async fn query(&self, scope: &ScopeCard) -> Result<CanonExtract, ServiceFailure> {
        let mut request = self.client.post(&self.endpoint).json(scope);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.classify(&e))?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ServiceFailure::AuthFailure(status.to_string()));
        }
        if !status.is_success() {
            return Err(ServiceFailure::Unreachable(format!("HTTP {status}")));
        }

        let canon: CanonExtract = response.json().await.map_err(|e| self.classify(&e))?;
        canon
            .validate()
            .map_err(|e| ServiceFailure::Malformed(e.to_string()))?;
        Ok(canon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_test_utils::healthy_scope;

    #[tokio::test]
    async fn unavailable_always_fails() {
        let err = Unavailable.query(&healthy_scope()).await.unwrap_err();
        assert!(matches!(err, ServiceFailure::Unreachable(_)));
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let service = HttpKnowledgeService::new("http://127.0.0.1:9/canon")
            .with_request_timeout(Duration::from_secs(2))
            .unwrap();
        let err = service.query(&healthy_scope()).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceFailure::Unreachable(_) | ServiceFailure::Timeout { .. }
        ));
    }
}
