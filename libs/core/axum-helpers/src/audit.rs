//! Audit logging for data modifications.
//!
//! Events are emitted on the `audit` tracing target so the log pipeline can
//! route them separately from request logs.
//!
//! ```ignore
//! use axum_helpers::audit::{AuditEvent, AuditOutcome, ClientContext};
//!
//! async fn delete(client: ClientContext, /* ... */) {
//!     AuditEvent::new("product.delete", Some(format!("product:{id}")), AuditOutcome::Success)
//!         .with_client(&client)
//!         .log();
//! }
//! ```

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    /// Rejected input or store failure
    Failure,
}

/// Structured audit event. Build it, then call [`AuditEvent::log`].
#[derive(Debug, Serialize)]
pub struct AuditEvent {
    /// e.g. "product.create"
    pub action: String,
    /// e.g. "product:42"
    pub resource: Option<String>,
    pub outcome: AuditOutcome,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, resource: Option<String>, outcome: AuditOutcome) -> Self {
        Self {
            action: action.into(),
            resource,
            outcome,
            ip_address: None,
            user_agent: None,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_client(mut self, client: &ClientContext) -> Self {
        self.ip_address = client.ip.clone();
        self.user_agent = client.user_agent.clone();
        self
    }

    /// Attach serializable details (changed fields, error message, ...).
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    pub fn log(self) {
        let details = self.details.as_ref().map(|d| d.to_string());
        tracing::info!(
            target: "audit",
            action = %self.action,
            resource = self.resource.as_deref(),
            outcome = ?self.outcome,
            ip = self.ip_address.as_deref(),
            user_agent = self.user_agent.as_deref(),
            timestamp = %self.timestamp.to_rfc3339(),
            details = details.as_deref(),
            "audit: {}",
            self.action
        );
    }
}

/// Who is calling: client IP and user agent, for audit events.
///
/// IP comes from `X-Forwarded-For` / `X-Real-IP` when behind a proxy, else
/// from the socket address when the server was started with connect info.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for ClientContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let socket = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self {
            ip: extract_ip_from_headers(&parts.headers).or_else(|| extract_ip_from_socket(socket)),
            user_agent: extract_user_agent(&parts.headers),
        })
    }
}

/// First address of `X-Forwarded-For`, else `X-Real-IP`.
pub fn extract_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
        })
}

pub fn extract_ip_from_socket(socket: Option<SocketAddr>) -> Option<String> {
    socket.map(|addr| addr.ip().to_string())
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
