//! Per-client form instances.
//!
//! The submission state machine is scoped to one form instance, which on the web means one
//! visitor. The registry keeps one [`SubmissionController`] per [`ClientKey`] in a bounded moka
//! cache so a visitor's cooldown and in-flight state survive between requests. Idle entries are
//! evicted after `forms.client_idle_timeout`.

use std::{fmt, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use moka::future::Cache;
use tracing::trace;

use crate::{
    AppState,
    config::FormsConfig,
    errors::Error,
    forms::{
        controller::{FormDefinition, SubmissionController},
        honeypot::Honeypot,
    },
};

/// Identifies the visitor that owns a form instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn anonymous() -> Self {
        Self("anonymous".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved from the configured client key header, then the peer address.
impl FromRequestParts<AppState> for ClientKey {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(header) = &state.config.forms.client_key_header {
            if let Some(value) = parts.headers.get(header.as_str()).and_then(|v| v.to_str().ok()) {
                // Proxies append, so the left-most entry is the original client
                let first = value.split(',').next().unwrap_or_default().trim();
                if !first.is_empty() {
                    return Ok(ClientKey::new(first));
                }
            }
        }

        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            return Ok(ClientKey::new(addr.ip().to_string()));
        }

        trace!("no client key available, using shared anonymous instance");
        Ok(ClientKey::anonymous())
    }
}

pub struct FormRegistry<F> {
    form: Arc<F>,
    honeypot_field: String,
    cooldown: Duration,
    timeout: Duration,
    instances: Cache<ClientKey, Arc<SubmissionController<F>>>,
}

impl<F: FormDefinition> FormRegistry<F> {
    pub fn new(form: F, config: &FormsConfig) -> Self {
        Self {
            form: Arc::new(form),
            honeypot_field: config.honeypot_field.clone(),
            cooldown: config.cooldown,
            timeout: config.submission_timeout,
            instances: Cache::builder()
                .max_capacity(config.max_tracked_clients)
                .time_to_idle(config.client_idle_timeout)
                .build(),
        }
    }

    /// The client's form instance, created on first use
    pub async fn instance(&self, key: &ClientKey) -> Arc<SubmissionController<F>> {
        self.instances
            .get_with(key.clone(), async {
                trace!(client = %key, form = F::NAME, "creating form instance");
                Arc::new(SubmissionController::new(
                    self.form.clone(),
                    Honeypot::new(self.honeypot_field.clone()),
                    self.cooldown,
                    self.timeout,
                ))
            })
            .await
    }

    /// The client's form instance if one is being tracked
    pub async fn existing(&self, key: &ClientKey) -> Option<Arc<SubmissionController<F>>> {
        self.instances.get(key).await
    }
}
