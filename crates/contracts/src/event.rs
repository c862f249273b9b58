//! AuditEvent - immutable audit record
//!
//! Produced once by the security-decision layer, then shared read-only across
//! all delivery attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AuditCategory, Origin};

/// A single security-relevant event
///
/// Never mutated after construction; the builder-style `with_*` methods are
/// consumed before the event enters the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event classification
    pub category: AuditCategory,

    /// Layer the request was observed on
    pub origin: Origin,

    /// UTC creation time
    pub timestamp: DateTime<Utc>,

    /// User the request was effectively executed as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_user: Option<String>,

    /// Remote peer address, if the request came over the network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_address: Option<String>,

    /// Request type / action name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_type: Option<String>,

    /// Tenant the request was scoped to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,

    /// Whether this event is subject to compliance handling
    #[serde(default)]
    pub compliance: bool,

    /// Category-specific fields
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl AuditEvent {
    /// Create a new event; the compliance flag defaults from the category
    pub fn new(category: AuditCategory, origin: Origin) -> Self {
        Self {
            category,
            origin,
            timestamp: Utc::now(),
            effective_user: None,
            remote_address: None,
            request_type: None,
            tenant: None,
            compliance: category.is_compliance(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_effective_user(mut self, user: impl Into<String>) -> Self {
        self.effective_user = Some(user.into());
        self
    }

    pub fn with_remote_address(mut self, addr: impl Into<String>) -> Self {
        self.remote_address = Some(addr.into());
        self
    }

    pub fn with_request_type(mut self, request_type: impl Into<String>) -> Self {
        self.request_type = Some(request_type.into());
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Override the category-derived compliance flag
    pub fn with_compliance(mut self, compliance: bool) -> Self {
        self.compliance = compliance;
        self
    }

    /// Attach a category-specific field
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}
