//! Audit categories and request origins

use serde::{Deserialize, Serialize};

/// Category of a security-relevant event
///
/// Compliance categories are subject to stricter handling; see
/// [`AuditCategory::is_compliance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditCategory {
    BadHeaders,
    FailedLogin,
    BlockedIp,
    BlockedUser,
    MissingPrivileges,
    ProtectedIndexAttempt,
    SslException,
    Authenticated,
    GrantedPrivileges,
    ComplianceDocRead,
    ComplianceDocWrite,
    ComplianceExternalConfig,
    ComplianceInternalConfigRead,
    ComplianceInternalConfigWrite,
    ComplianceImmutableIndexAttempt,
    IndexTemplateWrite,
    IndexWrite,
    UiLogin,
    UiLogout,
}

impl AuditCategory {
    /// Whether events of this category are compliance events by default
    pub fn is_compliance(&self) -> bool {
        matches!(
            self,
            Self::ComplianceDocRead
                | Self::ComplianceDocWrite
                | Self::ComplianceExternalConfig
                | Self::ComplianceInternalConfigRead
                | Self::ComplianceInternalConfigWrite
                | Self::ComplianceImmutableIndexAttempt
        )
    }

    /// Wire name (SCREAMING_SNAKE_CASE), used in logs and serialized events
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadHeaders => "BAD_HEADERS",
            Self::FailedLogin => "FAILED_LOGIN",
            Self::BlockedIp => "BLOCKED_IP",
            Self::BlockedUser => "BLOCKED_USER",
            Self::MissingPrivileges => "MISSING_PRIVILEGES",
            Self::ProtectedIndexAttempt => "PROTECTED_INDEX_ATTEMPT",
            Self::SslException => "SSL_EXCEPTION",
            Self::Authenticated => "AUTHENTICATED",
            Self::GrantedPrivileges => "GRANTED_PRIVILEGES",
            Self::ComplianceDocRead => "COMPLIANCE_DOC_READ",
            Self::ComplianceDocWrite => "COMPLIANCE_DOC_WRITE",
            Self::ComplianceExternalConfig => "COMPLIANCE_EXTERNAL_CONFIG",
            Self::ComplianceInternalConfigRead => "COMPLIANCE_INTERNAL_CONFIG_READ",
            Self::ComplianceInternalConfigWrite => "COMPLIANCE_INTERNAL_CONFIG_WRITE",
            Self::ComplianceImmutableIndexAttempt => "COMPLIANCE_IMMUTABLE_INDEX_ATTEMPT",
            Self::IndexTemplateWrite => "INDEX_TEMPLATE_WRITE",
            Self::IndexWrite => "INDEX_WRITE",
            Self::UiLogin => "UI_LOGIN",
            Self::UiLogout => "UI_LOGOUT",
        }
    }
}

impl std::fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layer on which the audited request was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    Rest,
    Transport,
    Local,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Rest => "REST",
            Self::Transport => "TRANSPORT",
            Self::Local => "LOCAL",
        };
        f.write_str(s)
    }
}
