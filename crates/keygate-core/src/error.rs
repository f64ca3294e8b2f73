//! Shared error type across keygate crates.

use thiserror::Error;

/// Stable error codes handed to the host's error-reporting path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Unexpected fault caught at the outer boundary.
    InternalException,
    /// Package lookup failed for a resolved application.
    MissingPackage,
    /// Key lookup failed or has no application/package linkage.
    MissingOrInvalidKey,
    /// No ACL could be resolved for the service.
    NoAclForService,
    /// Client address hit a deny CIDR or missed a non-empty allow list.
    GeoDenied,
    /// User agent hit a deny rule or missed a non-empty allow list.
    DeviceDenied,
    /// Caller is signed in but shares no group with the service-level `access`.
    GroupMismatchServiceLevel,
    /// Anonymous caller on a service whose `access` is required and the
    /// matched API (if any) does not waive it.
    AnonymousDeniedServiceLevel,
    /// Service is `restricted` and the path matches no declared API.
    RestrictedNoMatchingApi,
    /// Caller is signed in but shares no group with the API entry's `access`.
    GroupMismatchApiLevel,
    /// Anonymous caller on an API entry that requires access.
    AnonymousDeniedApiLevel,
    /// Session store rejected the session descriptor.
    SessionPersistenceFailure,
    /// Provisioning collaborator failed (roaming tenant resolution).
    ProvisioningFailure,
    /// Invalid gateway configuration.
    BadConfig,
}

impl ErrorCode {
    /// Symbolic name used in logs and response headers.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InternalException => "INTERNAL_EXCEPTION",
            ErrorCode::MissingPackage => "MISSING_PACKAGE",
            ErrorCode::MissingOrInvalidKey => "MISSING_OR_INVALID_KEY",
            ErrorCode::NoAclForService => "NO_ACL_FOR_SERVICE",
            ErrorCode::GeoDenied => "GEO_DENIED",
            ErrorCode::DeviceDenied => "DEVICE_DENIED",
            ErrorCode::GroupMismatchServiceLevel => "GROUP_MISMATCH_SERVICE_LEVEL",
            ErrorCode::AnonymousDeniedServiceLevel => "ANONYMOUS_DENIED_SERVICE_LEVEL",
            ErrorCode::RestrictedNoMatchingApi => "RESTRICTED_NO_MATCHING_API",
            ErrorCode::GroupMismatchApiLevel => "GROUP_MISMATCH_API_LEVEL",
            ErrorCode::AnonymousDeniedApiLevel => "ANONYMOUS_DENIED_API_LEVEL",
            ErrorCode::SessionPersistenceFailure => "SESSION_PERSISTENCE_FAILURE",
            ErrorCode::ProvisioningFailure => "PROVISIONING_FAILURE",
            ErrorCode::BadConfig => "BAD_CONFIG",
        }
    }

    /// Historic numeric gateway code.
    pub fn numeric(self) -> u16 {
        match self {
            ErrorCode::InternalException => 150,
            ErrorCode::MissingPackage => 152,
            ErrorCode::MissingOrInvalidKey => 153,
            ErrorCode::NoAclForService => 154,
            ErrorCode::GeoDenied => 155,
            ErrorCode::DeviceDenied => 156,
            ErrorCode::GroupMismatchServiceLevel => 157,
            ErrorCode::AnonymousDeniedServiceLevel => 158,
            ErrorCode::RestrictedNoMatchingApi => 159,
            ErrorCode::GroupMismatchApiLevel => 160,
            ErrorCode::AnonymousDeniedApiLevel => 161,
            ErrorCode::SessionPersistenceFailure => 163,
            ErrorCode::ProvisioningFailure => 170,
            ErrorCode::BadConfig => 171,
        }
    }

    /// HTTP status the host should translate this code into.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::MissingOrInvalidKey | ErrorCode::MissingPackage => 401,
            ErrorCode::InternalException
            | ErrorCode::SessionPersistenceFailure
            | ErrorCode::ProvisioningFailure
            | ErrorCode::BadConfig => 500,
            _ => 403,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, KeygateError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeygateError {
    #[error("missing or invalid key")]
    MissingOrInvalidKey,
    #[error("missing package: {0}")]
    MissingPackage(String),
    #[error("no acl for service: {0}")]
    NoAclForService(String),
    #[error("geo denied")]
    GeoDenied,
    #[error("device denied")]
    DeviceDenied,
    #[error("caller groups do not satisfy service access")]
    GroupMismatchServiceLevel,
    #[error("caller groups do not satisfy api access")]
    GroupMismatchApiLevel,
    #[error("anonymous caller denied: service requires identity")]
    AnonymousDeniedServiceLevel,
    #[error("anonymous caller denied: api requires identity")]
    AnonymousDeniedApiLevel,
    #[error("restricted service: no matching api")]
    RestrictedNoMatchingApi,
    #[error("session persistence failed: {0}")]
    SessionPersistenceFailure(String),
    #[error("provisioning: {0}")]
    Provisioning(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl KeygateError {
    /// Map to the stable code reported to the host.
    pub fn code(&self) -> ErrorCode {
        match self {
            KeygateError::MissingOrInvalidKey => ErrorCode::MissingOrInvalidKey,
            KeygateError::MissingPackage(_) => ErrorCode::MissingPackage,
            KeygateError::NoAclForService(_) => ErrorCode::NoAclForService,
            KeygateError::GeoDenied => ErrorCode::GeoDenied,
            KeygateError::DeviceDenied => ErrorCode::DeviceDenied,
            KeygateError::GroupMismatchServiceLevel => ErrorCode::GroupMismatchServiceLevel,
            KeygateError::GroupMismatchApiLevel => ErrorCode::GroupMismatchApiLevel,
            KeygateError::AnonymousDeniedServiceLevel => ErrorCode::AnonymousDeniedServiceLevel,
            KeygateError::AnonymousDeniedApiLevel => ErrorCode::AnonymousDeniedApiLevel,
            KeygateError::RestrictedNoMatchingApi => ErrorCode::RestrictedNoMatchingApi,
            KeygateError::SessionPersistenceFailure(_) => ErrorCode::SessionPersistenceFailure,
            KeygateError::Provisioning(_) => ErrorCode::ProvisioningFailure,
            KeygateError::BadConfig(_) => ErrorCode::BadConfig,
            KeygateError::Internal(_) => ErrorCode::InternalException,
        }
    }

    /// Whether this is a policy denial rather than a fault.
    pub fn is_denial(&self) -> bool {
        self.code().http_status() == 403
    }
}
