use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushErrorCode {
    CapabilityUnsupported,
    PermissionDenied,
    WorkerNotReady,
    RemoteSyncFailure,
    InvalidArgument,
    SubscribeFailed,
    UnsubscribeFailed,
    Storage,
    Internal,
}

impl PushErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushErrorCode::CapabilityUnsupported => "push/capability-unsupported",
            PushErrorCode::PermissionDenied => "push/permission-denied",
            PushErrorCode::WorkerNotReady => "push/worker-not-ready",
            PushErrorCode::RemoteSyncFailure => "push/remote-sync-failed",
            PushErrorCode::InvalidArgument => "push/invalid-argument",
            PushErrorCode::SubscribeFailed => "push/subscribe-failed",
            PushErrorCode::UnsubscribeFailed => "push/unsubscribe-failed",
            PushErrorCode::Storage => "push/storage",
            PushErrorCode::Internal => "push/internal",
        }
    }
}

#[derive(Clone, Debug)]
pub struct PushError {
    pub code: PushErrorCode,
    message: String,
}

impl PushError {
    pub fn new(code: PushErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` for failures the UI layer is expected to act on
    /// (remediation instructions, unsupported-browser notice).
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self.code,
            PushErrorCode::PermissionDenied | PushErrorCode::CapabilityUnsupported
        )
    }
}

impl Display for PushError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for PushError {}

pub type PushResult<T> = Result<T, PushError>;

pub fn capability_unsupported(message: impl Into<String>) -> PushError {
    PushError::new(PushErrorCode::CapabilityUnsupported, message)
}

pub fn permission_denied(message: impl Into<String>) -> PushError {
    PushError::new(PushErrorCode::PermissionDenied, message)
}

pub fn worker_not_ready(message: impl Into<String>) -> PushError {
    PushError::new(PushErrorCode::WorkerNotReady, message)
}

pub fn remote_sync_failed(message: impl Into<String>) -> PushError {
    PushError::new(PushErrorCode::RemoteSyncFailure, message)
}

pub fn invalid_argument(message: impl Into<String>) -> PushError {
    PushError::new(PushErrorCode::InvalidArgument, message)
}

pub fn subscribe_failed(message: impl Into<String>) -> PushError {
    PushError::new(PushErrorCode::SubscribeFailed, message)
}

pub fn unsubscribe_failed(message: impl Into<String>) -> PushError {
    PushError::new(PushErrorCode::UnsubscribeFailed, message)
}

pub fn storage_error(message: impl Into<String>) -> PushError {
    PushError::new(PushErrorCode::Storage, message)
}

pub fn internal_error(message: impl Into<String>) -> PushError {
    PushError::new(PushErrorCode::Internal, message)
}
