//! Error types
//!
//! Defines domain-specific error types for each module of the explorer.

use std::fmt;

/// Path module errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A leaf name was empty or contained a separator.
    InvalidSegment(String),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::InvalidSegment(s) if s.is_empty() => write!(f, "Invalid segment: empty name"),
            PathError::InvalidSegment(s) => write!(f, "Invalid segment: {}", s),
        }
    }
}

impl std::error::Error for PathError {}

/// Credential material errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingField(&'static str),
    /// Account or container name with a separator, whitespace or control character.
    InvalidName(&'static str),
    MalformedToken(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingField(field) => write!(f, "Missing required field: {}", field),
            AuthError::InvalidName(field) => write!(f, "Invalid characters in {}", field),
            AuthError::MalformedToken(reason) => write!(f, "Malformed SAS token: {}", reason),
        }
    }
}

impl std::error::Error for AuthError {}

/// Broad classification of a failure reported by a remote collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    NotFound,
    Rejected,
    Transport,
    Protocol,
}

/// Failure reported by the metadata API or the object store.
///
/// `Display` renders the remote detail verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    kind: RemoteErrorKind,
    detail: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NotFound, detail)
    }

    pub fn rejected(detail: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Rejected, detail)
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Transport, detail)
    }

    pub fn protocol(detail: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Protocol, detail)
    }

    pub fn kind(&self) -> RemoteErrorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        RemoteError::transport(error.to_string())
    }
}

/// Broker errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    NotConnected,
    InvalidPath(String),
    Remote(RemoteError),
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerError::NotConnected => write!(f, "Not connected"),
            BrokerError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            BrokerError::Remote(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BrokerError {}

impl From<RemoteError> for BrokerError {
    fn from(error: RemoteError) -> Self {
        BrokerError::Remote(error)
    }
}

impl From<BrokerError> for RemoteError {
    fn from(error: BrokerError) -> Self {
        match error {
            BrokerError::NotConnected => RemoteError::rejected("Not connected"),
            BrokerError::InvalidPath(p) => RemoteError::rejected(format!("Invalid path: {}", p)),
            BrokerError::Remote(e) => e,
        }
    }
}

/// Directory browser session errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Malformed path segment or credential shape.
    InvalidInput(String),
    NotConnected,
    /// Remote detail, passed through verbatim.
    RemoteFailure(String),
    /// An upload queue stopped at `file`; `completed` earlier files stay stored.
    PartialBatchFailure {
        file: String,
        completed: usize,
        total: usize,
        detail: String,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidInput(msg) => write!(f, "{}", msg),
            SessionError::NotConnected => write!(f, "Not connected"),
            SessionError::RemoteFailure(detail) => write!(f, "{}", detail),
            SessionError::PartialBatchFailure {
                file,
                completed,
                total,
                detail,
            } => write!(
                f,
                "Upload of {} failed ({} of {} files stored): {}",
                file, completed, total, detail
            ),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<PathError> for SessionError {
    fn from(error: PathError) -> Self {
        SessionError::InvalidInput(error.to_string())
    }
}

impl From<AuthError> for SessionError {
    fn from(error: AuthError) -> Self {
        SessionError::InvalidInput(error.to_string())
    }
}

impl From<RemoteError> for SessionError {
    fn from(error: RemoteError) -> Self {
        SessionError::RemoteFailure(error.detail().to_string())
    }
}

/// General explorer error that encompasses all error types
#[derive(Debug)]
pub enum ExplorerError {
    Path(PathError),
    Auth(AuthError),
    Remote(RemoteError),
    Broker(BrokerError),
    Session(SessionError),
    Config(config::ConfigError),
    IoError(std::io::Error),
}

impl fmt::Display for ExplorerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorerError::Path(e) => write!(f, "Path error: {}", e),
            ExplorerError::Auth(e) => write!(f, "Credential error: {}", e),
            ExplorerError::Remote(e) => write!(f, "Remote error: {}", e),
            ExplorerError::Broker(e) => write!(f, "Broker error: {}", e),
            ExplorerError::Session(e) => write!(f, "Session error: {}", e),
            ExplorerError::Config(e) => write!(f, "Configuration error: {}", e),
            ExplorerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ExplorerError {}

impl From<PathError> for ExplorerError {
    fn from(error: PathError) -> Self {
        ExplorerError::Path(error)
    }
}

impl From<AuthError> for ExplorerError {
    fn from(error: AuthError) -> Self {
        ExplorerError::Auth(error)
    }
}

impl From<RemoteError> for ExplorerError {
    fn from(error: RemoteError) -> Self {
        ExplorerError::Remote(error)
    }
}

impl From<BrokerError> for ExplorerError {
    fn from(error: BrokerError) -> Self {
        ExplorerError::Broker(error)
    }
}

impl From<SessionError> for ExplorerError {
    fn from(error: SessionError) -> Self {
        ExplorerError::Session(error)
    }
}

impl From<config::ConfigError> for ExplorerError {
    fn from(error: config::ConfigError) -> Self {
        ExplorerError::Config(error)
    }
}

impl From<std::io::Error> for ExplorerError {
    fn from(error: std::io::Error) -> Self {
        ExplorerError::IoError(error)
    }
}
