/// All error types that can occur when talking to a lamp.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to parse a configuration document.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// A network socket operation failed while communicating with a lamp.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// The lamp did not reply within the transport timeout.
    #[error("no reply from {address} within {timeout_ms}ms")]
    Timeout { address: String, timeout_ms: u64 },

    /// A status reply could not be decoded.
    #[error("malformed status reply {reply:?}: {reason}")]
    MalformedResponse { reply: String, reason: String },

    /// The effect name is not present in the effect registry.
    #[error("unknown effect name {0:?}")]
    UnknownEffect(String),
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new timeout error
    pub fn timeout(address: &str, timeout_ms: u64) -> Self {
        Error::Timeout {
            address: address.to_string(),
            timeout_ms,
        }
    }

    /// Create a new malformed response error
    pub fn malformed(reply: &str, reason: &str) -> Self {
        Error::MalformedResponse {
            reply: reply.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error came from the network rather than from the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Socket { .. } | Error::Timeout { .. })
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
