use thiserror::Error;

use super::types::HandshakeState;

/// Why a single candidate was abandoned. Never escapes the probe: the next
/// candidate is tried instead.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("per-candidate deadline exceeded")]
    Timeout,
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
    #[error("connection closed by peer")]
    Closed,
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("unexpected reply to {stage}: {line}")]
    UnexpectedReply { stage: HandshakeState, line: String },
}

impl ProbeError {
    pub(crate) fn connect(host: impl Into<String>, source: std::io::Error) -> Self {
        Self::Connect {
            host: host.into(),
            source,
        }
    }

    /// Read/write timeouts surface as `WouldBlock` or `TimedOut` depending on
    /// the platform.
    pub(crate) fn io(source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => Self::Timeout,
            std::io::ErrorKind::UnexpectedEof => Self::Closed,
            _ => Self::Io { source },
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}
