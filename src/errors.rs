use std::net::SocketAddr;

/// All error types that can occur when talking to LIFX devices.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A network socket operation failed.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// A buffer ended before a fixed-width field could be read.
    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A field held a value the protocol does not define.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A hardware address string could not be parsed.
    #[error("invalid mac address: {0}")]
    InvalidMacAddress(String),

    /// A non-broadcast message was sent without a target device.
    #[error("message type {message_type} requires a target device")]
    MissingTarget { message_type: u16 },

    /// A device did not answer a request that needs exactly one reply.
    #[error("no response for message type {message_type} from {peer:?}")]
    NoResponse {
        message_type: u16,
        peer: Option<SocketAddr>,
    },

    /// A device answered with a message of a type the caller did not ask for.
    #[error("unexpected response type {found}, expected {expected}")]
    UnexpectedResponse { expected: u16, found: u16 },

    /// Failed to deserialize JSON configuration.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// Failed to serialize JSON configuration.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    pub(crate) fn truncated(needed: usize, remaining: usize) -> Self {
        Error::Truncated { needed, remaining }
    }

    pub(crate) fn no_response(message_type: u16, peer: Option<SocketAddr>) -> Self {
        Error::NoResponse { message_type, peer }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
