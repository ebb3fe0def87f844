//! Error types for wolkit-core



/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// MAC address string does not describe six hex octets
    #[error("Invalid MAC address '{input}': {reason}")]
    InvalidMac {
        input: String,
        reason: String,
    },

    /// Magic packet has the wrong length
    #[error("Invalid magic packet length: expected {expected} bytes, got {actual} bytes")]
    InvalidPacketLength {
        expected: usize,
        actual: usize,
    },

    /// Magic packet does not start with the 0xFF sync stream
    #[error("Magic packet is missing the 0xFF sync stream")]
    MissingSyncStream,

    /// One of the MAC repetitions differs from the first
    #[error("Magic packet repetition {index} does not match the target MAC")]
    InconsistentRepetition {
        index: usize,
    },
}

impl Error {
    pub(crate) fn invalid_mac(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidMac {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if the error came from user-supplied input (as opposed to a received packet)
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidMac { .. })
    }
}
