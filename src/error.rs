use crate::blockchain::client::ClientError;
use crate::models::ScanHint;
use thiserror::Error;

/// Failures the detection engine recovers from locally. None of these
/// escape a scan; they decide the hint attached to its report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Remote node unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Malformed transaction {signature}: {reason}")]
    MalformedTransaction { signature: String, reason: String },

    #[error("Block not available for slot {0}")]
    BlockUnavailable(u64),
}

impl EngineError {
    pub fn hint(&self) -> ScanHint {
        match self {
            EngineError::RemoteUnavailable(_) => ScanHint::RemoteUnavailable,
            EngineError::BlockUnavailable(_) => ScanHint::BlockUnavailable,
            // a single bad transaction never empties a scan on its own
            EngineError::MalformedTransaction { .. } => ScanHint::NoQualifyingTransfers,
        }
    }
}

impl From<ClientError> for EngineError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::BlockUnavailable(slot) => EngineError::BlockUnavailable(slot),
            ClientError::MalformedTransaction { signature, reason } => {
                EngineError::MalformedTransaction { signature, reason }
            }
            other => EngineError::RemoteUnavailable(other.to_string()),
        }
    }
}
