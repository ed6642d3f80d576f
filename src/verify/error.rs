use thiserror::Error;

use crate::dns::DnsError;

/// Faults that prevent a verification from producing a result at all.
///
/// Everything recoverable (bad format, DNS failures, unreachable servers)
/// ends up inside the [`VerificationResult`](super::VerificationResult)
/// instead.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("no email address given")]
    MissingAddress,
    #[error(transparent)]
    Dns(#[from] DnsError),
}
