use std::fmt;

use crate::dns::MxCandidate;
use crate::verify::CheckResult;

pub(crate) const NO_CANDIDATES_MESSAGE: &str = "No mail servers found for this domain.";
pub(crate) const UNREACHABLE_MESSAGE: &str =
    "Could not verify mailbox - all mail servers unreachable.";
pub(crate) const DISABLED_MESSAGE: &str = "Mailbox probing is disabled.";

/// A complete SMTP reply. `lines` holds the raw lines (status code included);
/// for multi-line replies the last one carries the final status.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl SmtpReply {
    pub fn last_line(&self) -> &str {
        self.lines.last().map(String::as_str).unwrap_or_default()
    }

    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Position in the per-candidate dialogue.
///
/// `Connecting -> Greeted -> IdentitySent -> SenderSent -> RecipientSent -> Closed`.
/// An attempt that fails keeps the last state it reached.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Connecting,
    Greeted,
    IdentitySent,
    SenderSent,
    RecipientSent,
    Closed,
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Connecting => "greeting",
            Self::Greeted => "HELO",
            Self::IdentitySent => "MAIL FROM",
            Self::SenderSent => "RCPT TO",
            Self::RecipientSent => "QUIT",
            Self::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// Classification of the reply to `RCPT TO`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxVerdict {
    /// 2xx, trusted.
    Accepted,
    /// 2xx from a server whose wording suggests it accepts every recipient.
    BlanketAccept,
    /// 5xx.
    DoesNotExist,
    /// 4xx. Reported as a negative signal, never retried.
    TemporaryFailure,
    /// Any other status class.
    Unknown,
}

impl MailboxVerdict {
    pub fn mailbox_likely_valid(self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub(crate) fn message(self, line: &str) -> String {
        match self {
            Self::Accepted => format!("Mailbox verified: {line}"),
            Self::BlanketAccept => format!("Server accepts all emails (catch-all): {line}"),
            Self::DoesNotExist => format!("Mailbox does not exist: {line}"),
            Self::TemporaryFailure => format!("Temporary error, likely invalid: {line}"),
            Self::Unknown => format!("Unknown response: {line}"),
        }
    }
}

/// Diagnostics for one mail exchanger.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateAttempt {
    pub host: String,
    pub priority: u16,
    pub reached: HandshakeState,
    pub error: Option<String>,
    pub transcript: Vec<String>,
}

impl CandidateAttempt {
    pub(crate) fn new(candidate: &MxCandidate) -> Self {
        Self {
            host: candidate.host.clone(),
            priority: candidate.priority,
            reached: HandshakeState::Connecting,
            error: None,
            transcript: Vec::new(),
        }
    }

    pub fn abandoned(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of probing one address against its mail exchangers.
///
/// `determined == false` means no candidate produced a classifiable reply.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub determined: bool,
    pub mailbox_likely_valid: bool,
    pub response_code: Option<u16>,
    pub verdict: Option<MailboxVerdict>,
    pub responding_host: Option<String>,
    pub message: String,
    pub attempts: Vec<CandidateAttempt>,
}

impl ProbeOutcome {
    pub(crate) fn determined(
        host: &str,
        reply: &SmtpReply,
        verdict: MailboxVerdict,
        attempts: Vec<CandidateAttempt>,
    ) -> Self {
        Self {
            determined: true,
            mailbox_likely_valid: verdict.mailbox_likely_valid(),
            response_code: Some(reply.code),
            verdict: Some(verdict),
            responding_host: Some(host.to_string()),
            message: verdict.message(reply.last_line()),
            attempts,
        }
    }

    pub(crate) fn undetermined(message: &str, attempts: Vec<CandidateAttempt>) -> Self {
        Self {
            determined: false,
            mailbox_likely_valid: false,
            response_code: None,
            verdict: None,
            responding_host: None,
            message: message.to_string(),
            attempts,
        }
    }

    pub(crate) fn unreachable(attempts: Vec<CandidateAttempt>) -> Self {
        Self::undetermined(UNREACHABLE_MESSAGE, attempts)
    }

    pub(crate) fn no_candidates() -> Self {
        Self::undetermined(NO_CANDIDATES_MESSAGE, Vec::new())
    }

    pub(crate) fn disabled() -> Self {
        Self::undetermined(DISABLED_MESSAGE, Vec::new())
    }

    pub fn to_check(&self) -> CheckResult {
        CheckResult::new(self.mailbox_likely_valid, self.message.clone())
    }
}
