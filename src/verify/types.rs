use crate::probe::ProbeOutcome;
use crate::validator::FORMAT_INVALID_MESSAGE;

/// Outcome of one sub-check: a verdict plus a human-readable explanation.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResult {
    pub is_valid: bool,
    pub message: String,
}

impl CheckResult {
    pub fn new(is_valid: bool, message: impl Into<String>) -> Self {
        Self {
            is_valid,
            message: message.into(),
        }
    }

    pub fn valid(message: impl Into<String>) -> Self {
        Self::new(true, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(false, message)
    }
}

/// Aggregated verdict for one address.
///
/// `is_valid` only depends on `format`, `domain_status` and the disposable
/// classification. `mailbox` is advisory.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub is_valid: bool,
    pub email: String,
    pub format: CheckResult,
    pub professional: CheckResult,
    pub domain_status: CheckResult,
    pub mailbox: CheckResult,
    /// Probe diagnostics, present only when a probe actually ran.
    #[cfg_attr(
        feature = "with-serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub probe: Option<ProbeOutcome>,
}

impl VerificationResult {
    /// Result for an address that failed the format check. Every other
    /// sub-check keeps its default negative state.
    pub(crate) fn malformed(email: &str) -> Self {
        Self {
            is_valid: false,
            email: email.to_string(),
            format: CheckResult::invalid(FORMAT_INVALID_MESSAGE),
            professional: CheckResult::default(),
            domain_status: CheckResult::default(),
            mailbox: CheckResult::default(),
            probe: None,
        }
    }
}
