use crate::verify::CheckResult;

pub(crate) const DOMAIN_HAS_MX_MESSAGE: &str = "The domain name exists and has valid MX records.";
pub(crate) const DOMAIN_NO_MAIL_MESSAGE: &str =
    "The domain name exists but may not be configured for email.";
pub(crate) const DOMAIN_MISSING_MESSAGE: &str =
    "The domain name doesn't exist or has no valid DNS records.";
pub(crate) const DOMAIN_LOOKUP_ERROR_MESSAGE: &str =
    "Could not verify domain status due to DNS lookup error.";

/// One mail exchanger; lower `priority` is tried first.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxCandidate {
    pub host: String,
    pub priority: u16,
}

impl MxCandidate {
    pub fn new(host: impl Into<String>, priority: u16) -> Self {
        Self {
            host: host.into(),
            priority,
        }
    }
}

/// Combined outcome of the address-record and MX lookups for one domain.
///
/// `candidates` is sorted by ascending priority; ties keep discovery order.
/// The `*_fault` fields hold resolver-level failures (anything but "no such
/// record"). A fault on one lookup leaves the other lookup's answer intact.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainStatus {
    pub has_address_record: bool,
    pub candidates: Vec<MxCandidate>,
    pub address_fault: Option<String>,
    pub mx_fault: Option<String>,
}

impl DomainStatus {
    pub fn has_mail_servers(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn has_fault(&self) -> bool {
        self.address_fault.is_some() || self.mx_fault.is_some()
    }

    /// Any resolver fault makes the domain invalid, whatever the other lookup
    /// returned.
    pub fn is_valid(&self) -> bool {
        !self.has_fault() && (self.has_mail_servers() || self.has_address_record)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.host.as_str())
    }

    pub fn check(&self) -> CheckResult {
        if self.has_fault() {
            CheckResult::invalid(DOMAIN_LOOKUP_ERROR_MESSAGE)
        } else if self.has_mail_servers() {
            CheckResult::valid(DOMAIN_HAS_MX_MESSAGE)
        } else if self.has_address_record {
            CheckResult::valid(DOMAIN_NO_MAIL_MESSAGE)
        } else {
            CheckResult::invalid(DOMAIN_MISSING_MESSAGE)
        }
    }
}
