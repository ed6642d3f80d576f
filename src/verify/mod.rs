//! Verification pipeline: format, DNS, domain lists, then the mailbox probe.

mod error;
mod types;

pub use error::VerifyError;
pub use types::{CheckResult, VerificationResult};

use crate::config::VerifierConfig;
use crate::dns::{DomainLookup, DomainStatus, SystemResolver, resolve_domain, system_resolver};
use crate::lists::DomainLists;
use crate::probe::{MailboxProber, ProbeOutcome, SmtpProber};
use crate::validator::{Address, FORMAT_VALID_MESSAGE, ValidationMode, parse_address};

pub(crate) const DISPOSABLE_MESSAGE: &str = "This appears to be a disposable email address.";
pub(crate) const NO_MAIL_SERVERS_MESSAGE: &str =
    "Cannot verify mailbox - domain has no email servers configured.";
pub(crate) const MX_LOOKUP_FAILED_MESSAGE: &str =
    "Cannot verify mailbox - mail server lookup failed.";
pub(crate) const CATCH_ALL_MESSAGE: &str = "Cannot verify mailbox - this domain accepts all emails during SMTP but may bounce invalid ones later.";

/// Runs the whole pipeline for one address at a time.
///
/// Holds no per-request state: the resolver, prober and lists are only read,
/// so the same `Verifier` can serve any number of calls.
pub struct Verifier<R = SystemResolver, P = SmtpProber> {
    resolver: R,
    prober: P,
    lists: DomainLists,
    mode: ValidationMode,
}

impl Verifier {
    /// System resolver and a TCP prober configured from `config`.
    pub fn from_config(config: VerifierConfig) -> Result<Self, VerifyError> {
        let resolver = system_resolver()?;
        let lists = config.lists.build();
        Ok(Self::new(resolver, SmtpProber::new(config.probe), lists)
            .with_mode(config.validation_mode))
    }
}

impl<R, P> Verifier<R, P>
where
    R: DomainLookup,
    P: MailboxProber,
{
    pub fn new(resolver: R, prober: P, lists: DomainLists) -> Self {
        Self {
            resolver,
            prober,
            lists,
            mode: ValidationMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn lists(&self) -> &DomainLists {
        &self.lists
    }

    /// Verifies `raw`.
    ///
    /// Only an empty input is an error. A malformed address yields a result
    /// with `format.is_valid == false` and no network work is done.
    pub fn verify(&self, raw: &str) -> Result<VerificationResult, VerifyError> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(VerifyError::MissingAddress);
        }

        let address = match parse_address(input, self.mode) {
            Ok(address) => address,
            Err(err) => {
                tracing::debug!(email = input, error = %err, "format check failed");
                return Ok(VerificationResult::malformed(input));
            }
        };

        let format = CheckResult::valid(FORMAT_VALID_MESSAGE);
        let disposable = self.lists.is_disposable(&address.domain);
        let professional = self.lists.professional_check(&address.domain);
        let domain = resolve_domain(&self.resolver, &address.ascii_domain);
        let domain_status = domain.check();
        let (mailbox, probe) = self.mailbox_check(&address, &domain, disposable);

        let result = VerificationResult {
            is_valid: format.is_valid && domain_status.is_valid && !disposable,
            email: address.to_string(),
            format,
            professional,
            domain_status,
            mailbox,
            probe,
        };
        tracing::info!(
            email = %result.email,
            valid = result.is_valid,
            disposable,
            domain_valid = result.domain_status.is_valid,
            mailbox_valid = result.mailbox.is_valid,
            "verification finished"
        );
        Ok(result)
    }

    /// Disposable, no MX and catch-all each skip the probe, in that order.
    /// A faulted address lookup does not: known MX hosts are still probed.
    fn mailbox_check(
        &self,
        address: &Address,
        domain: &DomainStatus,
        disposable: bool,
    ) -> (CheckResult, Option<ProbeOutcome>) {
        if disposable {
            return (CheckResult::invalid(DISPOSABLE_MESSAGE), None);
        }
        if !domain.has_mail_servers() {
            let message = if domain.mx_fault.is_some() {
                MX_LOOKUP_FAILED_MESSAGE
            } else {
                NO_MAIL_SERVERS_MESSAGE
            };
            return (CheckResult::invalid(message), None);
        }
        if self.lists.is_catch_all(&address.ascii_domain, domain.hosts()) {
            tracing::debug!(domain = %address.ascii_domain, "catch-all provider, probe skipped");
            return (CheckResult::invalid(CATCH_ALL_MESSAGE), None);
        }

        let outcome = self.prober.probe(address, &domain.candidates);
        (outcome.to_check(), Some(outcome))
    }
}
