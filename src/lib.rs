#![forbid(unsafe_code)]
//! mailverify_lib — e-mail verification: format, DNS, domain lists and a
//! live SMTP mailbox probe.
//!
//! ```no_run
//! use mailverify_lib::{Verifier, VerifierConfig};
//!
//! let verifier = Verifier::from_config(VerifierConfig::default())?;
//! let result = verifier.verify("jane.doe@example.com")?;
//! println!("{} -> {}", result.email, result.is_valid);
//! # Ok::<(), mailverify_lib::VerifyError>(())
//! ```

pub mod config;
pub mod dns;
pub mod lists;
pub mod probe;
pub mod validator;
pub mod verify;

#[cfg(feature = "with-serde")]
pub use config::ConfigError;
pub use config::{ListsConfig, VerifierConfig};
pub use dns::{
    DnsError, DomainLookup, DomainStatus, MxCandidate, SystemResolver, resolve_domain,
};
pub use lists::DomainLists;
pub use probe::{
    MailboxProber, MailboxVerdict, ProbeError, ProbeOptions, ProbeOutcome, SmtpProber,
    probe_candidates,
};
pub use validator::{
    Address, FormatError, ValidationMode, ValidationReport, check_format, parse_address,
    validate_email,
};
pub use verify::{CheckResult, VerificationResult, Verifier, VerifyError};
