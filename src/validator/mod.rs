mod domain;
mod local;
mod types;

pub use types::{Address, FormatError, ValidationMode, ValidationReport};

use domain::{check_domain, normalize_domain};
use local::{is_local_relaxed, is_local_strict};

use crate::verify::CheckResult;

pub(crate) const FORMAT_VALID_MESSAGE: &str =
    "This email address is written correctly and isn't gibberish.";
pub(crate) const FORMAT_INVALID_MESSAGE: &str = "This email address format is invalid.";

const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

/// Checks `email` (surrounding whitespace ignored) and lists every rule it
/// breaks.
pub fn validate_email(email: &str, mode: ValidationMode) -> ValidationReport {
    let input = email.trim();
    let mut reasons = Vec::new();

    if input.len() > MAX_ADDRESS_LEN {
        reasons.push(format!("total length {} > {MAX_ADDRESS_LEN}", input.len()));
    }

    let Some((local, domain)) = split_address(input) else {
        reasons.push("must contain exactly one '@'".to_string());
        return ValidationReport { ok: false, reasons };
    };

    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        reasons.push(format!(
            "local part length {} invalid (1..={MAX_LOCAL_LEN})",
            local.len()
        ));
    }

    let local_ok = match mode {
        ValidationMode::Strict => is_local_strict(local),
        ValidationMode::Relaxed => is_local_relaxed(local),
    };
    if !local_ok {
        reasons.push(format!("invalid local part ({mode} rules)"));
    }

    check_domain(domain, &mut reasons);

    ValidationReport {
        ok: reasons.is_empty(),
        reasons,
    }
}

/// Validates `email` and decomposes it into an [`Address`] with a
/// lower-cased domain.
pub fn parse_address(email: &str, mode: ValidationMode) -> Result<Address, FormatError> {
    let report = validate_email(email, mode);
    if !report.ok {
        return Err(FormatError::new(report.reasons));
    }

    let (local, domain) = split_address(email.trim())
        .ok_or_else(|| FormatError::new(vec!["must contain exactly one '@'".to_string()]))?;
    let (domain, ascii_domain) = normalize_domain(domain)
        .ok_or_else(|| FormatError::new(vec!["domain punycode conversion failed".to_string()]))?;

    Ok(Address {
        local: local.to_string(),
        domain,
        ascii_domain,
    })
}

fn split_address(input: &str) -> Option<(&str, &str)> {
    let (local, domain) = input.split_once('@')?;
    if domain.contains('@') {
        return None;
    }
    Some((local, domain))
}

/// Format sub-check as reported in a verification result.
pub fn check_format(email: &str, mode: ValidationMode) -> CheckResult {
    if validate_email(email, mode).ok {
        CheckResult::valid(FORMAT_VALID_MESSAGE)
    } else {
        CheckResult::invalid(FORMAT_INVALID_MESSAGE)
    }
}
