use std::sync::atomic::{AtomicUsize, Ordering};

use trust_dns_resolver::error::ResolveError;

use super::resolver::{normalize_exchange, order_candidates};
use super::types::DOMAIN_NO_MAIL_MESSAGE;
use super::*;

type AddressFn = dyn Fn(&str) -> Result<bool, DnsError> + Send + Sync;
type MxFn = dyn Fn(&str) -> Result<Vec<MxCandidate>, DnsError> + Send + Sync;

/// Scripted resolver that counts the lookups it serves.
pub(crate) struct StubResolver {
    pub on_address: Box<AddressFn>,
    pub on_mx: Box<MxFn>,
    pub calls: AtomicUsize,
}

impl StubResolver {
    pub(crate) fn new<A, M>(on_address: A, on_mx: M) -> Self
    where
        A: Fn(&str) -> Result<bool, DnsError> + Send + Sync + 'static,
        M: Fn(&str) -> Result<Vec<MxCandidate>, DnsError> + Send + Sync + 'static,
    {
        Self {
            on_address: Box::new(on_address),
            on_mx: Box::new(on_mx),
            calls: AtomicUsize::new(0),
        }
    }

    /// Domain with an A record and the given MX set.
    pub(crate) fn with_mx(records: Vec<MxCandidate>) -> Self {
        Self::new(|_| Ok(true), move |_| Ok(records.clone()))
    }

    /// Domain that resolves to nothing at all.
    pub(crate) fn empty() -> Self {
        Self::new(|_| Ok(false), |_| Ok(Vec::new()))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DomainLookup for StubResolver {
    fn lookup_address(&self, domain: &str) -> Result<bool, DnsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.on_address)(domain)
    }

    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxCandidate>, DnsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.on_mx)(domain)
    }
}

pub(crate) fn servfail(domain: &str, kind: RecordKind) -> DnsError {
    DnsError::lookup(domain, kind, ResolveError::from("simulated SERVFAIL"))
}

#[test]
fn resolve_sorts_by_priority() {
    let stub = StubResolver::with_mx(vec![
        MxCandidate::new("hosta.example.com", 20),
        MxCandidate::new("hostb.example.com", 10),
    ]);
    let status = resolve_domain(&stub, "example.com");
    let hosts: Vec<&str> = status.hosts().collect();
    assert_eq!(hosts, ["hostb.example.com", "hosta.example.com"]);
    assert_eq!(stub.calls(), 2);
}

#[test]
fn ties_keep_discovery_order_and_dedup() {
    let ordered = order_candidates(vec![
        MxCandidate::new("zeta.example.com", 10),
        MxCandidate::new("alpha.example.com", 10),
        MxCandidate::new("zeta.example.com", 10),
        MxCandidate::new("backup.example.com", 5),
        MxCandidate::new("", 0),
    ]);
    let hosts: Vec<&str> = ordered.iter().map(|c| c.host.as_str()).collect();
    assert_eq!(
        hosts,
        ["backup.example.com", "zeta.example.com", "alpha.example.com"]
    );
}

#[test]
fn mx_only_domain_is_valid() {
    let stub = StubResolver::new(
        |_| Ok(false),
        |_| Ok(vec![MxCandidate::new("mx.example.com", 10)]),
    );
    let status = resolve_domain(&stub, "example.com");
    assert!(status.is_valid());
    assert_eq!(status.check().message, DOMAIN_HAS_MX_MESSAGE);
}

#[test]
fn address_only_domain_is_valid_but_not_for_mail() {
    let stub = StubResolver::new(|_| Ok(true), |_| Ok(Vec::new()));
    let status = resolve_domain(&stub, "example.com");
    let check = status.check();
    assert!(check.is_valid);
    assert_eq!(check.message, DOMAIN_NO_MAIL_MESSAGE);
    assert!(!status.has_mail_servers());
}

#[test]
fn nothing_found_is_invalid() {
    let status = resolve_domain(&StubResolver::empty(), "email.example");
    let check = status.check();
    assert!(!check.is_valid);
    assert_eq!(check.message, DOMAIN_MISSING_MESSAGE);
    assert!(!status.has_fault());
}

#[test]
fn resolver_fault_gets_distinct_message() {
    let stub = StubResolver::new(
        |d| Err(servfail(d, RecordKind::Address)),
        |d| Err(servfail(d, RecordKind::Mx)),
    );
    let status = resolve_domain(&stub, "example.com");
    let check = status.check();
    assert!(!check.is_valid);
    assert_eq!(check.message, DOMAIN_LOOKUP_ERROR_MESSAGE);
    assert!(status.address_fault.is_some());
    assert!(status.mx_fault.is_some());
}

#[test]
fn address_fault_invalidates_domain_but_keeps_mx_records() {
    let stub = StubResolver::new(
        |d| Err(servfail(d, RecordKind::Address)),
        |_| Ok(vec![MxCandidate::new("mx.example.com", 10)]),
    );
    let status = resolve_domain(&stub, "example.com");
    let check = status.check();
    assert!(!check.is_valid);
    assert_eq!(check.message, DOMAIN_LOOKUP_ERROR_MESSAGE);
    assert!(!status.is_valid());
    assert!(status.mx_fault.is_none());
    assert!(status.has_mail_servers());
}

#[test]
fn mx_fault_invalidates_domain_with_address_record() {
    let stub = StubResolver::new(|_| Ok(true), |d| Err(servfail(d, RecordKind::Mx)));
    let status = resolve_domain(&stub, "example.com");
    let check = status.check();
    assert!(!check.is_valid);
    assert_eq!(check.message, DOMAIN_LOOKUP_ERROR_MESSAGE);
    assert!(status.has_address_record);
    assert!(status.address_fault.is_none());
    assert!(status.mx_fault.as_deref().is_some_and(|f| f.contains("MX lookup failed")));
}

/// Answers only through `lookup_both`, the way a resolver that overlaps its
/// queries does.
struct PairedLookup;

impl DomainLookup for PairedLookup {
    fn lookup_address(&self, domain: &str) -> Result<bool, DnsError> {
        Err(servfail(domain, RecordKind::Address))
    }

    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxCandidate>, DnsError> {
        Err(servfail(domain, RecordKind::Mx))
    }

    fn lookup_both(
        &self,
        _domain: &str,
    ) -> (Result<bool, DnsError>, Result<Vec<MxCandidate>, DnsError>) {
        (Ok(true), Ok(vec![MxCandidate::new("mx.example.com", 10)]))
    }
}

#[test]
fn resolve_goes_through_lookup_both() {
    let status = resolve_domain(&PairedLookup, "example.com");
    assert!(!status.has_fault());
    assert!(status.is_valid());
    assert_eq!(status.check().message, DOMAIN_HAS_MX_MESSAGE);
}

#[test]
#[ignore = "requires network DNS"]
fn system_resolver_answers_both_lookups() {
    let resolver = SystemResolver::from_system_conf().expect("system resolver");
    let status = resolve_domain(&resolver, "gmail.com");
    assert!(!status.has_fault(), "{status:?}");
    assert!(status.has_mail_servers());
}

#[test]
fn empty_domain_is_a_fault_without_lookups() {
    let stub = StubResolver::empty();
    let status = resolve_domain(&stub, "  ");
    assert_eq!(stub.calls(), 0);
    assert!(!status.is_valid());
    assert_eq!(status.mx_fault, Some(DnsError::EmptyDomain.to_string()));
    assert_eq!(status.check().message, DOMAIN_LOOKUP_ERROR_MESSAGE);
}

#[test]
fn normalize_exchange_trims_dot_and_lowercases() {
    let out = normalize_exchange("Mail.EXAMPLE.com.".to_string());
    assert_eq!(out, "mail.example.com");
}
