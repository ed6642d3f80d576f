use std::collections::HashSet;

use tokio::runtime::{Builder, Runtime};
use trust_dns_resolver::{
    TokioAsyncResolver,
    error::{ResolveError, ResolveErrorKind},
    lookup::MxLookup,
    lookup_ip::LookupIp,
};

use super::{DnsError, DomainStatus, MxCandidate, RecordKind};

type AddressAnswer = Result<bool, DnsError>;
type MxAnswer = Result<Vec<MxCandidate>, DnsError>;

/// DNS operations the verification pipeline needs.
///
/// "No such record" (NXDOMAIN, empty answer) is not an error: implementations
/// return `Ok(false)` / `Ok(vec![])` and reserve `Err` for resolver faults.
pub trait DomainLookup {
    fn lookup_address(&self, domain: &str) -> AddressAnswer;
    fn lookup_mx(&self, domain: &str) -> MxAnswer;

    /// Both lookups for one domain. The default issues them one after the
    /// other; resolvers that can overlap the two queries override it.
    fn lookup_both(&self, domain: &str) -> (AddressAnswer, MxAnswer) {
        (self.lookup_address(domain), self.lookup_mx(domain))
    }
}

/// Async trust-dns resolver driven by its own current-thread runtime, so the
/// address and MX queries of one domain are in flight together.
pub struct SystemResolver {
    runtime: Runtime,
    resolver: TokioAsyncResolver,
}

impl SystemResolver {
    /// Reads the system configuration (`/etc/resolv.conf`).
    pub fn from_system_conf() -> Result<Self, DnsError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(DnsError::runtime)?;
        let resolver = {
            let _guard = runtime.enter();
            TokioAsyncResolver::tokio_from_system_conf().map_err(DnsError::resolver_init)?
        };
        Ok(Self { runtime, resolver })
    }

    async fn address(&self, domain: &str) -> AddressAnswer {
        address_answer(domain, self.resolver.lookup_ip(domain).await)
    }

    async fn mx(&self, domain: &str) -> MxAnswer {
        mx_answer(domain, self.resolver.mx_lookup(domain).await)
    }
}

impl DomainLookup for SystemResolver {
    fn lookup_address(&self, domain: &str) -> AddressAnswer {
        self.runtime.block_on(self.address(domain))
    }

    fn lookup_mx(&self, domain: &str) -> MxAnswer {
        self.runtime.block_on(self.mx(domain))
    }

    fn lookup_both(&self, domain: &str) -> (AddressAnswer, MxAnswer) {
        self.runtime
            .block_on(async { tokio::join!(self.address(domain), self.mx(domain)) })
    }
}

/// Builds a resolver from the system configuration.
pub fn system_resolver() -> Result<SystemResolver, DnsError> {
    SystemResolver::from_system_conf()
}

/// Runs the address and MX lookups for `ascii_domain` through
/// [`DomainLookup::lookup_both`] and merges them. Neither failure aborts the
/// other.
pub fn resolve_domain<R>(resolver: &R, ascii_domain: &str) -> DomainStatus
where
    R: DomainLookup + ?Sized,
{
    let domain = ascii_domain.trim().trim_end_matches('.');
    if domain.is_empty() {
        let fault = DnsError::EmptyDomain.to_string();
        return DomainStatus {
            address_fault: Some(fault.clone()),
            mx_fault: Some(fault),
            ..DomainStatus::default()
        };
    }

    let (address, mx) = resolver.lookup_both(domain);

    let mut status = DomainStatus::default();
    match address {
        Ok(found) => status.has_address_record = found,
        Err(err) => {
            tracing::warn!(domain, error = %err, "address lookup failed");
            status.address_fault = Some(err.to_string());
        }
    }
    match mx {
        Ok(records) => status.candidates = order_candidates(records),
        Err(err) => {
            tracing::warn!(domain, error = %err, "MX lookup failed");
            status.mx_fault = Some(err.to_string());
        }
    }

    tracing::debug!(
        domain,
        has_address_record = status.has_address_record,
        mx = status.candidates.len(),
        faulted = status.has_fault(),
        "domain resolved"
    );
    status
}

/// Stable sort by priority, drops null-MX / empty hosts and repeated hosts
/// (first occurrence wins).
pub(crate) fn order_candidates(mut records: Vec<MxCandidate>) -> Vec<MxCandidate> {
    records.retain(|r| !r.host.is_empty());
    records.sort_by_key(|r| r.priority);
    let mut seen = HashSet::new();
    records.retain(|r| seen.insert(r.host.clone()));
    records
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

fn is_not_found(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

fn address_answer(domain: &str, answer: Result<LookupIp, ResolveError>) -> AddressAnswer {
    match answer {
        Ok(lookup) => Ok(lookup.iter().next().is_some()),
        Err(err) if is_not_found(&err) => Ok(false),
        Err(err) => Err(DnsError::lookup(domain, RecordKind::Address, err)),
    }
}

fn mx_answer(domain: &str, answer: Result<MxLookup, ResolveError>) -> MxAnswer {
    match answer {
        Ok(lookup) => Ok(lookup
            .iter()
            .map(|mx| {
                MxCandidate::new(normalize_exchange(mx.exchange().to_utf8()), mx.preference())
            })
            .collect()),
        Err(err) if is_not_found(&err) => Ok(Vec::new()),
        Err(err) => Err(DnsError::lookup(domain, RecordKind::Mx, err)),
    }
}
