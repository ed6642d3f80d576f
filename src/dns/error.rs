use std::fmt;

use thiserror::Error;

/// DNS record family a lookup was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Address,
    Mx,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => f.write_str("A/AAAA"),
            Self::Mx => f.write_str("MX"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DnsError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("resolver runtime could not start: {source}")]
    Runtime {
        #[source]
        source: std::io::Error,
    },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
    #[error("{kind} lookup failed for {name}: {source}")]
    Lookup {
        name: String,
        kind: RecordKind,
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
}

impl DnsError {
    pub(crate) fn runtime(source: std::io::Error) -> Self {
        Self::Runtime { source }
    }

    pub(crate) fn resolver_init(source: trust_dns_resolver::error::ResolveError) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(
        name: impl Into<String>,
        kind: RecordKind,
        source: trust_dns_resolver::error::ResolveError,
    ) -> Self {
        Self::Lookup {
            name: name.into(),
            kind,
            source,
        }
    }
}
