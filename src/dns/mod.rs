//! DNS checks for the domain of an address.
//!
//! [`resolve_domain`] asks for the address records and the MX set of a domain
//! and folds both answers (or failures) into a [`DomainStatus`].
//! [`SystemResolver`] keeps both queries in flight at once on a private
//! runtime.

mod error;
mod resolver;
mod types;

pub use error::{DnsError, RecordKind};
pub use resolver::{DomainLookup, SystemResolver, resolve_domain, system_resolver};
pub use types::{DomainStatus, MxCandidate};

pub(crate) use types::{DOMAIN_HAS_MX_MESSAGE, DOMAIN_LOOKUP_ERROR_MESSAGE, DOMAIN_MISSING_MESSAGE};

#[cfg(test)]
pub(crate) mod tests;
