//! Curated domain lists: disposable domains, consumer mail providers and
//! catch-all-prone hosting providers.
//!
//! [`DomainLists`] is built once (from the built-in tables or from
//! configuration) and only read afterwards.

mod builtin;

use std::collections::HashSet;

use crate::verify::CheckResult;

pub(crate) use builtin::{
    BLANKET_ACCEPTANCE_PHRASES, CATCH_ALL_HOSTS, CONSUMER_PROVIDERS, DISPOSABLE_DOMAINS,
    TRUSTED_PROVIDERS,
};

pub(crate) const PROFESSIONAL_MESSAGE: &str =
    "The domain isn't linked to webmail or throwaway email services.";
pub(crate) const PERSONAL_MESSAGE: &str = "This appears to be a personal email address.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainLists {
    disposable: HashSet<String>,
    consumer_providers: HashSet<String>,
    catch_all_hosts: Vec<String>,
}

impl DomainLists {
    pub fn new<D, C, H>(disposable: D, consumer_providers: C, catch_all_hosts: H) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
        H: IntoIterator,
        H::Item: AsRef<str>,
    {
        Self {
            disposable: normalize_all(disposable).collect(),
            consumer_providers: normalize_all(consumer_providers).collect(),
            catch_all_hosts: normalize_all(catch_all_hosts).collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            DISPOSABLE_DOMAINS.iter(),
            CONSUMER_PROVIDERS.iter(),
            CATCH_ALL_HOSTS.iter(),
        )
    }

    /// Exact match against the disposable list.
    pub fn is_disposable(&self, domain: &str) -> bool {
        self.disposable.contains(&normalize(domain))
    }

    /// Exact match against the consumer-provider list.
    pub fn is_consumer_provider(&self, domain: &str) -> bool {
        self.consumer_providers.contains(&normalize(domain))
    }

    pub fn is_professional(&self, domain: &str) -> bool {
        !self.is_consumer_provider(domain)
    }

    pub fn professional_check(&self, domain: &str) -> CheckResult {
        if self.is_professional(domain) {
            CheckResult::valid(PROFESSIONAL_MESSAGE)
        } else {
            CheckResult::invalid(PERSONAL_MESSAGE)
        }
    }

    /// True when the domain or any MX host belongs to a hosting provider known
    /// to accept every recipient at RCPT time.
    pub fn is_catch_all<'a, I>(&self, domain: &str, mx_hosts: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let listed = |host: &str| {
            self.catch_all_hosts
                .iter()
                .any(|entry| host_matches(host, entry))
        };
        listed(&normalize(domain)) || mx_hosts.into_iter().any(listed)
    }

    pub fn catch_all_hosts(&self) -> &[String] {
        &self.catch_all_hosts
    }
}

impl Default for DomainLists {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Case-insensitive substring containment of `entry` in `host`. So
/// `mx1.hostinger.com.br` and `mx.nothostinger.com` both match
/// `hostinger.com`.
pub(crate) fn host_matches(host: &str, entry: &str) -> bool {
    let entry = entry.trim().trim_end_matches('.').to_ascii_lowercase();
    !entry.is_empty() && host.to_ascii_lowercase().contains(&entry)
}

fn normalize(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_lowercase()
}

fn normalize_all<I>(items: I) -> impl Iterator<Item = String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| normalize(item.as_ref()))
        .filter(|item| !item.is_empty())
}
