use phf::phf_set;

pub(crate) const DISPOSABLE_DOMAINS: phf::Set<&'static str> = phf_set! {
    "10minutemail.com",
    "guerrillamail.com",
    "mailinator.com",
    "tempmail.org",
    "throwaway.email",
    "temp-mail.org",
    "getairmail.com",
};

pub(crate) const CONSUMER_PROVIDERS: phf::Set<&'static str> = phf_set! {
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
    "icloud.com",
    "live.com",
    "msn.com",
    "yandex.com",
    "mail.ru",
};

// Hosting providers that accept every RCPT and bounce later.
pub(crate) const CATCH_ALL_HOSTS: phf::Set<&'static str> = phf_set! {
    "hostinger.com",
    "namecheap.com",
    "godaddy.com",
};

pub(crate) const TRUSTED_PROVIDERS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "icloud.com",
    "live.com",
];

pub(crate) const BLANKET_ACCEPTANCE_PHRASES: &[&str] = &[
    "relay accepted",
    "will attempt delivery",
    "accepted for delivery",
];
