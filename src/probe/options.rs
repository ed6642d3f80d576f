use std::time::Duration;

use crate::lists::{BLANKET_ACCEPTANCE_PHRASES, TRUSTED_PROVIDERS};

/// Knobs for the SMTP mailbox probe.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default, deny_unknown_fields))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub enabled: bool,
    pub port: u16,
    /// Budget for one candidate, connect included.
    pub timeout_ms: u64,
    pub helo_name: String,
    pub sender: String,
    /// Mail providers whose 2xx to `RCPT TO` is always trusted.
    pub trusted_providers: Vec<String>,
    /// Wording (matched case-insensitively) that flags a 2xx as blanket acceptance.
    pub blanket_acceptance_phrases: Vec<String>,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 25,
            timeout_ms: 15_000,
            helo_name: "emailverifier.com".to_string(),
            sender: "noreply@emailverifier.com".to_string(),
            trusted_providers: TRUSTED_PROVIDERS.iter().map(|s| s.to_string()).collect(),
            blanket_acceptance_phrases: BLANKET_ACCEPTANCE_PHRASES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ProbeOptions {
    /// Per-candidate budget. Never zero: every attempt stays bounded.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}
