//! Live SMTP mailbox probe.
//!
//! [`SmtpProber`] walks the MX candidates in priority order, one connection at
//! a time, and runs `HELO` / `MAIL FROM` / `RCPT TO` / `QUIT` against each
//! until one server gives a classifiable answer to `RCPT TO`. No message is
//! ever transferred. A candidate that fails to connect, answers off-script or
//! exceeds its time budget is abandoned and the next one is tried.

mod dialogue;
mod error;
mod options;
mod session;
mod types;

pub use error::ProbeError;
pub use options::ProbeOptions;
pub use session::{Connection, Connector, TcpConnector};
pub use types::{CandidateAttempt, HandshakeState, MailboxVerdict, ProbeOutcome, SmtpReply};

pub(crate) use types::{NO_CANDIDATES_MESSAGE, UNREACHABLE_MESSAGE};

use std::time::Instant;

use crate::dns::MxCandidate;
use crate::validator::Address;

use dialogue::{classify_recipient_reply, run_dialogue};
use session::SmtpSession;

/// Mailbox existence check against a set of mail exchangers.
pub trait MailboxProber {
    fn probe(&self, address: &Address, candidates: &[MxCandidate]) -> ProbeOutcome;
}

#[derive(Debug, Clone, Default)]
pub struct SmtpProber<C = TcpConnector> {
    options: ProbeOptions,
    connector: C,
}

impl SmtpProber {
    pub fn new(options: ProbeOptions) -> Self {
        Self::with_connector(options, TcpConnector)
    }
}

impl<C> SmtpProber<C> {
    pub fn with_connector(options: ProbeOptions, connector: C) -> Self {
        Self { options, connector }
    }
}

impl<C: Connector> MailboxProber for SmtpProber<C> {
    fn probe(&self, address: &Address, candidates: &[MxCandidate]) -> ProbeOutcome {
        if !self.options.enabled {
            return ProbeOutcome::disabled();
        }
        probe_candidates(
            &self.connector,
            &self.options,
            &address.envelope(),
            candidates,
        )
    }
}

/// Tries `candidates` by ascending priority (ties keep their order) and
/// stops at the first determined answer.
pub fn probe_candidates<C>(
    connector: &C,
    options: &ProbeOptions,
    recipient: &str,
    candidates: &[MxCandidate],
) -> ProbeOutcome
where
    C: Connector + ?Sized,
{
    if candidates.is_empty() {
        return ProbeOutcome::no_candidates();
    }

    let mut ordered: Vec<&MxCandidate> = candidates.iter().collect();
    ordered.sort_by_key(|candidate| candidate.priority);

    let mut attempts = Vec::with_capacity(ordered.len());
    for candidate in ordered {
        let (attempt, reply) = probe_host(connector, options, recipient, candidate);
        attempts.push(attempt);
        let Some(reply) = reply else {
            continue;
        };
        let verdict = classify_recipient_reply(&reply, &candidate.host, options);
        tracing::info!(
            host = %candidate.host,
            code = reply.code,
            ?verdict,
            "RCPT TO answered"
        );
        return ProbeOutcome::determined(&candidate.host, &reply, verdict, attempts);
    }

    tracing::warn!(
        recipient,
        tried = attempts.len(),
        "no mail exchanger gave a usable answer"
    );
    ProbeOutcome::unreachable(attempts)
}

fn probe_host<C>(
    connector: &C,
    options: &ProbeOptions,
    recipient: &str,
    candidate: &MxCandidate,
) -> (CandidateAttempt, Option<SmtpReply>)
where
    C: Connector + ?Sized,
{
    let deadline = Instant::now() + options.timeout();
    let mut attempt = CandidateAttempt::new(candidate);
    tracing::debug!(host = %candidate.host, priority = candidate.priority, "probing candidate");

    let conn = match connector.connect(&candidate.host, options.port, deadline) {
        Ok(conn) => conn,
        Err(err) => {
            tracing::debug!(host = %candidate.host, error = %err, "candidate abandoned");
            attempt.error = Some(err.to_string());
            return (attempt, None);
        }
    };

    let mut session = SmtpSession::new(conn, deadline);
    let mut state = HandshakeState::Connecting;
    let result = run_dialogue(&mut session, recipient, options, &mut state);
    attempt.reached = state;
    attempt.transcript = session.into_transcript();

    match result {
        Ok(reply) => (attempt, Some(reply)),
        Err(err) => {
            tracing::debug!(
                host = %candidate.host,
                stage = %state,
                error = %err,
                "candidate abandoned"
            );
            attempt.error = Some(err.to_string());
            (attempt, None)
        }
    }
}
