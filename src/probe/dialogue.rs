use crate::lists::host_matches;

use super::error::ProbeError;
use super::options::ProbeOptions;
use super::session::{Connection, SmtpSession};
use super::types::{HandshakeState, MailboxVerdict, SmtpReply};

/// Drives one connection through greeting, `HELO`, `MAIL FROM` and
/// `RCPT TO`, then sends `QUIT`.
///
/// Returns the reply to `RCPT TO`. Any other reply that is not 2xx, and any
/// I/O failure, aborts the dialogue; `state` is left at the last state
/// reached.
pub(crate) fn run_dialogue<C: Connection>(
    session: &mut SmtpSession<C>,
    recipient: &str,
    options: &ProbeOptions,
    state: &mut HandshakeState,
) -> Result<SmtpReply, ProbeError> {
    loop {
        *state = match *state {
            HandshakeState::Connecting => {
                let greeting = session.read_reply()?;
                expect_positive(&greeting, *state)?;
                HandshakeState::Greeted
            }
            HandshakeState::Greeted => {
                let reply = session.send_command(&format!("HELO {}", options.helo_name))?;
                expect_positive(&reply, *state)?;
                HandshakeState::IdentitySent
            }
            HandshakeState::IdentitySent => {
                let reply = session.send_command(&format!("MAIL FROM:<{}>", options.sender))?;
                expect_positive(&reply, *state)?;
                HandshakeState::SenderSent
            }
            HandshakeState::SenderSent => {
                let reply = session.send_command(&format!("RCPT TO:<{recipient}>"))?;
                *state = HandshakeState::RecipientSent;
                session.quit();
                *state = HandshakeState::Closed;
                return Ok(reply);
            }
            HandshakeState::RecipientSent | HandshakeState::Closed => {
                return Err(ProbeError::Protocol("dialogue already finished".to_string()));
            }
        };
    }
}

fn expect_positive(reply: &SmtpReply, stage: HandshakeState) -> Result<(), ProbeError> {
    if reply.is_positive_completion() {
        Ok(())
    } else {
        Err(ProbeError::UnexpectedReply {
            stage,
            line: reply.last_line().to_string(),
        })
    }
}

/// Classifies the reply to `RCPT TO` given by `host`.
pub(crate) fn classify_recipient_reply(
    reply: &SmtpReply,
    host: &str,
    options: &ProbeOptions,
) -> MailboxVerdict {
    match reply.code / 100 {
        2 => {
            let trusted = options
                .trusted_providers
                .iter()
                .any(|provider| host_matches(host, provider));
            if !trusted && sounds_like_blanket_acceptance(reply.last_line(), options) {
                MailboxVerdict::BlanketAccept
            } else {
                MailboxVerdict::Accepted
            }
        }
        4 => MailboxVerdict::TemporaryFailure,
        5 => MailboxVerdict::DoesNotExist,
        _ => MailboxVerdict::Unknown,
    }
}

fn sounds_like_blanket_acceptance(line: &str, options: &ProbeOptions) -> bool {
    let line = line.to_lowercase();
    options
        .blanket_acceptance_phrases
        .iter()
        .any(|phrase| !phrase.is_empty() && line.contains(&phrase.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(line: &str) -> SmtpReply {
        SmtpReply {
            code: line[..3].parse().expect("code"),
            lines: vec![line.to_string()],
        }
    }

    #[test]
    fn classes_by_status_code() {
        let options = ProbeOptions::default();
        let host = "mx.example.com";
        let cases = [
            ("250 2.1.5 Ok", MailboxVerdict::Accepted),
            ("251 User not local; will forward", MailboxVerdict::Accepted),
            ("550 5.1.1 User unknown", MailboxVerdict::DoesNotExist),
            ("553 mailbox name not allowed", MailboxVerdict::DoesNotExist),
            ("554 Transaction failed", MailboxVerdict::DoesNotExist),
            ("450 4.2.0 Greylisted", MailboxVerdict::TemporaryFailure),
            ("354 Start mail input", MailboxVerdict::Unknown),
        ];
        for (line, expected) in cases {
            assert_eq!(
                classify_recipient_reply(&reply(line), host, &options),
                expected,
                "{line}"
            );
        }
    }

    #[test]
    fn blanket_wording_from_unknown_host_is_not_trusted() {
        let options = ProbeOptions::default();
        let verdict = classify_recipient_reply(
            &reply("250 2.1.5 Recipient OK, Relay Accepted"),
            "mx.smallhost.example",
            &options,
        );
        assert_eq!(verdict, MailboxVerdict::BlanketAccept);
        assert!(!verdict.mailbox_likely_valid());
    }

    #[test]
    fn blanket_wording_from_trusted_provider_is_accepted() {
        let options = ProbeOptions::default();
        let verdict = classify_recipient_reply(
            &reply("250 OK, will attempt delivery"),
            "mx1.icloud.com",
            &options,
        );
        assert_eq!(verdict, MailboxVerdict::Accepted);
    }

    #[test]
    fn verdict_messages_quote_the_reply() {
        assert_eq!(
            MailboxVerdict::DoesNotExist.message("550 5.1.1 unknown"),
            "Mailbox does not exist: 550 5.1.1 unknown"
        );
        insta::assert_snapshot!(
            MailboxVerdict::TemporaryFailure.message("451 try later"),
            @"Temporary error, likely invalid: 451 try later"
        );
    }
}
