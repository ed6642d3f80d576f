use std::io::{self, Read, Write};
use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use super::error::ProbeError;
use super::types::SmtpReply;

// A reply line is at most 512 octets; anything far beyond is not SMTP.
const MAX_PENDING: usize = 64 * 1024;

/// Byte stream a probe talks over.
pub trait Connection: Read + Write {
    /// Bounds the next blocking read or write. `timeout` is never zero.
    fn set_io_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl Connection for TcpStream {
    fn set_io_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_read_timeout(Some(timeout))?;
        self.set_write_timeout(Some(timeout))
    }
}

/// Opens connections to mail exchangers.
pub trait Connector {
    type Connection: Connection;

    /// Connects to `host:port`, giving up at `deadline`.
    fn connect(
        &self,
        host: &str,
        port: u16,
        deadline: Instant,
    ) -> Result<Self::Connection, ProbeError>;
}

/// Plain TCP, trying every resolved address of the host in turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Connection = TcpStream;

    fn connect(&self, host: &str, port: u16, deadline: Instant) -> Result<TcpStream, ProbeError> {
        let addrs = resolve_within(host, port, deadline)?;

        let mut last_err = None;
        for addr in &addrs {
            let remaining = remaining_until(deadline)?;
            match TcpStream::connect_timeout(addr, remaining) {
                Ok(stream) => return Ok(stream),
                Err(err) => last_err = Some(err),
            }
        }
        Err(ProbeError::connect(
            host,
            last_err.unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "no socket address available",
                )
            }),
        ))
    }
}

/// Host name to socket addresses, bounded by `deadline`.
///
/// `getaddrinfo` has no timeout of its own, so it runs on a helper thread and
/// the attempt stops waiting for it once the deadline passes. IP literals skip
/// the lookup.
fn resolve_within(
    host: &str,
    port: u16,
    deadline: Instant,
) -> Result<Vec<SocketAddr>, ProbeError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![SocketAddr::new(ip, port)]);
    }
    let remaining = remaining_until(deadline)?;

    let (tx, rx) = mpsc::channel();
    let target = (host.to_string(), port);
    thread::spawn(move || {
        let _ = tx.send(target.to_socket_addrs().map(Iterator::collect::<Vec<_>>));
    });
    match rx.recv_timeout(remaining) {
        Ok(Ok(addrs)) => Ok(addrs),
        Ok(Err(err)) => Err(ProbeError::connect(host, err)),
        Err(RecvTimeoutError::Timeout) => {
            tracing::debug!(host, "address resolution exceeded the attempt deadline");
            Err(ProbeError::Timeout)
        }
        Err(RecvTimeoutError::Disconnected) => Err(ProbeError::connect(
            host,
            io::Error::other("address resolution aborted"),
        )),
    }
}

fn remaining_until(deadline: Instant) -> Result<Duration, ProbeError> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|left| !left.is_zero())
        .ok_or(ProbeError::Timeout)
}

/// Accumulates raw bytes and hands out complete lines only.
///
/// A trailing fragment without `\n` stays buffered and is prefixed onto the
/// bytes of the next [`push`](Self::push).
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Next complete line with its `\r\n` (or bare `\n`) stripped.
    pub(crate) fn next_line(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|byte| *byte == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    pub(crate) fn pending(&self) -> &[u8] {
        &self.pending
    }
}

/// One SMTP connection bounded by a single deadline.
///
/// Every read and write re-arms the socket timeout with whatever budget is
/// left, so a stalled server unblocks the read once the deadline passes.
/// Dropping the session closes the connection.
pub(crate) struct SmtpSession<C> {
    conn: C,
    lines: LineBuffer,
    deadline: Instant,
    transcript: Vec<String>,
}

impl<C: Connection> SmtpSession<C> {
    pub(crate) fn new(conn: C, deadline: Instant) -> Self {
        Self {
            conn,
            lines: LineBuffer::default(),
            deadline,
            transcript: Vec::new(),
        }
    }

    pub(crate) fn read_reply(&mut self) -> Result<SmtpReply, ProbeError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            if line.trim().is_empty() {
                continue;
            }
            self.transcript.push(format!("S: {line}"));
            let last = !is_continuation(&line);
            lines.push(line);
            if last {
                break;
            }
        }
        let final_line = lines.last().map(String::as_str).unwrap_or_default();
        let code = parse_code(final_line)
            .ok_or_else(|| ProbeError::Protocol(format!("invalid reply: {final_line}")))?;
        Ok(SmtpReply { code, lines })
    }

    pub(crate) fn send_command(&mut self, command: &str) -> Result<SmtpReply, ProbeError> {
        self.write_command(command)?;
        self.read_reply()
    }

    /// Sends `QUIT` without waiting for the reply; failures are ignored.
    pub(crate) fn quit(&mut self) {
        if let Err(err) = self.write_command("QUIT") {
            tracing::debug!(error = %err, "QUIT not delivered");
        }
    }

    pub(crate) fn into_transcript(self) -> Vec<String> {
        self.transcript
    }

    fn remaining(&self) -> Result<Duration, ProbeError> {
        remaining_until(self.deadline)
    }

    fn write_command(&mut self, command: &str) -> Result<(), ProbeError> {
        self.transcript.push(format!("C: {command}"));
        let remaining = self.remaining()?;
        self.conn.set_io_timeout(remaining).map_err(ProbeError::io)?;
        let mut data = command.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        self.conn.write_all(&data).map_err(ProbeError::io)?;
        self.conn.flush().map_err(ProbeError::io)
    }

    fn read_line(&mut self) -> Result<String, ProbeError> {
        loop {
            if let Some(line) = self.lines.next_line() {
                return Ok(line);
            }
            if self.lines.pending().len() > MAX_PENDING {
                return Err(ProbeError::Protocol("reply line too long".to_string()));
            }

            let remaining = self.remaining()?;
            self.conn.set_io_timeout(remaining).map_err(ProbeError::io)?;
            let mut buf = [0u8; 512];
            let read = match self.conn.read(&mut buf) {
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProbeError::io(err)),
            };
            if read == 0 {
                return Err(ProbeError::Closed);
            }
            self.lines.push(&buf[..read]);
        }
    }
}

/// `250-...` announces more lines, `250 ...` (or a bare code) ends the reply.
fn is_continuation(line: &str) -> bool {
    line.as_bytes().get(3) == Some(&b'-')
}

pub(crate) fn parse_code(line: &str) -> Option<u16> {
    let head = line.get(..3)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    head.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn drain(buffer: &mut LineBuffer) -> Vec<String> {
        std::iter::from_fn(|| buffer.next_line()).collect()
    }

    #[test]
    fn expired_deadline_stops_before_resolving_or_dialing() {
        let past = Instant::now();
        for host in ["mx.unresolvable.invalid", "192.0.2.1"] {
            let err = TcpConnector.connect(host, 25, past).expect_err("deadline passed");
            assert!(matches!(err, ProbeError::Timeout), "{host}: {err:?}");
        }
    }

    #[test]
    fn ip_literal_skips_name_resolution() {
        let addrs = resolve_within("192.0.2.1", 2525, Instant::now() + Duration::from_secs(5))
            .expect("literal");
        assert_eq!(addrs, vec![SocketAddr::from(([192, 0, 2, 1], 2525))]);
    }

    #[test]
    fn only_complete_lines_are_yielded() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"220 mx.exa");
        assert_eq!(buffer.next_line(), None);
        buffer.push(b"mple.com ESMTP\r\n250 ok");
        assert_eq!(buffer.next_line().as_deref(), Some("220 mx.example.com ESMTP"));
        assert_eq!(buffer.next_line(), None);
        assert_eq!(buffer.pending(), b"250 ok");
    }

    #[test]
    fn batched_lines_split_in_order() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"250-first\r\n250-second\n250 third\r\n");
        assert_eq!(drain(&mut buffer), ["250-first", "250-second", "250 third"]);
        assert!(buffer.pending().is_empty());
    }

    #[test]
    fn crlf_split_across_reads() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"550 no such user\r");
        assert_eq!(buffer.next_line(), None);
        buffer.push(b"\n");
        assert_eq!(buffer.next_line().as_deref(), Some("550 no such user"));
    }

    #[test]
    fn parse_code_requires_three_digits() {
        assert_eq!(parse_code("250 ok"), Some(250));
        assert_eq!(parse_code("550"), Some(550));
        assert_eq!(parse_code("25"), None);
        assert_eq!(parse_code("hello"), None);
        assert_eq!(parse_code("2x0 nope"), None);
    }

    #[test]
    fn continuation_marker() {
        assert!(is_continuation("250-PIPELINING"));
        assert!(!is_continuation("250 SIZE"));
        assert!(!is_continuation("250"));
    }

    proptest! {
        #[test]
        fn fragmentation_does_not_change_lines(cuts in proptest::collection::vec(0usize..48, 0..10)) {
            let stream: &[u8] = b"220 ready\r\n250-first\r\n250 last\r\n550 trailing";
            let mut points: Vec<usize> = cuts.into_iter().map(|c| c % stream.len()).collect();
            points.push(0);
            points.push(stream.len());
            points.sort_unstable();
            points.dedup();

            let mut buffer = LineBuffer::default();
            let mut lines = Vec::new();
            for pair in points.windows(2) {
                buffer.push(&stream[pair[0]..pair[1]]);
                lines.extend(drain(&mut buffer));
            }
            prop_assert_eq!(lines, vec!["220 ready", "250-first", "250 last"]);
            prop_assert_eq!(buffer.pending(), &b"550 trailing"[..]);
        }
    }
}
