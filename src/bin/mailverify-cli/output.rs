#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};

use crate::args::Cli;
use mailverify_lib::{CheckResult, VerificationResult};

pub fn write_reports(rows: &[VerificationResult], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => {
            print!("{}", render_human(rows));
            Ok(())
        }
        "json" => write_json(rows, cli),
        "ndjson" => write_ndjson(rows, cli),
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn any_invalid(rows: &[VerificationResult]) -> bool {
    rows.iter().any(|row| !row.is_valid)
}

pub fn render_human(rows: &[VerificationResult]) -> String {
    let mut out = String::new();
    for row in rows {
        let tag = if row.is_valid { "[OK]     " } else { "[INVALID]" };
        out.push_str(&format!("{tag} {}\n", row.email));
        for (label, check) in [
            ("format", &row.format),
            ("professional", &row.professional),
            ("domain", &row.domain_status),
            ("mailbox", &row.mailbox),
        ] {
            if check.message.is_empty() {
                continue;
            }
            out.push_str(&format!("        {label}: {}\n", check_line(check)));
        }
        if let Some(host) = row.probe.as_ref().and_then(|p| p.responding_host.as_deref()) {
            out.push_str(&format!("        answered by: {host}\n"));
        }
    }
    out
}

fn check_line(check: &CheckResult) -> String {
    let mark = if check.is_valid { "yes" } else { "no" };
    format!("{mark} ({})", check.message)
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[VerificationResult], cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[VerificationResult], _: &Cli) -> Result<()> {
    bail!("format=json requires the 'with-serde' feature")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[VerificationResult], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for row in rows {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[VerificationResult], _: &Cli) -> Result<()> {
    bail!("format=ndjson requires the 'with-serde' feature")
}

#[cfg(feature = "with-csv")]
const CSV_HEADER: [&str; 10] = [
    "email",
    "is_valid",
    "format_valid",
    "professional",
    "domain_valid",
    "domain_message",
    "mailbox_valid",
    "mailbox_message",
    "response_code",
    "responding_host",
];

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[VerificationResult], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[VerificationResult], _: &Cli) -> Result<()> {
    bail!("format=csv requires the 'with-csv' feature")
}

#[cfg(feature = "with-csv")]
fn csv_record(row: &VerificationResult) -> Vec<String> {
    let probe = row.probe.as_ref();
    vec![
        row.email.clone(),
        row.is_valid.to_string(),
        row.format.is_valid.to_string(),
        row.professional.is_valid.to_string(),
        row.domain_status.is_valid.to_string(),
        row.domain_status.message.clone(),
        row.mailbox.is_valid.to_string(),
        row.mailbox.message.clone(),
        probe
            .and_then(|p| p.response_code)
            .map(|code| code.to_string())
            .unwrap_or_default(),
        probe
            .and_then(|p| p.responding_host.clone())
            .unwrap_or_default(),
    ]
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
