use anyhow::{Context, Result};
use mailverify_lib::{VerificationResult, Verifier, VerifyError};
use tracing_subscriber::EnvFilter;

use std::io::{self, BufRead};

#[path = "mailverify-cli/args.rs"]
mod args;
#[path = "mailverify-cli/output.rs"]
mod output;

use args::{Cli, Commands};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let emails: Vec<String> = if cli.stdin {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<_>>()
            .context("read stdin")?
    } else if let Some(Commands::Verify { email }) = &cli.cmd {
        vec![email.clone()]
    } else {
        Cli::clap_command().print_help()?;
        println!();
        return Ok(());
    };

    let config = cli.verifier_config()?;
    let verifier = Verifier::from_config(config).context("initialise DNS resolver")?;

    let mut rows: Vec<VerificationResult> = Vec::with_capacity(emails.len());
    for email in &emails {
        match verifier.verify(email) {
            Ok(result) => rows.push(result),
            // blank lines in a stdin batch
            Err(VerifyError::MissingAddress) if cli.stdin => continue,
            Err(err) => return Err(err).with_context(|| format!("verify '{email}'")),
        }
    }

    output::write_reports(&rows, &cli)?;

    // exit codes: 0 all valid, 2 some invalid, 1 fatal
    if output::any_invalid(&rows) {
        std::process::exit(2);
    }
    Ok(())
}
