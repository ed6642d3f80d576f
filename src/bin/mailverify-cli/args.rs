use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use mailverify_lib::{ValidationMode, VerifierConfig};

#[derive(Parser, Debug)]
#[command(name = "mailverify-cli", version, about = "Verify e-mail addresses")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// écrit le rapport dans un fichier (JSON/NDJSON/CSV selon --format)
    #[arg(long)]
    pub out: Option<String>,

    /// mode: strict|relaxed (prioritaire sur le fichier de config)
    #[arg(long)]
    pub mode: Option<String>,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// fichier de configuration TOML
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// budget par serveur MX pour la sonde SMTP (ms)
    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// port SMTP
    #[arg(long)]
    pub port: Option<u16>,

    /// nom envoyé avec HELO
    #[arg(long)]
    pub helo: Option<String>,

    /// enveloppe MAIL FROM
    #[arg(long = "from")]
    pub mail_from: Option<String>,

    /// saute la sonde SMTP (format, DNS et listes seulement)
    #[arg(long)]
    pub skip_probe: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// vérifie une seule adresse
    Verify { email: String },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    /// Fichier de config (ou défauts) + surcharges de la ligne de commande.
    pub fn verifier_config(&self) -> Result<VerifierConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => VerifierConfig::default(),
        };

        if let Some(mode) = self.mode.as_deref() {
            config.validation_mode = mode_from_str(mode)?;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.probe.timeout_ms = timeout_ms;
        }
        if let Some(port) = self.port {
            config.probe.port = port;
        }
        if let Some(helo) = &self.helo {
            config.probe.helo_name = helo.clone();
        }
        if let Some(mail_from) = &self.mail_from {
            config.probe.sender = mail_from.clone();
        }
        if self.skip_probe {
            config.probe.enabled = false;
        }
        Ok(config)
    }
}

#[cfg(feature = "with-serde")]
fn load_config(path: &std::path::Path) -> Result<VerifierConfig> {
    use anyhow::Context;

    VerifierConfig::load(path).with_context(|| format!("load config {}", path.display()))
}

#[cfg(not(feature = "with-serde"))]
fn load_config(_path: &std::path::Path) -> Result<VerifierConfig> {
    bail!("--config requires the 'with-serde' feature")
}

pub fn mode_from_str(s: &str) -> Result<ValidationMode> {
    match s {
        "strict" => Ok(ValidationMode::Strict),
        "relaxed" => Ok(ValidationMode::Relaxed),
        other => bail!("unknown --mode '{other}', use: strict|relaxed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = <Cli as Parser>::try_parse_from([
            "mailverify-cli",
            "--timeout-ms",
            "2000",
            "--port",
            "2525",
            "--mode",
            "relaxed",
            "--skip-probe",
            "verify",
            "jane@example.com",
        ])
        .expect("valid args");
        let config = cli.verifier_config().expect("config");

        assert_eq!(config.probe.timeout_ms, 2000);
        assert_eq!(config.probe.port, 2525);
        assert!(!config.probe.enabled);
        assert_eq!(config.validation_mode, ValidationMode::Relaxed);
        assert!(matches!(cli.cmd, Some(Commands::Verify { ref email }) if email == "jane@example.com"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(mode_from_str("lenient").is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::clap_command().debug_assert();
    }
}
