//! ARI CLI - Query ACME renewal information
//!
//! Checks whether a certificate authority advertises the renewal-info
//! endpoint and fetches the suggested renewal window for a certificate.

use anyhow::{Context, Result};
use ari_client::{
    CertificateId, DirectoryFetcher, ErrorKind, HttpTransport, HttpTransportConfig,
    RenewalInfoClient, SharedDirectory,
};
use ari_proto::{LETS_ENCRYPT_DIRECTORY, LETS_ENCRYPT_STAGING_DIRECTORY};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// ARI - ACME Renewal Information client
#[derive(Parser, Debug)]
#[command(name = "ari")]
#[command(about = "Query ACME renewal information (draft-ietf-acme-ari)")]
#[command(version)]
struct Cli {
    /// ACME directory URL (defaults to Let's Encrypt)
    #[arg(long, global = true, env = "ARI_DIRECTORY_URL")]
    directory_url: Option<String>,

    /// Use the Let's Encrypt staging directory when no URL is given
    #[arg(long, global = true)]
    staging: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "10")]
    timeout_secs: u64,

    /// Skip certificate verification (insecure, for test CAs only)
    #[arg(long, global = true)]
    insecure: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show whether the CA advertises a renewal-info endpoint
    Directory,
    /// Fetch renewal information for a certificate
    #[command(long_about = r#"
Fetch the suggested renewal window for a certificate.

CERT_ID is the base64url ARI identifier: base64url(AKI keyIdentifier) "."
base64url(serial number), e.g. aYhba4dGQEHhs3uEe6CuLN4ByNQ.AIdlQyE

EXAMPLES:
  ari fetch aYhba4dGQEHhs3uEe6CuLN4ByNQ.AIdlQyE
  ari --staging fetch aYhba4dGQEHhs3uEe6CuLN4ByNQ.AIdlQyE
    "#)]
    Fetch {
        /// Certificate identifier
        cert_id: String,
    },
}

impl Cli {
    fn directory_url(&self) -> &str {
        match &self.directory_url {
            Some(url) => url,
            None if self.staging => LETS_ENCRYPT_STAGING_DIRECTORY,
            None => LETS_ENCRYPT_DIRECTORY,
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            timeout: self.timeout(),
            insecure: self.insecure,
            ..HttpTransportConfig::default()
        }
    }
}

fn init_logging(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .context("Failed to initialize logging filter")?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

async fn load_directory(cli: &Cli) -> Result<SharedDirectory> {
    let directory = SharedDirectory::default();

    DirectoryFetcher::new(&cli.transport_config())
        .context("Failed to create directory fetcher")?
        .refresh(cli.directory_url(), &directory)
        .await
        .with_context(|| format!("Failed to load directory {}", cli.directory_url()))?;

    Ok(directory)
}

async fn show_directory(cli: &Cli) -> Result<()> {
    let directory = load_directory(cli).await?.snapshot();

    println!("Directory:     {}", cli.directory_url());
    match directory.renewal_info_url() {
        Some(url) => println!("Renewal info:  {}", url),
        None => println!("Renewal info:  not offered"),
    }

    Ok(())
}

async fn fetch(cli: &Cli, cert_id: &str) -> Result<()> {
    let directory = load_directory(cli).await?;

    let transport =
        HttpTransport::new(cli.transport_config()).context("Failed to create HTTP transport")?;

    let client = RenewalInfoClient::new(Arc::new(directory), Arc::new(transport));

    let response = match client
        .fetch_renewal_info(&CertificateId::from(cert_id))
        .await
    {
        Ok(response) => response,
        Err(err) if err.kind() == ErrorKind::CapabilityUnsupported => {
            anyhow::bail!("{} does not offer renewal information", cli.directory_url())
        }
        Err(err) => {
            if err.is_retryable() {
                warn!("Renewal info request failed, it may succeed if retried later");
            }
            return Err(err).context("Failed to fetch renewal info");
        }
    };

    println!("Status:        {}", response.status);

    if !response.is_success() {
        println!("{}", String::from_utf8_lossy(&response.body));
        anyhow::bail!("Server rejected the renewal info request");
    }

    let info = response
        .renewal_info()
        .context("Failed to decode renewal info")?;
    debug!("Renewal info: {:?}", info);

    let now = Utc::now();
    let window = info.suggested_window;
    println!("Window start:  {}", window.start.to_rfc3339());
    println!("Window end:    {}", window.end.to_rfc3339());

    if !window.is_valid() {
        warn!("Suggested window ends before it starts");
    } else if window.contains(now) || window.end <= now {
        println!("Renew:         now");
    } else {
        println!("Renew:         not yet");
    }

    if let Some(url) = &info.explanation_url {
        println!("Explanation:   {}", url);
    }
    if let Some(retry_after) = response.retry_after(now) {
        println!("Check again:   in {}s", retry_after.as_secs());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match &cli.command {
        Commands::Directory => show_directory(&cli).await,
        Commands::Fetch { cert_id } => fetch(&cli, cert_id).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_url_defaults() {
        let cli = Cli::try_parse_from(["ari", "directory"]).unwrap();
        assert_eq!(cli.directory_url(), LETS_ENCRYPT_DIRECTORY);

        let cli = Cli::try_parse_from(["ari", "--staging", "directory"]).unwrap();
        assert_eq!(cli.directory_url(), LETS_ENCRYPT_STAGING_DIRECTORY);
    }

    #[test]
    fn test_explicit_directory_url_wins() {
        let cli = Cli::try_parse_from([
            "ari",
            "fetch",
            "abc123",
            "--staging",
            "--directory-url",
            "https://localhost:14000/dir",
            "--timeout-secs",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.directory_url(), "https://localhost:14000/dir");
        assert_eq!(cli.timeout(), Duration::from_secs(3));
        assert_eq!(cli.transport_config().timeout, Duration::from_secs(3));
        assert!(!cli.transport_config().insecure);
        match cli.command {
            Commands::Fetch { cert_id } => assert_eq!(cert_id, "abc123"),
            other => panic!("Expected fetch command, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_requires_cert_id() {
        assert!(Cli::try_parse_from(["ari", "fetch"]).is_err());
    }
}
