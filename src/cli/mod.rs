//! # Command Line Interface
//!
//! `gsm fetch` and `gsm store` on top of the secret manager client.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::debug;

use crate::context::CallContext;
use crate::observability::{init_logging, LoggingConfig};
use crate::secrets::{SecretManagerClient, SecretStore};

#[derive(Parser, Debug)]
#[command(name = "gsm")]
#[command(about = "Read and write Google Cloud Secret Manager secrets via the metadata server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Overall deadline for the operation, in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Print the latest version of a secret to stdout
    Fetch {
        /// Secret name
        name: String,

        /// Project ID (auto-detected from the metadata server if omitted)
        #[arg(long)]
        project: Option<String>,
    },

    /// Add a new version of a secret, creating the secret if needed
    Store {
        /// Secret name
        name: String,

        /// Project ID (auto-detected from the metadata server if omitted)
        #[arg(long)]
        project: Option<String>,

        /// Secret value (read from stdin if omitted)
        #[arg(long)]
        value: Option<String>,
    },
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&LoggingConfig::new(cli.verbose, cli.json));

    let client = SecretManagerClient::from_env().context("Failed to build secret manager client")?;

    let ctx = match cli.timeout {
        Some(secs) => CallContext::with_timeout(Duration::from_secs(secs)),
        None => CallContext::background(),
    };

    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling");
            interrupt.cancel();
        }
    });

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    execute(cli.command, &client, &ctx, stdin.lock(), &mut stdout.lock()).await
}

/// Execute one command against `store`.
pub async fn execute<R: Read, W: Write>(
    command: Commands,
    store: &dyn SecretStore,
    ctx: &CallContext,
    mut input: R,
    output: &mut W,
) -> anyhow::Result<()> {
    match command {
        Commands::Fetch { name, project } => {
            let payload = match project {
                Some(project) => store.fetch_from_project(ctx, &project, &name).await?,
                None => store.fetch(ctx, &name).await?,
            };
            output.write_all(payload.expose_bytes()).context("Failed to write secret")?;
            output.flush()?;
        }
        Commands::Store { name, project, value } => {
            let value = match value {
                Some(value) => value.into_bytes(),
                None => {
                    let mut buf = Vec::new();
                    input.read_to_end(&mut buf).context("Failed to read secret from stdin")?;
                    buf
                }
            };
            match project {
                Some(project) => store.store_in_project(ctx, &project, &name, &value).await?,
                None => store.store(ctx, &name, &value).await?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Result, SecretsError};
    use crate::secrets::SecretPayload;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store keyed by (project, name)
    #[derive(Default)]
    struct MemoryStore {
        secrets: Mutex<HashMap<(String, String), Vec<u8>>>,
    }

    const DEFAULT_PROJECT: &str = "home-project";

    #[async_trait]
    impl SecretStore for MemoryStore {
        async fn fetch(&self, ctx: &CallContext, name: &str) -> Result<SecretPayload> {
            self.fetch_from_project(ctx, DEFAULT_PROJECT, name).await
        }

        async fn fetch_from_project(
            &self,
            _ctx: &CallContext,
            project_id: &str,
            name: &str,
        ) -> Result<SecretPayload> {
            let secrets = self.secrets.lock().unwrap();
            secrets
                .get(&(project_id.to_string(), name.to_string()))
                .map(|v| SecretPayload::new(v.clone()))
                .ok_or_else(|| SecretsError::NotFound {
                    phase: crate::errors::Phase::AccessSecret,
                    body: name.to_string(),
                })
        }

        async fn store(&self, ctx: &CallContext, name: &str, value: &[u8]) -> Result<()> {
            self.store_in_project(ctx, DEFAULT_PROJECT, name, value).await
        }

        async fn store_in_project(
            &self,
            _ctx: &CallContext,
            project_id: &str,
            name: &str,
            value: &[u8],
        ) -> Result<()> {
            self.secrets
                .lock()
                .unwrap()
                .insert((project_id.to_string(), name.to_string()), value.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from(["gsm", "fetch", "api-key", "--project", "my-project"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Fetch { name: "api-key".into(), project: Some("my-project".into()) }
        );
    }

    #[test]
    fn test_parse_store_with_globals() {
        let cli =
            Cli::try_parse_from(["gsm", "store", "api-key", "--value", "v", "--timeout", "5", "-v"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.timeout, Some(5));
        assert!(matches!(cli.command, Commands::Store { value: Some(_), project: None, .. }));
    }

    #[tokio::test]
    async fn test_store_from_stdin_then_fetch() {
        let store = MemoryStore::default();
        let ctx = CallContext::background();

        let command = Commands::Store { name: "token".into(), project: None, value: None };
        let mut sink = Vec::new();
        execute(command, &store, &ctx, &b"from-stdin"[..], &mut sink).await.unwrap();

        let mut out = Vec::new();
        let command = Commands::Fetch { name: "token".into(), project: None };
        execute(command, &store, &ctx, std::io::empty(), &mut out).await.unwrap();
        assert_eq!(out, b"from-stdin");
    }

    #[tokio::test]
    async fn test_explicit_project_and_value() {
        let store = MemoryStore::default();
        let ctx = CallContext::background();

        let command = Commands::Store {
            name: "token".into(),
            project: Some("other-project".into()),
            value: Some("explicit".into()),
        };
        execute(command, &store, &ctx, std::io::empty(), &mut Vec::new()).await.unwrap();

        let missing = Commands::Fetch { name: "token".into(), project: None };
        let err = execute(missing, &store, &ctx, std::io::empty(), &mut Vec::new()).await.unwrap_err();
        assert!(err.to_string().contains("not found"));

        let mut out = Vec::new();
        let command = Commands::Fetch { name: "token".into(), project: Some("other-project".into()) };
        execute(command, &store, &ctx, std::io::empty(), &mut out).await.unwrap();
        assert_eq!(out, b"explicit");
    }
}
