//! The `aim` command-line client: submit proposals to the AIM evaluator and follow their evaluation.

mod commands;
mod config;

use aim_types::AccountAddress;
use aim_utils::{LogFormat, ShutdownController};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use config::ClientConfig;

#[derive(Parser)]
#[command(name = "aim", about = "AIM evaluator proposal client", version)]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "AIM_CONFIG")]
    config: Option<PathBuf>,

    /// JSON-RPC relay URL.
    #[arg(long, env = "AIM_NODE_URL")]
    node_url: Option<String>,

    /// Event stream URL.
    #[arg(long, env = "AIM_WS_URL")]
    ws_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "AIM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format: "human" or "json".
    #[arg(long, env = "AIM_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the current constitution.
    Constitution,

    /// Print the current evaluation fee estimate.
    Fee,

    /// Submit a proposal and wait for its evaluation.
    Submit {
        /// Account the proposal is submitted from.
        #[arg(long, env = "AIM_ACCOUNT")]
        account: AccountAddress,

        /// Proposal text.
        #[arg(long)]
        text: String,
    },

    /// Show past evaluations, newest first.
    History {
        /// Number of entries to show.
        #[arg(long)]
        window: Option<usize>,

        /// Keep running and print new evaluations as they arrive.
        #[arg(long)]
        follow: bool,
    },

    /// Read the result of a request by id.
    Result {
        #[arg(long)]
        id: u64,
    },
}

impl Cli {
    /// Merge file configuration with flag overrides.
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_toml_file(path)?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.node_url {
            config.node_url = url.clone();
        }
        if let Some(url) = &self.ws_url {
            config.ws_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.client_config()?;
    aim_utils::init_logging(config.log_format, &config.log_level)?;

    if let Some(path) = &cli.config {
        tracing::debug!("loaded config from {}", path.display());
    }

    let shutdown = Arc::new(ShutdownController::new());
    let signal = Arc::clone(&shutdown);
    tokio::spawn(async move { signal.wait_for_signal().await });

    match cli.command {
        Command::Constitution => commands::constitution(&config).await,
        Command::Fee => commands::fee(&config).await,
        Command::Submit { account, text } => {
            commands::submit(&config, account, text, &shutdown).await
        }
        Command::History { window, follow } => {
            commands::history(&config, window, follow, &shutdown).await
        }
        Command::Result { id } => commands::result(&config, id).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "aim",
            "--node-url",
            "http://relay.example:8545",
            "--log-format",
            "json",
            "history",
            "--window",
            "8",
        ])
        .unwrap();
        let config = cli.client_config().unwrap();
        assert_eq!(config.node_url, "http://relay.example:8545");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Command::History { window: Some(8), follow: false }));
    }

    #[test]
    fn submit_requires_valid_account() {
        let bad = Cli::try_parse_from(["aim", "submit", "--account", "0x12", "--text", "hi"]);
        assert!(bad.is_err());

        let good = Cli::try_parse_from([
            "aim",
            "submit",
            "--account",
            "0x0A0f4321214BB6C7811dD8a71cF587bdaF03f0A0",
            "--text",
            "Increase treasury allocation",
        ])
        .unwrap();
        match good.command {
            Command::Submit { account, text } => {
                assert_eq!(account.as_str(), "0x0a0f4321214bb6c7811dd8a71cf587bdaf03f0a0");
                assert_eq!(text, "Increase treasury allocation");
            }
            _ => panic!("expected submit"),
        }
    }
}
