//! GraXpert mock server — entry point.

use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use graxpert_mock::WireFormat;
use graxpert_mock_server::client::describe_reply;
use graxpert_mock_server::config::{
    resolve_address, resolve_port, resolve_url, ServerConfig, DEFAULT_PROCESSING_DELAY,
};
use graxpert_mock_server::session::{self, SessionOptions};
use graxpert_mock_server::types::ServerInfo;
use graxpert_mock_server::WebSocketServer;

#[derive(Parser)]
#[command(
    name = "graxpert-mock-server",
    about = "WebSocket mock of the GraXpert background-extraction backend",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the mock server (default).
    Serve {
        /// Listen address. Also reads GRAXPERT_MOCK_ADDRESS.
        #[arg(short, long)]
        address: Option<String>,

        /// Listen port. Also reads GRAXPERT_MOCK_PORT.
        #[arg(short, long)]
        port: Option<u16>,

        /// Simulated processing time per request, in milliseconds.
        #[arg(long, default_value_t = DEFAULT_PROCESSING_DELAY.as_millis() as u64)]
        delay_ms: u64,

        /// Reply encoding: json, or legacy (dict-repr replies, as the Python mock sent them).
        #[arg(long, default_value_t = WireFormat::Json)]
        wire_format: WireFormat,
    },

    /// Send one PROCESS_IMAGE_REQUEST and print replies until the server closes or Ctrl-C.
    Probe {
        /// Server URL (default: ws://<address>:<port> from the environment or defaults).
        #[arg(long, conflicts_with = "spawn")]
        url: Option<String>,

        /// Filename to request processing for.
        #[arg(short, long, default_value = "some_file")]
        filename: String,

        /// Start the mock in-process on the resolved address and port first.
        #[arg(long)]
        spawn: bool,

        /// Processing delay of the spawned mock, in milliseconds.
        #[arg(long, requires = "spawn", default_value_t = DEFAULT_PROCESSING_DELAY.as_millis() as u64)]
        delay_ms: u64,
    },

    /// Launch an interactive client.
    Repl {
        /// Server URL (default: ws://<address>:<port> from the environment or defaults).
        #[arg(long)]
        url: Option<String>,
    },

    /// Print server information as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   graxpert-mock-server completions bash > ~/.local/share/bash-completion/completions/graxpert-mock-server
    ///   graxpert-mock-server completions zsh > ~/.zfunc/_graxpert-mock-server
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve {
        address: None,
        port: None,
        delay_ms: DEFAULT_PROCESSING_DELAY.as_millis() as u64,
        wire_format: WireFormat::Json,
    }) {
        Commands::Serve {
            address,
            port,
            delay_ms,
            wire_format,
        } => {
            let config = ServerConfig {
                address: resolve_address(address.as_deref()),
                port: resolve_port(port)?,
                processing_delay: Duration::from_millis(delay_ms),
                wire_format,
            };

            tracing::info!("GraXpert mock server");

            let server = WebSocketServer::bind(&config).await?;
            server
                .run_until(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for Ctrl-C: {e}");
                        std::future::pending::<()>().await;
                    }
                })
                .await?;
        }

        Commands::Probe {
            url,
            filename,
            spawn,
            delay_ms,
        } => {
            let spawn = if spawn {
                Some(ServerConfig {
                    address: resolve_address(None),
                    port: resolve_port(None)?,
                    processing_delay: Duration::from_millis(delay_ms),
                    wire_format: WireFormat::Json,
                })
            } else {
                None
            };
            let options = SessionOptions {
                url: resolve_url(url.as_deref())?,
                filename,
                spawn,
            };

            let outcome = session::run(
                options,
                async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for Ctrl-C: {e}");
                        std::future::pending::<()>().await;
                    }
                },
                |reply| println!("{}", describe_reply(reply)),
            )
            .await?;
            tracing::info!(
                "Session with {} ended after {} replies",
                outcome.url,
                outcome.replies.len()
            );
        }

        Commands::Repl { url } => {
            let url = resolve_url(url.as_deref())?;
            graxpert_mock_server::repl::run(url).await?;
        }

        Commands::Info => {
            let config = ServerConfig {
                address: resolve_address(None),
                port: resolve_port(None)?,
                ..ServerConfig::default()
            };
            let info = ServerInfo::for_config(&config);
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(
                shell,
                &mut cmd,
                "graxpert-mock-server",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
