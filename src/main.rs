use anyhow::Result;
use calculator_mcp::client::{parse_invocation, McpClient};
use calculator_mcp::config::{find_config_file, load_config, Config};
use calculator_mcp::mcp::McpServer;
use calculator_mcp::tools::ToolRegistry;
use calculator_mcp::ui;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Calculator MCP - a tutorial MCP server and client across three transports
#[derive(Parser, Debug)]
#[command(name = "calculator-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run the calculator/weather MCP server or call it as a client", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times: -v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
}

/// Transport mode for the server
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TransportMode {
    /// Stdio pipe (for Claude Desktop and other MCP clients)
    Stdio,
    /// SSE over HTTP (served by the SDK's Streamable HTTP listener)
    Sse,
    /// Single-endpoint Streamable HTTP
    #[value(name = "streamable-http", alias = "http")]
    StreamableHttp,
}

/// Which demo tools to serve
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Toolset {
    /// Only the `add` tool
    Calculator,
    /// Only the weather demo tools
    Weather,
    /// Everything
    All,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server
    Serve {
        /// Transport to serve on
        #[arg(long, short, value_enum, default_value_t = TransportMode::Stdio)]
        transport: TransportMode,

        /// Host to bind for HTTP transports (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind for HTTP transports (overrides config)
        #[arg(long, short)]
        port: Option<u16>,

        /// Toolset to expose
        #[arg(long, value_enum, default_value_t = Toolset::Calculator)]
        toolset: Toolset,
    },

    /// Connect to a server, list its tools, and optionally call one
    #[command(alias = "call")]
    Client {
        /// Server script path (stdio) or URL ending in /sse or /mcp
        target: String,

        /// Tool name followed by key=value arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        invocation: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("calculator_mcp={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration from file if specified or found in default locations
    let config = if let Some(config_path) = &cli.config {
        load_config(config_path)?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Serve {
            transport,
            host,
            port,
            toolset,
        } => {
            let registry = match toolset {
                Toolset::Calculator => ToolRegistry::calculator(),
                Toolset::Weather => ToolRegistry::weather_from(&config.weather),
                Toolset::All => ToolRegistry::all_from(&config.weather),
            };
            tracing::info!("Serving {} tool(s)", registry.len());

            let server = McpServer::new(registry)?;

            match transport {
                TransportMode::Stdio => {
                    server.run_stdio().await?;
                }
                TransportMode::Sse | TransportMode::StreamableHttp => {
                    let host = host.unwrap_or(config.server.host);
                    let port = port.unwrap_or(config.server.port);
                    let addr = format!("{}:{}", host, port);

                    let (bound_addr, handle) = server.run_http(&addr).await?;
                    tracing::info!("MCP server listening on {}", bound_addr);

                    handle
                        .await
                        .map_err(|e| anyhow::anyhow!("Server task failed: {}", e))?;
                }
            }
        }

        Commands::Client { target, invocation } => {
            // Argument problems are fatal before any network call
            let (tool, params) = parse_invocation(&invocation)?;

            let timeout = Duration::from_secs(
                cli.timeout.unwrap_or(config.client.request_timeout_secs),
            );
            let as_json = match cli.output {
                OutputFormat::Json => true,
                OutputFormat::Table => false,
                OutputFormat::Auto => !ui::is_terminal(),
            };

            let mut client = McpClient::connect(&target, timeout).await?;
            let outcome = run_client(&mut client, tool, params, as_json, cli.quiet).await;
            // The connection is released unconditionally, success or not
            let _ = client.close().await;
            outcome?;
        }
    }

    Ok(())
}

async fn run_client(
    client: &mut McpClient,
    tool: Option<String>,
    params: serde_json::Map<String, serde_json::Value>,
    as_json: bool,
    quiet: bool,
) -> Result<()> {
    let Some(tool) = tool else {
        ui::print_tools(client.server_info(), client.tools(), as_json);
        return Ok(());
    };

    if !quiet {
        eprintln!(
            "Calling tool '{}' with params {}",
            tool,
            serde_json::Value::Object(params.clone())
        );
    }

    let result = client.call_tool(&tool, params).await?;
    ui::print_result(&result);

    if result.is_error == Some(true) {
        anyhow::bail!("Tool '{}' reported an error", tool);
    }
    Ok(())
}
