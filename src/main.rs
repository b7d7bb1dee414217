use std::sync::Arc;

use crypto_provider::coingecko::CoinGeckoClient;
use crypto_provider::config::{GatewayConfig, HttpConfig};
use crypto_provider::mcp::CryptoServer;
use crypto_provider::transport::start_sse_server;

/// Command-line overrides; unset fields keep the environment's values
#[derive(Debug, Default)]
struct CliArgs {
    host: Option<String>,
    port: Option<u16>,
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args);

    let mut http_config = HttpConfig::from_env()?;
    if let Some(host) = cli.host {
        http_config.host = host;
    }
    if let Some(port) = cli.port {
        http_config.port = port;
    }
    http_config.debug |= cli.debug;

    // Logs go to stderr, RUST_LOG refines the default level
    let level = if http_config.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    tracing::info!(
        "Starting {} v{}...",
        http_config.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let gateway_config = GatewayConfig::from_env()?;
    match &gateway_config.credentials {
        Some(credentials) => {
            tracing::info!(plan = ?credentials.plan, "CoinGecko API key configured");
        }
        None => {
            tracing::warn!("COINGECKO_API_KEY not set - using the public API rate limits");
        }
    }

    let client = CoinGeckoClient::new(&gateway_config)?;
    tracing::info!(base_url = %client.base_url(), "CoinGecko client ready");

    let server = CryptoServer::new(Arc::new(client), http_config.service_name.clone())?;
    tracing::info!(
        tools = server.operations.list().len(),
        prompts = server.prompts.list().len(),
        "Registries built"
    );

    start_sse_server(&http_config, server).await?;

    Ok(())
}

/// Parse command-line arguments
fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                if i + 1 < args.len() {
                    cli.host = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--port" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse() {
                        Ok(port) => cli.port = Some(port),
                        Err(_) => {
                            eprintln!("Invalid port: {}", args[i + 1]);
                            print_usage();
                            std::process::exit(1);
                        }
                    }
                    i += 1;
                }
            }
            "--debug" => cli.debug = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Print usage information
fn print_usage() {
    println!("Crypto Provider - MCP server for CoinGecko cryptocurrency market data");
    println!();
    println!("USAGE:");
    println!("    crypto-provider [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --host <HOST>       Address to bind (default: 127.0.0.1)");
    println!("    --port <PORT>       Port to listen on (default: 8000)");
    println!("    --debug             Enable debug logging");
    println!("    --help, -h          Print this help message");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    HOST                    Address to bind (default: 127.0.0.1)");
    println!("    PORT                    Port to listen on (default: 8000)");
    println!("    DEBUG                   Enable debug logging (default: false)");
    println!("    SERVICE_NAME            Reported service name (default: crypto-mcp-server)");
    println!("    MAX_SESSIONS            Max concurrent SSE sessions (default: 50)");
    println!("    COINGECKO_API_KEY       CoinGecko API key (optional)");
    println!("    COINGECKO_API_PLAN      demo or pro (default: demo)");
    println!("    COINGECKO_BASE_URL      API base URL (default: https://api.coingecko.com/api/v3)");
    println!("    COINGECKO_TIMEOUT_SECS  Upstream request timeout (default: 30)");
    println!("    RUST_LOG                Logging filter (default: info)");
    println!();
    println!("EXAMPLES:");
    println!("    # Start on the default address");
    println!("    crypto-provider");
    println!();
    println!("    # Listen on all interfaces with verbose logs");
    println!("    crypto-provider --host 0.0.0.0 --port 8080 --debug");
}
