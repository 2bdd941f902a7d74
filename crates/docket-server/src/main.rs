//! Docket server binary
//!
//! Loads configuration and starts the HTTP server.

use docket_server::{config::ServerConfig, start_server, ServerError};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using default test configuration");
        eprintln!("Usage: docket-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default_test_config()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Docket Server - Case Management with AI Document Intake");
    println!();
    println!("USAGE:");
    println!("    docket-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("EXAMPLE:");
    println!("    docket-server --config config/docket.toml");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file should contain:");
    println!("    - bind_address: IP address to bind (e.g., '127.0.0.1')");
    println!("    - bind_port: Port number (e.g., 8080)");
    println!("    - database_path: Path to the SQLite database file");
    println!("    - blob_root: Directory uploaded documents are stored under");
    println!("    - session_ttl_secs: Session lifetime in seconds (default: 7 days)");
    println!("    - [llm]: model, endpoint, request_timeout_secs, max_attempts,");
    println!("             analysis_timeout_secs");
    println!();
    println!("ENVIRONMENT:");
    println!("    GEMINI_API_KEY     Model API credential (required)");
    println!();
}
