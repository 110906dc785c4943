//! MCP server wiring: CLI, logging, and the stdio/SSE transports.

mod requests;
mod server;

pub use server::InteractServer;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use interact_config::Config;
use rmcp::{transport::sse_server::SseServer, transport::stdio, ServiceExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// Serve over stdin/stdout (the usual MCP client setup)
    Stdio,
    /// Serve over HTTP with server-sent events
    Sse,
}

/// MCP server for iOS Simulator automation
#[derive(Parser)]
#[command(name = "ios-interact")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Transport to serve on
    #[arg(long, value_enum, default_value = "stdio")]
    transport: Transport,

    /// Path to a configuration file
    #[arg(long)]
    config: Option<String>,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Log to stderr; stdout carries the MCP protocol
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let bind_address = config.server.bind_address.clone();
    let server = InteractServer::new(config)?;

    match cli.transport {
        Transport::Stdio => {
            tracing::info!("serving over stdio");
            let service = server.serve(stdio()).await?;
            service.waiting().await?;
        }
        Transport::Sse => {
            tracing::info!(%bind_address, "serving over SSE");
            let ct = SseServer::serve(bind_address.parse()?)
                .await?
                .with_service(move || server.clone());
            tokio::signal::ctrl_c().await?;
            ct.cancel();
        }
    }

    Ok(())
}
