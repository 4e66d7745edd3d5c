use clap::Parser;
use log::{error, info};
use server::config::ServerConfig;
use server::network::Server;

/// Parses the command line, binds the listener and runs the simulation
/// until the process receives Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();
    let server = Server::bind(config).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
