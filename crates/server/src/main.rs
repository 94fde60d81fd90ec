//! mmrag server binary: loads configuration and serves the `/api/rag` API.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    server::start_server(config).await
}
