use tradejournal_server::{init_tracing, run, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = ServerConfig::from_env()?;
    run(config).await
}
