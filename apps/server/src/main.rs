use vhub::domain::config::ApiConfig;
use vhub::kernel::config::load_config;
use vhub_logger::Logger;
use vhub_server::Server;

#[vhub_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).init()?;

    // Missing config file is not fatal: defaults run against an in-memory database.
    let cfg = load_config(Some("server")).unwrap_or_else(|e| {
        tracing::warn!("Falling back to default configuration: {e}");
        ApiConfig::default()
    });

    Server::builder().config(cfg).build().await?.run().await
}
