use partylobby::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), LobbyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::load();
    config.validate()?;

    // A missing or broken catalog stops start-up here.
    let catalog = RuleCatalog::load(&config.rules_path)?;

    let server = LobbyServerBuilder::from_config(&config)
        .build::<DeferredRoles>(catalog)
        .await?;
    tracing::info!(addr = %server.local_addr()?, "partylobby listening");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
}
