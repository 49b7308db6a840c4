use anyhow::Context;

use invoicedesk_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    invoicedesk_observability::init();

    let config = AppConfig::from_env()?;
    let app = invoicedesk_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
