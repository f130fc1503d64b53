use tokio::net::TcpListener;
use tracing::info;
use ezdrop::{config::Config, routes::create_router, utils::init_logger, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        base_url = %config.upload.base_url,
        storage_root = %config.upload.storage_root.display(),
        allowed = ?config.upload.allowed_extensions,
        "Configuration loaded"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config);
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
