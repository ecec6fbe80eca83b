use mock_vtn::VtnConfig;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let config = VtnConfig::from_env();

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, client_id = %config.client_id, "mock VTN listening");
    mock_vtn::run_with(listener, config).await
}
