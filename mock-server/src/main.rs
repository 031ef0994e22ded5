use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let consumer_key =
        std::env::var("POCKET_CONSUMER_KEY").unwrap_or_else(|_| "mock-consumer-key".to_string());
    let username = std::env::var("POCKET_USERNAME").unwrap_or_else(|_| "mock-user".to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    mock_server::run(listener, mock_server::new_db(&consumer_key, &username)).await
}
