use mock_server::{MockConfig, DEMO_API_KEY, DEMO_SHARED_KEY};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let api_key = std::env::var("PDFREPRO_API_KEY").unwrap_or_else(|_| DEMO_API_KEY.to_string());
    let shared_key =
        std::env::var("PDFREPRO_SHARED_KEY").unwrap_or_else(|_| DEMO_SHARED_KEY.to_string());
    let mut config = MockConfig::new(&api_key, &shared_key);
    if let Some(quota) = std::env::var("PDFREPRO_PDF_QUOTA").ok().and_then(|q| q.parse().ok()) {
        config = config.with_pdf_quota(quota);
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "PDFrePRO mock listening");
    mock_server::run(listener, config).await
}
