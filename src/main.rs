use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use tutoria_backend::config::Settings;
use tutoria_backend::server::router::router;
use tutoria_backend::state::AppState;
use tutoria_backend::{logging, rag};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    logging::init(&settings.log_dir);

    // `tutoria-backend ingest [--overwrite]` reprocesses the knowledge base
    // and exits; otherwise start the server.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("ingest") {
        let overwrite = args.iter().any(|a| a == "--overwrite");
        let state = AppState::initialize(settings).await?;
        let report: rag::IngestReport = state.ingestor.run(overwrite).await?;
        tracing::info!(
            "done: {} stored, {} skipped",
            report.chunks_stored,
            report.chunks_skipped
        );
        return Ok(());
    }

    let bind_addr = format!("127.0.0.1:{}", settings.port);
    let state = AppState::initialize(settings).await?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", bind_addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    let app: Router = router(state);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
