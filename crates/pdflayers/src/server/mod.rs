use crate::prelude::{eprintln, *};

pub mod cli;
mod routes;

pub use routes::router;

pub async fn run(options: cli::ServeOptions, global: crate::Global) -> Result<()> {
    let addr = f!("{}:{}", options.host, options.port);
    let app = router(options.max_upload_bytes());

    if global.verbose {
        eprintln!("Layer extraction endpoint: http://{}/extract-layers", addr);
        eprintln!("Upload limit: {} MB", options.max_upload_mb);
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;
    log::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}
