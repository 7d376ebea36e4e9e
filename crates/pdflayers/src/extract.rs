use pdf::ExtractOptions;
use pdflayers_core::layers::Precision;

use crate::prelude::{println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "extract")]
#[command(about = "Extract layers from a local PDF file")]
pub struct App {
    /// Path to the PDF file
    pub path: std::path::PathBuf,

    /// Decimal places kept for coordinates, lengths, and widths (0-3)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub precision: Option<u8>,

    /// Print the report on a single line
    #[arg(long)]
    pub compact: bool,
}

pub async fn run(app: App, _global: crate::Global) -> Result<()> {
    let precision = app
        .precision
        .map(Precision::try_from)
        .transpose()
        .map_err(|e| eyre!(e))?;
    let bytes = std::fs::read(&app.path)
        .with_context(|| f!("Failed to read {}", app.path.display()))?;

    log::debug!("Read {} bytes from {}", bytes.len(), app.path.display());

    let options = ExtractOptions { precision };
    let report = tokio::task::spawn_blocking(move || pdf::extract_layers(&bytes, &options))
        .await?
        .map_err(|e| eyre!(e))?;
    let report = match app.path.file_name() {
        Some(name) => report.with_filename(name.to_string_lossy()),
        None => report,
    };

    let json = if app.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{}", json);
    Ok(())
}
