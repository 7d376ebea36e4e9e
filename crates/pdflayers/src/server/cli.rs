#[derive(Debug, clap::Args)]
pub struct ServeOptions {
    /// Host to bind to
    #[arg(long, env = "PDFLAYERS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PDFLAYERS_PORT", default_value = "10000")]
    pub port: u16,

    /// Largest accepted request body, in megabytes
    #[arg(long, env = "PDFLAYERS_MAX_UPLOAD_MB", default_value = "100")]
    pub max_upload_mb: usize,
}

impl ServeOptions {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
