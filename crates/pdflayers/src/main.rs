use crate::prelude::*;
use clap::Parser;

mod error;
mod extract;
mod prelude;
mod server;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Extract optional content groups (layers) from PDF files, over HTTP or from the command line"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "PDFLAYERS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Run the layer extraction HTTP service
    Serve(crate::server::cli::ServeOptions),

    /// Extract layers from a local PDF file and print them as JSON
    Extract(crate::extract::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::parse();

    // RUST_LOG still wins when set.
    let default_filter = if app.global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    color_eyre::install()?;

    match app.command {
        SubCommands::Serve(options) => crate::server::run(options, app.global).await,
        SubCommands::Extract(sub_app) => crate::extract::run(sub_app, app.global).await,
    }
}
