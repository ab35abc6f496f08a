use anyhow::Result;
use clap::{Parser, Subcommand};
use tuiter_backend::config::TuiterConfig;
use tuiter_backend::node::TuiterNode;
use tuiter_backend::telemetry;

#[derive(Parser)]
#[command(author, version, about = "Tuiter REST backend")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (Axum) for the REST API
    Serve,
    /// Create the data directory and apply database migrations, then exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();

    let config = TuiterConfig::from_env()?;
    let node = TuiterNode::start(config)?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => node.run_http_server().await,
        Command::Migrate => {
            tracing::info!(
                db_path = %node.config().paths.db_path.display(),
                "migrations applied"
            );
            Ok(())
        }
    }
}
