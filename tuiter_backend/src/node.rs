use crate::api;
use crate::bootstrap::{self, BootstrapResources};
use crate::config::TuiterConfig;
use crate::database::Database;
use anyhow::Result;

/// Bootstraps the backend once and hands out cloned handles to whichever
/// entrypoint needs them.
pub struct TuiterNode {
    config: TuiterConfig,
    bootstrap: BootstrapResources,
}

impl TuiterNode {
    /// Creates the data directory and opens (and migrates) the database.
    pub fn start(config: TuiterConfig) -> Result<Self> {
        let bootstrap = bootstrap::initialize(&config)?;

        tracing::info!(
            directories_created = ?bootstrap.directories_created,
            database_initialized = bootstrap.database_initialized,
            db_path = %config.paths.db_path.display(),
            "tuiter node initialized"
        );

        Ok(Self { config, bootstrap })
    }

    /// Runs the REST API server until shutdown.
    pub async fn run_http_server(&self) -> Result<()> {
        api::serve_http(self.config.clone(), self.database()).await
    }

    pub fn config(&self) -> &TuiterConfig {
        &self.config
    }

    /// Returns a clone of the database handle.
    pub fn database(&self) -> Database {
        self.bootstrap.database.clone()
    }
}
